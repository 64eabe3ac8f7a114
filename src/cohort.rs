use rayon::prelude::*;

use crate::config::EngineConstants;
use crate::engine::Engine;
use crate::numeric::{round_to, whole_pct};
use crate::pdi::PdiResult;
use crate::player::PlayerRecord;
use crate::ratings::SkillGroup;

/// Position of ARM inside the `[floor, ceiling]` band as 0..=100.
pub fn age_score(arm: f64, constants: &EngineConstants) -> u8 {
    let range = constants.arm_ceiling - constants.arm_floor;
    if range <= 0.0 {
        return 50;
    }
    whole_pct((arm - constants.arm_floor) / range * 100.0)
}

/// Players that take part in cohort ranking: submitted and coach-rated on technique.
pub fn is_comparable(player: &PlayerRecord) -> bool {
    player.submitted && player.coach_ratings.rated_in(SkillGroup::TechnicalPrimary) > 0
}

/// Sorted PDIs of the comparable pool, built once and queried per player.
#[derive(Debug, Clone, Default)]
pub struct CohortIndex {
    sorted: Vec<f64>,
}

impl CohortIndex {
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = scores.into_iter().filter(|v| *v > 0.0).collect();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    /// Score every comparable player in parallel.
    pub fn build(players: &[PlayerRecord], engine: &Engine<'_>) -> Self {
        let scores: Vec<f64> = players
            .par_iter()
            .filter(|p| is_comparable(p))
            .map(|p| engine.score(p).pdi)
            .collect();
        Self::from_scores(scores)
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Share of the other pool members strictly below `pdi`, as 0..=100.
    /// A pool of one or none is 50.
    pub fn percentile(&self, pdi: f64) -> u8 {
        let n = self.sorted.len();
        if n <= 1 {
            return 50;
        }
        let below = self.sorted.partition_point(|v| *v < pdi);
        whole_pct(below as f64 / (n - 1) as f64 * 100.0)
    }
}

/// Overall core score: mean of PDI percent, cohort percentile and age score.
pub fn overall_score(result: &PdiResult, cohort_percentile: u8) -> Option<u8> {
    if result.pdi <= 0.0 {
        return None;
    }
    let sum = f64::from(result.pdi_pct) + f64::from(cohort_percentile) + f64::from(result.age_score);
    Some(round_to(sum / 3.0, 0) as u8)
}

/// Fill cohort percentile and overall score on already computed results.
///
/// `results[i]` must belong to `players[i]`.
pub fn rank_scored(players: &[PlayerRecord], results: &mut [PdiResult]) -> CohortIndex {
    let index = CohortIndex::from_scores(
        players
            .iter()
            .zip(results.iter())
            .filter(|(p, _)| is_comparable(p))
            .map(|(_, r)| r.pdi),
    );
    for result in results.iter_mut() {
        let pct = index.percentile(result.pdi);
        result.cohort_percentile = Some(pct);
        result.overall_score = overall_score(result, pct);
    }
    index
}

/// Score a whole pool once and rank every player against it.
pub fn rank_pool(players: &[PlayerRecord], engine: &Engine<'_>) -> Vec<PdiResult> {
    let mut results: Vec<PdiResult> = players.par_iter().map(|p| engine.score(p)).collect();
    let index = rank_scored(players, &mut results);
    tracing::debug!(pool = players.len(), ranked = index.len(), "ranked cohort");
    results
}
