use serde::{Deserialize, Serialize};

use crate::benchmarks::{BenchmarkTable, Direction, score_against};
use crate::competition::{Band, CompetitionTier, tier_by_name};
use crate::numeric::round2;
use crate::player::{PeakBatting, PeakBowling};
use crate::weights::{SubWeights, present_weighted_mean};

const RUNS_SHARE: f64 = 0.7;
const STRIKE_RATE_SHARE: f64 = 0.3;
const WICKETS_SHARE: f64 = 0.6;
const ECONOMY_SHARE: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredInnings {
    pub runs: f64,
    pub score: f64,
    pub band: Band,
    pub competition: Option<String>,
    pub opponent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSpell {
    pub wickets: f64,
    pub runs: f64,
    pub score: f64,
    pub band: Band,
    pub competition: Option<String>,
    pub opponent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakResult {
    pub score: f64,
    pub best_bat: f64,
    pub best_bowl: f64,
    pub innings: Vec<ScoredInnings>,
    pub spells: Vec<ScoredSpell>,
    pub has_peaks: bool,
}

/// Band for a peak played in `competition`, falling back to the player's own CTI.
fn band_for(competition: Option<&str>, tiers: &[CompetitionTier], fallback_cti: f64) -> Band {
    let cti = competition
        .and_then(|name| tier_by_name(tiers, name))
        .map(|t| t.cti_value)
        .unwrap_or(fallback_cti);
    Band::from_cti(cti)
}

pub fn score_innings(
    innings: &PeakBatting,
    tiers: &[CompetitionTier],
    fallback_cti: f64,
    bench: &BenchmarkTable,
) -> Option<ScoredInnings> {
    if innings.runs <= 0.0 {
        return None;
    }
    let band = band_for(innings.competition.as_deref(), tiers, fallback_cti);
    let runs_score = score_against(innings.runs, bench.peak_runs.band(band), Direction::HigherBetter)
        .unwrap_or(0.0);
    let mut score = runs_score;
    if innings.balls > 0.0 {
        let strike_rate = innings.runs / innings.balls * 100.0;
        if let Some(sr_score) =
            score_against(strike_rate, &bench.season.band(band).bat_sr, Direction::HigherBetter)
        {
            score = runs_score * RUNS_SHARE + sr_score * STRIKE_RATE_SHARE;
        }
    }
    Some(ScoredInnings {
        runs: innings.runs,
        score,
        band,
        competition: innings.competition.clone(),
        opponent: innings.opponent.clone(),
    })
}

pub fn score_spell(
    spell: &PeakBowling,
    tiers: &[CompetitionTier],
    fallback_cti: f64,
    bench: &BenchmarkTable,
) -> Option<ScoredSpell> {
    if spell.wickets <= 0.0 && spell.runs <= 0.0 {
        return None;
    }
    let band = band_for(spell.competition.as_deref(), tiers, fallback_cti);
    let wickets_score = score_against(spell.wickets, &bench.peak_wickets, Direction::HigherBetter);
    let mut score = wickets_score.unwrap_or(0.0);
    if spell.overs > 0.0 && spell.runs >= 0.0 {
        let economy = spell.runs / spell.overs;
        let economy_score =
            score_against(economy, &bench.season.band(band).bowl_econ, Direction::LowerBetter);
        if let (Some(w), Some(e)) = (wickets_score, economy_score) {
            score = w * WICKETS_SHARE + e * ECONOMY_SHARE;
        }
    }
    Some(ScoredSpell {
        wickets: spell.wickets,
        runs: spell.runs,
        score,
        band,
        competition: spell.competition.clone(),
        opponent: spell.opponent.clone(),
    })
}

/// Score a player's standout innings and spells.
///
/// The best innings and best spell are combined with the role's bat/bowl sub-weights;
/// a side with no score drops out of the mean.
pub fn score_peaks(
    batting: &[PeakBatting],
    bowling: &[PeakBowling],
    tiers: &[CompetitionTier],
    fallback_cti: f64,
    bench: &BenchmarkTable,
    sub: SubWeights,
) -> PeakResult {
    let innings: Vec<ScoredInnings> = batting
        .iter()
        .filter_map(|b| score_innings(b, tiers, fallback_cti, bench))
        .collect();
    let spells: Vec<ScoredSpell> = bowling
        .iter()
        .filter_map(|b| score_spell(b, tiers, fallback_cti, bench))
        .collect();

    let best_bat = innings.iter().map(|i| i.score).fold(0.0, f64::max);
    let best_bowl = spells.iter().map(|s| s.score).fold(0.0, f64::max);
    let score = present_weighted_mean([(best_bat, sub.bat), (best_bowl, sub.bowl)]);

    PeakResult {
        score: round2(score),
        best_bat: round2(best_bat),
        best_bowl: round2(best_bowl),
        innings: innings
            .into_iter()
            .map(|i| ScoredInnings { score: round2(i.score), ..i })
            .collect(),
        spells: spells
            .into_iter()
            .map(|s| ScoredSpell { score: round2(s.score), ..s })
            .collect(),
        has_peaks: best_bat > 0.0 || best_bowl > 0.0,
    }
}
