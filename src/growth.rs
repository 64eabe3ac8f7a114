use serde::{Deserialize, Serialize};

use crate::numeric::round2;
use crate::pdi::PdiResult;
use crate::weights::Pillar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarDelta {
    pub pillar: Pillar,
    pub baseline: f64,
    pub current: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthDelta {
    pub pillars: Vec<PillarDelta>,
    pub pdi_delta: f64,
    pub sagi_delta: Option<f64>,
}

/// Per-pillar change in raw score between two snapshots of the same player.
/// A pillar missing from the baseline counts as 0 there.
pub fn growth_delta(baseline: &PdiResult, current: &PdiResult) -> GrowthDelta {
    let pillars = current
        .pillars
        .iter()
        .map(|p| {
            let before = baseline
                .pillar(p.pillar)
                .map(|b| b.raw_score)
                .unwrap_or(0.0);
            PillarDelta {
                pillar: p.pillar,
                baseline: before,
                current: p.raw_score,
                delta: round2(p.raw_score - before),
            }
        })
        .collect();
    let sagi_delta = match (baseline.sagi, current.sagi) {
        (Some(b), Some(c)) => Some(round2(c - b)),
        _ => None,
    };
    GrowthDelta {
        pillars,
        pdi_delta: round2(current.pdi - baseline.pdi),
        sagi_delta,
    }
}

impl GrowthDelta {
    pub fn pillar(&self, pillar: Pillar) -> Option<&PillarDelta> {
        self.pillars.iter().find(|d| d.pillar == pillar)
    }

    /// Pillar with the largest gain, if any pillar improved.
    pub fn biggest_gain(&self) -> Option<&PillarDelta> {
        self.pillars
            .iter()
            .filter(|d| d.delta > 0.0)
            .max_by(|a, b| a.delta.total_cmp(&b.delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::CcmResult;
    use crate::config::EngineConfig;
    use crate::pdi::compute_pdi;
    use crate::player::PlayerRecord;
    use crate::ratings::{RatingSet, SkillGroup};

    fn snapshot(tactical: &[u8], own: &[u8]) -> PdiResult {
        let player = PlayerRecord {
            coach_ratings: RatingSet::new().with(SkillGroup::Tactical, tactical),
            self_ratings: RatingSet::new().with(SkillGroup::Tactical, own),
            ..PlayerRecord::default()
        };
        compute_pdi(&player, &CcmResult::default(), &EngineConfig::default(), 2026)
    }

    #[test]
    fn deltas_per_pillar() {
        let before = snapshot(&[2, 2], &[4, 4]);
        let after = snapshot(&[3, 4], &[4, 4]);
        let d = growth_delta(&before, &after);
        let te = d.pillar(Pillar::TacticalExecution).unwrap();
        assert_eq!(te.baseline, 2.0);
        assert_eq!(te.current, 3.5);
        assert_eq!(te.delta, 1.5);
        assert_eq!(d.sagi_delta, Some(-1.5));
        // SAGI 2.0 -> 0.5 lifts self-awareness from 1.0 to 4.0.
        assert_eq!(d.biggest_gain().map(|g| g.pillar), Some(Pillar::SelfAwareness));
        assert_eq!(d.pillars.len(), 8);
    }

    #[test]
    fn sagi_delta_needs_both() {
        let before = snapshot(&[2, 2], &[]);
        let after = snapshot(&[3, 4], &[4, 4]);
        let d = growth_delta(&before, &after);
        assert_eq!(d.sagi_delta, None);
    }
}
