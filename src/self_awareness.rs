use serde::{Deserialize, Serialize};

use crate::config::EngineConstants;
use crate::numeric::round2;
use crate::palette;
use crate::player::Role;
use crate::ratings::{GroupMean, RatingSet, SkillGroup, group_mean};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagiLabel {
    Aligned,
    OverEstimates,
    UnderEstimates,
    /// Either side has nothing rated.
    Unknown,
}

impl SagiLabel {
    pub fn text(self) -> &'static str {
        match self {
            SagiLabel::Aligned => "Aligned",
            SagiLabel::OverEstimates => "Over-estimates",
            SagiLabel::UnderEstimates => "Under-estimates",
            SagiLabel::Unknown => "\u{2014}",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SagiLabel::Aligned => palette::GREEN,
            SagiLabel::OverEstimates => palette::AMBER,
            SagiLabel::UnderEstimates => palette::SKY,
            SagiLabel::Unknown => palette::GREY_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfAwareness {
    pub sagi: Option<f64>,
    pub label: SagiLabel,
    /// 1..=5 pillar score, 0 when SAGI is unknown.
    pub score: f64,
    pub coach: GroupMean,
    pub player: GroupMean,
}

/// Pooled mean over every skill group (phase excluded) for one rater.
pub fn overall_mean(set: &RatingSet, role: Role) -> GroupMean {
    let parts: Vec<GroupMean> = SkillGroup::SKILL
        .iter()
        .map(|g| group_mean(set, *g, role))
        .collect();
    GroupMean::pooled(&parts)
}

/// Self-Awareness Gap Index: self mean minus coach mean.
pub fn sagi(coach: &GroupMean, player: &GroupMean) -> Option<f64> {
    if coach.rated == 0 || player.rated == 0 {
        return None;
    }
    Some(round2(player.mean - coach.mean))
}

pub fn classify(sagi: Option<f64>, constants: &EngineConstants) -> SagiLabel {
    match sagi {
        None => SagiLabel::Unknown,
        Some(gap) if gap > constants.sagi_aligned_max => SagiLabel::OverEstimates,
        Some(gap) if gap < constants.sagi_aligned_min => SagiLabel::UnderEstimates,
        Some(_) => SagiLabel::Aligned,
    }
}

/// Pillar score: 5 at perfect alignment, falling linearly with the absolute gap.
pub fn pillar_score(sagi: Option<f64>, constants: &EngineConstants) -> f64 {
    let Some(gap) = sagi else {
        return 0.0;
    };
    let raw = 5.0 - gap.abs() * constants.sagi_penalty_factor;
    round2(raw.min(5.0).max(constants.sagi_floor_score))
}

pub fn assess(
    coach: &RatingSet,
    player: &RatingSet,
    role: Role,
    constants: &EngineConstants,
) -> SelfAwareness {
    let coach_mean = overall_mean(coach, role);
    let player_mean = overall_mean(player, role);
    let gap = sagi(&coach_mean, &player_mean);
    SelfAwareness {
        sagi: gap,
        label: classify(gap, constants),
        score: pillar_score(gap, constants),
        coach: coach_mean,
        player: player_mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_gap_scores_five() {
        let c = EngineConstants::default();
        assert_eq!(pillar_score(Some(0.0), &c), 5.0);
        assert_eq!(classify(Some(0.0), &c), SagiLabel::Aligned);
    }

    #[test]
    fn large_gap_hits_floor() {
        let c = EngineConstants::default();
        assert_eq!(pillar_score(Some(3.0), &c), 1.0);
        assert_eq!(pillar_score(Some(-1.0), &c), 3.0);
        assert_eq!(classify(Some(-1.0), &c), SagiLabel::UnderEstimates);
        assert_eq!(classify(Some(0.51), &c), SagiLabel::OverEstimates);
        assert_eq!(classify(Some(0.5), &c), SagiLabel::Aligned);
    }

    #[test]
    fn missing_side_is_unknown_not_aligned() {
        let c = EngineConstants::default();
        let coach = RatingSet::new().with(SkillGroup::Tactical, &[4, 4]);
        let r = assess(&coach, &RatingSet::new(), Role::Batter, &c);
        assert_eq!(r.sagi, None);
        assert_eq!(r.label, SagiLabel::Unknown);
        assert_eq!(r.label.text(), "\u{2014}");
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn phase_ratings_do_not_move_sagi() {
        let c = EngineConstants::default();
        let coach = RatingSet::new()
            .with(SkillGroup::Mental, &[3, 3])
            .with(SkillGroup::Phase, &[1, 1]);
        let player = RatingSet::new()
            .with(SkillGroup::Mental, &[4, 4])
            .with(SkillGroup::Phase, &[5, 5]);
        let r = assess(&coach, &player, Role::Pace, &c);
        assert_eq!(r.sagi, Some(1.0));
        assert_eq!(r.label, SagiLabel::OverEstimates);
        assert_eq!(r.score, 3.0);
    }
}
