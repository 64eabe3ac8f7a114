use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::competition::CompetitionGrade;
use crate::numeric::{lenient_bool, lenient_f64, lenient_opt_f64};
use crate::ratings::{RatingSet, SkillGroup};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[serde(alias = "specialist_batter")]
    Batter,
    #[serde(alias = "pace_bowler")]
    Pace,
    #[serde(alias = "spin_bowler")]
    Spin,
    #[serde(alias = "wicketkeeper_batter")]
    Keeper,
    #[serde(alias = "batting_allrounder")]
    Allrounder,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Batter,
        Role::Pace,
        Role::Spin,
        Role::Keeper,
        Role::Allrounder,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Role::Batter => "batter",
            Role::Pace => "pace",
            Role::Spin => "spin",
            Role::Keeper => "keeper",
            Role::Allrounder => "allrounder",
        }
    }

    /// Identifier used by the reference-data store.
    pub fn db_id(self) -> &'static str {
        match self {
            Role::Batter => "specialist_batter",
            Role::Pace => "pace_bowler",
            Role::Spin => "spin_bowler",
            Role::Keeper => "wicketkeeper_batter",
            Role::Allrounder => "batting_allrounder",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Batter => "Specialist Batter",
            Role::Pace => "Pace Bowler",
            Role::Spin => "Spin Bowler",
            Role::Keeper => "WK-Batter",
            Role::Allrounder => "Batting All-Rounder",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Role::Batter => "BAT",
            Role::Pace => "PACE",
            Role::Spin => "SPIN",
            Role::Keeper => "WK",
            Role::Allrounder => "AR",
        }
    }

    /// Best-effort role from free text. Unknown text is `None`.
    pub fn from_text(raw: &str) -> Option<Role> {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }
        if let Some(role) = Role::ALL.into_iter().find(|r| r.id() == s || r.db_id() == s) {
            return Some(role);
        }
        if s.contains("keeper") || s == "wk" || s.starts_with("wk-") {
            return Some(Role::Keeper);
        }
        if (s.contains("all") && s.contains("round")) || s == "ar" {
            return Some(Role::Allrounder);
        }
        if s.contains("pace") || s.contains("seam") || s.contains("fast") {
            return Some(Role::Pace);
        }
        if s.contains("spin") {
            return Some(Role::Spin);
        }
        if s.contains("bat") {
            return Some(Role::Batter);
        }
        None
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let role = raw.as_deref().and_then(Role::from_text);
    if role.is_none() {
        tracing::debug!(role = ?raw, "unrecognised role, scoring as batter");
    }
    Ok(role.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakBatting {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub runs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balls: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fours: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sixes: f64,
    #[serde(default, alias = "notOut", deserialize_with = "lenient_bool")]
    pub not_out: bool,
    #[serde(default, alias = "comp")]
    pub competition: Option<String>,
    #[serde(default, alias = "vs")]
    pub opponent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakBowling {
    #[serde(default, alias = "wkts", deserialize_with = "lenient_f64")]
    pub wickets: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub runs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub maidens: f64,
    #[serde(default, alias = "comp")]
    pub competition: Option<String>,
    #[serde(default, alias = "vs")]
    pub opponent: Option<String>,
}

/// Onboarding answers that feed the archetype classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Onboarding {
    #[serde(default, alias = "goToShots")]
    pub go_to_shots: Vec<String>,
    #[serde(default, alias = "batPhases")]
    pub bat_phases: Vec<String>,
    #[serde(default, alias = "batPosition")]
    pub bat_position: Option<String>,
    #[serde(default, alias = "comfortSpin", deserialize_with = "lenient_opt_f64")]
    pub comfort_spin: Option<f64>,
    #[serde(default, alias = "comfortPace", deserialize_with = "lenient_opt_f64")]
    pub comfort_pace: Option<f64>,
}

/// Everything the engine knows about one player, as handed over by persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub submitted: bool,
    #[serde(default)]
    pub grades: Vec<CompetitionGrade>,
    #[serde(default, alias = "topBat")]
    pub top_bat: Vec<PeakBatting>,
    #[serde(default, alias = "topBowl")]
    pub top_bowl: Vec<PeakBowling>,
    #[serde(default, alias = "cd")]
    pub coach_ratings: RatingSet,
    #[serde(default)]
    pub self_ratings: RatingSet,
    #[serde(default, alias = "batA")]
    pub coach_bat_archetype: Option<String>,
    #[serde(default, alias = "bwlA")]
    pub coach_bowl_archetype: Option<String>,
    #[serde(default)]
    pub onboarding: Onboarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentStatus {
    Awaiting,
    SelfAssessed,
    CoachAssessed,
}

impl AssessmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Awaiting => "Awaiting",
            AssessmentStatus::SelfAssessed => "Self-assessed",
            AssessmentStatus::CoachAssessed => "Coach assessed",
        }
    }
}

impl PlayerRecord {
    pub fn assessment_status(&self) -> AssessmentStatus {
        if self.coach_ratings.rated_in(SkillGroup::TechnicalPrimary) > 0 {
            AssessmentStatus::CoachAssessed
        } else if self.self_ratings.rated_in(SkillGroup::TechnicalPrimary) > 0 {
            AssessmentStatus::SelfAssessed
        } else {
            AssessmentStatus::Awaiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_from_text_handles_labels_and_ids() {
        assert_eq!(Role::from_text("WK-Batter"), Some(Role::Keeper));
        assert_eq!(Role::from_text("wicketkeeper_batter"), Some(Role::Keeper));
        for role in Role::ALL {
            assert_eq!(Role::from_text(role.db_id()), Some(role));
            assert_eq!(Role::from_text(role.id()), Some(role));
        }
        assert_eq!(Role::from_text("Batting All-Rounder"), Some(Role::Allrounder));
        assert_eq!(Role::from_text("pace_bowler"), Some(Role::Pace));
        assert_eq!(Role::from_text("Spin Bowler"), Some(Role::Spin));
        assert_eq!(Role::from_text("specialist_batter"), Some(Role::Batter));
        assert_eq!(Role::from_text("umpire"), None);
    }

    #[test]
    fn player_record_parses_persisted_shape() {
        let raw = r#"{
            "id": "p1", "name": "Liam", "dob": "15/03/2012", "role": "pace", "submitted": true,
            "grades": [{"level": "local_j1", "matches": "12", "batInn": "10", "runs": "285", "ct": ""}],
            "topBat": [{"runs": "67", "balls": 48, "comp": "U14 Shield", "vs": "Ringwood"}],
            "cd": {"t1_0": 4, "t1_1": "3", "iq_0": 0, "batA": "dual"},
            "batA": "dual"
        }"#;
        let p: PlayerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(p.role, Role::Pace);
        assert!(p.submitted);
        assert_eq!(p.grades[0].matches, 12.0);
        assert_eq!(p.grades[0].bat_innings, 10.0);
        assert_eq!(p.grades[0].catches, 0.0);
        assert_eq!(p.top_bat[0].runs, 67.0);
        assert_eq!(p.top_bat[0].competition.as_deref(), Some("U14 Shield"));
        assert_eq!(p.coach_ratings.len(), 2);
        assert_eq!(p.coach_bat_archetype.as_deref(), Some("dual"));
        assert_eq!(p.assessment_status(), AssessmentStatus::CoachAssessed);
    }

    #[test]
    fn unknown_role_scores_as_batter() {
        let p: PlayerRecord = serde_json::from_str(r#"{"role": "umpire"}"#).unwrap();
        assert_eq!(p.role, Role::Batter);
        assert_eq!(p.assessment_status(), AssessmentStatus::Awaiting);
    }
}
