use std::fmt;

use serde::{Deserialize, Serialize};

use crate::age::resolve_age;
use crate::config::EngineConstants;
use crate::numeric::{lenient_f64, round2, round_to};

/// One row of the competition reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionTier {
    pub code: String,
    #[serde(default, alias = "ctiValue", deserialize_with = "lenient_f64")]
    pub cti_value: f64,
    #[serde(default, alias = "expectedMidpointAge", deserialize_with = "lenient_f64")]
    pub expected_midpoint_age: f64,
    #[serde(default, alias = "competitionName")]
    pub competition_name: String,
    #[serde(default, alias = "tier")]
    pub group: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// One competition level a player played in a season. Every stat is optional in the
/// persisted data and lands as 0 when blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionGrade {
    #[serde(default)]
    pub level: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub matches: f64,
    #[serde(default, alias = "batInn", deserialize_with = "lenient_f64")]
    pub bat_innings: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub runs: f64,
    #[serde(default, alias = "hs", deserialize_with = "lenient_f64")]
    pub high_score: f64,
    #[serde(default, alias = "ballsFaced", deserialize_with = "lenient_f64")]
    pub balls_faced: f64,
    #[serde(default, alias = "bowlInn", deserialize_with = "lenient_f64")]
    pub bowl_innings: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overs: f64,
    #[serde(default, alias = "wkts", deserialize_with = "lenient_f64")]
    pub wickets: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub econ: f64,
    #[serde(default, alias = "bAvg", deserialize_with = "lenient_f64")]
    pub bowl_avg: f64,
    #[serde(default, alias = "ct", deserialize_with = "lenient_f64")]
    pub catches: f64,
    #[serde(default, alias = "ro", deserialize_with = "lenient_f64")]
    pub run_outs: f64,
    #[serde(default, alias = "st", deserialize_with = "lenient_f64")]
    pub stumpings: f64,
    #[serde(default, alias = "keeperCatches", deserialize_with = "lenient_f64")]
    pub keeper_catches: f64,
    #[serde(default)]
    pub association: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl CompetitionGrade {
    pub fn level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }

    pub fn field_actions(&self) -> f64 {
        self.catches + self.run_outs + self.stumpings + self.keeper_catches
    }
}

pub fn tier_by_code<'a>(tiers: &'a [CompetitionTier], code: &str) -> Option<&'a CompetitionTier> {
    tiers.iter().find(|t| t.code == code)
}

pub fn tier_by_name<'a>(tiers: &'a [CompetitionTier], name: &str) -> Option<&'a CompetitionTier> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    tiers.iter().find(|t| t.competition_name == name)
}

/// Competition difficulty bucket used to pick a benchmark curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    #[default]
    Low,
    Mid,
    High,
    Elite,
    Top,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::Low, Band::Mid, Band::High, Band::Elite, Band::Top];

    pub fn from_cti(cti: f64) -> Self {
        if cti >= 1.20 {
            Band::Top
        } else if cti >= 1.00 {
            Band::Elite
        } else if cti >= 0.80 {
            Band::High
        } else if cti >= 0.60 {
            Band::Mid
        } else {
            Band::Low
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
            Band::Elite => "elite",
            Band::Top => "top",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcmResult {
    pub ccm: f64,
    pub cti: f64,
    pub arm: f64,
    /// Code of the grade that set the CTI.
    pub code: Option<String>,
    pub expected_age: f64,
}

impl Default for CcmResult {
    fn default() -> Self {
        Self {
            ccm: 0.0,
            cti: 0.0,
            arm: 1.0,
            code: None,
            expected_age: 0.0,
        }
    }
}

impl CcmResult {
    pub fn has_context(&self) -> bool {
        self.ccm > 0.0
    }
}

/// Age Relativity Modifier: rewards playing below the tier's expected age.
pub fn age_relativity(expected_age: f64, age: f64, constants: &EngineConstants) -> f64 {
    let raw = 1.0 + (expected_age - age) * constants.arm_sensitivity_factor;
    round2(raw.clamp(constants.arm_floor, constants.arm_ceiling))
}

/// Competition Context Multiplier from the player's hardest resolvable grade.
///
/// Returns the zero context (CCM 0, CTI 0, ARM 1) when no grade resolves against
/// `tiers` or the date of birth gives no age.
pub fn compute_ccm(
    grades: &[CompetitionGrade],
    dob: Option<&str>,
    tiers: &[CompetitionTier],
    constants: &EngineConstants,
    reference_year: i32,
) -> CcmResult {
    if grades.is_empty() || tiers.is_empty() {
        return CcmResult::default();
    }
    let Some(age) = dob.and_then(|d| resolve_age(d, reference_year)) else {
        tracing::debug!("no usable date of birth, competition context is zero");
        return CcmResult::default();
    };

    let mut best: Option<&CompetitionTier> = None;
    for grade in grades {
        if grade.level.trim().is_empty() {
            continue;
        }
        let Some(tier) = tier_by_code(tiers, grade.level.trim()) else {
            tracing::debug!(level = %grade.level, "grade level not in tier table");
            continue;
        };
        let highest = best.map(|t| t.cti_value).unwrap_or(0.0);
        if tier.cti_value > highest {
            best = Some(tier);
        }
    }
    let Some(tier) = best else {
        return CcmResult::default();
    };

    let arm = age_relativity(tier.expected_midpoint_age, f64::from(age), constants);
    CcmResult {
        ccm: round_to(tier.cti_value * arm, 3),
        cti: round2(tier.cti_value),
        arm,
        code: Some(tier.code.clone()),
        expected_age: tier.expected_midpoint_age,
    }
}
