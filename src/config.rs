use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::archetype::SignalMap;
use crate::benchmarks::BenchmarkTable;
use crate::competition::CompetitionTier;
use crate::numeric::coerce_value;
use crate::player::PlayerRecord;
use crate::weights::WeightConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunable scalars. Missing, blank, zero or non-numeric values keep the built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConstantsRepr")]
pub struct EngineConstants {
    pub arm_sensitivity_factor: f64,
    pub arm_floor: f64,
    pub arm_ceiling: f64,
    pub coach_weight: f64,
    pub player_weight: f64,
    pub sagi_aligned_min: f64,
    pub sagi_aligned_max: f64,
    pub sagi_penalty_factor: f64,
    pub sagi_floor_score: f64,
    pub trajectory_age_threshold: f64,
    pub pdi_scale_max: f64,
    pub min_matches: f64,
    pub min_bat_innings: f64,
    pub min_overs: f64,
    pub coach_archetype_weight: f64,
    pub archetype_min_signal_count: usize,
    pub comfort_signal_threshold: f64,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            arm_sensitivity_factor: 0.05,
            arm_floor: 0.80,
            arm_ceiling: 1.50,
            coach_weight: 0.75,
            player_weight: 0.25,
            sagi_aligned_min: -0.5,
            sagi_aligned_max: 0.5,
            sagi_penalty_factor: 2.0,
            sagi_floor_score: 1.0,
            trajectory_age_threshold: 1.5,
            pdi_scale_max: 5.0,
            min_matches: 5.0,
            min_bat_innings: 5.0,
            min_overs: 20.0,
            coach_archetype_weight: 3.0,
            archetype_min_signal_count: 3,
            comfort_signal_threshold: 4.0,
        }
    }
}

#[derive(Deserialize)]
struct ConstantRow {
    #[serde(alias = "key")]
    constant_key: String,
    #[serde(default)]
    value: Value,
}

/// Constants arrive either as a plain object or as reference-data rows.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConstantsRepr {
    Rows(Vec<ConstantRow>),
    Map(BTreeMap<String, Value>),
}

impl From<ConstantsRepr> for EngineConstants {
    fn from(repr: ConstantsRepr) -> Self {
        let pairs: Vec<(String, Value)> = match repr {
            ConstantsRepr::Rows(rows) => rows.into_iter().map(|r| (r.constant_key, r.value)).collect(),
            ConstantsRepr::Map(map) => map.into_iter().collect(),
        };
        let mut constants = EngineConstants::default();
        for (key, value) in pairs {
            constants.apply(&key, &value);
        }
        constants
    }
}

impl EngineConstants {
    /// Set one constant by its key. Unknown keys and unusable values are ignored.
    pub fn apply(&mut self, key: &str, value: &Value) {
        let Some(v) = coerce_value(value) else {
            tracing::debug!(key, "constant has no numeric value, keeping built-in");
            return;
        };
        let slot = match key.trim() {
            "arm_sensitivity_factor" => &mut self.arm_sensitivity_factor,
            "arm_floor" => &mut self.arm_floor,
            "arm_ceiling" => &mut self.arm_ceiling,
            "coach_weight" => &mut self.coach_weight,
            "player_weight" => &mut self.player_weight,
            "sagi_aligned_min" => &mut self.sagi_aligned_min,
            "sagi_aligned_max" => &mut self.sagi_aligned_max,
            "sagi_penalty_factor" => &mut self.sagi_penalty_factor,
            "sagi_floor_score" => &mut self.sagi_floor_score,
            "trajectory_age_threshold" => &mut self.trajectory_age_threshold,
            "pdi_scale_max" => &mut self.pdi_scale_max,
            "coach_archetype_weight" => &mut self.coach_archetype_weight,
            "comfort_signal_threshold" => &mut self.comfort_signal_threshold,
            // Sample thresholds may legitimately be zero.
            "min_matches" | "minMatches" => {
                if v >= 0.0 {
                    self.min_matches = v;
                }
                return;
            }
            "min_bat_innings" | "minBatInn" => {
                if v >= 0.0 {
                    self.min_bat_innings = v;
                }
                return;
            }
            "min_overs" | "minOvers" => {
                if v >= 0.0 {
                    self.min_overs = v;
                }
                return;
            }
            "archetype_min_signal_count" => {
                if v >= 0.0 {
                    self.archetype_min_signal_count = v.round() as usize;
                }
                return;
            }
            other => {
                tracing::debug!(key = other, "unknown engine constant");
                return;
            }
        };
        if v == 0.0 {
            tracing::warn!(key, "zero engine constant rejected, keeping built-in");
            return;
        }
        *slot = v;
    }

    /// Restore pairs of constants that contradict each other.
    pub fn sanitize(&mut self) {
        let builtin = EngineConstants::default();
        if self.arm_floor >= self.arm_ceiling || self.arm_floor < 0.0 {
            tracing::warn!(floor = self.arm_floor, ceiling = self.arm_ceiling, "invalid ARM band, using built-in");
            self.arm_floor = builtin.arm_floor;
            self.arm_ceiling = builtin.arm_ceiling;
        }
        if self.sagi_aligned_min > self.sagi_aligned_max {
            tracing::warn!("invalid SAGI alignment band, using built-in");
            self.sagi_aligned_min = builtin.sagi_aligned_min;
            self.sagi_aligned_max = builtin.sagi_aligned_max;
        }
        if self.coach_weight < 0.0 || self.player_weight < 0.0 {
            tracing::warn!("negative coach/self blend, using built-in");
            self.coach_weight = builtin.coach_weight;
            self.player_weight = builtin.player_weight;
        }
        for (name, value, fallback) in [
            ("sagi_penalty_factor", &mut self.sagi_penalty_factor, builtin.sagi_penalty_factor),
            ("sagi_floor_score", &mut self.sagi_floor_score, builtin.sagi_floor_score),
            ("pdi_scale_max", &mut self.pdi_scale_max, builtin.pdi_scale_max),
            ("arm_sensitivity_factor", &mut self.arm_sensitivity_factor, builtin.arm_sensitivity_factor),
        ] {
            if *value < 0.0 {
                tracing::warn!(key = name, value = *value, "negative constant, using built-in");
                *value = fallback;
            }
        }
    }
}

/// Reference data and tunables the engine reads. Every section is optional in JSON and
/// falls back to the built-in tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(alias = "compTiers")]
    pub tiers: Vec<CompetitionTier>,
    pub weights: WeightConfig,
    pub benchmarks: BenchmarkTable,
    pub constants: EngineConstants,
    pub archetypes: SignalMap,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tiers: Vec::new(),
            weights: WeightConfig::default(),
            benchmarks: BenchmarkTable::default(),
            constants: EngineConstants::default(),
            archetypes: SignalMap::default(),
        }
    }
}

static DEFAULT_CONFIG: OnceCell<EngineConfig> = OnceCell::new();

/// The built-in configuration. It has no competition tiers, so CCM is zero until
/// a tier table is supplied.
pub fn default_config() -> &'static EngineConfig {
    DEFAULT_CONFIG.get_or_init(EngineConfig::default)
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            tiers = config.tiers.len(),
            "loaded engine config"
        );
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let mut config: EngineConfig = serde_json::from_str(raw)?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        let before = self.tiers.len();
        self.tiers
            .retain(|t| !t.code.trim().is_empty() && t.cti_value.is_finite() && t.cti_value > 0.0);
        if self.tiers.len() != before {
            tracing::warn!(dropped = before - self.tiers.len(), "ignored tiers without a code or CTI");
        }
        self.weights.sanitize();
        self.benchmarks.sanitize();
        self.constants.sanitize();
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolFile {
    Players(Vec<PlayerRecord>),
    Wrapped { players: Vec<PlayerRecord> },
}

/// Read a player pool: either a bare JSON array or `{"players": [...]}`.
pub fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pool: PoolFile = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match pool {
        PoolFile::Players(players) => players,
        PoolFile::Wrapped { players } => players,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_from_rows_with_text_values() {
        let c: EngineConstants = serde_json::from_str(
            r#"[
                {"constant_key": "arm_sensitivity_factor", "value": "0.04"},
                {"constant_key": "coach_weight", "value": "0"},
                {"constant_key": "sagi_penalty_factor", "value": "abc"},
                {"constant_key": "min_overs", "value": "0"},
                {"constant_key": "mystery", "value": "9"}
            ]"#,
        )
        .unwrap();
        assert_eq!(c.arm_sensitivity_factor, 0.04);
        assert_eq!(c.coach_weight, 0.75);
        assert_eq!(c.sagi_penalty_factor, 2.0);
        assert_eq!(c.min_overs, 0.0);
    }

    #[test]
    fn constants_from_map() {
        let c: EngineConstants =
            serde_json::from_str(r#"{"arm_floor": 0.7, "minMatches": "3"}"#).unwrap();
        assert_eq!(c.arm_floor, 0.7);
        assert_eq!(c.min_matches, 3.0);
        assert_eq!(c.arm_ceiling, 1.5);
    }

    #[test]
    fn sanitize_restores_inverted_arm_band() {
        let mut c = EngineConstants {
            arm_floor: 1.6,
            ..EngineConstants::default()
        };
        c.sanitize();
        assert_eq!(c.arm_floor, 0.8);
        assert_eq!(c.arm_ceiling, 1.5);
    }

    #[test]
    fn empty_json_is_builtin_config() {
        let cfg = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(&cfg, default_config());
    }

    #[test]
    fn tiers_without_cti_are_dropped() {
        let cfg = EngineConfig::from_json_str(
            r#"{"tiers": [{"code": "A", "cti_value": "0.9"}, {"code": "B", "cti_value": ""}, {"code": "", "cti_value": 1}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.tiers.len(), 1);
        assert_eq!(cfg.tiers[0].code, "A");
    }
}
