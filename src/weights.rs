use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::age::AgeTier;
use crate::numeric::lenient_opt_f64;
use crate::palette;
use crate::player::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pillar {
    #[serde(rename = "tm")]
    TechnicalMastery,
    #[serde(rename = "te")]
    TacticalExecution,
    #[serde(rename = "pc")]
    PhysicalConditioning,
    #[serde(rename = "mr")]
    MentalResilience,
    #[serde(rename = "af")]
    AthleticFielding,
    #[serde(rename = "mi")]
    MatchImpact,
    #[serde(rename = "pw")]
    PowerHitting,
    #[serde(rename = "sa")]
    SelfAwareness,
}

impl Pillar {
    pub const ALL: [Pillar; 8] = [
        Pillar::TechnicalMastery,
        Pillar::TacticalExecution,
        Pillar::PhysicalConditioning,
        Pillar::MentalResilience,
        Pillar::AthleticFielding,
        Pillar::MatchImpact,
        Pillar::PowerHitting,
        Pillar::SelfAwareness,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Pillar::TechnicalMastery => "tm",
            Pillar::TacticalExecution => "te",
            Pillar::PhysicalConditioning => "pc",
            Pillar::MentalResilience => "mr",
            Pillar::AthleticFielding => "af",
            Pillar::MatchImpact => "mi",
            Pillar::PowerHitting => "pw",
            Pillar::SelfAwareness => "sa",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pillar::TechnicalMastery => "Technical Mastery",
            Pillar::TacticalExecution => "Tactical Execution",
            Pillar::PhysicalConditioning => "Physical Conditioning",
            Pillar::MentalResilience => "Mental Resilience",
            Pillar::AthleticFielding => "Athletic Fielding",
            Pillar::MatchImpact => "Match Impact",
            Pillar::PowerHitting => "Power Hitting",
            Pillar::SelfAwareness => "Self-Awareness",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Pillar::TechnicalMastery => palette::PINK,
            Pillar::TacticalExecution => palette::SKY,
            Pillar::PhysicalConditioning => palette::NAVY,
            Pillar::MentalResilience => palette::PURPLE,
            Pillar::AthleticFielding => palette::GREEN,
            Pillar::MatchImpact => palette::ORANGE,
            Pillar::PowerHitting => palette::PINK,
            Pillar::SelfAwareness => palette::BLUE,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Built-in weights used for any pillar no configured layer covers.
pub const DEFAULT_WEIGHTS: [f64; 8] = [0.14, 0.18, 0.08, 0.14, 0.10, 0.12, 0.10, 0.14];

/// A weight row where every pillar may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialPillarWeights {
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub tm: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub te: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub pc: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub mr: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub af: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub mi: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub pw: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub sa: Option<f64>,
}

impl PartialPillarWeights {
    pub fn full(values: [f64; 8]) -> Self {
        let [tm, te, pc, mr, af, mi, pw, sa] = values.map(Some);
        Self { tm, te, pc, mr, af, mi, pw, sa }
    }

    /// The usable weight for `pillar`: present, finite and positive.
    pub fn get(&self, pillar: Pillar) -> Option<f64> {
        let raw = match pillar {
            Pillar::TechnicalMastery => self.tm,
            Pillar::TacticalExecution => self.te,
            Pillar::PhysicalConditioning => self.pc,
            Pillar::MentalResilience => self.mr,
            Pillar::AthleticFielding => self.af,
            Pillar::MatchImpact => self.mi,
            Pillar::PowerHitting => self.pw,
            Pillar::SelfAwareness => self.sa,
        };
        raw.filter(|w| w.is_finite() && *w > 0.0)
    }

    fn slot(&mut self, pillar: Pillar) -> &mut Option<f64> {
        match pillar {
            Pillar::TechnicalMastery => &mut self.tm,
            Pillar::TacticalExecution => &mut self.te,
            Pillar::PhysicalConditioning => &mut self.pc,
            Pillar::MentalResilience => &mut self.mr,
            Pillar::AthleticFielding => &mut self.af,
            Pillar::MatchImpact => &mut self.mi,
            Pillar::PowerHitting => &mut self.pw,
            Pillar::SelfAwareness => &mut self.sa,
        }
    }

    /// Drop unusable values so the merge never sees them. Returns how many were dropped.
    fn sanitize(&mut self) -> usize {
        let mut dropped = 0;
        for pillar in Pillar::ALL {
            let slot = self.slot(pillar);
            if slot.is_some_and(|w| !w.is_finite() || w <= 0.0) {
                *slot = None;
                dropped += 1;
            }
        }
        dropped
    }
}

/// Which layer supplied a pillar's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    RoleAgeTier,
    AgeTier,
    Role,
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWeights {
    entries: [(f64, WeightSource); 8],
}

impl ResolvedWeights {
    pub fn weight(&self, pillar: Pillar) -> f64 {
        self.entries[pillar.index()].0
    }

    pub fn source(&self, pillar: Pillar) -> WeightSource {
        self.entries[pillar.index()].1
    }
}

/// Merge weight layers key by key. For each pillar the first layer holding a usable
/// value wins; pillars no layer covers take [`DEFAULT_WEIGHTS`].
pub fn merge_layers(layers: &[(WeightSource, Option<&PartialPillarWeights>)]) -> ResolvedWeights {
    let mut entries = [(0.0, WeightSource::Default); 8];
    for pillar in Pillar::ALL {
        let found = layers.iter().find_map(|(source, layer)| {
            layer
                .and_then(|l| l.get(pillar))
                .map(|w| (w, *source))
        });
        entries[pillar.index()] =
            found.unwrap_or((DEFAULT_WEIGHTS[pillar.index()], WeightSource::Default));
    }
    ResolvedWeights { entries }
}

/// Batting / bowling / fielding split inside the statistical domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubWeights {
    pub bat: f64,
    pub bowl: f64,
    pub field: f64,
}

impl SubWeights {
    pub const fn new(bat: f64, bowl: f64, field: f64) -> Self {
        Self { bat, bowl, field }
    }

    pub fn builtin(role: Role) -> Self {
        match role {
            Role::Batter => SubWeights::new(0.60, 0.10, 0.30),
            Role::Pace | Role::Spin => SubWeights::new(0.15, 0.65, 0.20),
            Role::Allrounder => SubWeights::new(0.35, 0.45, 0.20),
            Role::Keeper => SubWeights::new(0.45, 0.10, 0.45),
        }
    }

    fn is_valid(&self) -> bool {
        [self.bat, self.bowl, self.field]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
            && self.bat + self.bowl + self.field > 0.0
    }
}

/// Weighted mean over `(value, weight)` pairs, skipping values that are not positive.
/// Renormalises over what remains; 0 when nothing does.
pub fn present_weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut sum = 0.0;
    let mut weight = 0.0;
    for (value, w) in pairs {
        if value > 0.0 && w > 0.0 {
            sum += value * w;
            weight += w;
        }
    }
    if weight > 0.0 { sum / weight } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Explicit weights for a role at a given age tier.
    pub role_age_tier: BTreeMap<Role, BTreeMap<AgeTier, PartialPillarWeights>>,
    #[serde(alias = "statDomainWeights")]
    pub age_tier: BTreeMap<AgeTier, PartialPillarWeights>,
    pub role: BTreeMap<Role, PartialPillarWeights>,
    #[serde(alias = "statSubWeights")]
    pub stat_sub_weights: BTreeMap<Role, SubWeights>,
}

impl Default for WeightConfig {
    fn default() -> Self {
        let age_tier = BTreeMap::from([
            (
                AgeTier::Young,
                PartialPillarWeights::full([0.14, 0.18, 0.08, 0.14, 0.10, 0.12, 0.10, 0.14]),
            ),
            (
                AgeTier::Mid,
                PartialPillarWeights::full([0.14, 0.16, 0.08, 0.14, 0.10, 0.14, 0.10, 0.14]),
            ),
            (
                AgeTier::Senior,
                PartialPillarWeights::full([0.14, 0.14, 0.08, 0.12, 0.10, 0.18, 0.10, 0.14]),
            ),
        ]);
        let role = BTreeMap::from([
            (
                Role::Batter,
                PartialPillarWeights::full([0.14, 0.18, 0.08, 0.14, 0.10, 0.12, 0.10, 0.14]),
            ),
            (
                Role::Pace,
                PartialPillarWeights::full([0.16, 0.14, 0.16, 0.14, 0.10, 0.12, 0.06, 0.12]),
            ),
            (
                Role::Spin,
                PartialPillarWeights::full([0.18, 0.18, 0.08, 0.12, 0.08, 0.12, 0.06, 0.18]),
            ),
            (
                Role::Keeper,
                PartialPillarWeights::full([0.16, 0.14, 0.10, 0.12, 0.16, 0.10, 0.08, 0.14]),
            ),
            (
                Role::Allrounder,
                PartialPillarWeights::full([0.14, 0.16, 0.10, 0.14, 0.10, 0.14, 0.08, 0.14]),
            ),
        ]);
        let stat_sub_weights = Role::ALL
            .into_iter()
            .map(|r| (r, SubWeights::builtin(r)))
            .collect();
        Self {
            role_age_tier: BTreeMap::new(),
            age_tier,
            role,
            stat_sub_weights,
        }
    }
}

impl WeightConfig {
    /// Pillar weights for a role and age tier.
    ///
    /// Precedence per pillar: role+age-tier table, then age-tier table, then the role
    /// table (the batter row when the role has none), then [`DEFAULT_WEIGHTS`].
    pub fn resolve(&self, role: Role, tier: AgeTier) -> ResolvedWeights {
        let role_age = self.role_age_tier.get(&role).and_then(|m| m.get(&tier));
        let role_row = self.role.get(&role).or_else(|| {
            tracing::debug!(role = %role, "no role weight row, using batter row");
            self.role.get(&Role::Batter)
        });
        merge_layers(&[
            (WeightSource::RoleAgeTier, role_age),
            (WeightSource::AgeTier, self.age_tier.get(&tier)),
            (WeightSource::Role, role_row),
        ])
    }

    pub fn sub_weights(&self, role: Role) -> SubWeights {
        self.stat_sub_weights
            .get(&role)
            .or_else(|| self.stat_sub_weights.get(&Role::Batter))
            .copied()
            .unwrap_or_else(|| SubWeights::builtin(role))
    }

    pub fn sanitize(&mut self) {
        let mut dropped = 0;
        for row in self.role_age_tier.values_mut().flat_map(|m| m.values_mut()) {
            dropped += row.sanitize();
        }
        for row in self.age_tier.values_mut() {
            dropped += row.sanitize();
        }
        for row in self.role.values_mut() {
            dropped += row.sanitize();
        }
        if dropped > 0 {
            tracing::warn!(dropped, "ignored non-positive pillar weights");
        }
        for (role, sub) in self.stat_sub_weights.iter_mut() {
            if !sub.is_valid() {
                tracing::warn!(role = %role, ?sub, "invalid stat sub-weights, using built-in split");
                *sub = SubWeights::builtin(*role);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_from_age_tier() {
        let cfg = WeightConfig::default();
        let w = cfg.resolve(Role::Pace, AgeTier::Senior);
        assert_eq!(w.weight(Pillar::MatchImpact), 0.18);
        assert_eq!(w.source(Pillar::MatchImpact), WeightSource::AgeTier);
    }

    #[test]
    fn layers_merge_key_by_key() {
        let mut cfg = WeightConfig::default();
        cfg.age_tier.insert(
            AgeTier::Young,
            PartialPillarWeights {
                te: Some(0.30),
                ..Default::default()
            },
        );
        cfg.role_age_tier.insert(
            Role::Spin,
            BTreeMap::from([(
                AgeTier::Young,
                PartialPillarWeights {
                    sa: Some(0.25),
                    ..Default::default()
                },
            )]),
        );
        let w = cfg.resolve(Role::Spin, AgeTier::Young);
        assert_eq!(w.weight(Pillar::SelfAwareness), 0.25);
        assert_eq!(w.source(Pillar::SelfAwareness), WeightSource::RoleAgeTier);
        assert_eq!(w.weight(Pillar::TacticalExecution), 0.30);
        assert_eq!(w.source(Pillar::TacticalExecution), WeightSource::AgeTier);
        // Spin role row: tm 0.18.
        assert_eq!(w.weight(Pillar::TechnicalMastery), 0.18);
        assert_eq!(w.source(Pillar::TechnicalMastery), WeightSource::Role);
    }

    #[test]
    fn empty_config_falls_to_defaults() {
        let cfg = WeightConfig {
            role_age_tier: BTreeMap::new(),
            age_tier: BTreeMap::new(),
            role: BTreeMap::new(),
            stat_sub_weights: BTreeMap::new(),
        };
        let w = cfg.resolve(Role::Keeper, AgeTier::Mid);
        for p in Pillar::ALL {
            assert_eq!(w.source(p), WeightSource::Default);
        }
        assert_eq!(w.weight(Pillar::TacticalExecution), 0.18);
        assert_eq!(cfg.sub_weights(Role::Keeper), SubWeights::builtin(Role::Keeper));
    }

    #[test]
    fn non_positive_weights_are_skipped() {
        let layer = PartialPillarWeights {
            tm: Some(0.0),
            te: Some(-1.0),
            pc: Some(f64::NAN),
            mr: Some(0.2),
            ..Default::default()
        };
        let w = merge_layers(&[(WeightSource::Role, Some(&layer))]);
        assert_eq!(w.source(Pillar::TechnicalMastery), WeightSource::Default);
        assert_eq!(w.source(Pillar::TacticalExecution), WeightSource::Default);
        assert_eq!(w.source(Pillar::PhysicalConditioning), WeightSource::Default);
        assert_eq!(w.weight(Pillar::MentalResilience), 0.2);
    }

    #[test]
    fn weights_accept_text_values() {
        let cfg: WeightConfig = serde_json::from_str(
            r#"{"role": {"pace_bowler": {"tm": "0.2", "te": ""}}, "age_tier": {}}"#,
        )
        .unwrap();
        let w = cfg.resolve(Role::Pace, AgeTier::Young);
        assert_eq!(w.weight(Pillar::TechnicalMastery), 0.2);
        assert_eq!(w.source(Pillar::TacticalExecution), WeightSource::Default);
    }

    #[test]
    fn present_mean_renormalises() {
        let m = present_weighted_mean([(4.0, 0.6), (0.0, 0.1), (2.0, 0.3)]);
        assert!((m - (4.0 * 0.6 + 2.0 * 0.3) / 0.9).abs() < 1e-12);
        assert_eq!(present_weighted_mean([(0.0, 1.0)]), 0.0);
    }
}
