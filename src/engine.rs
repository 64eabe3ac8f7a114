use crate::age::{AgeBracket, resolve_age, resolve_bracket};
use crate::archetype::{ArchetypeDna, archetype_dna};
use crate::competition::{CcmResult, compute_ccm};
use crate::config::{EngineConfig, default_config};
use crate::pdi::{PdiResult, compute_pdi};
use crate::player::PlayerRecord;
use crate::stat_domain::{StatDomain, StatInputs, compute_stat_domain};

/// Configuration plus the reference year every age is measured against.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    pub config: &'a EngineConfig,
    pub reference_year: i32,
}

impl Engine<'static> {
    pub fn with_defaults(reference_year: i32) -> Self {
        Engine::new(default_config(), reference_year)
    }
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a EngineConfig, reference_year: i32) -> Self {
        Self {
            config,
            reference_year,
        }
    }

    pub fn age(&self, dob: &str) -> Option<u32> {
        resolve_age(dob, self.reference_year)
    }

    pub fn bracket(&self, dob: &str) -> AgeBracket {
        resolve_bracket(dob, self.reference_year)
    }

    pub fn ccm(&self, player: &PlayerRecord) -> CcmResult {
        compute_ccm(
            &player.grades,
            player.dob.as_deref(),
            &self.config.tiers,
            &self.config.constants,
            self.reference_year,
        )
    }

    pub fn stat_domain(&self, player: &PlayerRecord) -> StatDomain {
        let ccm = self.ccm(player);
        compute_stat_domain(
            StatInputs {
                grades: &player.grades,
                top_bat: &player.top_bat,
                top_bowl: &player.top_bowl,
                cti: ccm.cti,
                arm: ccm.arm,
            },
            &self.config.tiers,
            &self.config.benchmarks,
            self.config.weights.sub_weights(player.role),
            &self.config.constants,
        )
    }

    /// Full PDI for one player. Cohort fields stay empty; see [`crate::cohort::rank_pool`].
    pub fn score(&self, player: &PlayerRecord) -> PdiResult {
        let ccm = self.ccm(player);
        compute_pdi(player, &ccm, self.config, self.reference_year)
    }

    pub fn archetype_dna(&self, player: &PlayerRecord) -> ArchetypeDna {
        archetype_dna(
            &player.onboarding,
            player.coach_bat_archetype.as_deref(),
            player.coach_bowl_archetype.as_deref(),
            &self.config.archetypes,
            &self.config.constants,
        )
    }
}
