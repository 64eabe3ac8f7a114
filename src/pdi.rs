use serde::{Deserialize, Serialize};

use crate::age::{AgeTier, resolve_age};
use crate::cohort::age_score;
use crate::competition::CcmResult;
use crate::config::EngineConfig;
use crate::numeric::{round2, whole_pct};
use crate::palette;
use crate::player::{PlayerRecord, Role};
use crate::ratings::{
    GroupMean, ItemKey, PWR_ITEMS, RatingSet, SkillGroup, context_scaled, group_mean,
};
use crate::self_awareness::{self, SagiLabel};
use crate::stat_domain::{StatDomain, StatInputs, compute_stat_domain};
use crate::weights::{Pillar, ResolvedWeights, WeightSource};

const PHASE_SHARE: f64 = 0.60;
const STAT_SHARE: f64 = 0.40;
const TRAJECTORY_MIN_PDI: f64 = 2.5;
/// Technical items that stand in for the power-hitting pillar when it has no ratings.
const POWER_FALLBACK_ITEMS: [&str; 2] = ["Power Hitting", "Death-Over Hitting"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Elite,
    Advanced,
    Competent,
    Emerging,
    Developing,
    Foundation,
    Unrated,
}

impl Grade {
    pub fn from_pdi(pdi: f64) -> Self {
        if pdi >= 4.25 {
            Grade::Elite
        } else if pdi >= 3.50 {
            Grade::Advanced
        } else if pdi >= 2.75 {
            Grade::Competent
        } else if pdi >= 2.00 {
            Grade::Emerging
        } else if pdi >= 1.00 {
            Grade::Developing
        } else if pdi > 0.0 {
            Grade::Foundation
        } else {
            Grade::Unrated
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Elite => "ELITE",
            Grade::Advanced => "ADVANCED",
            Grade::Competent => "COMPETENT",
            Grade::Emerging => "EMERGING",
            Grade::Developing => "DEVELOPING",
            Grade::Foundation => "FOUNDATION",
            Grade::Unrated => "\u{2014}",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Grade::Elite => palette::GREEN,
            Grade::Advanced => palette::BLUE,
            Grade::Competent => palette::AMBER,
            Grade::Emerging => palette::PINK,
            Grade::Developing => palette::GREY_600,
            Grade::Foundation | Grade::Unrated => palette::GREY_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub pillar: Pillar,
    /// Coach mean (or the pillar's own score for self-awareness), unscaled.
    pub raw_score: f64,
    /// CCM-scaled value that feeds the PDI.
    pub context_score: f64,
    pub rated_count: usize,
    pub self_rated_count: usize,
    pub total_items: usize,
    pub weight: f64,
    pub weight_source: WeightSource,
    pub percent: u8,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdiResult {
    pub player_id: String,
    pub pdi: f64,
    pub pdi_pct: u8,
    pub grade: Grade,
    pub pillars: Vec<PillarScore>,
    pub sagi: Option<f64>,
    pub sagi_label: SagiLabel,
    pub trajectory: bool,
    /// No coach ratings at all; only the statistical domain can score.
    pub provisional: bool,
    pub completeness_pct: u8,
    pub rated_items: usize,
    pub total_items: usize,
    pub ccm: CcmResult,
    pub stat: StatDomain,
    pub age: Option<u32>,
    pub age_tier: AgeTier,
    pub age_score: u8,
    /// Filled in by cohort ranking.
    pub cohort_percentile: Option<u8>,
    pub overall_score: Option<u8>,
}

impl PdiResult {
    pub fn pillar(&self, pillar: Pillar) -> Option<&PillarScore> {
        self.pillars.iter().find(|p| p.pillar == pillar)
    }
}

struct PillarInput {
    pillar: Pillar,
    raw: f64,
    css: f64,
    rated: usize,
    self_rated: usize,
    total: usize,
}

impl PillarInput {
    fn from_means(pillar: Pillar, coach: GroupMean, player: GroupMean, css: f64) -> Self {
        Self {
            pillar,
            raw: coach.mean,
            css,
            rated: coach.rated,
            self_rated: player.rated,
            total: coach.total,
        }
    }
}

/// Rating pillar: group means for both raters, blended and scaled by CCM.
fn rated_pillar(
    pillar: Pillar,
    groups: &[SkillGroup],
    coach: &RatingSet,
    player: &RatingSet,
    role: Role,
    ccm: f64,
    config: &EngineConfig,
) -> PillarInput {
    let coach_mean = GroupMean::pooled(
        &groups
            .iter()
            .map(|g| group_mean(coach, *g, role))
            .collect::<Vec<_>>(),
    );
    let player_mean = GroupMean::pooled(
        &groups
            .iter()
            .map(|g| group_mean(player, *g, role))
            .collect::<Vec<_>>(),
    );
    let css = context_scaled(coach_mean.mean, player_mean.mean, ccm, &config.constants);
    PillarInput::from_means(pillar, coach_mean, player_mean, css)
}

fn power_fallback_keys(role: Role) -> Vec<ItemKey> {
    [SkillGroup::TechnicalPrimary, SkillGroup::TechnicalSecondary]
        .into_iter()
        .flat_map(|group| {
            group
                .items(role)
                .iter()
                .enumerate()
                .filter(|(_, name)| POWER_FALLBACK_ITEMS.contains(*name))
                .map(move |(idx, _)| ItemKey::new(group, idx as u8))
        })
        .collect()
}

fn power_pillar(
    coach: &RatingSet,
    player: &RatingSet,
    role: Role,
    ccm: f64,
    config: &EngineConfig,
) -> PillarInput {
    let dedicated = rated_pillar(
        Pillar::PowerHitting,
        &[SkillGroup::Power],
        coach,
        player,
        role,
        ccm,
        config,
    );
    if dedicated.rated > 0 || dedicated.self_rated > 0 {
        return dedicated;
    }
    let keys = power_fallback_keys(role);
    let coach_mean = GroupMean::of_keys(coach, &keys);
    let player_mean = GroupMean::of_keys(player, &keys);
    if coach_mean.rated + player_mean.rated > 0 {
        tracing::debug!(role = %role, "no power ratings, using technical hitting items");
    }
    let css = context_scaled(coach_mean.mean, player_mean.mean, ccm, &config.constants);
    PillarInput {
        total: PWR_ITEMS.len(),
        ..PillarInput::from_means(Pillar::PowerHitting, coach_mean, player_mean, css)
    }
}

/// 60/40 phase and stat blend; either side alone stands in for the whole.
fn phase_stat_blend(phase: f64, stat: f64) -> f64 {
    if phase > 0.0 && stat > 0.0 {
        phase * PHASE_SHARE + stat * STAT_SHARE
    } else if phase > 0.0 {
        phase
    } else {
        stat
    }
}

fn match_impact(
    coach: &RatingSet,
    player: &RatingSet,
    role: Role,
    ccm: &CcmResult,
    stat: &StatDomain,
    config: &EngineConfig,
) -> PillarInput {
    let phase = rated_pillar(
        Pillar::MatchImpact,
        &[SkillGroup::Phase],
        coach,
        player,
        role,
        ccm.ccm,
        config,
    );
    PillarInput {
        raw: phase_stat_blend(phase.raw, stat.score),
        css: phase_stat_blend(phase.css, stat.css),
        rated: phase.rated + usize::from(stat.eligible),
        total: phase.total + 1,
        ..phase
    }
}

fn finish_pillar(input: PillarInput, weights: &ResolvedWeights) -> PillarScore {
    // Self ratings only feed the blend and SAGI; a pillar counts once the coach rated it.
    let included = input.rated > 0;
    PillarScore {
        pillar: input.pillar,
        raw_score: round2(input.raw),
        context_score: round2(input.css),
        rated_count: input.rated,
        self_rated_count: input.self_rated,
        total_items: input.total,
        weight: weights.weight(input.pillar),
        weight_source: weights.source(input.pillar),
        percent: if input.raw > 0.0 { whole_pct(input.raw / 5.0 * 100.0) } else { 0 },
        included,
    }
}

/// Player Development Index over the eight pillars.
///
/// Only pillars with at least one rated item take part in the weighted mean, so a
/// missing pillar never drags the score down. `ccm` is the player's competition
/// context (see [`crate::competition::compute_ccm`]).
pub fn compute_pdi(
    player: &PlayerRecord,
    ccm: &CcmResult,
    config: &EngineConfig,
    reference_year: i32,
) -> PdiResult {
    let constants = &config.constants;
    let role = player.role;
    let coach = &player.coach_ratings;
    let own = &player.self_ratings;
    let age = player
        .dob
        .as_deref()
        .and_then(|d| resolve_age(d, reference_year));
    let age_tier = AgeTier::from_age(age);
    let weights = config.weights.resolve(role, age_tier);
    let scale = ccm.ccm;

    let stat = compute_stat_domain(
        StatInputs {
            grades: &player.grades,
            top_bat: &player.top_bat,
            top_bowl: &player.top_bowl,
            cti: ccm.cti,
            arm: ccm.arm,
        },
        &config.tiers,
        &config.benchmarks,
        config.weights.sub_weights(role),
        constants,
    );

    let awareness = self_awareness::assess(coach, own, role, constants);
    let sa_css = if awareness.score > 0.0 && scale > 0.0 {
        awareness.score * scale
    } else {
        awareness.score
    };

    let inputs = [
        rated_pillar(
            Pillar::TechnicalMastery,
            &[SkillGroup::TechnicalPrimary, SkillGroup::TechnicalSecondary],
            coach,
            own,
            role,
            scale,
            config,
        ),
        rated_pillar(Pillar::TacticalExecution, &[SkillGroup::Tactical], coach, own, role, scale, config),
        rated_pillar(Pillar::PhysicalConditioning, &[SkillGroup::Physical], coach, own, role, scale, config),
        rated_pillar(Pillar::MentalResilience, &[SkillGroup::Mental], coach, own, role, scale, config),
        rated_pillar(Pillar::AthleticFielding, &[SkillGroup::Fielding], coach, own, role, scale, config),
        match_impact(coach, own, role, ccm, &stat, config),
        power_pillar(coach, own, role, scale, config),
        PillarInput {
            pillar: Pillar::SelfAwareness,
            raw: awareness.score,
            css: sa_css,
            rated: usize::from(awareness.sagi.is_some()),
            self_rated: 0,
            total: 1,
        },
    ];
    let pillars: Vec<PillarScore> = inputs
        .into_iter()
        .map(|i| finish_pillar(i, &weights))
        .collect();

    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for p in pillars.iter().filter(|p| p.included) {
        weighted += p.context_score * p.weight;
        weight_sum += p.weight;
    }
    let raw_pdi = if weight_sum > 0.0 { weighted / weight_sum } else { 0.0 };
    let pdi = round2(raw_pdi.min(constants.pdi_scale_max));
    let pdi_pct = if pdi > 0.0 {
        whole_pct(pdi / constants.pdi_scale_max * 100.0)
    } else {
        0
    };

    let rated_items: usize = pillars.iter().map(|p| p.rated_count).sum();
    let total_items: usize = pillars.iter().map(|p| p.total_items).sum();
    let completeness_pct = if total_items > 0 {
        whole_pct(rated_items as f64 / total_items as f64 * 100.0)
    } else {
        0
    };

    let trajectory = match age {
        Some(a) => {
            ccm.expected_age > 0.0
                && pdi >= TRAJECTORY_MIN_PDI
                && f64::from(a) < ccm.expected_age - constants.trajectory_age_threshold
        }
        None => false,
    };

    PdiResult {
        player_id: player.id.clone(),
        pdi,
        pdi_pct,
        grade: Grade::from_pdi(pdi),
        pillars,
        sagi: awareness.sagi,
        sagi_label: awareness.label,
        trajectory,
        provisional: awareness.coach.rated == 0,
        completeness_pct,
        rated_items,
        total_items,
        ccm: ccm.clone(),
        stat,
        age,
        age_tier,
        age_score: age_score(ccm.arm, constants),
        cohort_percentile: None,
        overall_score: None,
    }
}
