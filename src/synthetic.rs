//! Seeded pools of plausible players for demos and benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::archetype::BatArchetype;
use crate::competition::{CompetitionGrade, CompetitionTier};
use crate::player::{Onboarding, PeakBatting, PeakBowling, PlayerRecord, Role};
use crate::ratings::{ItemKey, RatingSet, SkillGroup};

const FIRST_NAMES: [&str; 12] = [
    "Liam", "Noah", "Aarav", "Oliver", "Jack", "Ishaan", "Mason", "Ethan", "Kabir", "Lucas",
    "Harvey", "Rohan",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Patel", "Nguyen", "Brown", "Singh", "Wilson", "Khan", "Taylor", "Sharma", "Walker",
];
const SHOTS: [&str; 8] = [
    "Drive", "Pull", "Cut", "Sweep", "Reverse Sweep", "Lofted Hit", "Flick", "Switch Hit",
];
const PHASES: [&str; 3] = ["pp", "mid", "death"];
const POSITIONS: [&str; 4] = ["top", "middle", "lower", "tail"];

/// Generate `size` players. The same seed always yields the same pool.
pub fn synthetic_pool(
    size: usize,
    seed: u64,
    tiers: &[CompetitionTier],
    reference_year: i32,
) -> Vec<PlayerRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|idx| synthetic_player(idx, &mut rng, tiers, reference_year))
        .collect()
}

fn synthetic_player(
    idx: usize,
    rng: &mut impl Rng,
    tiers: &[CompetitionTier],
    reference_year: i32,
) -> PlayerRecord {
    let role = Role::ALL[rng.gen_range(0..Role::ALL.len())];
    let age = rng.gen_range(11..=19);
    let dob = format!(
        "{:02}/{:02}/{}",
        rng.gen_range(1..=28),
        rng.gen_range(1..=12),
        reference_year - age
    );
    // Underlying talent drives every rating and stat so the pool spreads out.
    let talent: f64 = rng.gen_range(1.5..4.6);

    let coach_ratings = if rng.gen_bool(0.85) {
        rate_groups(rng, role, talent, 0.8)
    } else {
        RatingSet::new()
    };
    let self_bias = rng.gen_range(-0.8..1.0);
    let self_ratings = if rng.gen_bool(0.9) {
        rate_groups(rng, role, talent + self_bias, 0.6)
    } else {
        RatingSet::new()
    };

    let grades = if tiers.is_empty() || rng.gen_bool(0.1) {
        Vec::new()
    } else {
        let tier = &tiers[rng.gen_range(0..tiers.len())];
        vec![season(rng, role, talent, &tier.code)]
    };

    let top_bat = (0..rng.gen_range(0..=3))
        .map(|_| {
            let runs = (talent * rng.gen_range(6.0..18.0)).round();
            PeakBatting {
                runs,
                balls: (runs / rng.gen_range(0.6..1.5)).round(),
                not_out: rng.gen_bool(0.3),
                competition: tiers
                    .get(rng.gen_range(0..tiers.len().max(1)))
                    .map(|t| t.competition_name.clone()),
                ..PeakBatting::default()
            }
        })
        .collect();
    let top_bowl = if matches!(role, Role::Pace | Role::Spin | Role::Allrounder) {
        (0..rng.gen_range(1..=3))
            .map(|_| PeakBowling {
                wickets: rng.gen_range(0..=5) as f64,
                runs: rng.gen_range(8..=40) as f64,
                overs: 4.0,
                maidens: rng.gen_range(0..=1) as f64,
                ..PeakBowling::default()
            })
            .collect()
    } else {
        Vec::new()
    };

    let onboarding = Onboarding {
        go_to_shots: (0..rng.gen_range(0..=3))
            .map(|_| SHOTS[rng.gen_range(0..SHOTS.len())].to_string())
            .collect(),
        bat_phases: vec![PHASES[rng.gen_range(0..PHASES.len())].to_string()],
        bat_position: Some(POSITIONS[rng.gen_range(0..POSITIONS.len())].to_string()),
        comfort_spin: Some(rng.gen_range(1..=5) as f64),
        comfort_pace: Some(rng.gen_range(1..=5) as f64),
    };

    PlayerRecord {
        id: format!("syn-{idx:04}"),
        name: format!(
            "{} {}",
            FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
        ),
        dob: Some(dob),
        role,
        submitted: rng.gen_bool(0.9),
        grades,
        top_bat,
        top_bowl,
        coach_ratings,
        self_ratings,
        coach_bat_archetype: rng
            .gen_bool(0.5)
            .then(|| BatArchetype::ALL[rng.gen_range(0..BatArchetype::ALL.len())].id().to_string()),
        coach_bowl_archetype: None,
        onboarding,
    }
}

/// Rate a random subset of every group around `centre`.
fn rate_groups(rng: &mut impl Rng, role: Role, centre: f64, coverage: f64) -> RatingSet {
    let mut set = RatingSet::new();
    for group in SkillGroup::ALL {
        for idx in 0..group.item_count(role) {
            if !rng.gen_bool(coverage) {
                continue;
            }
            let value = (centre + rng.gen_range(-1.0..1.0)).round().clamp(1.0, 5.0);
            set.rate(ItemKey::new(group, idx as u8), value as u8);
        }
    }
    set
}

fn season(rng: &mut impl Rng, role: Role, talent: f64, level: &str) -> CompetitionGrade {
    let matches = rng.gen_range(4..=14) as f64;
    let bat_innings = (matches - rng.gen_range(0.0..3.0)).max(0.0).round();
    let runs = (bat_innings * talent * rng.gen_range(3.0..8.0)).round();
    let bowls = matches!(role, Role::Pace | Role::Spin | Role::Allrounder);
    let overs = if bowls { (matches * rng.gen_range(2.0..4.0)).round() } else { 0.0 };
    CompetitionGrade {
        level: level.to_string(),
        matches,
        bat_innings,
        runs,
        high_score: (runs / bat_innings.max(1.0) * rng.gen_range(1.5..3.0)).round(),
        balls_faced: (runs / rng.gen_range(0.55..1.2)).round(),
        overs,
        wickets: if bowls { (overs / rng.gen_range(3.0..9.0)).round() } else { 0.0 },
        econ: if bowls { (rng.gen_range(3.5..8.0_f64) * 100.0).round() / 100.0 } else { 0.0 },
        catches: rng.gen_range(0..=6) as f64,
        run_outs: rng.gen_range(0..=2) as f64,
        stumpings: if role == Role::Keeper { rng.gen_range(0..=4) as f64 } else { 0.0 },
        ..CompetitionGrade::default()
    }
}
