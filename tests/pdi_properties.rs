use std::path::PathBuf;

use pdi_engine::competition::CompetitionGrade;
use pdi_engine::ratings::{RatingSet, SkillGroup};
use pdi_engine::self_awareness::SagiLabel;
use pdi_engine::weights::Pillar;
use pdi_engine::{Engine, EngineConfig, Grade, PlayerRecord, Role};

fn fixture_config() -> EngineConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("engine.json");
    EngineConfig::load(&path).expect("fixture config")
}

/// Sixteen-year-old in district turf: CCM 1.105 against the fixture tiers.
fn in_district_turf(role: Role, coach: RatingSet, own: RatingSet) -> PlayerRecord {
    PlayerRecord {
        dob: Some("01/01/2010".into()),
        grades: vec![CompetitionGrade::level("DIST_TURF")],
        ..player(role, coach, own)
    }
}

fn rated_everywhere(role: Role, value: u8) -> RatingSet {
    let mut set = RatingSet::new();
    for group in SkillGroup::ALL {
        set = set.with(group, &vec![value; group.item_count(role)]);
    }
    set
}

fn player(role: Role, coach: RatingSet, own: RatingSet) -> PlayerRecord {
    PlayerRecord {
        id: format!("{}-p", role.id()),
        dob: Some("01/01/2012".into()),
        role,
        submitted: true,
        coach_ratings: coach,
        self_ratings: own,
        ..PlayerRecord::default()
    }
}

#[test]
fn unrated_player_scores_nothing() {
    let engine = Engine::with_defaults(2026);
    let zeros = rated_everywhere(Role::Batter, 0);
    assert!(zeros.is_empty());
    let r = engine.score(&player(Role::Batter, zeros.clone(), zeros));
    assert_eq!(r.pdi, 0.0);
    assert_eq!(r.pdi_pct, 0);
    assert_eq!(r.grade, Grade::Unrated);
    assert_eq!(r.grade.label(), "\u{2014}");
    assert_eq!(r.sagi_label, SagiLabel::Unknown);
    assert!(r.pillars.iter().all(|p| !p.included));
}

#[test]
fn raising_every_rating_raises_pdi() {
    let engine = Engine::with_defaults(2026);
    for role in Role::ALL {
        for value in 1..=4 {
            let low = engine.score(&player(role, rated_everywhere(role, value), RatingSet::new()));
            let high = engine.score(&player(role, rated_everywhere(role, value + 1), RatingSet::new()));
            assert!(
                high.pdi > low.pdi,
                "{role:?}: {} -> {} should rise",
                low.pdi,
                high.pdi
            );
        }
    }
}

#[test]
fn empty_pillar_does_not_move_pdi() {
    let engine = Engine::with_defaults(2026);
    let base = RatingSet::new()
        .with(SkillGroup::TechnicalPrimary, &[4, 3, 4])
        .with(SkillGroup::Mental, &[3, 3]);
    let padded = base.clone().with(SkillGroup::Fielding, &[0, 0, 0, 0, 0, 0]);
    let a = engine.score(&player(Role::Batter, base, RatingSet::new()));
    let b = engine.score(&player(Role::Batter, padded, RatingSet::new()));
    assert_eq!(a.pdi, b.pdi);
    assert!(!b.pillar(Pillar::AthleticFielding).map(|p| p.included).unwrap_or(true));
}

#[test]
fn matching_self_view_scores_full_self_awareness() {
    let engine = Engine::with_defaults(2026);
    let ratings = RatingSet::new()
        .with(SkillGroup::TechnicalPrimary, &[3, 4, 2])
        .with(SkillGroup::Tactical, &[4]);
    let r = engine.score(&player(Role::Spin, ratings.clone(), ratings));
    assert_eq!(r.sagi, Some(0.0));
    assert_eq!(r.sagi_label, SagiLabel::Aligned);
    let sa = r.pillar(Pillar::SelfAwareness).expect("self-awareness pillar");
    assert_eq!(sa.raw_score, 5.0);
    assert!(sa.included);
}

#[test]
fn overrating_self_is_flagged() {
    let engine = Engine::with_defaults(2026);
    let coach = RatingSet::new().with(SkillGroup::TechnicalPrimary, &[2, 2, 2, 2]);
    let own = RatingSet::new().with(SkillGroup::TechnicalPrimary, &[4, 4, 4, 4]);
    let r = engine.score(&player(Role::Pace, coach, own));
    assert_eq!(r.sagi, Some(2.0));
    assert_eq!(r.sagi_label, SagiLabel::OverEstimates);
    assert_eq!(r.pillar(Pillar::SelfAwareness).map(|p| p.raw_score), Some(1.0));
}

#[test]
fn pdi_stays_on_scale() {
    let engine = Engine::with_defaults(2026);
    for role in Role::ALL {
        let r = engine.score(&player(role, rated_everywhere(role, 5), rated_everywhere(role, 5)));
        assert!(r.pdi > 0.0 && r.pdi <= 5.0, "{role:?} pdi {}", r.pdi);
        assert!(r.pdi_pct <= 100);
        // Every item rated; only the season-stat slot of match impact stays open.
        assert!(r.completeness_pct >= 95 && r.completeness_pct < 100);
    }
}

#[test]
fn coach_and_self_blend_under_competition_context() {
    let cfg = fixture_config();
    let engine = Engine::new(&cfg, 2026);
    let coach = RatingSet::new().with(SkillGroup::Tactical, &[4, 4]);
    let own = RatingSet::new().with(SkillGroup::Tactical, &[4, 3]);
    let r = engine.score(&in_district_turf(Role::Batter, coach, own));
    assert_eq!(r.ccm.ccm, 1.105);
    assert!(!r.stat.eligible);

    // (4 * 0.75 + 3.5 * 0.25) * 1.105
    let te = r.pillar(Pillar::TacticalExecution).expect("tactical pillar");
    assert_eq!(te.raw_score, 4.0);
    assert!((te.context_score - 4.28).abs() < 1e-9);

    // SAGI -0.5 is still aligned and scores 4, scaled to 4.42.
    assert_eq!(r.sagi, Some(-0.5));
    assert_eq!(r.sagi_label, SagiLabel::Aligned);
    let sa = r.pillar(Pillar::SelfAwareness).expect("self-awareness pillar");
    assert!((sa.context_score - 4.42).abs() < 1e-9);

    // Mid tier weights te 0.16 and sa 0.14.
    assert!((r.pdi - 4.35).abs() < 1e-9, "pdi {}", r.pdi);
    assert_eq!(r.grade, Grade::Elite);
}

#[test]
fn raising_every_rating_raises_pdi_under_competition_context() {
    let cfg = fixture_config();
    let engine = Engine::new(&cfg, 2026);
    for role in Role::ALL {
        for value in 1..=4 {
            let low = engine.score(&in_district_turf(role, rated_everywhere(role, value), RatingSet::new()));
            let high = engine.score(&in_district_turf(role, rated_everywhere(role, value + 1), RatingSet::new()));
            assert_eq!(low.ccm.ccm, 1.105);
            assert!(
                high.pdi > low.pdi,
                "{role:?}: {} -> {} should rise",
                low.pdi,
                high.pdi
            );
        }
    }
}

#[test]
fn empty_pillar_does_not_move_pdi_under_competition_context() {
    let cfg = fixture_config();
    let engine = Engine::new(&cfg, 2026);
    let base = RatingSet::new()
        .with(SkillGroup::TechnicalPrimary, &[4, 3, 4])
        .with(SkillGroup::Mental, &[3, 3]);
    let padded = base.clone().with(SkillGroup::Physical, &[0, 0, 0, 0, 0]);
    let own = RatingSet::new().with(SkillGroup::TechnicalPrimary, &[4, 4, 4]);
    let a = engine.score(&in_district_turf(Role::Pace, base, own.clone()));
    let b = engine.score(&in_district_turf(Role::Pace, padded, own));
    assert!(a.pdi > 0.0);
    assert_eq!(a.pdi, b.pdi);
}

#[test]
fn self_ratings_alone_never_score() {
    let cfg = fixture_config();
    let engine = Engine::new(&cfg, 2026);
    let own = rated_everywhere(Role::Spin, 5);
    let r = engine.score(&in_district_turf(Role::Spin, RatingSet::new(), own));
    assert!(r.provisional);
    assert_eq!(r.pdi, 0.0);
    assert_eq!(r.grade, Grade::Unrated);
}
