use std::path::PathBuf;

use pdi_engine::competition::CompetitionGrade;
use pdi_engine::config::load_players;
use pdi_engine::{Engine, EngineConfig, PlayerRecord};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn config() -> EngineConfig {
    EngineConfig::load(&fixture("engine.json")).expect("fixture config")
}

fn player(dob: Option<&str>, levels: &[&str]) -> PlayerRecord {
    PlayerRecord {
        id: "p".into(),
        dob: dob.map(str::to_string),
        grades: levels.iter().map(|l| CompetitionGrade::level(l)).collect(),
        ..PlayerRecord::default()
    }
}

#[test]
fn sixteen_year_old_in_district_turf() {
    let cfg = config();
    let engine = Engine::new(&cfg, 2026);
    let r = engine.ccm(&player(Some("01/01/2010"), &["DIST_TURF"]));
    assert_eq!(r.arm, 1.30);
    assert_eq!(r.cti, 0.85);
    assert_eq!(r.ccm, 1.105);
    assert_eq!(r.code.as_deref(), Some("DIST_TURF"));
}

#[test]
fn older_player_hits_arm_floor() {
    let cfg = config();
    let engine = Engine::new(&cfg, 2026);
    let r = engine.ccm(&player(Some("15/06/1996"), &["DIST_TURF"]));
    assert_eq!(r.arm, 0.80);
    assert_eq!(r.ccm, 0.68);
}

#[test]
fn young_player_in_premier_hits_arm_ceiling() {
    let cfg = config();
    let engine = Engine::new(&cfg, 2026);
    let r = engine.ccm(&player(Some("20/03/2014"), &["U13_LOCAL", "PREMIER"]));
    assert_eq!(r.arm, 1.50);
    assert_eq!(r.cti, 1.30);
    assert_eq!(r.ccm, 1.95);
}

#[test]
fn no_grades_or_no_dob_means_no_context() {
    let cfg = config();
    let engine = Engine::new(&cfg, 2026);
    let none = engine.ccm(&player(Some("01/01/2010"), &[]));
    assert_eq!(none.ccm, 0.0);
    assert_eq!(none.arm, 1.0);
    assert!(!none.has_context());

    let no_dob = engine.ccm(&player(None, &["PREMIER"]));
    assert_eq!(no_dob.ccm, 0.0);
    assert_eq!(no_dob.code, None);

    let unknown = engine.ccm(&player(Some("01/01/2010"), &["NOT_A_TIER"]));
    assert_eq!(unknown.ccm, 0.0);
}

#[test]
fn built_in_config_has_no_tiers() {
    let engine = Engine::with_defaults(2026);
    let r = engine.ccm(&player(Some("01/01/2010"), &["DIST_TURF"]));
    assert_eq!(r.ccm, 0.0);
}

#[test]
fn fixture_pool_resolves_expected_context() {
    let cfg = config();
    let engine = Engine::new(&cfg, 2026);
    let pool = load_players(&fixture("players.json")).expect("fixture players");
    let ccms = pool
        .iter()
        .map(|p| (p.id.as_str(), engine.ccm(p).ccm))
        .collect::<Vec<_>>();
    assert_eq!(
        ccms,
        vec![
            ("p-ava", 1.105),
            ("p-ben", 0.68),
            ("p-cal", 1.95),
            ("p-dee", 0.0),
            ("p-eli", 0.0)
        ]
    );
}
