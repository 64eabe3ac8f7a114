use std::path::PathBuf;

use pdi_engine::cohort::{CohortIndex, is_comparable, rank_pool, rank_scored};
use pdi_engine::config::load_players;
use pdi_engine::synthetic::synthetic_pool;
use pdi_engine::{Engine, EngineConfig};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn percentiles_span_the_pool() {
    let cfg = EngineConfig::load(&fixture("engine.json")).expect("fixture config");
    let engine = Engine::new(&cfg, 2026);
    let pool = synthetic_pool(120, 3, &cfg.tiers, 2026);
    let results = rank_pool(&pool, &engine);
    assert_eq!(results.len(), pool.len());

    let ranked = pool
        .iter()
        .zip(&results)
        .filter(|(p, r)| is_comparable(p) && r.pdi > 0.0)
        .map(|(_, r)| r)
        .collect::<Vec<_>>();
    assert!(ranked.len() > 10, "synthetic pool should be mostly comparable");

    let best = ranked
        .iter()
        .max_by(|a, b| a.pdi.total_cmp(&b.pdi))
        .expect("non-empty");
    let worst = ranked
        .iter()
        .min_by(|a, b| a.pdi.total_cmp(&b.pdi))
        .expect("non-empty");
    assert!(best.cohort_percentile.expect("ranked") >= 50);
    assert!(worst.cohort_percentile.expect("ranked") <= 50);
    assert!(results.iter().all(|r| r.cohort_percentile.is_some_and(|p| p <= 100)));
}

#[test]
fn percentile_is_monotonic_in_pdi() {
    let index = CohortIndex::from_scores([1.2, 2.5, 3.1, 3.1, 4.4]);
    let mut last = 0;
    for pdi in [0.5, 1.2, 2.0, 3.1, 3.5, 4.4, 4.9] {
        let pct = index.percentile(pdi);
        assert!(pct >= last, "{pdi} -> {pct} after {last}");
        last = pct;
    }
    assert_eq!(index.percentile(4.4), 100);
    assert_eq!(index.percentile(1.2), 0);
}

#[test]
fn tiny_pools_sit_in_the_middle() {
    assert_eq!(CohortIndex::from_scores(Vec::new()).percentile(3.0), 50);
    assert_eq!(CohortIndex::from_scores([3.0]).percentile(3.0), 50);
    // Zero scores never join the pool.
    assert_eq!(CohortIndex::from_scores([0.0, 2.0]).percentile(2.0), 50);
}

#[test]
fn unsubmitted_players_are_ranked_but_not_compared() {
    let cfg = EngineConfig::load(&fixture("engine.json")).expect("fixture config");
    let engine = Engine::new(&cfg, 2026);
    let pool = load_players(&fixture("players.json")).expect("fixture players");
    let mut results = pool.iter().map(|p| engine.score(p)).collect::<Vec<_>>();
    let index = rank_scored(&pool, &mut results);

    // ava, ben and cal are submitted with coach technique ratings.
    assert_eq!(index.len(), 3);
    let dee = &results[3];
    assert!(!pool[3].submitted);
    assert!(dee.cohort_percentile.is_some());

    let eli = &results[4];
    assert_eq!(eli.pdi, 0.0);
    assert_eq!(eli.overall_score, None);
    let ava = &results[0];
    assert!(ava.overall_score.is_some());
}
