use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use pdi_engine::PdiResult;
use pdi_engine::growth::growth_delta;

// Compares two `pdi_engine --json` snapshots player by player.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let json = args.iter().any(|a| a == "--json");
    let paths = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .collect::<Vec<_>>();
    let [baseline_path, current_path] = paths.as_slice() else {
        bail!("usage: growth_report <baseline.json> <current.json> [--json]");
    };

    let baseline = load_snapshot(baseline_path)?;
    let current = load_snapshot(current_path)?;
    let by_id = baseline
        .iter()
        .map(|r| (r.player_id.as_str(), r))
        .collect::<HashMap<_, _>>();

    let mut missing = 0usize;
    let mut deltas = Vec::new();
    for now in &current {
        let Some(before) = by_id.get(now.player_id.as_str()) else {
            missing += 1;
            continue;
        };
        deltas.push((now.player_id.clone(), growth_delta(before, now)));
    }
    if missing > 0 {
        tracing::info!(missing, "players without a baseline snapshot skipped");
    }
    deltas.sort_by(|a, b| b.1.pdi_delta.total_cmp(&a.1.pdi_delta));

    if json {
        let out = deltas
            .iter()
            .map(|(id, d)| serde_json::json!({ "player_id": id, "growth": d }))
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&out).context("serialize growth")?);
        return Ok(());
    }

    println!("{:<16} {:>7} {:>7}  BIGGEST GAIN", "PLAYER", "PDI", "SAGI");
    for (id, d) in &deltas {
        let gain = d
            .biggest_gain()
            .map(|p| format!("{} {:+.2}", p.pillar.label(), p.delta))
            .unwrap_or_else(|| "-".to_string());
        let sagi = d
            .sagi_delta
            .map(|v| format!("{v:+.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<16} {:>+7.2} {:>7}  {}", id, d.pdi_delta, sagi, gain);
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Vec<PdiResult>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
