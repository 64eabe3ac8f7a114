use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Datelike;
use tracing_subscriber::EnvFilter;

use pdi_engine::cohort::rank_scored;
use pdi_engine::config::load_players;
use pdi_engine::score_cache::{ScoreCache, default_cache_path};
use pdi_engine::synthetic::synthetic_pool;
use pdi_engine::{Engine, EngineConfig, PdiResult, PlayerRecord};

const USAGE: &str = "usage: pdi_engine <players.json> [--config=PATH] [--reference-year=YYYY] \
[--cache=PATH | --no-cache] [--demo=N] [--seed=N] [--json]";
const DEFAULT_DEMO_SEED: u64 = 42;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = match flag_value(&args, "--config").or_else(|| opt_env("PDI_CONFIG")) {
        Some(path) => EngineConfig::load(&PathBuf::from(path)).context("unable to load engine config")?,
        None => EngineConfig::default(),
    };
    let reference_year = resolve_reference_year(&args)?;
    let engine = Engine::new(&config, reference_year);

    let players = match flag_value(&args, "--demo") {
        Some(raw) => {
            let size = raw.parse::<usize>().context("--demo expects a pool size")?;
            let seed = match flag_value(&args, "--seed") {
                Some(s) => s.parse::<u64>().context("--seed expects an integer")?,
                None => DEFAULT_DEMO_SEED,
            };
            synthetic_pool(size, seed, &config.tiers, reference_year)
        }
        None => {
            let path = positional(&args).ok_or_else(|| anyhow!(USAGE))?;
            load_players(&path).context("unable to load players")?
        }
    };
    tracing::info!(players = players.len(), reference_year, tiers = config.tiers.len(), "scoring pool");

    let mut results = score(&players, &engine, &args);
    rank_scored(&players, &mut results);

    if has_flag(&args, "--json") {
        let json = serde_json::to_string_pretty(&results).context("serialize results")?;
        println!("{json}");
    } else {
        print_table(&players, &results, &engine);
    }
    Ok(())
}

fn score(players: &[PlayerRecord], engine: &Engine<'_>, args: &[String]) -> Vec<PdiResult> {
    let cache_path = if has_flag(args, "--no-cache") {
        None
    } else {
        flag_value(args, "--cache")
            .or_else(|| opt_env("PDI_CACHE"))
            .map(PathBuf::from)
            .or_else(default_cache_path)
    };
    let Some(path) = cache_path else {
        return players.iter().map(|p| engine.score(p)).collect();
    };

    let mut cache = ScoreCache::load(&path);
    let (results, stats) = cache.score_all(players, engine);
    tracing::info!(hits = stats.hits, misses = stats.misses, path = %path.display(), "score cache");
    if stats.misses > 0 {
        if let Err(err) = cache.save(&path) {
            tracing::warn!(error = %err, "failed to write score cache");
        }
    }
    results
}

fn print_table(players: &[PlayerRecord], results: &[PdiResult], engine: &Engine<'_>) {
    let mut order = (0..results.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| results[*b].pdi.total_cmp(&results[*a].pdi));

    println!(
        "{:>4}  {:<22} {:<5} {:<8} {:>5} {:<11} {:>4} {:>4} {:>4} {:>4}  {:<16} {:<12} FLAGS",
        "#", "PLAYER", "ROLE", "BRACKET", "PDI", "GRADE", "PCT", "COH", "AGE", "CORE", "SELF-AWARENESS", "BAT DNA"
    );
    for (rank, idx) in order.into_iter().enumerate() {
        let player = &players[idx];
        let r = &results[idx];
        let bracket = player
            .dob
            .as_deref()
            .map(|d| engine.bracket(d).label())
            .unwrap_or("?");
        let dna = engine.archetype_dna(player);
        let mut flags = Vec::new();
        if r.trajectory {
            flags.push("TRAJ");
        }
        if r.provisional {
            flags.push("PROV");
        }
        if !player.submitted {
            flags.push("DRAFT");
        }
        println!(
            "{:>4}  {:<22} {:<5} {:<8} {:>5.2} {:<11} {:>4} {:>4} {:>4} {:>4}  {:<16} {:<12} {}",
            rank + 1,
            truncate(&display_name(player), 22),
            player.role.short(),
            bracket,
            r.pdi,
            r.grade.label(),
            r.pdi_pct,
            r.cohort_percentile.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            r.age_score,
            r.overall_score.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            match r.sagi {
                Some(gap) => format!("{} ({gap:+.2})", r.sagi_label.text()),
                None => r.sagi_label.text().to_string(),
            },
            dna.primary_bat.map(|a| a.label()).unwrap_or("-"),
            flags.join(",")
        );
    }
}

fn display_name(player: &PlayerRecord) -> String {
    if player.name.trim().is_empty() {
        player.id.clone()
    } else {
        player.name.clone()
    }
}

fn truncate(raw: &str, width: usize) -> String {
    if raw.chars().count() <= width {
        return raw.to_string();
    }
    let mut out = raw.chars().take(width.saturating_sub(1)).collect::<String>();
    out.push('~');
    out
}

fn resolve_reference_year(args: &[String]) -> Result<i32> {
    let raw = flag_value(args, "--reference-year").or_else(|| opt_env("PDI_REFERENCE_YEAR"));
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .with_context(|| format!("invalid reference year `{raw}`")),
        None => Ok(chrono::Local::now().year()),
    }
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !arg.contains('=') && !matches!(arg.as_str(), "--json" | "--no-cache" | "--help");
            continue;
        }
        return Some(PathBuf::from(arg));
    }
    None
}

fn opt_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
