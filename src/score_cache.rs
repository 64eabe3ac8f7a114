use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{ConfigError, EngineConfig};
use crate::engine::Engine;
use crate::pdi::PdiResult;
use crate::player::PlayerRecord;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "pdi_engine";
const CACHE_FILE: &str = "scores.json";

/// Hashes the config and reference year once, then each player on top of that.
#[derive(Clone)]
pub struct Fingerprinter {
    base: Sha256,
}

impl Fingerprinter {
    pub fn new(config: &EngineConfig, reference_year: i32) -> Self {
        let mut base = Sha256::new();
        base.update(CACHE_VERSION.to_le_bytes());
        base.update(reference_year.to_le_bytes());
        match serde_json::to_vec(config) {
            Ok(bytes) => base.update(&bytes),
            Err(err) => tracing::warn!(error = %err, "config not serialisable, fingerprint covers year only"),
        }
        Self { base }
    }

    pub fn for_engine(engine: &Engine<'_>) -> Self {
        Self::new(engine.config, engine.reference_year)
    }

    pub fn player(&self, player: &PlayerRecord) -> String {
        let mut hasher = self.base.clone();
        match serde_json::to_vec(player) {
            Ok(bytes) => hasher.update(&bytes),
            // Unhashable input must never share a key with another player.
            Err(_) => hasher.update(player.id.as_bytes()),
        }
        BASE64.encode(hasher.finalize())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// On-disk memo of PDI results keyed by input fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCache {
    version: u32,
    entries: HashMap<String, PdiResult>,
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }
}

pub fn default_cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

impl ScoreCache {
    /// Missing, unreadable or stale-version files start an empty cache.
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            return Self::default();
        };
        let Ok(cache) = serde_json::from_str::<ScoreCache>(&raw) else {
            tracing::debug!(path = %path.display(), "unreadable score cache, starting fresh");
            return Self::default();
        };
        if cache.version != CACHE_VERSION {
            return Self::default();
        }
        cache
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| ConfigError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: &str) -> Option<&PdiResult> {
        self.entries.get(fingerprint)
    }

    /// Score every player, reusing cached results and computing the rest in parallel.
    /// Results come back in `players` order without cohort fields.
    pub fn score_all(
        &mut self,
        players: &[PlayerRecord],
        engine: &Engine<'_>,
    ) -> (Vec<PdiResult>, CacheStats) {
        let fingerprinter = Fingerprinter::for_engine(engine);
        let keys: Vec<String> = players.par_iter().map(|p| fingerprinter.player(p)).collect();

        let entries = &self.entries;
        let computed: Vec<(PdiResult, bool)> = players
            .par_iter()
            .zip(keys.par_iter())
            .map(|(player, key)| match entries.get(key) {
                Some(hit) => (hit.clone(), true),
                None => (engine.score(player), false),
            })
            .collect();

        let mut stats = CacheStats::default();
        let mut results = Vec::with_capacity(computed.len());
        for ((result, hit), key) in computed.into_iter().zip(keys) {
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
                self.entries.insert(key, result.clone());
            }
            results.push(result);
        }
        tracing::debug!(hits = stats.hits, misses = stats.misses, "scored pool");
        (results, stats)
    }
}
