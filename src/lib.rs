pub mod age;
pub mod archetype;
pub mod benchmarks;
pub mod cohort;
pub mod competition;
pub mod config;
pub mod engine;
pub mod growth;
pub mod numeric;
pub mod palette;
pub mod pdi;
pub mod peak;
pub mod player;
pub mod ratings;
pub mod score_cache;
pub mod self_awareness;
pub mod stat_domain;
pub mod synthetic;
pub mod weights;

pub use config::{ConfigError, EngineConfig, EngineConstants, default_config};
pub use engine::Engine;
pub use pdi::{Grade, PdiResult};
pub use player::{PlayerRecord, Role};
