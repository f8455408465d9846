//! Configuration for the recomp engine, loaded from `recomp.toml`.

pub mod analysis_config;
pub mod cache_config;
pub mod recomp_config;

pub use analysis_config::AnalysisConfig;
pub use cache_config::CacheConfig;
pub use recomp_config::RecompConfig;
