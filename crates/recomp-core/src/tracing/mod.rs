//! Tracing setup. Filter comes from `RECOMP_LOG`, e.g.
//! `RECOMP_LOG=recomp_analysis=debug` to see which units were demoted to
//! dependency-to-all.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "RECOMP_LOG";

const DEFAULT_DIRECTIVES: &str = "recomp_core=info,recomp_analysis=info,recomp_storage=info";

/// Install the global fmt subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
