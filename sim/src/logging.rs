use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects debug output (drop-throughs, waypoint
/// arrivals, rider cache evictions) over the default info level.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // A logger may already be installed when tests run in one process.
    let _ = builder.try_init();
}
