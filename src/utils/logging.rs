use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Initialize tracing/logging for the application.
///
/// `default_level` seeds the filter; `RUST_LOG`, when set, takes precedence.
pub fn init(default_level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(parse_level(default_level)).into())
        .from_env_lossy();

    // try_init so tests can call this more than once
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}
