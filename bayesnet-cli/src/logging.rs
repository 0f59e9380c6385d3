use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `BAYESNET_LOG=bayesnet=debug`.
pub const LOG_ENV: &str = "BAYESNET_LOG";

/// Install the global subscriber, logging to stderr.
///
/// `--trace` and `--verbose` take precedence over `BAYESNET_LOG`, which defaults to `warn`.
pub fn init(verbose: bool, trace: bool) {
    let filter = if trace {
        EnvFilter::new("bayesnet=trace,bayesnet_cli=trace")
    } else if verbose {
        EnvFilter::new("bayesnet=debug,bayesnet_cli=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
