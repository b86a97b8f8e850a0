use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr so log lines never interleave with the screen on stdout.
///
/// Level comes from `RUST_LOG`, defaulting to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
