use tracing_subscriber::EnvFilter;

/// Initializes a global tracing subscriber respecting the `RUST_LOG`
/// environment variable. Subsequent calls become no-ops so the backend binary,
/// the desktop shell and tests can all invoke it.
pub fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| {
            EnvFilter::new("formhelper_backend=info,formhelper_frontend=info,formhelper_desktop=info")
        });
    // `try_init` also installs the `log` bridge so frontend records reach the
    // same subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
