use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with the specified verbosity level and output format.
///
/// Only events from the workspace crates are shown, at INFO by default.
/// `RUST_LOG` is ignored so that the verbosity flag stays authoritative.
///
/// # Arguments
/// * `json` - If true, output logs as JSON lines; otherwise, use human-readable format.
/// * `verbose` - Verbosity level: 0 for INFO, 1 for DEBUG, 2+ for TRACE.
pub fn init_tracing(json: bool, verbose: u8) {
    let filter = EnvFilter::new(filter_directives(verbose));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
            .init();
    }
    else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Filter directives for the given verbosity.
fn filter_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("studyhub={},studyhub_store={},studyhub_cli={}", level, level, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(
            filter_directives(0),
            "studyhub=info,studyhub_store=info,studyhub_cli=info"
        );
        assert!(filter_directives(1).contains("studyhub_store=debug"));
        assert!(filter_directives(7).contains("studyhub_cli=trace"));
    }
}
