use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
/// Logs go to stderr so tables and summaries on stdout stay clean.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Filter for `-v` repetitions.
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "rr_iops=info",
        1 => "rr_iops=debug",
        _ => "rr_iops=trace,reqwest=debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_verbosity() {
        assert_eq!(filter_for_verbosity(0), "rr_iops=info");
        assert_eq!(filter_for_verbosity(1), "rr_iops=debug");
        assert!(filter_for_verbosity(5).starts_with("rr_iops=trace"));
    }
}
