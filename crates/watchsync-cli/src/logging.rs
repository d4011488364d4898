use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

// Non-interactive progress events stay visible by default; reconciler narration needs -v
const DEFAULT_FILTER: &str = "warn,watchsync=info";

pub fn init_logging(verbose_level: u8, quiet: bool) -> Result<()> {
    let filter = filter_directives(verbose_level, quiet);
    let filter = if quiet {
        EnvFilter::new(filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);

    // Logs go to stderr; stdout carries prompts and summaries
    if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_target(false)
            .with_writer(io::stderr);

        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}

/// 0 = progress events, 1 = debug (hyper noise suppressed), 2+ = trace
fn filter_directives(verbose_level: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose_level {
        0 => DEFAULT_FILTER,
        1 => "debug,hyper=warn,reqwest=info,rustls=warn",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(0, false), DEFAULT_FILTER);
        assert!(!DEFAULT_FILTER.contains("watch_sync_core"));
        assert_eq!(filter_directives(3, true), "error");
        assert!(filter_directives(1, false).starts_with("debug"));
        assert_eq!(filter_directives(2, false), "trace");
    }
}
