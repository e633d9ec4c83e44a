//! Log output for the CLI: plain lines on stderr, so stdout carries only the
//! bundle or summary.

use qconnect_config::LoggingConfig;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Who chose the active filter, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterSource {
    Env,
    Flag,
    Settings,
}

fn initial_filter(rust_log: Option<String>, cli_level: Option<&str>) -> (String, FilterSource) {
    match (rust_log, cli_level) {
        (Some(directives), _) if !directives.trim().is_empty() => (directives, FilterSource::Env),
        (_, Some(level)) => (level.to_string(), FilterSource::Flag),
        _ => (LoggingConfig::default().level, FilterSource::Settings),
    }
}

/// Installed subscriber plus the handle to retune it once settings are loaded
pub struct Logging {
    handle: reload::Handle<EnvFilter, Registry>,
    source: FilterSource,
}

impl Logging {
    /// Install the global subscriber before settings load, so load errors are logged too.
    pub fn init(cli_level: Option<&str>) -> Self {
        let (directives, source) = initial_filter(std::env::var("RUST_LOG").ok(), cli_level);
        let (filter_layer, handle) = reload::Layer::new(EnvFilter::new(directives));

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();

        Self { handle, source }
    }

    /// Switch to `logging.level` unless RUST_LOG or `--log-level` already chose a filter.
    pub fn apply_settings(&self, logging: &LoggingConfig) {
        if self.source != FilterSource::Settings {
            return;
        }
        if let Err(e) = self.handle.modify(|f| *f = EnvFilter::new(&logging.level)) {
            tracing::warn!(error = %e, "failed to apply logging.level");
        }
    }
}
