//! Tracing setup for hosts of the simulation core
//!
//! The library only emits events. A host (the `runner-sim` binary, a test
//! harness) installs the subscriber once through `init_tracing`; `RUST_LOG`
//! replaces the configured directives when set.

use std::sync::Once;
use std::time::{Duration, Instant};

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// `-v` count on the command line; none means `Info`
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    /// Extra `module=level` directives
    pub module_filters: Vec<(&'static str, LogLevel)>,
    /// The game loop runs on its own named thread
    pub show_thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("runner_core::session", LogLevel::Info),
                // dropped catch-up ticks only
                ("runner_core::scheduler", LogLevel::Warn),
                ("runner_core::level", LogLevel::Info),
                ("runner_core::replay", LogLevel::Info),
            ],
            show_thread_names: true,
        }
    }
}

impl TracingConfig {
    /// New default level; module filters quieter than it are raised to match
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        for (_, module_level) in &mut self.module_filters {
            *module_level = (*module_level).min(level);
        }
        self
    }

    /// `EnvFilter` directive string, default level first
    pub fn directives(&self) -> String {
        std::iter::once(self.default_level.as_str().to_string())
            .chain(
                self.module_filters
                    .iter()
                    .map(|(module, level)| format!("{module}={}", level.as_str())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the fmt subscriber; later calls are ignored
pub fn init_tracing(config: &TracingConfig) {
    let directives = config.directives();
    let show_thread_names = config.show_thread_names;
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(show_thread_names)
            .compact();

        // the host may own the global subscriber already
        let _ = subscriber.try_init();
    });
}

/// Entered span that logs its wall time at `debug` when dropped
pub struct TimingSpan {
    name: &'static str,
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl TimingSpan {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            started: Instant::now(),
            _span: tracing::info_span!("timed", name = name).entered(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for TimingSpan {
    fn drop(&mut self) {
        debug!(
            name = self.name,
            elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_maps_to_level() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Trace);
        assert_eq!(LogLevel::from_verbosity(u8::MAX), LogLevel::Trace);
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(
            TracingConfig::default().directives(),
            "info,runner_core::session=info,runner_core::scheduler=warn,\
             runner_core::level=info,runner_core::replay=info"
        );
    }

    #[test]
    fn test_verbose_cli_lowers_module_filters() {
        let config = TracingConfig::default().with_level(LogLevel::from_verbosity(1));
        assert_eq!(config.default_level, LogLevel::Debug);
        assert!(config
            .module_filters
            .iter()
            .all(|(_, level)| *level == LogLevel::Debug));
    }

    #[test]
    fn test_quieter_default_keeps_module_filters() {
        let config = TracingConfig::default().with_level(LogLevel::Error);
        let directives = config.directives();
        assert!(directives.starts_with("error,"));
        assert!(directives.contains("runner_core::scheduler=warn"));
        assert!(directives.contains("runner_core::session=info"));
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(&TracingConfig::default());
        init_tracing(&TracingConfig::default().with_level(LogLevel::Trace));
    }

    #[test]
    fn test_timing_span_measures_wall_time() {
        let span = TimingSpan::new("sleep");
        std::thread::sleep(Duration::from_millis(2));
        assert!(span.elapsed() >= Duration::from_millis(2));
    }
}
