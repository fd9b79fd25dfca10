use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "lumen_renderer::vao=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,

    /// Level for the renderer's own targets, applied on top of the filter.
    ///
    /// `Trace` shows per-draw traffic, `Debug` cache builds and evictions.
    pub renderer_level: Option<LevelFilter>,

    pub write_style: env_logger::WriteStyle,

    /// Route output through the test harness capture.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            renderer_level: None,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

impl LoggingConfig {
    /// Configuration with an explicit filter, overriding `RUST_LOG`.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn renderer_level(mut self, level: LevelFilter) -> Self {
        self.renderer_level = Some(level);
        self
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(LevelFilter::Info);
        }

        if let Some(level) = config.renderer_level {
            builder.filter_module(env!("CARGO_CRATE_NAME"), level);
        }

        builder.write_style(config.write_style).is_test(config.is_test);

        // A host application or test may already own the global logger.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized ({:?})", config);
    });
}

/// Logger for unit tests: captured output, renderer targets at `debug`.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    init_logging(LoggingConfig {
        is_test: true,
        ..LoggingConfig::default().renderer_level(LevelFilter::Debug)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig::with_filter("warn").renderer_level(LevelFilter::Trace);
        assert_eq!(config.env_filter.as_deref(), Some("warn"));
        assert_eq!(config.renderer_level, Some(LevelFilter::Trace));
        assert!(!config.is_test);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_test_logging();
        init_test_logging();
        log::debug!("still logging");
    }
}
