/*!
 * Logging Module
 * Subscriber setup: console plus daily-rolled files
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

/// Logging knobs read from `ENVIRONMENT`, `LOG_LEVEL`, `LOG_FORMAT`, `LOG_DIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub environment: String,
    pub level: String,
    pub json: bool,
    pub dir: String,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let production = environment == "production";
        let level = get("LOG_LEVEL")
            .unwrap_or_else(|| if production { "info" } else { "debug" }.to_string());
        // JSON in production unless explicitly overridden.
        let json = match get("LOG_FORMAT").as_deref() {
            Some("json") => true,
            Some("pretty") | Some("text") => false,
            _ => production,
        };
        let dir = get("LOG_DIR").unwrap_or_else(|| "logs".to_string());
        Self {
            environment,
            level,
            json,
            dir,
        }
    }

    /// `RUST_LOG` wins over `LOG_LEVEL`.
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }

    fn directive(&self) -> String {
        format!(
            "portfolio_api={},tower_http=debug,axum=debug,sqlx=warn",
            self.level
        )
    }
}

/// Build the subscriber for `settings` without installing it.
fn build(settings: &LogSettings) -> (Layered<Vec<BoxedLayer>, Base>, Vec<WorkerGuard>) {
    std::fs::create_dir_all(&settings.dir).ok();

    let (file_writer, file_guard) = non_blocking(rolling::daily(&settings.dir, "app.log"));
    let (error_writer, error_guard) = non_blocking(rolling::daily(&settings.dir, "error.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());

    // error.log is always JSON so alerts can parse it.
    let error_layer = fmt::layer()
        .json()
        .with_writer(error_writer)
        .with_file(true)
        .with_line_number(true)
        .with_filter(LevelFilter::ERROR)
        .boxed();

    let layers: Vec<BoxedLayer> = if settings.json {
        vec![
            fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            fmt::layer()
                .json()
                .with_writer(console_writer)
                .with_target(false)
                .boxed(),
            error_layer,
        ]
    } else {
        vec![
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            fmt::layer().with_writer(console_writer).pretty().boxed(),
            error_layer,
        ]
    };

    let subscriber = tracing_subscriber::registry()
        .with(settings.filter())
        .with(layers);
    (subscriber, vec![file_guard, error_guard, console_guard])
}

/// Initialize the logging system.
///
/// The returned guards flush the non-blocking writers on drop and must be
/// held for the lifetime of the process.
pub fn init() -> Vec<WorkerGuard> {
    let settings = LogSettings::from_env();
    let (subscriber, guards) = build(&settings);
    subscriber.init();

    tracing::info!(
        environment = %settings.environment,
        json = settings.json,
        dir = %settings.dir,
        "logging initialized"
    );

    guards
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let s = settings(&[]);
        assert_eq!(s.level, "debug");
        assert!(!s.json);
        assert_eq!(s.dir, "logs");
    }

    #[test]
    fn test_production_defaults_to_json_at_info() {
        let s = settings(&[("ENVIRONMENT", "production")]);
        assert_eq!(s.level, "info");
        assert!(s.json);
    }

    #[test]
    fn test_log_format_overrides_environment() {
        assert!(!settings(&[("ENVIRONMENT", "production"), ("LOG_FORMAT", "pretty")]).json);
        assert!(settings(&[("LOG_FORMAT", "json")]).json);
    }

    #[test]
    fn test_both_formats_build_and_write_error_log() {
        for json in [true, false] {
            let dir = std::env::temp_dir().join(format!(
                "portfolio-api-logs-{}-{}",
                std::process::id(),
                json
            ));
            let mut s = settings(&[]);
            s.json = json;
            s.dir = dir.to_string_lossy().into_owned();

            let (subscriber, guards) = build(&s);
            tracing::subscriber::with_default(subscriber, || {
                tracing::error!(target: "portfolio_api", "boom");
            });
            drop(guards);

            let wrote_error_log = std::fs::read_dir(&dir)
                .unwrap()
                .filter_map(Result::ok)
                .any(|e| e.file_name().to_string_lossy().starts_with("error.log"));
            assert!(wrote_error_log, "json={json}");
            std::fs::remove_dir_all(&dir).ok();
        }
    }

    #[test]
    fn test_directive_targets_this_crate() {
        let directive = settings(&[("LOG_LEVEL", "warn")]).directive();
        assert!(directive.starts_with("portfolio_api=warn"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
