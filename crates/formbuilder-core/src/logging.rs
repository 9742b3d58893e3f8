//! Logging integration for the formbuilder workspace.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-form spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info", "warn",
/// "error"). In debug mode a pretty, human-readable format is used; in production
/// a structured JSON format is used.
///
/// Installing a subscriber twice is not an error; the second call is ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one form-handling request.
///
/// Enter this span while configuring, materializing, and submitting a
/// builder so that every event carries the logical form name.
///
/// # Examples
///
/// ```
/// use formbuilder_core::logging::builder_span;
///
/// let span = builder_span("registration");
/// let _guard = span.enter();
/// tracing::info!("building form");
/// ```
pub fn builder_span(form_name: &str) -> tracing::Span {
    tracing::info_span!("form_builder", form = form_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings {
            log_level: "not a valid filter [".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&settings);
    }

    #[test]
    fn test_builder_span_enter() {
        let span = builder_span("test");
        let _guard = span.enter();
        tracing::debug!("inside span");
    }
}
