//! Logging bootstrap: env-filtered tracing with pretty or JSON output.

use tracing_subscriber::EnvFilter;

use bookstock_kernel::settings::{LogFormat, TelemetrySettings};

const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Install the global tracing subscriber according to settings.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(settings: &TelemetrySettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
