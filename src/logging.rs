use tracing_subscriber::{
    EnvFilter,
    filter::ParseError,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "heroes_api=info,tower_http=info";

/// Target sqlx logs executed statements under.
const SQL_ECHO_DIRECTIVE: &str = "sqlx::query=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter;
/// `echo` additionally enables sqlx statement logging at INFO.
pub fn init_tracing(format: LogFormat, echo: bool) -> Result<(), ParseError> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), echo)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }

    Ok(())
}

/// An unparseable `rust_log` falls back to the default filter.
pub fn build_filter(rust_log: Option<&str>, echo: bool) -> Result<EnvFilter, ParseError> {
    let filter = rust_log
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    if echo {
        Ok(filter.add_directive(SQL_ECHO_DIRECTIVE.parse()?))
    } else {
        Ok(filter)
    }
}
