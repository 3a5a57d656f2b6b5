use anyhow::{anyhow, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Output format of the log lines written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown log format: {other}")),
        }
    }
}

fn env_filter(verbosity_level: Level) -> Result<EnvFilter> {
    // RUST_LOG=
    Ok(EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

/// Initialize logging. Logs go to stderr so command output on stdout stays
/// machine readable.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already installed
pub fn init(verbosity_level: Option<Level>, format: LogFormat) -> Result<()> {
    let filter = env_filter(verbosity_level.unwrap_or(Level::ERROR))?;

    match format {
        LogFormat::Text => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false);
            let subscriber = Registry::default().with(fmt_layer).with(filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true);
            let subscriber = Registry::default().with(fmt_layer).with(filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!(" Text ".parse::<LogFormat>().ok(), Some(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_env_filter_builds() {
        temp_env::with_var("RUST_LOG", None::<&str>, || {
            assert!(env_filter(Level::DEBUG).is_ok());
        });
    }
}
