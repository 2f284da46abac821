//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the
//! rendered ResultSet.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }

    /// Apply `-v` / `-q`; verbose wins when both are given
    pub fn adjusted(self, verbose: bool, quiet: bool) -> Self {
        if verbose {
            LogLevel::Debug
        } else if quiet {
            LogLevel::Error
        } else {
            self
        }
    }
}

/// Install the global subscriber. `silent` installs none.
pub fn setup_tracing(log_level: LogLevel, color: bool) {
    if let Some(level) = log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_ansi(color)
            .without_time()
            .compact()
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LogLevel::Debug, Some(tracing::Level::DEBUG))]
    #[case(LogLevel::Warn, Some(tracing::Level::WARN))]
    #[case(LogLevel::Silent, None)]
    fn test_to_tracing_level(#[case] level: LogLevel, #[case] expected: Option<tracing::Level>) {
        assert_eq!(level.to_tracing_level(), expected);
    }

    #[rstest]
    #[case(false, false, LogLevel::Warn)]
    #[case(true, false, LogLevel::Debug)]
    #[case(false, true, LogLevel::Error)]
    #[case(true, true, LogLevel::Debug)]
    fn test_adjusted(#[case] verbose: bool, #[case] quiet: bool, #[case] expected: LogLevel) {
        assert_eq!(LogLevel::Warn.adjusted(verbose, quiet), expected);
    }
}
