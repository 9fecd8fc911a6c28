//! Where and how statistics are written.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;

struct StatisticOptions {
    /// Statistics are printed as `{prefix} {name}={value}`.
    prefix: &'static str,
    /// Printed by [`log_statistic_postfix`] after a block of statistics.
    after_statistics: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

impl Debug for StatisticOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOptions")
            .field("prefix", &self.prefix)
            .field("after_statistics", &self.after_statistics)
            .field("casing", &self.casing)
            .field("writer", &"<Writer>")
            .finish()
    }
}

static STATISTIC_OPTIONS: OnceLock<RwLock<StatisticOptions>> = OnceLock::new();

/// Turns on statistic logging.
///
/// Only the first call has an effect. Without a writer the statistics go to stdout.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        RwLock::from(StatisticOptions {
            prefix,
            after_statistics: after,
            casing,
            writer: writer.unwrap_or(Box::new(stdout())),
        })
    });
}

/// Logs a statistic as `PREFIX NAME=VALUE` if statistic logging is configured.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(options_lock) = STATISTIC_OPTIONS.get() {
        if let Ok(mut options) = options_lock.write() {
            let name = match options.casing {
                Some(casing) => name.to_string().to_case(casing),
                None => name.to_string(),
            };
            let prefix = options.prefix;
            let _ = writeln!(options.writer, "{prefix} {name}={value}");
        }
    }
}

/// Logs the closing line of a block of statistics, if one was configured.
pub fn log_statistic_postfix() {
    if let Some(options_lock) = STATISTIC_OPTIONS.get() {
        if let Ok(mut options) = options_lock.write() {
            if let Some(postfix) = options.after_statistics {
                let _ = writeln!(options.writer, "{postfix}");
            }
        }
    }
}

pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
