//! Leveled log output on stderr, so stdout only carries the register report.

use std::io::{self, Write};

use log::{Level, Metadata, Record};

struct Logger {
    /// The maximum log level to emit.
    log_level: Level,
    use_colors: bool,
}

impl Logger {
    /// Returns the color prefix for a log level.
    fn get_color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[34m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.log_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = io::stderr().lock();
        // Nowhere left to report a failed write to stderr
        let _ = if self.use_colors {
            let color = Self::get_color(record.level());
            writeln!(
                stderr,
                "{}{:>5} {}\x1b[0m",
                color,
                record.level(),
                record.args()
            )
        } else {
            writeln!(stderr, "{:>5} {}", record.level(), record.args())
        };
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// `verbosity` is 0 for the default (warnings), negative for quieter, positive for more.
pub fn init(verbosity: i8, use_colors: bool) -> Result<(), log::SetLoggerError> {
    let log_level = match verbosity {
        ..=-1 => Level::Error,
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    log::set_logger(Box::leak(Box::new(Logger {
        log_level,
        use_colors,
    })))?;
    log::set_max_level(log_level.to_level_filter());
    Ok(())
}
