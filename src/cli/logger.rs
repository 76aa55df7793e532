// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Colored stderr logger for the command line

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes records at or above its level to stderr
pub struct StderrLogger {
    level: LevelFilter,
}

static DEBUG_LOGGER: StderrLogger = StderrLogger {
    level: LevelFilter::Debug,
};
static DEFAULT_LOGGER: StderrLogger = StderrLogger {
    level: LevelFilter::Warn,
};

/// Install the logger; `verbose` enables debug output
pub fn init_logger(verbose: bool) -> Result<(), SetLoggerError> {
    let logger = if verbose { &DEBUG_LOGGER } else { &DEFAULT_LOGGER };
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}

impl StderrLogger {
    fn tag(level: Level) -> ColoredString {
        match level {
            Level::Error => "error".red().bold(),
            Level::Warn => "warn".yellow().bold(),
            Level::Info => "info".green(),
            Level::Debug => "debug".bright_blue(),
            Level::Trace => "trace".bright_black(),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "{} {} {}",
            Self::tag(record.level()),
            record.target().bright_black(),
            record.args()
        );
    }

    fn flush(&self) {}
}
