// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up by [`BooleanConfig::load`] from the working directory
pub const CONFIG_FILE: &str = "polyframe-boolean.toml";

/// Options controlling Boolean operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanConfig {
    /// Merge bit-identical input vertices before anything else
    pub weld_vertices: bool,
    /// Reject Boolean operands that are not closed
    pub require_closed_inputs: bool,
    /// Check resolution and output invariants after each phase
    pub verify: bool,
    /// Ray directions tried per patch before giving up
    pub max_ray_attempts: usize,
    /// Log predicate counters after each operation
    pub log_stats: bool,
}

impl Default for BooleanConfig {
    fn default() -> Self {
        Self {
            weld_vertices: true,
            require_closed_inputs: true,
            verify: true,
            max_ray_attempts: 16,
            log_stats: false,
        }
    }
}

impl BooleanConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: BooleanConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `polyframe-boolean.toml` when present, then apply
    /// `POLYFRAME_BOOLEAN_*` environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    /// Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |name: &str| lookup(name).and_then(|v| parse_flag(&v));

        if let Some(weld) = flag("POLYFRAME_BOOLEAN_WELD_VERTICES") {
            self.weld_vertices = weld;
        }
        if let Some(closed) = flag("POLYFRAME_BOOLEAN_REQUIRE_CLOSED") {
            self.require_closed_inputs = closed;
        }
        if let Some(verify) = flag("POLYFRAME_BOOLEAN_VERIFY") {
            self.verify = verify;
        }
        if let Some(attempts) = lookup("POLYFRAME_BOOLEAN_MAX_RAY_ATTEMPTS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.max_ray_attempts = attempts;
        }
        if let Some(stats) = flag("POLYFRAME_BOOLEAN_LOG_STATS") {
            self.log_stats = stats;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
