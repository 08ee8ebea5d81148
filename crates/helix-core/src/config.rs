//! Scheduler configuration
//!
//! Defaults cover the common case; hosts can overlay environment variables
//! with [`SchedulerConfig::from_env`]:
//!
//! - `HELIX_INFINITE_PLAY`: `1`/`true` turns infinite play on for fresh states
//! - `HELIX_THREAD_PREFIXES`: comma-separated prefixes for thread-id recovery

use crate::tube::DEFAULT_SKIP_NUMBER;

/// Default prefixes recognized when recovering a tube number from a thread id
pub const DEFAULT_THREAD_PREFIXES: [&str; 3] = ["thread-T", "tube-", "t-"];

/// Configuration for the resilient scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Infinite play mode for states that do not carry the flag yet
    pub infinite_play_default: bool,
    /// Known thread-id prefixes, tried in order
    pub thread_prefixes: Vec<String>,
    /// Prefix for synthesized placeholder content ids
    pub placeholder_prefix: String,
    /// Skip number of synthesized and seeded entries
    pub default_skip_number: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            infinite_play_default: false,
            thread_prefixes: DEFAULT_THREAD_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            placeholder_prefix: "placeholder".to_string(),
            default_skip_number: DEFAULT_SKIP_NUMBER,
        }
    }
}

impl SchedulerConfig {
    /// Defaults overlaid with `HELIX_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("HELIX_INFINITE_PLAY") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.infinite_play_default = true,
                "0" | "false" | "no" | "off" => self.infinite_play_default = false,
                other => tracing::warn!("Ignoring HELIX_INFINITE_PLAY={}", other),
            }
        }

        if let Some(raw) = lookup("HELIX_THREAD_PREFIXES") {
            let prefixes: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if !prefixes.is_empty() {
                self.thread_prefixes = prefixes;
            }
        }

        self
    }

    /// Deterministic placeholder content id for an empty tube
    pub fn placeholder_content_id(&self, tube: u8) -> String {
        format!("{}-tube-{}", self.placeholder_prefix, tube)
    }
}
