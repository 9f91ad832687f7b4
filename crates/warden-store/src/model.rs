//! The persisted application document
//!
//! Field names are part of the on-disk compatibility contract: the document
//! is serialized with camelCase keys and must keep them stable across
//! versions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_util::RuleId;

/// Default polling interval in seconds
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 5;

/// An enforcement rule: process pattern, daily budget, warning lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,

    /// Bare process name (case-insensitive, extension-agnostic) or full
    /// executable path (case-insensitive, exact).
    pub process_name_or_path: String,

    /// Label shown to the user; defaults to the pattern's file stem.
    pub display_name: String,

    /// Daily budget in minutes, > 0.
    pub daily_limit_minutes: u32,

    /// Minutes before exhaustion at which the warning fires, >= 0.
    pub warning_minutes_before: u32,

    /// Disabled rules are skipped entirely by the enforcement cycle.
    pub is_enabled: bool,
}

impl Rule {
    pub fn new(
        pattern: impl Into<String>,
        daily_limit_minutes: u32,
        warning_minutes_before: u32,
    ) -> Self {
        let pattern = pattern.into();
        let display_name = default_display_name(&pattern);

        Self {
            id: RuleId::new(),
            process_name_or_path: pattern,
            display_name,
            daily_limit_minutes,
            warning_minutes_before,
            is_enabled: true,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn limit_seconds(&self) -> u64 {
        self.daily_limit_minutes as u64 * 60
    }

    /// Warning threshold in seconds. Evaluated as written: a warning lead
    /// larger than the daily limit yields a negative threshold, which makes
    /// the warning fire on the first observed cycle.
    pub fn warning_threshold_seconds(&self) -> i64 {
        (self.daily_limit_minutes as i64 - self.warning_minutes_before as i64) * 60
    }
}

/// File stem of a pattern, e.g. `/usr/games/frotz.exe` -> `frotz`.
pub fn default_display_name(pattern: &str) -> String {
    Path::new(pattern)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| pattern.to_string())
}

/// Accumulated usage for one rule on one calendar day.
///
/// At most one record exists per (rule, date); a fresh record is created
/// lazily on the first reference after midnight, so yesterday's record is
/// never mutated by rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub rule_id: RuleId,
    pub date: NaiveDate,
    pub used_seconds_today: u64,
    pub warning_shown: bool,
}

impl UsageRecord {
    pub fn new(rule_id: RuleId, date: NaiveDate) -> Self {
        Self {
            rule_id,
            date,
            used_seconds_today: 0,
            warning_shown: false,
        }
    }
}

/// Daemon settings. Read-only to the core while the scheduler is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub start_with_windows: bool,
    pub start_minimized: bool,
    pub polling_interval_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_with_windows: false,
            start_minimized: false,
            polling_interval_seconds: DEFAULT_POLLING_INTERVAL_SECS,
        }
    }
}

/// The full persisted document: rules, usage ledger, settings.
///
/// There is exactly one authoritative in-memory copy per running instance,
/// owned by the monitor engine behind its lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    pub rules: Vec<Rule>,
    pub usage_records: Vec<UsageRecord>,
    pub settings: Settings,
}

impl AppData {
    pub fn rule(&self, id: &RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| &r.id == id)
    }

    pub fn rule_mut(&mut self, id: &RuleId) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| &r.id == id)
    }

    pub fn usage_for(&self, id: &RuleId, date: NaiveDate) -> Option<&UsageRecord> {
        self.usage_records
            .iter()
            .find(|u| &u.rule_id == id && u.date == date)
    }

    /// Today's record for a rule, created zeroed if absent for this date.
    pub fn get_or_create_usage(&mut self, id: &RuleId, date: NaiveDate) -> &mut UsageRecord {
        let idx = match self
            .usage_records
            .iter()
            .position(|u| &u.rule_id == id && u.date == date)
        {
            Some(idx) => idx,
            None => {
                self.usage_records.push(UsageRecord::new(id.clone(), date));
                self.usage_records.len() - 1
            }
        };
        &mut self.usage_records[idx]
    }

    /// Remove a rule and all of its usage records.
    pub fn remove_rule(&mut self, id: &RuleId) -> Option<Rule> {
        let idx = self.rules.iter().position(|r| &r.id == id)?;
        let rule = self.rules.remove(idx);
        self.usage_records.retain(|u| u.rule_id != rule.id);
        Some(rule)
    }

    /// Drop usage records strictly older than the retention window.
    /// Returns the number of records removed.
    pub fn purge_usage_older_than(&mut self, today: NaiveDate, days: i64) -> usize {
        let before = self.usage_records.len();
        self.usage_records
            .retain(|u| today.signed_duration_since(u.date).num_days() <= days);
        before - self.usage_records.len()
    }
}
