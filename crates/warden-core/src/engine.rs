//! Monitoring and enforcement engine

use chrono::{DateTime, Local, NaiveDate};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use warden_host::{ProcessHost, ProcessInfo};
use warden_store::{AppData, Rule, Store, UsageRecord};
use warden_util::{Result, RuleId, WardenError};

use crate::matcher::matching_processes;
use crate::validate::validate_rule;
use crate::CoreEvent;

/// Minimum wall-clock time between throttled periodic flushes
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Per-rule decisions taken under the lock, acted on outside it
struct RuleOutcome {
    rule: Rule,
    kill: bool,
    warn_remaining: Option<i64>,
    used_seconds: u64,
    limit_seconds: u64,
}

/// The monitoring and enforcement engine.
///
/// Owns the authoritative in-memory document behind a single mutex. The
/// timer-driven enforcement cycle and user-initiated rule edits both
/// serialize through that lock; process enumeration, process termination
/// and disk writes always run outside it.
pub struct MonitorEngine {
    data: Mutex<AppData>,
    store: Arc<dyn Store>,
    host: Arc<dyn ProcessHost>,
    last_flush: Mutex<Instant>,
}

impl MonitorEngine {
    pub fn new(data: AppData, store: Arc<dyn Store>, host: Arc<dyn ProcessHost>) -> Self {
        info!(
            rule_count = data.rules.len(),
            usage_records = data.usage_records.len(),
            "Monitor engine initialized"
        );

        Self {
            data: Mutex::new(data),
            store,
            host,
            last_flush: Mutex::new(Instant::now()),
        }
    }

    fn lock_data(&self) -> Result<MutexGuard<'_, AppData>> {
        self.data
            .lock()
            .map_err(|_| WardenError::internal("app data lock poisoned"))
    }

    /// Polling interval currently configured in settings.
    pub fn polling_interval(&self) -> Result<Duration> {
        Ok(Duration::from_secs(
            self.lock_data()?.settings.polling_interval_seconds,
        ))
    }

    // ---- Enforcement cycle ----

    /// Run one enforcement cycle at wall-clock time `now`.
    ///
    /// Returns the events produced this cycle, per rule in the order
    /// warning -> kill outcomes -> usage update. Errors are confined to the
    /// cycle boundary; the scheduler logs them and keeps firing.
    pub fn run_cycle(&self, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        let today = now.date_naive();

        let (rules, poll_secs) = {
            let data = self.lock_data()?;
            (data.rules.clone(), data.settings.polling_interval_seconds)
        };

        // Blocking OS enumeration, outside the lock.
        let processes = self.host.processes();

        let mut events = Vec::new();
        for rule in rules.iter().filter(|r| r.is_enabled) {
            let matched: Vec<ProcessInfo> = matching_processes(rule, &processes)
                .into_iter()
                .cloned()
                .collect();
            self.enforce_rule(&rule.id, &matched, today, poll_secs, &mut events)?;
        }

        Ok(events)
    }

    fn enforce_rule(
        &self,
        rule_id: &RuleId,
        matched: &[ProcessInfo],
        today: NaiveDate,
        poll_secs: u64,
        events: &mut Vec<CoreEvent>,
    ) -> Result<()> {
        let outcome = {
            let mut data = self.lock_data()?;

            // Re-resolve: the rule may have been edited or removed since
            // the cycle snapshot was taken.
            let Some(rule) = data.rule(rule_id).cloned() else {
                return Ok(());
            };
            if !rule.is_enabled {
                return Ok(());
            }

            let record = data.get_or_create_usage(rule_id, today);
            if matched.is_empty() {
                // No matching process: no accrual, no kill this cycle.
                return Ok(());
            }

            let limit_seconds = rule.limit_seconds();

            if record.used_seconds_today >= limit_seconds {
                // Relaunched while already over budget: kill, no accrual.
                RuleOutcome {
                    kill: true,
                    warn_remaining: None,
                    used_seconds: record.used_seconds_today,
                    limit_seconds,
                    rule,
                }
            } else {
                // Coarse accrual: a full polling interval is credited when
                // the process was observed at the sampling instant.
                record.used_seconds_today += poll_secs;
                let used = record.used_seconds_today;

                let mut warn_remaining = None;
                if used as i64 >= rule.warning_threshold_seconds() && !record.warning_shown {
                    record.warning_shown = true;
                    warn_remaining = Some((limit_seconds as i64 - used as i64).div_euclid(60));
                }

                RuleOutcome {
                    kill: used >= limit_seconds,
                    warn_remaining,
                    used_seconds: used,
                    limit_seconds,
                    rule,
                }
            }
        };

        if let Some(remaining) = outcome.warn_remaining {
            info!(
                rule_id = %rule_id,
                remaining_minutes = remaining,
                "Warning threshold reached"
            );
            events.push(CoreEvent::WarningTriggered {
                rule_id: rule_id.clone(),
                display_name: outcome.rule.display_name.clone(),
                remaining_minutes: remaining,
            });
        }

        if outcome.kill {
            for process in matched {
                // Blocking OS call, outside the lock. A failed attempt is
                // not retried this cycle; the next cycle retries while the
                // rule still matches and remains over budget.
                match self.host.terminate(process.pid) {
                    Ok(()) => {
                        info!(
                            rule_id = %rule_id,
                            pid = process.pid,
                            process = %process.name,
                            "Over budget, process terminated"
                        );
                        events.push(CoreEvent::AppKilled {
                            rule_id: rule_id.clone(),
                            display_name: outcome.rule.display_name.clone(),
                            process_name: process.name.clone(),
                        });
                    }
                    Err(e) => {
                        warn!(
                            rule_id = %rule_id,
                            pid = process.pid,
                            process = %process.name,
                            error = %e,
                            "Failed to terminate process"
                        );
                        events.push(CoreEvent::AppKillFailed {
                            rule_id: rule_id.clone(),
                            display_name: outcome.rule.display_name.clone(),
                            process_name: process.name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        events.push(CoreEvent::UsageUpdated {
            rule_id: rule_id.clone(),
            used_seconds: outcome.used_seconds,
            limit_seconds: outcome.limit_seconds,
        });

        Ok(())
    }

    // ---- Command surface (presentation layer) ----

    /// Add a new rule. Persists the document best-effort.
    pub fn add_rule(&self, rule: Rule) -> Result<Rule> {
        validate_rule(&rule)?;

        let snapshot = {
            let mut data = self.lock_data()?;
            data.rules.push(rule.clone());
            data.clone()
        };

        info!(
            rule_id = %rule.id,
            pattern = %rule.process_name_or_path,
            limit_minutes = rule.daily_limit_minutes,
            "Rule added"
        );
        self.persist(&snapshot);

        Ok(rule)
    }

    /// Replace an existing rule's definition, matched by id.
    pub fn update_rule(&self, rule: Rule) -> Result<()> {
        validate_rule(&rule)?;

        {
            let mut data = self.lock_data()?;
            let Some(existing) = data.rule_mut(&rule.id) else {
                return Err(WardenError::RuleNotFound(rule.id.clone()));
            };
            *existing = rule.clone();
        }

        debug!(rule_id = %rule.id, "Rule updated");
        Ok(())
    }

    /// Remove a rule and all of its usage records.
    pub fn remove_rule(&self, rule_id: &RuleId) -> Result<Rule> {
        let (removed, snapshot) = {
            let mut data = self.lock_data()?;
            let removed = data
                .remove_rule(rule_id)
                .ok_or_else(|| WardenError::RuleNotFound(rule_id.clone()))?;
            (removed, data.clone())
        };

        info!(rule_id = %rule_id, "Rule removed");
        self.persist(&snapshot);

        Ok(removed)
    }

    /// Enable or disable a rule.
    pub fn set_rule_enabled(&self, rule_id: &RuleId, enabled: bool) -> Result<()> {
        let snapshot = {
            let mut data = self.lock_data()?;
            let Some(rule) = data.rule_mut(rule_id) else {
                return Err(WardenError::RuleNotFound(rule_id.clone()));
            };
            rule.is_enabled = enabled;
            data.clone()
        };

        info!(rule_id = %rule_id, enabled, "Rule toggled");
        self.persist(&snapshot);

        Ok(())
    }

    /// Today's usage record for a rule, created lazily (for display).
    pub fn today_usage(&self, rule_id: &RuleId, now: DateTime<Local>) -> Result<UsageRecord> {
        let mut data = self.lock_data()?;
        if data.rule(rule_id).is_none() {
            return Err(WardenError::RuleNotFound(rule_id.clone()));
        }
        Ok(data.get_or_create_usage(rule_id, now.date_naive()).clone())
    }

    /// Current rule set.
    pub fn rules(&self) -> Result<Vec<Rule>> {
        Ok(self.lock_data()?.rules.clone())
    }

    /// Snapshot of the full document.
    pub fn snapshot(&self) -> Result<AppData> {
        Ok(self.lock_data()?.clone())
    }

    /// Explicit save request from the presentation layer.
    pub fn save_now(&self) -> Result<()> {
        let snapshot = self.snapshot()?;
        self.persist(&snapshot);
        Ok(())
    }

    /// Document snapshot for the throttled periodic flush, if one is due.
    /// At most one snapshot per [`FLUSH_INTERVAL`] of wall-clock time.
    pub fn flush_snapshot_if_due(&self) -> Result<Option<AppData>> {
        let mut last = self
            .last_flush
            .lock()
            .map_err(|_| WardenError::internal("flush clock lock poisoned"))?;

        if last.elapsed() < FLUSH_INTERVAL {
            return Ok(None);
        }
        *last = Instant::now();

        Ok(Some(self.lock_data()?.clone()))
    }

    /// Persistence failures never fail the calling operation.
    fn persist(&self, data: &AppData) {
        if let Err(e) = self.store.save(data) {
            warn!(error = %e, "Failed to persist document, keeping in-memory state");
        }
    }
}
