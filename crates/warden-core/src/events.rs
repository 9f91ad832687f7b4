//! Core events emitted by the enforcement cycle

use warden_util::RuleId;

/// Events emitted by the monitor engine.
///
/// Within one cycle the events for a given rule are produced in a fixed
/// order: warning first, kill outcomes next, usage update last.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Warning threshold crossed; fires at most once per rule per day.
    /// `remaining_minutes` can be zero or negative when the warning lead
    /// exceeds the daily limit.
    WarningTriggered {
        rule_id: RuleId,
        display_name: String,
        remaining_minutes: i64,
    },

    /// A matched process was terminated over budget
    AppKilled {
        rule_id: RuleId,
        display_name: String,
        process_name: String,
    },

    /// Termination was attempted and failed; the user has to close the
    /// process manually (or the next cycle retries).
    AppKillFailed {
        rule_id: RuleId,
        display_name: String,
        process_name: String,
        error: String,
    },

    /// Usage changed for a rule with at least one matched process
    UsageUpdated {
        rule_id: RuleId,
        used_seconds: u64,
        limit_seconds: u64,
    },
}
