//! Rule input validation

use warden_store::Rule;
use warden_util::{Result, WardenError};

/// Validate a rule before it enters the rule set.
///
/// `warning_minutes_before` larger than `daily_limit_minutes` is accepted
/// here: the threshold arithmetic is evaluated literally at enforcement
/// time, so such a rule warns on the first observed cycle with a remaining
/// value that can be zero or negative. Known input-validation gap.
pub fn validate_rule(rule: &Rule) -> Result<()> {
    if rule.process_name_or_path.trim().is_empty() {
        return Err(WardenError::validation(
            "process name or path must not be empty",
        ));
    }

    if rule.daily_limit_minutes == 0 {
        return Err(WardenError::validation(
            "daily limit must be at least one minute",
        ));
    }

    Ok(())
}
