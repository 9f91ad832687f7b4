//! Strongly-typed identifiers for wardend

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an enforcement rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(Uuid);

impl RuleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_uniqueness() {
        let a = RuleId::new();
        let b = RuleId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn rule_id_serializes_as_uuid_string() {
        let id = RuleId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
