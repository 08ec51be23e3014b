//! Ripeness labels produced by the local color pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ripeness classification for a fruit photo.
///
/// The set is closed. `Unknown` is the explicit result when no threshold
/// rule matches; it is a label, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RipenessLabel {
    /// Not yet ripe.
    Green,
    /// Ready to eat.
    Ripe,
    /// Past its best.
    Overripe,
    /// No rule matched.
    #[default]
    Unknown,
}

impl RipenessLabel {
    /// All labels, in rule declaration order.
    pub const ALL: &'static [RipenessLabel] = &[
        RipenessLabel::Green,
        RipenessLabel::Ripe,
        RipenessLabel::Overripe,
        RipenessLabel::Unknown,
    ];

    /// Returns the label tag as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RipenessLabel::Green => "green",
            RipenessLabel::Ripe => "ripe",
            RipenessLabel::Overripe => "overripe",
            RipenessLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RipenessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serde() {
        assert_eq!(serde_json::to_string(&RipenessLabel::Overripe).unwrap(), "\"overripe\"");
        let label: RipenessLabel = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(label, RipenessLabel::Green);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(RipenessLabel::Ripe.to_string(), "ripe");
        assert_eq!(RipenessLabel::default().to_string(), "unknown");
    }

    #[test]
    fn test_all_in_rule_order() {
        let tags: Vec<&str> = RipenessLabel::ALL.iter().map(RipenessLabel::as_str).collect();
        assert_eq!(tags, ["green", "ripe", "overripe", "unknown"]);
    }
}
