//! Core data types shared by the tool server, the correlator and the popup

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Title shown when the popup is launched without one
pub const DEFAULT_TITLE: &str = "Notification";

/// Message shown when the popup is launched without one
pub const DEFAULT_MESSAGE: &str = "Task completed!";

/// Stand-in text reported when the user submitted a blank answer
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "(empty response)";

/// Result text for an explicit or implicit dismissal
pub const DISMISSED_TEXT: &str = "User dismissed the notification without answering.";

/// Arguments of one `ring` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Window title (e.g., "Task Complete")
    pub title: String,

    /// Body text shown under the title
    pub message: String,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// The single decision recorded by the popup in the handoff artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// True when the user submitted an answer
    #[serde(default)]
    pub answered: bool,

    /// Submitted text, empty unless `answered` (`null` reads as empty)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,

    /// Why the popup terminated abnormally, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecisionRecord {
    /// User submitted `response` (already trimmed by the popup)
    pub fn answered(response: impl Into<String>) -> Self {
        Self {
            answered: true,
            response: response.into(),
            error: None,
        }
    }

    /// User closed the popup without answering
    pub fn dismissed() -> Self {
        Self::default()
    }

    /// Popup failed before the user decided
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            answered: false,
            response: String::new(),
            error: Some(error.into()),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// What the correlator found at the handoff path once the popup exited
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// A well-formed decision record
    Recorded(DecisionRecord),

    /// Nothing was written (crash or external kill)
    Missing,

    /// Something was written but could not be parsed
    Unreadable(String),
}

/// Typed result of a `ring` call, rendered into the tool's text result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingOutcome {
    /// User submitted text, possibly empty
    Answered(String),

    /// User dismissed, or the popup ended without recording anything
    Dismissed,

    /// The popup closed but its record could not be read
    Unreadable(String),
}

impl From<ArtifactOutcome> for RingOutcome {
    fn from(outcome: ArtifactOutcome) -> Self {
        match outcome {
            ArtifactOutcome::Recorded(record) if record.answered => {
                RingOutcome::Answered(record.response)
            }
            ArtifactOutcome::Recorded(_) | ArtifactOutcome::Missing => RingOutcome::Dismissed,
            ArtifactOutcome::Unreadable(reason) => RingOutcome::Unreadable(reason),
        }
    }
}

impl fmt::Display for RingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingOutcome::Answered(text) if text.is_empty() => {
                write!(f, "User answered: {}", EMPTY_RESPONSE_PLACEHOLDER)
            }
            RingOutcome::Answered(text) => write!(f, "User answered: {}", text),
            RingOutcome::Dismissed => f.write_str(DISMISSED_TEXT),
            RingOutcome::Unreadable(reason) => {
                write!(f, "Notification closed. Could not read response: {}", reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_wire_format() {
        let json = serde_json::to_string(&DecisionRecord::answered("ship it")).unwrap();
        assert_eq!(json, r#"{"answered":true,"response":"ship it"}"#);

        let json = serde_json::to_string(&DecisionRecord::failed("no display")).unwrap();
        assert_eq!(
            json,
            r#"{"answered":false,"response":"","error":"no display"}"#
        );
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let record: DecisionRecord = serde_json::from_str(r#"{"answered":true}"#).unwrap();
        assert_eq!(record, DecisionRecord::answered(""));

        let record: DecisionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, DecisionRecord::dismissed());
    }

    #[test]
    fn test_null_response_is_empty_answer() {
        let record: DecisionRecord =
            serde_json::from_str(r#"{"answered":true,"response":null}"#).unwrap();
        assert_eq!(record, DecisionRecord::answered(""));

        let outcome = RingOutcome::from(ArtifactOutcome::Recorded(record));
        assert_eq!(outcome.to_string(), "User answered: (empty response)");
    }

    #[test]
    fn test_failed_record_maps_to_dismissal() {
        let outcome = RingOutcome::from(ArtifactOutcome::Recorded(DecisionRecord::failed("boom")));
        assert_eq!(outcome, RingOutcome::Dismissed);
        assert_eq!(outcome.to_string(), DISMISSED_TEXT);
    }

    #[test]
    fn test_missing_maps_to_dismissal() {
        assert_eq!(
            RingOutcome::from(ArtifactOutcome::Missing),
            RingOutcome::Dismissed
        );
    }

    #[test]
    fn test_empty_answer_uses_placeholder() {
        let outcome = RingOutcome::from(ArtifactOutcome::Recorded(DecisionRecord::answered("")));
        assert_eq!(outcome.to_string(), "User answered: (empty response)");
    }

    #[test]
    fn test_unreadable_text() {
        let outcome = RingOutcome::from(ArtifactOutcome::Unreadable("EOF while parsing".into()));
        assert_eq!(
            outcome.to_string(),
            "Notification closed. Could not read response: EOF while parsing"
        );
    }

    proptest! {
        #[test]
        fn prop_answer_text_is_reported_verbatim(text in "\\PC+") {
            let outcome = RingOutcome::from(ArtifactOutcome::Recorded(DecisionRecord::answered(text.clone())));
            prop_assert_eq!(outcome.to_string(), format!("User answered: {}", text));
        }

        #[test]
        fn prop_dismissal_ignores_stale_response(text in "\\PC*", error in proptest::option::of("\\PC*")) {
            let record = DecisionRecord { answered: false, response: text, error };
            let outcome = RingOutcome::from(ArtifactOutcome::Recorded(record));
            prop_assert_eq!(outcome.to_string(), DISMISSED_TEXT);
        }
    }
}
