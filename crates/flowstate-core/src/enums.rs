//! Enum types for the flowstate system.
//!
//! Each enum is closed: unknown strings are rejected rather than carried
//! along in a catch-all variant. Each enum has:
//! - Custom Serialize (as snake_case string)
//! - Custom Deserialize (known variants only)
//! - `as_str()`, `ALL`, `FromStr` and `Display`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

// ---------------------------------------------------------------------------
// Macro: defines a closed enum with string variants.
//
// Variants are declared in ascending order; the derived `Ord` follows that
// declaration order.
// ---------------------------------------------------------------------------
macro_rules! define_closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:expr, default = $default:ident,
        variants: [
            $( $(#[$vmeta:meta])* ($variant:ident, $str:literal) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in ascending order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Returns the string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $str => Ok(Self::$variant), )+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                        expected: [$( $str ),+].join(", "),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ===========================================================================
// StepStatus
// ===========================================================================

define_closed_enum! {
    /// Evaluated status of a step within one run.
    ///
    /// The ordering is the conflict precedence: `Done > Ready > Blocked`.
    /// When several records disagree about the same (run, step), the
    /// greatest one wins.
    StepStatus, kind = "step status", default = Blocked,
    variants: [
        /// At least one dependency is not done yet.
        (Blocked, "blocked"),
        /// Every dependency is done; work may start.
        (Ready, "ready"),
        /// Completed, either by a job/human or by available input.
        (Done, "done"),
    ]
}

impl StepStatus {
    /// Returns `true` for `Done`.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns `true` for `Ready`.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Combines two conflicting observations using the precedence rule.
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

// ===========================================================================
// JobStatus
// ===========================================================================

define_closed_enum! {
    /// Lifecycle of a job record held by a dispatcher outbox.
    JobStatus, kind = "job status", default = Queued,
    variants: [
        (Queued, "queued"),
        (Finished, "finished"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn step_status_default_is_blocked() {
        assert_eq!(StepStatus::default(), StepStatus::Blocked);
        assert!(StepStatus::Blocked.is_default());
        assert!(!StepStatus::Done.is_default());
    }

    #[test]
    fn step_status_precedence() {
        assert!(StepStatus::Done > StepStatus::Ready);
        assert!(StepStatus::Ready > StepStatus::Blocked);
        assert_eq!(StepStatus::Blocked.merge(StepStatus::Done), StepStatus::Done);
        assert_eq!(StepStatus::Ready.merge(StepStatus::Blocked), StepStatus::Ready);
    }

    #[test]
    fn step_status_serde() {
        let json = serde_json::to_string(&StepStatus::Ready).unwrap();
        assert_eq!(json, r#""ready""#);
        let back: StepStatus = serde_json::from_str(r#""done""#).unwrap();
        assert_eq!(back, StepStatus::Done);
    }

    #[test]
    fn step_status_rejects_unknown() {
        let err = serde_json::from_str::<StepStatus>(r#""in_progress""#).unwrap_err();
        assert!(err.to_string().contains("unknown step status 'in_progress'"));

        let err = "Done".parse::<StepStatus>().unwrap_err();
        assert_eq!(err.value, "Done");
        assert_eq!(err.expected, "blocked, ready, done");
    }

    #[test]
    fn all_is_in_ascending_order() {
        assert_eq!(
            StepStatus::ALL,
            &[StepStatus::Blocked, StepStatus::Ready, StepStatus::Done]
        );
    }

    #[test]
    fn job_status_as_str() {
        assert_eq!(JobStatus::default(), JobStatus::Queued);
        assert_eq!(JobStatus::Finished.as_str(), "finished");
        assert_eq!("queued".parse::<JobStatus>().unwrap(), JobStatus::Queued);
    }
}
