use std::fmt;
use std::str::FromStr;

use gigfind_types::models::ApplicationStatus;

/// How an owner may move an application between review states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any status may be set at any time, including back to `pending`.
    #[default]
    Reversible,
    /// `pending` moves once; `accepted`/`rejected` are final. Re-setting the
    /// current status is a no-op.
    OneShot,
}

impl StatusPolicy {
    pub fn allows(&self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        match self {
            Self::Reversible => true,
            Self::OneShot => !from.is_terminal() || from == to,
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reversible => f.write_str("reversible"),
            Self::OneShot => f.write_str("one-shot"),
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reversible" => Ok(Self::Reversible),
            "one-shot" | "oneshot" | "one_shot" => Ok(Self::OneShot),
            other => Err(format!(
                "unknown application status policy '{}' (expected 'reversible' or 'one-shot')",
                other
            )),
        }
    }
}
