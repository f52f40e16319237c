use serde::{Deserialize, Serialize};

/// Requested change of a boolean window state
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Action {
    /// Turn the state on
    Add,
    /// Turn the state off
    Remove,
    /// Flip the current state
    Toggle,
}

impl Action {
    /// Evaluate the [`Action`] against the current value, returning whether
    /// the state should end up set
    pub(crate) const fn should_add(self, current: bool) -> bool {
        match self {
            Self::Add => true,
            Self::Remove => false,
            Self::Toggle => !current,
        }
    }
}
