use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`Missive`](crate::Missive).
///
/// Transitions are advisory rather than enforced: the dispatcher only ever
/// moves a missive forward (`Draft`/`Pending` → `Sent` or `Failed`), and
/// webhook-driven updates arrive out of band. [`Self::can_transition_to`]
/// exists for callers that want a monotonicity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Draft,
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
    Cancelled,
}

impl DeliveryStatus {
    /// States that are considered final.
    pub const TERMINAL: [Self; 4] = [Self::Delivered, Self::Read, Self::Failed, Self::Cancelled];

    /// Checks whether this status is a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// Advisory check that a transition moves the lifecycle forward.
    ///
    /// Terminal states accept no further transitions; non-terminal states may
    /// always fail or be cancelled, and otherwise only advance.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }

        matches!(next, Self::Failed | Self::Cancelled) || next.rank() > self.rank()
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Pending => 1,
            Self::Sent => 2,
            Self::Delivered => 3,
            Self::Read => 4,
            Self::Failed | Self::Cancelled => 5,
        }
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Delivered => "DELIVERED",
            Self::Read => "READ",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        write!(fmt, "{name}")
    }
}
