//! Alert decision for a section's status transition.
//!
//! ```text
//!  prev \ curr  | CLOSED | WAITLISTED        | OPEN
//!  -------------+--------+-------------------+------------
//!  (unset)      | none   | none              | notify open
//!  CLOSED       | none   | notify waitlisted | notify open
//!  WAITLISTED   | none   | none              | notify open
//!  OPEN         | none   | none              | none
//! ```
//!
//! A first observation only alerts when the section is already open, so a
//! large batch of newly discovered sections doesn't flood the channel.
//! Downgrades (open to waitlisted) and closings never alert.

use crate::models::Status;

/// What to send for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    None,
    NotifyOpen,
    NotifyWaitlisted,
}

/// Decide the alert for a transition from `prev` to `curr`.
pub fn decide(prev: Option<Status>, curr: Status) -> AlertAction {
    let Some(prev) = prev else {
        return match curr {
            Status::Open => AlertAction::NotifyOpen,
            _ => AlertAction::None,
        };
    };

    if prev == curr {
        return AlertAction::None;
    }

    match curr {
        Status::Open => AlertAction::NotifyOpen,
        Status::Waitlisted if prev == Status::Closed => AlertAction::NotifyWaitlisted,
        Status::Waitlisted | Status::Closed => AlertAction::None,
    }
}
