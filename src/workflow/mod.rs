//! Leave approval rules.
//!
//! Everything in here is a pure function over already-loaded data. Handlers
//! fetch the current row, ask these functions what should happen, and write
//! the answer back themselves.

use chrono::NaiveDate;
use derive_more::Display;

use crate::model::role::Role;
use crate::model::status::LeaveStatus;

pub mod balance;
pub mod day_count;
pub mod statistics;
pub mod transition;

pub use transition::Action;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[display(fmt = "cannot {} a leave request in status {}", action, status)]
    NotPermitted { action: Action, status: LeaveStatus },

    #[display(fmt = "role {} may not {} leave requests", role, action)]
    ForbiddenRole { role: Role, action: Action },

    #[display(fmt = "only the requester may cancel a leave request")]
    NotOwner,

    #[display(fmt = "the immediate supervisor has not approved this request yet")]
    SupervisorPending,

    #[display(fmt = "only the designated immediate supervisor may verify this request")]
    NotSupervisor,

    #[display(fmt = "the immediate supervisor has already decided on this request")]
    AlreadyDecided,

    #[display(fmt = "nobody may decide on their own leave request")]
    SelfDecision,

    #[display(fmt = "end date {} is before start date {}", end, start)]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl std::error::Error for WorkflowError {}
