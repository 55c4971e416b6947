use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::workflow::WorkflowError;

/// Error returned by handlers. Renders as `{"message": ...}`.
#[derive(Debug, Display)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        let message = e.to_string();
        match e {
            WorkflowError::ForbiddenRole { .. }
            | WorkflowError::NotOwner
            | WorkflowError::NotSupervisor
            | WorkflowError::SelfDecision => ApiError::Forbidden(message),
            WorkflowError::NotPermitted { .. }
            | WorkflowError::SupervisorPending
            | WorkflowError::AlreadyDecided => ApiError::Conflict(message),
            WorkflowError::InvalidDateRange { .. } => ApiError::BadRequest(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::model::status::LeaveStatus;
    use crate::workflow::Action;

    #[test]
    fn workflow_errors_map_to_statuses() {
        let cases = [
            (
                WorkflowError::ForbiddenRole {
                    role: Role::Pegawai,
                    action: Action::Approve,
                },
                StatusCode::FORBIDDEN,
            ),
            (WorkflowError::NotOwner, StatusCode::FORBIDDEN),
            (
                WorkflowError::NotPermitted {
                    action: Action::Cancel,
                    status: LeaveStatus::Proses,
                },
                StatusCode::CONFLICT,
            ),
            (WorkflowError::SupervisorPending, StatusCode::CONFLICT),
            (WorkflowError::NotSupervisor, StatusCode::FORBIDDEN),
            (WorkflowError::SelfDecision, StatusCode::FORBIDDEN),
            (WorkflowError::AlreadyDecided, StatusCode::CONFLICT),
            (
                WorkflowError::InvalidDateRange {
                    start: "2024-01-05".parse().unwrap(),
                    end: "2024-01-01".parse().unwrap(),
                },
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn message_is_carried_into_body_text() {
        let err = ApiError::from(WorkflowError::NotPermitted {
            action: Action::Approve,
            status: LeaveStatus::Terima,
        });
        assert_eq!(err.to_string(), "cannot approve a leave request in status Terima");
    }
}
