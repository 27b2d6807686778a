use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use serde_json::json;
use std::process::{ExitCode, Termination};

use application::error::BookError;
use kernel::KernelError;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<BookError>);

impl From<Report<BookError>> for ErrorStatus {
    fn from(e: Report<BookError>) -> Self {
        ErrorStatus(e)
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let context = self.0.current_context();
        let status = match context {
            BookError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookError::Duplicate(_) | BookError::Conflict(_) => StatusCode::CONFLICT,
            BookError::NotFound => StatusCode::NOT_FOUND,
            BookError::Store => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Rejections are expected outcomes; only store failures are errors.
        let body = match context {
            BookError::Store => {
                tracing::error!("store failure: {:?}", self.0);
                json!({ "message": context.to_string() })
            }
            BookError::Validation(violations) => json!({
                "message": context.to_string(),
                "violations": violations,
            }),
            _ => json!({ "message": context.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
