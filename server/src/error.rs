use rocket::form::error::ErrorKind;
use rocket::form::Errors;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::catch;
use serde::Serialize;
use tracing::{debug, error};

use greencart::{IngestError, IngestPolicy};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: Status,
    message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn internal() -> Self {
        Self::new(Status::InternalServerError, "Internal server error")
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Maps a failed multipart parse. A single part over the file limit is a
    /// file that is too large; otherwise a body over the form limit carries
    /// more parts than `policy` allows. Anything else means no usable files
    /// arrived.
    pub fn from_form_errors(errors: Errors<'_>, policy: &IngestPolicy) -> Self {
        let status = errors.status();
        if status == Status::PayloadTooLarge {
            let oversized_part = errors
                .iter()
                .any(|e| matches!(e.kind, ErrorKind::InvalidLength { min: None, max: Some(_) }));
            if oversized_part {
                return Self::new(status, "File too large");
            }
            debug!(%errors, "multipart body over the form limit");
            return Self::new(Status::BadRequest, format!("Too many files (max {})", policy.max_files));
        }
        if status.code >= 500 {
            error!(%errors, "failed to read multipart body");
            return Self::internal();
        }
        debug!(%errors, "unusable multipart body");
        IngestError::NoFilesProvided.into()
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        let status = match &e {
            IngestError::NoFilesProvided => Status::BadRequest,
            IngestError::TooManyFiles { .. } => Status::BadRequest,
            IngestError::UnsupportedMediaType { .. } => Status::UnsupportedMediaType,
            IngestError::PayloadTooLarge { .. } => Status::PayloadTooLarge,
            IngestError::Storage(inner) => {
                error!(error = %inner, "storage failure during upload");
                return Self::internal();
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        error!(error = %e, "failed to read uploaded file");
        Self::internal()
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(ErrorBody { error: self.message })).respond_to(req)
    }
}

#[catch(401)]
pub fn unauthorized() -> Json<ErrorBody> {
    Json(ErrorBody { error: "Invalid or expired token".to_string() })
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let message = status.reason().unwrap_or("Unknown error").to_string();
    (status, Json(ErrorBody { error: message }))
}
