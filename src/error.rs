use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Structural problems with an invite request
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingRequiredField,

    #[error("At least one recipient is required")]
    MissingRecipients,

    #[error("All recipients must have name and email")]
    InvalidRecipient,
}

impl ValidationError {
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField => "missing-required-field",
            ValidationError::MissingRecipients => "missing-recipients",
            ValidationError::InvalidRecipient => "invalid-recipient",
        }
    }
}

/// Failure of a single delivery attempt. Never reaches the HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("missing-template-id: SENDGRID_TEMPLATE_ID not set")]
    MissingTemplateId,

    #[error("Mail send failed: {0}")]
    Transport(String),

    #[error("Provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl DeliveryError {
    /// Configuration defects as opposed to provider/transport failures
    pub fn is_configuration(&self) -> bool {
        matches!(self, DeliveryError::MissingTemplateId)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Bad-request class is reported as plain text
        let (status, detail) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        (status, detail).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
