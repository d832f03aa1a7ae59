//! Structural checks on incoming invite requests

use crate::error::ValidationError;
use crate::models::InviteRequest;

/// Reject the request wholesale if any required field is missing.
pub fn validate_invite(req: &InviteRequest) -> Result<(), ValidationError> {
    if req.sender.name.is_empty() || req.sender.email.is_empty() {
        return Err(ValidationError::MissingRequiredField);
    }

    if req.recipients.is_empty() {
        return Err(ValidationError::MissingRecipients);
    }

    if req.title.is_empty() || req.date_time.is_empty() || req.meeting_link.is_empty() {
        return Err(ValidationError::MissingRequiredField);
    }

    if !req.recipients.iter().all(|r| r.is_complete()) {
        return Err(ValidationError::InvalidRecipient);
    }

    Ok(())
}
