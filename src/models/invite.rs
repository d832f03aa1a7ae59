use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DeliveryError;

/// A named email address, either a recipient or the sender
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default, deserialize_with = "null_as_default", alias = "Name", alias = "NAME")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default", alias = "Email", alias = "EMAIL")]
    pub email: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }
}

/// POST /api/invite body.
///
/// Missing keys and `null` values decode to empty values so that the
/// validator, not the decoder, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[serde(default, deserialize_with = "null_as_default", alias = "Sender")]
    pub sender: Participant,
    #[serde(default, deserialize_with = "null_as_default", alias = "Recipients")]
    pub recipients: Vec<Participant>,
    #[serde(default, deserialize_with = "null_as_default", alias = "Title")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "DateTime",
        alias = "datetime",
        alias = "Datetime",
        alias = "DATETIME"
    )]
    pub date_time: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "MeetingLink",
        alias = "meetinglink",
        alias = "Meetinglink",
        alias = "MEETINGLINK"
    )]
    pub meeting_link: String,
    #[serde(default, deserialize_with = "null_as_default", alias = "Message")]
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl InviteRequest {
    /// Recipients in request order, followed by the sender
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.recipients.iter().chain(std::iter::once(&self.sender))
    }
}

/// Provider "add to calendar" links, computed once per invite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarLinks {
    pub google: String,
    pub outlook: String,
}

/// Result of one delivery attempt, used for logging only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub participant: Participant,
    pub status: Option<u16>,
    pub error: Option<DeliveryError>,
}

impl DeliveryOutcome {
    pub fn delivered(participant: Participant, status: u16) -> Self {
        Self {
            participant,
            status: Some(status),
            error: None,
        }
    }

    pub fn failed(participant: Participant, error: DeliveryError) -> Self {
        let status = match &error {
            DeliveryError::Rejected { status, .. } => Some(*status),
            _ => None,
        };
        Self {
            participant,
            status,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Response returned once an invite has been accepted for dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteResponse {
    pub message: String,
}

impl InviteResponse {
    pub fn accepted() -> Self {
        Self {
            message: "Invites sent successfully".to_string(),
        }
    }
}
