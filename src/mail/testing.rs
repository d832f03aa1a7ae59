//! In-memory `NotificationSender` for tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{NotificationSender, TemplateVariables};
use crate::error::DeliveryError;
use crate::models::Participant;

#[derive(Debug, Clone)]
pub struct SentMail {
    pub template_id: String,
    pub from: Participant,
    pub to: Participant,
    pub variables: TemplateVariables,
}

/// Records every attempt; addresses in `failing` are rejected by the "provider".
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentMail>>,
    failing: HashSet<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(emails: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: emails.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.to.email).collect()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(
        &self,
        template_id: &str,
        from: &Participant,
        to: &Participant,
        variables: &TemplateVariables,
    ) -> Result<u16, DeliveryError> {
        self.sent.lock().unwrap().push(SentMail {
            template_id: template_id.to_string(),
            from: from.clone(),
            to: to.clone(),
            variables: variables.clone(),
        });

        if self.failing.contains(&to.email) {
            return Err(DeliveryError::Rejected {
                status: 400,
                body: "rejected".to_string(),
            });
        }

        Ok(202)
    }
}
