pub mod sendgrid;
#[cfg(test)]
pub mod testing;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::models::Participant;

pub use sendgrid::SendGridMailer;

/// Dynamic template data, keyed by template variable name
pub type TemplateVariables = BTreeMap<String, String>;

/// Templated transactional email delivery.
///
/// One call is one delivery attempt. Returns the provider's 2xx status code;
/// anything else is a `DeliveryError`.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        template_id: &str,
        from: &Participant,
        to: &Participant,
        variables: &TemplateVariables,
    ) -> Result<u16, DeliveryError>;
}
