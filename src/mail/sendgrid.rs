use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{NotificationSender, TemplateVariables};
use crate::config::Config;
use crate::error::DeliveryError;
use crate::models::Participant;

/// SendGrid v3 mail-send client using dynamic templates
#[derive(Clone)]
pub struct SendGridMailer {
    client: Client,
    api_key: String,
    api_url: String,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

impl<'a> From<&'a Participant> for Address<'a> {
    fn from(p: &'a Participant) -> Self {
        Self {
            email: &p.email,
            name: &p.name,
        }
    }
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    dynamic_template_data: &'a TemplateVariables,
}

#[derive(Serialize)]
struct Payload<'a> {
    from: Address<'a>,
    template_id: &'a str,
    personalizations: Vec<Personalization<'a>>,
}

impl SendGridMailer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.sendgrid_api_key.clone(),
            api_url: config.sendgrid_api_url.clone(),
        }
    }
}

fn build_payload<'a>(
    template_id: &'a str,
    from: &'a Participant,
    to: &'a Participant,
    variables: &'a TemplateVariables,
) -> Payload<'a> {
    Payload {
        from: from.into(),
        template_id,
        personalizations: vec![Personalization {
            to: vec![to.into()],
            dynamic_template_data: variables,
        }],
    }
}

#[async_trait]
impl NotificationSender for SendGridMailer {
    async fn send(
        &self,
        template_id: &str,
        from: &Participant,
        to: &Participant,
        variables: &TemplateVariables,
    ) -> Result<u16, DeliveryError> {
        let payload = build_payload(template_id, from, to, variables);

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(status.as_u16())
    }
}
