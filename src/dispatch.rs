//! Invitation dispatch: validate, build calendar links once, then notify every
//! recipient followed by the sender.
//!
//! Delivery is best effort. Individual failures are logged and never change
//! the outcome returned to the caller once validation has passed.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::calendar::calendar_links;
use crate::config::Config;
use crate::error::{DeliveryError, Result};
use crate::mail::{NotificationSender, TemplateVariables};
use crate::models::{CalendarLinks, DeliveryOutcome, InviteRequest, InviteResponse, Participant};
use crate::validation::validate_invite;

pub struct InviteDispatcher {
    sender: Arc<dyn NotificationSender>,
    template_id: Option<String>,
    from: Participant,
    concurrency: usize,
}

impl InviteDispatcher {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        template_id: Option<String>,
        from: Participant,
    ) -> Self {
        Self {
            sender,
            template_id,
            from,
            concurrency: 1,
        }
    }

    pub fn from_config(sender: Arc<dyn NotificationSender>, config: &Config) -> Self {
        Self::new(sender, config.template_id.clone(), config.mail_from())
            .with_concurrency(config.send_concurrency)
    }

    /// Number of sends kept in flight at once. `1` sends strictly in order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Validate and dispatch an invite.
    ///
    /// Only validation failures are returned as errors; delivery failures are
    /// absorbed.
    pub async fn handle_invite(&self, req: &InviteRequest) -> Result<InviteResponse> {
        if let Err(err) = validate_invite(req) {
            tracing::warn!(reason = err.reason(), "Rejected invite request");
            return Err(err.into());
        }

        let outcomes = self.dispatch(req).await;

        let failed = outcomes.iter().filter(|o| !o.success()).count();
        tracing::info!(
            title = %req.title,
            attempted = outcomes.len(),
            succeeded = outcomes.len() - failed,
            failed,
            "Invite dispatched"
        );

        Ok(InviteResponse::accepted())
    }

    /// Attempt one delivery per participant, recipients first and the sender
    /// last. Assumes `req` has already been validated.
    pub async fn dispatch(&self, req: &InviteRequest) -> Vec<DeliveryOutcome> {
        let links = calendar_links(req);
        let links = &links;
        let sender_index = req.recipients.len();
        let participants: Vec<(usize, Participant)> =
            req.participants().cloned().enumerate().collect();

        stream::iter(participants)
            .map(|(idx, participant)| async move {
                let role = if idx == sender_index {
                    "sender"
                } else {
                    "recipient"
                };
                self.deliver(req, links, &participant, role).await
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn deliver(
        &self,
        req: &InviteRequest,
        links: &CalendarLinks,
        participant: &Participant,
        role: &'static str,
    ) -> DeliveryOutcome {
        let Some(template_id) = self.template_id.as_deref() else {
            let err = DeliveryError::MissingTemplateId;
            tracing::error!(email = %participant.email, role, error = %err, "Failed to send invite");
            return DeliveryOutcome::failed(participant.clone(), err);
        };

        let variables = template_variables(req, links, participant);
        tracing::debug!(
            email = %participant.email,
            template_id,
            ?variables,
            "Sending invite"
        );

        match self
            .sender
            .send(template_id, &self.from, participant, &variables)
            .await
        {
            Ok(status) => {
                tracing::info!(email = %participant.email, role, status, "Invite sent");
                DeliveryOutcome::delivered(participant.clone(), status)
            }
            Err(err) => {
                tracing::warn!(email = %participant.email, role, error = %err, "Failed to send invite");
                DeliveryOutcome::failed(participant.clone(), err)
            }
        }
    }
}

/// Dynamic template data for one participant. `message` is only present when
/// the invite carries one.
pub fn template_variables(
    req: &InviteRequest,
    links: &CalendarLinks,
    participant: &Participant,
) -> TemplateVariables {
    let mut vars = TemplateVariables::new();
    vars.insert("recipient_name".into(), participant.name.clone());
    vars.insert("sender_name".into(), req.sender.name.clone());
    vars.insert("title".into(), req.title.clone());
    vars.insert("datetime".into(), req.date_time.clone());
    vars.insert("meeting_link".into(), req.meeting_link.clone());
    vars.insert("google_calendar_link".into(), links.google.clone());
    vars.insert("outlook_calendar_link".into(), links.outlook.clone());

    if !req.message.is_empty() {
        vars.insert("message".into(), req.message.clone());
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ValidationError};
    use crate::mail::testing::RecordingSender;
    use pretty_assertions::assert_eq;

    fn sample_request() -> InviteRequest {
        InviteRequest {
            sender: Participant::new("Alice", "a@x.com"),
            recipients: vec![Participant::new("Bob", "b@x.com")],
            title: "Sync".to_string(),
            date_time: "2024-01-01T10:00".to_string(),
            meeting_link: "https://meet.example/abc".to_string(),
            message: String::new(),
        }
    }

    fn dispatcher(sender: Arc<RecordingSender>) -> InviteDispatcher {
        InviteDispatcher::new(
            sender,
            Some("d-template".to_string()),
            Participant::new("MeetZen", "invite@meetzen.me"),
        )
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_handle_invite_future_is_send() {
        let dispatcher = dispatcher(Arc::new(RecordingSender::new()));
        let req = sample_request();
        let fut = dispatcher.handle_invite(&req);
        assert_send(&fut);
    }

    #[tokio::test]
    async fn test_dispatch_runs_on_spawned_task() {
        let fake = Arc::new(RecordingSender::new());
        let dispatcher = dispatcher(fake.clone());
        let req = sample_request();

        let handle = tokio::spawn(async move { dispatcher.dispatch(&req).await });
        let outcomes = handle.await.expect("Task should complete");

        assert_eq!(outcomes.len(), 2);
        assert_eq!(fake.recipients(), vec!["b@x.com", "a@x.com"]);
    }

    #[tokio::test]
    async fn test_sends_to_recipients_then_sender() {
        let fake = Arc::new(RecordingSender::new());
        let mut req = sample_request();
        req.recipients.push(Participant::new("Carol", "c@x.com"));

        let response = dispatcher(fake.clone())
            .handle_invite(&req)
            .await
            .expect("Should accept");

        assert_eq!(response, InviteResponse::accepted());
        assert_eq!(fake.recipients(), vec!["b@x.com", "c@x.com", "a@x.com"]);

        let sent = fake.sent();
        assert!(sent.iter().all(|m| m.template_id == "d-template"));
        assert!(sent.iter().all(|m| m.from.email == "invite@meetzen.me"));
    }

    #[tokio::test]
    async fn test_example_invite() {
        let fake = Arc::new(RecordingSender::new());
        let req = sample_request();

        dispatcher(fake.clone())
            .handle_invite(&req)
            .await
            .expect("Should accept");

        let sent = fake.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to.name, "Bob");
        assert_eq!(sent[1].to.name, "Alice");

        let google = &sent[0].variables["google_calendar_link"];
        assert!(google.contains("text=Sync"));
        assert!(google.contains("location=https%3A%2F%2Fmeet.example%2Fabc"));
    }

    #[tokio::test]
    async fn test_invalid_request_sends_nothing() {
        let fake = Arc::new(RecordingSender::new());
        let mut req = sample_request();
        req.recipients.clear();

        let result = dispatcher(fake.clone()).handle_invite(&req).await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::MissingRecipients))
        ));
        assert!(fake.sent().is_empty());
    }

    #[tokio::test]
    async fn test_partial_invalid_recipients_sends_nothing() {
        let fake = Arc::new(RecordingSender::new());
        let mut req = sample_request();
        req.recipients.push(Participant::new("", "c@x.com"));

        let result = dispatcher(fake.clone()).handle_invite(&req).await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::InvalidRecipient))
        ));
        assert!(fake.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_sends() {
        let fake = Arc::new(RecordingSender::failing_for(&["b@x.com"]));
        let mut req = sample_request();
        req.recipients.push(Participant::new("Carol", "c@x.com"));
        let dispatcher = dispatcher(fake.clone());

        let outcomes = dispatcher.dispatch(&req).await;
        let successes: Vec<bool> = outcomes.iter().map(|o| o.success()).collect();
        assert_eq!(successes, vec![false, true, true]);
        assert_eq!(outcomes[0].status, Some(400));

        let response = dispatcher.handle_invite(&req).await.expect("Should accept");
        assert_eq!(response.message, "Invites sent successfully");
        assert_eq!(fake.sent().len(), 6);
    }

    #[tokio::test]
    async fn test_missing_template_id_fails_every_attempt_without_sending() {
        let fake = Arc::new(RecordingSender::new());
        let dispatcher = InviteDispatcher::new(
            fake.clone(),
            None,
            Participant::new("MeetZen", "invite@meetzen.me"),
        );
        let req = sample_request();

        let outcomes = dispatcher.dispatch(&req).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| o.error == Some(DeliveryError::MissingTemplateId)));
        assert!(fake.sent().is_empty());

        assert!(dispatcher.handle_invite(&req).await.is_ok());
    }

    #[tokio::test]
    async fn test_attempt_count_with_concurrency() {
        let fake = Arc::new(RecordingSender::new());
        let mut req = sample_request();
        for i in 0..5 {
            req.recipients
                .push(Participant::new(format!("R{}", i), format!("r{}@x.com", i)));
        }

        let outcomes = dispatcher(fake.clone())
            .with_concurrency(4)
            .dispatch(&req)
            .await;

        assert_eq!(outcomes.len(), req.recipients.len() + 1);
        assert_eq!(fake.sent().len(), req.recipients.len() + 1);
        // Outcomes come back in participant order regardless of concurrency
        assert_eq!(outcomes.last().map(|o| o.participant.email.as_str()), Some("a@x.com"));
    }

    #[test]
    fn test_variables_without_message() {
        let req = sample_request();
        let links = calendar_links(&req);
        let vars = template_variables(&req, &links, &req.recipients[0]);

        let keys: Vec<&str> = vars.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "datetime",
                "google_calendar_link",
                "meeting_link",
                "outlook_calendar_link",
                "recipient_name",
                "sender_name",
                "title",
            ]
        );
        assert_eq!(vars["recipient_name"], "Bob");
        assert_eq!(vars["sender_name"], "Alice");
        assert_eq!(vars["outlook_calendar_link"], links.outlook);
    }

    #[test]
    fn test_variables_with_message() {
        let mut req = sample_request();
        req.message = "  Bring notes  ".to_string();
        let links = calendar_links(&req);
        let vars = template_variables(&req, &links, &req.sender);

        assert_eq!(vars.get("message").map(String::as_str), Some("  Bring notes  "));
        assert_eq!(vars["recipient_name"], "Alice");
    }

    #[tokio::test]
    async fn test_message_key_absent_in_sent_payload() {
        let fake = Arc::new(RecordingSender::new());
        dispatcher(fake.clone())
            .handle_invite(&sample_request())
            .await
            .expect("Should accept");

        assert!(fake
            .sent()
            .iter()
            .all(|m| !m.variables.contains_key("message")));
    }
}
