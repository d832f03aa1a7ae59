//! "Add to calendar" deep links for Google Calendar and Outlook.
//!
//! Query values are form-urlencoded and emitted in ascending key order so the
//! same invite always produces byte-identical links. The `- Message: ` suffix
//! is kept even when the message is empty; existing consumers rely on it.

use url::form_urlencoded;

use crate::models::{CalendarLinks, InviteRequest};

const GOOGLE_BASE_URL: &str = "https://calendar.google.com/calendar/render";
const OUTLOOK_BASE_URL: &str = "https://outlook.live.com/calendar/0/deeplink/compose";

/// Compute both provider links for an invite
pub fn calendar_links(req: &InviteRequest) -> CalendarLinks {
    CalendarLinks {
        google: google_link(req),
        outlook: outlook_link(req),
    }
}

pub fn google_link(req: &InviteRequest) -> String {
    let details = format!(
        "Meeting Link: {} - Message: {}",
        req.meeting_link, req.message
    );

    build_url(
        GOOGLE_BASE_URL,
        &[
            ("action", "TEMPLATE"),
            ("details", details.as_str()),
            ("location", req.meeting_link.as_str()),
            ("text", req.title.as_str()),
        ],
    )
}

pub fn outlook_link(req: &InviteRequest) -> String {
    let body = format!(
        "Date & Time: {} - Meeting Link: {} - Message: {}",
        req.date_time, req.meeting_link, req.message
    );

    build_url(
        OUTLOOK_BASE_URL,
        &[
            ("body", body.as_str()),
            ("location", req.meeting_link.as_str()),
            ("path", "/calendar/action/compose"),
            ("rru", "addevent"),
            ("subject", req.title.as_str()),
        ],
    )
}

fn build_url(base: &str, params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{}?{}", base, query)
}
