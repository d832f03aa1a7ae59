pub mod invite;

pub use invite::{CalendarLinks, DeliveryOutcome, InviteRequest, InviteResponse, Participant};
