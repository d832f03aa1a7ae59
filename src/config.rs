use std::env;
use std::path::Path;

use crate::models::Participant;

const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Loaded in order; variables already set are never overwritten.
const ENV_FILES: [&str; 2] = ["sendgrid.env", ".env"];

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub sendgrid_api_key: String,
    pub sendgrid_api_url: String,
    pub template_id: Option<String>,
    pub mail_from_name: String,
    pub mail_from_email: String,
    pub send_concurrency: usize,
}

impl Config {
    /// Load configuration from `sendgrid.env`, `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_files(Path::new("."));

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            sendgrid_api_key: env::var("SENDGRID_API_KEY").unwrap_or_default(),
            sendgrid_api_url: env::var("SENDGRID_API_URL")
                .unwrap_or_else(|_| DEFAULT_SENDGRID_API_URL.to_string()),
            template_id: non_empty(env::var("SENDGRID_TEMPLATE_ID").ok()),
            mail_from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "MeetZen".to_string()),
            mail_from_email: env::var("MAIL_FROM_EMAIL")
                .unwrap_or_else(|_| "invite@meetzen.me".to_string()),
            send_concurrency: env::var("INVITE_SEND_CONCURRENCY")
                .unwrap_or_else(|_| "1".to_string())
                .parse::<usize>()
                .unwrap_or(1)
                .max(1),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Fixed identity every invitation is sent from
    pub fn mail_from(&self) -> Participant {
        Participant::new(&self.mail_from_name, &self.mail_from_email)
    }
}

/// Load `sendgrid.env` then `.env` from `dir`, ignoring missing files.
pub fn load_env_files(dir: &Path) {
    for name in ENV_FILES {
        dotenvy::from_path(dir.join(name)).ok();
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
}
