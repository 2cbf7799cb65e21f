// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification email delivery.
//!
//! Validated submissions are rendered into an HTML notification and handed
//! to a [`Mailer`]. The production mailer posts JSON to the mail relay's
//! HTTP API, authenticating with the configured account.

use crate::config::MailCredentials;
use async_trait::async_trait;
use chrono::Utc;
use forms_common::ValidatedForm;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Mail delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A message ready to hand to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

impl OutboundEmail {
    /// Render a notification for a validated submission. Field values are
    /// already HTML-escaped, so they are embedded as-is.
    pub fn notification(form: &ValidatedForm, from: &str, to: &str) -> Self {
        let mut html = format!("<h2>New {}</h2>\n", form.title());

        for field in form.fields() {
            if field.value.is_empty() {
                continue;
            }
            let value = field.value.as_str().replace('\n', "<br>");
            html.push_str(&format!(
                "<p><strong>{}:</strong> {}</p>\n",
                field.rule.label, value
            ));
        }

        if let Some(file) = form.attachment() {
            html.push_str(&format!(
                "<p><strong>Resume:</strong> {} ({}, {} bytes)</p>\n",
                file.file_name, file.content_type, file.size
            ));
        }

        html.push_str(&format!(
            "<p><em>Submitted at {}</em></p>",
            Utc::now().to_rfc3339()
        ));

        Self {
            from: from.to_string(),
            to: to.to_string(),
            reply_to: form
                .get("email")
                .filter(|v| !v.is_empty())
                .map(|v| v.as_str().to_string()),
            subject: form.subject(),
            html,
        }
    }
}

/// Something that can deliver an [`OutboundEmail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Mailer that posts to a mail relay HTTP API with basic auth.
pub struct HttpMailer {
    api_url: String,
    credentials: MailCredentials,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(api_url: String, credentials: MailCredentials) -> Self {
        Self {
            api_url,
            credentials,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %email.to, subject = %email.subject, "Notification accepted by relay");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
