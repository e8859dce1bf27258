//! Inbound mail requests, the validated message built from them, and the
//! SendGrid v3 payload they serialize to.

use carepoint_core::security::{escape_html, is_valid_email, sanitize_input};
use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// MIME type sent for every attachment; callers only provide base64 content.
pub const ATTACHMENT_MIME_TYPE: &str = "application/octet-stream";

/// Raw request body as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub attachment_base64: Option<String>,
    #[serde(default)]
    pub attachment_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Base64 content without any `data:` URL prefix.
    pub content: String,
    pub filename: String,
}

/// A validated outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub attachment: Option<Attachment>,
}

impl EmailMessage {
    /// Validates a request and builds the text and HTML bodies.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidMessage`] when `to`, `subject` or
    /// `message` is missing or blank, or when `to` is not an email address.
    pub fn from_request(request: &EmailRequest) -> Result<Self, MailError> {
        let subject = request.subject.as_deref().map(sanitize_input);
        let (Some(to), Some(subject), Some(message)) = (
            non_blank(request.to.as_deref()),
            non_blank(subject.as_deref()),
            non_blank(request.message.as_deref()),
        ) else {
            return Err(MailError::InvalidMessage(
                "Missing required fields".to_string(),
            ));
        };

        let to = to.trim();
        if !is_valid_email(to) {
            return Err(MailError::InvalidMessage(
                "Invalid recipient email".to_string(),
            ));
        }

        let attachment = match (
            non_blank(request.attachment_base64.as_deref()),
            non_blank(request.attachment_name.as_deref()),
        ) {
            (Some(content), Some(filename)) => Some(Attachment {
                content: strip_data_url_prefix(content).to_string(),
                filename: filename.to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            to: to.to_string(),
            subject: subject.to_string(),
            text: message.to_string(),
            html: format!("<p>{}</p>", escape_html(message)),
            attachment,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Removes a leading `data:<mime>;base64,` prefix if present.
#[must_use]
pub fn strip_data_url_prefix(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("data:") else {
        return content;
    };
    match rest.split_once(";base64,") {
        Some((mime, payload)) if !mime.is_empty() && !mime.contains(';') => payload,
        _ => content,
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    /// SendGrid's `x-message-id` response header, when present.
    pub message_id: Option<String>,
}

// ---------------------------------------------------------------------------
// SendGrid v3 wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct SendGridPayload<'a> {
    pub personalizations: [Personalization<'a>; 1],
    pub from: Address<'a>,
    pub subject: &'a str,
    pub content: [Content<'a>; 2],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SendGridAttachment<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Personalization<'a> {
    pub to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct Address<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendGridAttachment<'a> {
    pub content: &'a str,
    pub filename: &'a str,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub disposition: &'static str,
}

impl<'a> SendGridPayload<'a> {
    pub(crate) fn new(message: &'a EmailMessage, sender: &'a str) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: &message.to }],
            }],
            from: Address { email: sender },
            subject: &message.subject,
            content: [
                Content {
                    mime_type: "text/plain",
                    value: &message.text,
                },
                Content {
                    mime_type: "text/html",
                    value: &message.html,
                },
            ],
            attachments: message
                .attachment
                .iter()
                .map(|a| SendGridAttachment {
                    content: &a.content,
                    filename: &a.filename,
                    mime_type: ATTACHMENT_MIME_TYPE,
                    disposition: "attachment",
                })
                .collect(),
        }
    }
}
