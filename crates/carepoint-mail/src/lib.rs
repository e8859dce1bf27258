//! Transactional email relay over the SendGrid v3 API.

pub mod client;
pub mod error;
pub mod types;

pub use client::SendGridClient;
pub use error::MailError;
pub use types::{strip_data_url_prefix, Attachment, EmailMessage, EmailRequest, MailReceipt};
