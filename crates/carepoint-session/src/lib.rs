//! Per-request user session context backed by Firestore profile documents.
//!
//! [`SessionContext::establish`] loads `users/{uid}` under a bounded
//! [`RetryPolicy`] and returns an explicit value recording the profile, the
//! effective [`Role`] and how many attempts the lookup took.

pub mod client;
pub mod error;
pub mod profile;
pub mod retry;
pub mod role;
pub mod session;

pub use client::FirestoreClient;
pub use error::SessionError;
pub use profile::UserProfile;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use role::Role;
pub use session::{ProfileStatus, SessionContext};
