//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod discovery;
pub mod follows;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod reactions;
pub mod topics;
pub mod users;
