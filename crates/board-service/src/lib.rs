//! # board-service
//!
//! Application layer containing business logic, services, DTOs and the
//! persona agent.

pub mod agent;
pub mod dto;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{AgentController, GeminiGenerator, ReplyGenerator};
pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
