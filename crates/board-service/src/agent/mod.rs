//! Persona agent
//!
//! The persona is a regular user with a reserved id. Everything that makes
//! it act on its own lives here: mention detection, prompt construction,
//! the generation client and the controller that polls for work.

pub mod controller;
pub mod generator;
pub mod mention;
pub mod prompt;

pub use controller::{AgentController, PollReport};
pub use generator::{GeminiGenerator, GenerationError, GenerationRequest, ReplyGenerator};
pub use mention::MentionMatcher;
