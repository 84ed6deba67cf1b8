//! Fallback generator implementations

mod openai;
mod unavailable;

pub use openai::{OpenAiGenerator, DEFAULT_CHAT_MODEL};
pub use unavailable::UnavailableGenerator;
