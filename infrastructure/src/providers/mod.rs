//! Text-generation provider adapters.

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiGateway};
