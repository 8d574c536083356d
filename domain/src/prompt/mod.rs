//! Prompt construction for role positions

pub mod template;

pub use template::PromptTemplate;
