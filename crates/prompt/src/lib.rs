//! Prompt system for askdocs.
//!
//! - YAML system prompt definitions
//! - Handlebars rendering with the current date and ISO week
//! - The grounded `[Question] ... [Context] ...` user turn

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{user_message, PromptBuilder};
pub use loader::load_prompt;
pub use types::{PromptDefinition, WeekWindow};
