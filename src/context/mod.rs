//! Instruction files assembled into the host's system prompt.

mod system_prompt;

pub use system_prompt::{PromptSection, SystemPromptLoader};
