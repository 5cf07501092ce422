mod input;
mod prompt;

pub use prompt::{Prompt, PromptResult};
