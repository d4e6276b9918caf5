//! Answer generation: query expansion, reflection and content agents

pub mod composer;
pub mod content;
pub mod expander;
pub mod pipeline;
pub mod prompt;
pub mod reflection;

pub use composer::{AnswerComposer, Composition, NO_CONTEXT_ANSWER};
pub use content::ContentGenerator;
pub use expander::QueryExpander;
pub use pipeline::RagPipeline;
pub use prompt::PromptBuilder;
pub use reflection::ReflectionPolicy;
