//! Prompt construction for the four pipeline roles.
//!
//! System messages are fixed per role ([`personas`]); user messages are
//! rendered from templates that always state whether document text is
//! available ([`builder`]).

pub mod builder;
pub mod personas;

pub use builder::{
    DOCUMENT_UNAVAILABLE_MARKER, PromptBuilder, PromptError, PromptMessages, render_template,
};
pub use personas::system_prompt;
