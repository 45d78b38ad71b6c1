//! Provider adapter implementations.

pub mod openai;
pub mod scripted;

pub use openai::{OpenAiCompatibleProvider, OpenAiProviderConfig};
pub use scripted::{ScriptedProvider, ScriptedReply};
