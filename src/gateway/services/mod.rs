//! Gateway services.

mod fallback;

pub use fallback::{ModelGateway, ProviderError};
