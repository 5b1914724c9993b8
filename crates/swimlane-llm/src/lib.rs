pub mod error;
pub mod gemini;
pub mod mock;
pub mod provider;

pub use error::ProviderError;
pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::MockProvider;
pub use provider::{Document, GenerativeProvider};
