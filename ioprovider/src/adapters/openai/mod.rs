mod auth;
mod provider;
mod serde_api;
mod tests;
mod transport;
mod types;

pub use provider::{OPENAI_SUPPORTED_MODELS, OpenAiProvider, OpenAiSupportedModel, supported_model};
pub use transport::{OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport};
pub use types::{
    OpenAiAuth, OpenAiInputItem, OpenAiInputPart, OpenAiReasoningEffort, OpenAiRequest,
    OpenAiResponse, OpenAiRole,
};
