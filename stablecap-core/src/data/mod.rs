//! Upstream data: source trait, DefiLlama and file-backed sources, wire parsing,
//! and the per-asset history loop.

pub mod file_source;
pub mod history;
pub mod llama;
pub mod provider;
pub mod schema;

pub use file_source::FileSource;
pub use history::{fetch_histories, HistoryBatch};
pub use llama::LlamaProvider;
pub use provider::{DataError, HistoryProgress, LogProgress, SilentProgress, StablecoinSource};
