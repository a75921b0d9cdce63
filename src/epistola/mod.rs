pub mod client;
pub mod error;
pub mod types;

pub use client::{EpistolaClient, JobStatusSource};
pub use error::EpistolaError;
pub use types::{GenerationJobDetail, GenerationJobStatus};
