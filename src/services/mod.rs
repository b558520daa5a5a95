pub mod allocation;
pub mod generation_service;
pub mod prompt_builder;
pub mod quiz_schema;

pub use allocation::RoundingPolicy;
pub use generation_service::{
    GeminiService, GenerationRequest, GenerationService, SamplingConfig,
};
