//! LLM provider layer for the document Q&A backend.
//!
//! Two logical profiles are managed by [`service_profiles::LlmServiceProfiles`]:
//! a **chat** profile (answer generation) and an **embedding** profile
//! (vectorizing chunks and queries). Either may be absent; callers decide how
//! to degrade when a profile is not configured.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
