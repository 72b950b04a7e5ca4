//! A text-completion serving node with interchangeable LLM backends.
//!
//! The node receives a prompt over HTTP, forwards it to the configured
//! remote backend, validates that the backend produced a complete answer,
//! and optionally reshapes the raw answer to external length/style
//! constraints before returning it.
//!
//! # Architecture
//!
//! - [`providers`]: the [`providers::CompletionBackend`] contract and one
//!   adapter per backend vendor, selected at construction time
//! - [`shaping`]: the response shaping pipeline (subject extraction, style
//!   and phrase selection, exact-length normalization)
//! - [`service`]: [`service::CompletionService`], the unit the HTTP
//!   boundary invokes
//! - [`server`]: the axum routes
//! - [`settings`] / [`error`]: env-sourced per-backend configuration and
//!   the typed error taxonomy
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use polymath::providers::OpenRouterBackend;
//! use polymath::settings::OpenRouterSettings;
//! use polymath::service::CompletionService;
//!
//! # async fn run() -> Result<(), polymath::error::CompletionError> {
//! let backend = OpenRouterBackend::new(OpenRouterSettings::from_env()?)?;
//! let service = Arc::new(CompletionService::new(Arc::new(backend)));
//! let app = polymath::server::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod providers;
pub mod server;
pub mod service;
pub mod settings;
pub mod shaping;

pub use error::CompletionError;
pub use providers::{AnthropicBackend, CompletionBackend, OpenAiBackend, OpenRouterBackend};
pub use service::CompletionService;
pub use shaping::{ResponseShaper, ShapingCriteria};
