//! Client for the document-analysis service.
//!
//! Keep the public surface small: one client type per execution model, one
//! method per service operation. Implementation details live under `src/client/`.

pub mod builder;
pub mod config;
pub mod core;
mod wire;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use builder::LangroidClientBuilder;
pub use config::ClientConfig;
pub use core::LangroidClient;
