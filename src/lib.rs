//! Async client for the Gini document-intelligence API.
//!
//! Upload documents, wait for their processing to finish and fetch the
//! results: extractions, layout and the processed file.
//!
//! Modules:
//!     clients: [`GiniClient`] and its document operations
//!     poller: upload-then-poll coordination with timeout and cancellation
//!     models: documents, extractions, layout and request options
//!
//! Example:
//! ```no_run
//! use std::time::Duration;
//! use rusty_gini::{ClientConfig, Credentials, GiniClient, PollOptions, Progress, UploadOptions};
//!
//! # async fn run() -> rusty_gini::Result<()> {
//! let client = GiniClient::connect(ClientConfig::new(Credentials::new("id", "secret"))).await?;
//! let options = UploadOptions::new("user-1234")
//!     .with_poll(PollOptions::default().with_timeout(Duration::from_secs(60)));
//! let doc = client.upload_file("invoice.pdf", &options).await?;
//! if doc.progress == Progress::Completed {
//!     let extractions = client.extractions(&doc, false).await?;
//!     println!("amount: {}", extractions.value_of("amountToPay"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod utils;

pub use clients::GiniClient;
pub use config::{AuthScheme, ClientConfig, Endpoints, OAuthGrant};
pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use models::*;
pub use poller::{PollError, PollOptions, PollOutcome, Pollable, poll, poll_outcome};
pub use utils::init_tracing;
