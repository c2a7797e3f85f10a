//! Async client for the Chatwoot REST API.
//!
//! Every method on [`ChatwootClient`] maps to exactly one HTTP request (two for
//! [`ChatwootClient::send_image_message`], which first downloads the image). The
//! access token is supplied per call and sent as the `api_access_token` header.
//! Nothing is retried or cached.
//!
//! ```no_run
//! use chatwoot_client::ChatwootClient;
//!
//! # async fn run() -> chatwoot_client::Result<()> {
//! let client = ChatwootClient::new("https://app.chatwoot.com");
//! let reply = client.create_outgoing_message(1, 42, "bot-token", "Hello!").await?;
//! println!("sent message {}", reply.id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod utils;

pub use api::attachment::Attachment;
pub use api::client::ChatwootClient;
pub use api::models::*;
pub use config::ClientConfig;
pub use error::{Error, Result};
