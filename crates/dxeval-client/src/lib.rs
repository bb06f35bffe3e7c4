//! Chat API client for the dxeval pipeline.
//!
//! - Session creation and message sending against the hosted bot API
//! - Bearer-token auth, separate connect/read timeouts
//! - Retry with exponential backoff on 429, 5xx and transport errors
//! - Normalization of the API's reply shapes into [`ChatReply`]
//!
//! # Quick Start
//!
//! ```no_run
//! use dxeval_client::{ChatBackend, ChatClient};
//!
//! # async fn example() -> Result<(), dxeval_client::ChatError> {
//! let client = ChatClient::from_env()?;
//! let session = client.create_session().await?;
//! let response = client.send_message(&session, "Patient Symptoms: ...").await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `DXEVAL_API_URL` | API base URL (default: `https://api.metisai.ir`) |
//! | `DXEVAL_API_KEY` | Bearer token (required) |
//! | `DXEVAL_BOT_ID` | Target bot id (required) |
//! | `DXEVAL_CONNECT_TIMEOUT` | Connect timeout in seconds (default: 10) |
//! | `DXEVAL_READ_TIMEOUT` | Read timeout in seconds (default: 120) |
//! | `DXEVAL_MAX_RETRIES` | Max retries for transient failures (default: 5) |

mod backend;
pub mod client;
pub mod error;
pub mod reply;
pub mod types;

pub use backend::ChatBackend;
pub use client::ChatClient;
pub use error::{ChatError, ChatResult};
pub use reply::{ChatMessage, ChatReply};
pub use types::{ChatResponse, ClientConfig, Credentials, SessionId};
