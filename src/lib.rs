// Library root
// -----------
// Client library for the BHIV prompt-to-JSON backend plus the terminal
// demo screen built on it. The binary (`main.rs`) wires the two together.
//
// Module responsibilities:
// - `api`: blocking HTTP client for login, refresh, generate, switch and
//   preview.
// - `models`: request bodies and typed response shapes.
// - `session`: the session token value and its on-disk mirror.
// - `config`: base URL / API key resolution from file and environment.
// - `error`: the error type every client operation returns.
// - `ui`: the interactive demo menu that calls into `api`.
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod ui;

pub use api::{ApiClient, Login};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use session::{Session, TokenStore};
