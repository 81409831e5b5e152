//! `docqa-server` exposes the docqa pipeline over HTTP.
//! Documents are uploaded as text files and questions are answered from them.

pub mod config;
pub mod decode;
pub mod error;
pub mod protocol;
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, app_router, build_pipeline, run_server};
