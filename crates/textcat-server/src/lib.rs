//! textcat Server
//!
//! HTTP front end for training and scoring textcat classifiers.
//!
//! - `POST /train` trains a model and returns its identifier
//! - `POST /score` scores samples with a stored model
//! - `GET /models`, `GET /health`, `GET /metrics`

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
