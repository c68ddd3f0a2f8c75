mod config;
mod error;
mod routes;

pub use config::{BotApiConfig, Launcher};
pub use error::BotApiError;
pub use routes::router;
