pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::{AppConfig, BootstrapConfig, LoggingConfig, ServerConfig, load_config};
pub use error::{ApiError, ApiResult};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{MedschedServer, ServerBuilder, build_app};
pub use state::AppState;
