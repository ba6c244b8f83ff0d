//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment variables or config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to the logger, probes and HTTP glue
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the log level can change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, from_lookup, load_config, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, GitHubConfig, HealthConfig, LoggingConfig, ObservabilityConfig, SecurityConfig,
    ServerConfig,
};
pub use validation::{validate_config, ValidationError};
