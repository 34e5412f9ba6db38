//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BenchConfig (validated)
//!     → CLI overrides applied in main, validated again
//!     → Harness::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a run starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BenchConfig, MemoryConfig, ObservabilityConfig, ReportConfig, SelectionConfig, SimulatorConfig};
pub use validation::{validate_config, ValidationError};
