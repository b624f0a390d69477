//! # Domain Avail Library
//!
//! Checks candidate names for availability against a registrar's HTTP API,
//! running every operation through a retrying execution engine that reports
//! progress as it goes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_avail_lib::{run_pipeline, Progress, RunConfig, TracingReporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut progress = Progress::new(TracingReporter);
//!     let config = RunConfig::default().with_output_file("available.txt");
//!
//!     progress.begin();
//!     let summary = run_pipeline(&mut progress, &config, vec!["shop".into()]).await?;
//!     progress.end();
//!
//!     println!("{} available", summary.available.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Building blocks
//!
//! - [`Progress`]: the engine; runs [`Action`]s and, inside them, [`Step`]s
//! - [`Outcome`]: success, warning or error result of an action
//! - [`Reporter`]: receives every lifecycle [`Event`]
//! - [`ops`]: the pipeline's concrete operations

// Re-export main public API types and functions
// This makes them available as domain_avail_lib::TypeName
pub use config::{
    load_env_config, parse_timeout_string, ApiFileConfig, ConfigManager, DefaultsConfig, EnvConfig,
    FileConfig,
};
pub use error::DomainAvailError;
pub use outcome::Outcome;
pub use pipeline::run_pipeline;
pub use progress::{
    backoff_delay, Action, Attempt, Conclusion, Event, MemoryReporter, NameColor, Progress,
    ProgressOptions, Reporter, Settings, Step, StepRetry, TracingReporter,
};
pub use protocols::RegistrarClient;
pub use types::{
    ApiConfig, ApiResponse, ApiStatus, AvailabilityRequest, AvailabilityStatus, OutputTarget,
    RunConfig, RunSummary, TldNames,
};

// Public modules
pub mod ops;
pub mod progress;

// Internal modules - these are not part of the public API
mod config;
mod error;
mod outcome;
mod pipeline;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainAvailError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
