//! The pipeline's operations, each run through [`Progress`](crate::Progress).
//!
//! Actions are listed here in the order the pipeline runs them.

mod fetch;
mod input;
mod output;
mod request;

pub use fetch::{FetchData, GetAvailability};
pub use input::{parse_input_yaml, ReadInputFile, ReadInputParam};
pub use output::{default_output_path, OpenOutputFile, WriteOutputFile};
pub use request::BuildRequest;
