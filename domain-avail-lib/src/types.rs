//! Core data types for the availability pipeline.
//!
//! This module defines the input, request and response shapes passed between
//! the pipeline operations, plus the run configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Candidate names for one TLD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldNames {
    /// TLD without a leading dot (e.g., "in.th")
    pub tld: String,

    /// Base names without the TLD (e.g., "example")
    pub names: Vec<String>,
}

impl TldNames {
    pub fn new<T: Into<String>>(tld: T, names: Vec<String>) -> Self {
        Self {
            tld: tld.into(),
            names,
        }
    }
}

/// One registrar API call covering a chunk of names under a single TLD.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRequest {
    pub tld: String,
    pub names: Vec<String>,
    pub url: reqwest::Url,
}

/// Top-level status field of a registrar response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Warn,
    Error,
    #[serde(other)]
    Unknown,
}

/// Availability of a single domain as reported by the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Registered,
    Available,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAvailability {
    pub status: AvailabilityStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponseData {
    /// Fully qualified domain -> availability
    #[serde(default)]
    pub availability: BTreeMap<String, DomainAvailability>,
}

/// Body of `GET /api/domains/available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ApiStatus,

    #[serde(default)]
    pub data: ApiResponseData,

    /// Body text as received, empty when not decoded from the wire
    #[serde(skip)]
    pub raw: String,
}

impl ApiResponse {
    /// Domains reported as available, in name order.
    pub fn available_domains(&self) -> Vec<String> {
        self.data
            .availability
            .iter()
            .filter(|(_, a)| a.status == AvailabilityStatus::Available)
            .map(|(domain, _)| domain.clone())
            .collect()
    }
}

/// The file that receives the available domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
}

/// Registrar API settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Scheme and host of the registrar service
    pub base_url: String,

    /// Value of the `preset` query parameter
    pub preset: String,

    /// Include aftermarket listings in the answer
    pub enable_aftermarket: bool,

    /// Timeout for each HTTP request
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://services.pathosting.co.th".to_string(),
            preset: "pat".to_string(),
            enable_aftermarket: false,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration for one availability run.
///
/// Built from defaults, then config files, environment variables and CLI
/// flags, in increasing precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// TLD applied to names given on the command line
    /// Default: "in.th"
    pub default_tld: String,

    /// YAML file mapping TLDs to names, read when no names were given
    /// Default: res/input-all.yaml
    pub input_file: PathBuf,

    /// Directory for generated output files
    /// Default: res
    pub output_dir: PathBuf,

    /// Explicit output path, overriding the generated one
    pub output_file: Option<PathBuf>,

    /// Names per registrar request
    /// Default: 5, Range: 1-100
    pub chunk_size: usize,

    /// Retry budget of each registrar request
    /// Default: 8
    pub fetch_retry: u32,

    pub api: ApiConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            default_tld: "in.th".to_string(),
            input_file: PathBuf::from("res/input-all.yaml"),
            output_dir: PathBuf::from("res"),
            output_file: None,
            chunk_size: 5,
            fetch_retry: 8,
            api: ApiConfig::default(),
        }
    }
}

impl RunConfig {
    /// Set the names per request, clamped to 1-100.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, 100);
        self
    }

    pub fn with_fetch_retry(mut self, retry: u32) -> Self {
        self.fetch_retry = retry;
        self
    }

    pub fn with_default_tld<T: Into<String>>(mut self, tld: T) -> Self {
        self.default_tld = tld.into();
        self
    }

    pub fn with_input_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_file = path.into();
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_output_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub domains_checked: usize,
    pub requests: usize,
    pub available: Vec<String>,
    pub output: PathBuf,
    pub bytes_written: usize,
}
