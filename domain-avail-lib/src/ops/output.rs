//! Actions that prepare and fill the output file.

use crate::error::DomainAvailError;
use crate::outcome::Outcome;
use crate::progress::{Action, Progress, Settings};
use crate::types::OutputTarget;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamped output path inside `dir`: `output-<unix millis>.txt`.
pub fn default_output_path(dir: &Path) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    dir.join(format!("output-{}.txt", millis))
}

/// Create an empty output file, replacing any file already at the path.
pub struct OpenOutputFile {
    path: PathBuf,
}

impl OpenOutputFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Action for OpenOutputFile {
    type Value = OutputTarget;

    fn name(&self) -> String {
        "open_output_file".to_string()
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(0)
    }

    fn stop_message(&self, value: &Self::Value) -> Option<String> {
        Some(format!("Opened {}", value.path.display()))
    }

    async fn run(&self, _progress: &mut Progress) -> Result<Outcome<Self::Value>> {
        let display = self.path.display().to_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainAvailError::file_error(&display, format!("Cannot create output directory: {}", e))
            })?;
        }
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            tokio::fs::remove_file(&self.path).await.map_err(|e| {
                DomainAvailError::file_error(&display, format!("Cannot remove old output file: {}", e))
            })?;
        }
        tokio::fs::File::create(&self.path).await.map_err(|e| {
            DomainAvailError::file_error(&display, format!("Cannot create output file: {}", e))
        })?;

        Ok(Outcome::Success(OutputTarget {
            path: self.path.clone(),
        }))
    }
}

/// Write one domain per line to the opened output file.
pub struct WriteOutputFile<'a> {
    target: &'a OutputTarget,
    domains: &'a [String],
}

impl<'a> WriteOutputFile<'a> {
    pub fn new(target: &'a OutputTarget, domains: &'a [String]) -> Self {
        Self { target, domains }
    }
}

#[async_trait]
impl<'a> Action for WriteOutputFile<'a> {
    /// Bytes written
    type Value = usize;

    fn name(&self) -> String {
        "write_output_file".to_string()
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(0)
    }

    fn start_message(&self) -> Option<String> {
        Some(format!("Writing... {}", self.target.path.display()))
    }

    fn stop_message(&self, value: &Self::Value) -> Option<String> {
        Some(format!("Written {} bytes to output", value))
    }

    async fn run(&self, _progress: &mut Progress) -> Result<Outcome<Self::Value>> {
        let content: String = self
            .domains
            .iter()
            .map(|domain| format!("{}\n", domain))
            .collect();

        tokio::fs::write(&self.target.path, content.as_bytes())
            .await
            .map_err(|e| {
                DomainAvailError::file_error(
                    self.target.path.display().to_string(),
                    format!("Cannot write output file: {}", e),
                )
            })?;

        Ok(Outcome::Success(content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryReporter;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("res"));
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(path.starts_with("res"));
        assert!(file_name.starts_with("output-"));
        assert!(file_name.ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_open_replaces_existing_file_then_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale\n").unwrap();

        let mut progress = Progress::new(MemoryReporter::new());
        let target = progress
            .run_action(&OpenOutputFile::new(&path))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        let domains = vec!["shop.in.th".to_string(), "cafe.in.th".to_string()];
        let written = progress
            .run_action(&WriteOutputFile::new(&target, &domains))
            .await
            .unwrap();

        assert_eq!(written, Some(22));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "shop.in.th\ncafe.in.th\n"
        );
    }
}
