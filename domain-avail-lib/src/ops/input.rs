//! Actions that collect candidate names.

use crate::error::DomainAvailError;
use crate::outcome::Outcome;
use crate::progress::{Action, Progress, Settings};
use crate::types::TldNames;
use crate::utils::normalize_names;
use crate::Result;
use async_trait::async_trait;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Names given on the command line, all under one TLD.
///
/// Ends with a warning (not a failure) when there are none, so the run can
/// fall back to the input file.
pub struct ReadInputParam {
    names: Vec<String>,
    tld: String,
}

impl ReadInputParam {
    pub fn new<T: Into<String>>(names: Vec<String>, tld: T) -> Self {
        Self {
            names,
            tld: tld.into(),
        }
    }
}

#[async_trait]
impl Action for ReadInputParam {
    type Value = Vec<TldNames>;

    fn name(&self) -> String {
        "read_input_param".to_string()
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(0)
    }

    fn stop_message(&self, value: &Self::Value) -> Option<String> {
        let count = value.first().map(|entry| entry.names.len()).unwrap_or(0);
        Some(format!("Read {} domain(s)", count))
    }

    async fn run(&self, _progress: &mut Progress) -> Result<Outcome<Self::Value>> {
        let names = normalize_names(&self.names, &self.tld);
        if names.is_empty() {
            return Ok(Outcome::Warning(DomainAvailError::no_input(
                "No input data were found",
            )));
        }
        Ok(Outcome::Success(vec![TldNames::new(self.tld.clone(), names)]))
    }
}

/// YAML file mapping each TLD to its candidate names.
///
/// ```yaml
/// in.th:
///   - shop
///   - cafe
/// co.th:
///   - shop
/// ```
///
/// Skipped when names were already supplied some other way.
pub struct ReadInputFile<'a> {
    path: PathBuf,
    input: Option<&'a [TldNames]>,
}

impl<'a> ReadInputFile<'a> {
    pub fn new<P: Into<PathBuf>>(path: P, input: Option<&'a [TldNames]>) -> Self {
        Self {
            path: path.into(),
            input,
        }
    }
}

#[async_trait]
impl<'a> Action for ReadInputFile<'a> {
    type Value = Vec<TldNames>;

    fn name(&self) -> String {
        "read_input_file".to_string()
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(0)
    }

    fn start_message(&self) -> Option<String> {
        Some(format!("Reading... {}", self.path.display()))
    }

    fn stop_message(&self, value: &Self::Value) -> Option<String> {
        let total: usize = value.iter().map(|entry| entry.names.len()).sum();
        Some(format!(
            "Read {} tld(s) with total {} domain(s)",
            value.len(),
            total
        ))
    }

    fn need_skip(&self) -> bool {
        self.input.map_or(false, |input| !input.is_empty())
    }

    async fn run(&self, _progress: &mut Progress) -> Result<Outcome<Self::Value>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainAvailError::file_error(
                self.path.display().to_string(),
                format!("Cannot read input file: {}", e),
            )
        })?;
        let entries = parse_input_yaml(&content, &self.path)?;
        Ok(Outcome::Success(entries))
    }
}

/// Parse the input document, keeping the file's TLD order.
///
/// An empty document yields no entries. A TLD with no value yields an entry
/// without names.
pub fn parse_input_yaml(content: &str, path: &Path) -> Result<Vec<TldNames>> {
    let document: Value = serde_yaml::from_str(content)?;
    let mapping = match document {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(DomainAvailError::file_error(
                path.display().to_string(),
                "Input file must map each TLD to a list of names",
            ))
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let tld = scalar_to_string(&key).ok_or_else(|| {
            DomainAvailError::file_error(path.display().to_string(), "TLD keys must be strings")
        })?;
        let raw: Vec<String> = match value {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        DomainAvailError::file_error(
                            path.display().to_string(),
                            format!("Names under '{}' must be plain strings", tld),
                        )
                    })
                })
                .collect::<Result<_>>()?,
            other => vec![scalar_to_string(&other).ok_or_else(|| {
                DomainAvailError::file_error(
                    path.display().to_string(),
                    format!("Names under '{}' must be a list", tld),
                )
            })?],
        };
        let names = normalize_names(&raw, &tld);
        entries.push(TldNames::new(tld, names));
    }

    Ok(entries)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Event, MemoryReporter};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_input_yaml_keeps_order() {
        let content = "co.th:\n  - Shop\n  - 1234\nin.th:\n  - cafe\nac.th:\n";
        let entries = parse_input_yaml(content, Path::new("input.yaml")).unwrap();
        assert_eq!(
            entries,
            vec![
                TldNames::new("co.th", vec!["shop".to_string(), "1234".to_string()]),
                TldNames::new("in.th", vec!["cafe".to_string()]),
                TldNames::new("ac.th", vec![]),
            ]
        );
    }

    #[test]
    fn test_parse_input_yaml_rejects_lists() {
        let err = parse_input_yaml("- shop\n- cafe\n", Path::new("input.yaml")).unwrap_err();
        assert!(matches!(err, DomainAvailError::FileError { .. }));
        assert!(parse_input_yaml("", Path::new("input.yaml")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_input_param_warns_when_empty() {
        let reporter = MemoryReporter::new();
        let mut progress = Progress::new(reporter.clone());

        let value = progress
            .run_action(&ReadInputParam::new(vec![], "in.th"))
            .await
            .unwrap();

        assert!(value.is_none());
        assert!(reporter.events().iter().any(|e| matches!(
            e,
            Event::ActionStopped { conclusion: crate::Conclusion::Warning(m), .. }
                if m == "No input data were found"
        )));
    }

    #[tokio::test]
    async fn test_read_input_file_skipped_when_names_given() {
        let reporter = MemoryReporter::new();
        let mut progress = Progress::new(reporter.clone());
        let input = vec![TldNames::new("in.th", vec!["shop".to_string()])];

        let value = progress
            .run_action(&ReadInputFile::new("does/not/exist.yaml", Some(input.as_slice())))
            .await
            .unwrap();

        assert!(value.is_none());
        assert_eq!(
            reporter.count(|e| matches!(e, Event::ActionSkipped { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_read_input_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"in.th:\n  - shop\n  - cafe\n").unwrap();
        file.flush().unwrap();

        let mut progress = Progress::new(MemoryReporter::new());
        let value = progress
            .run_action(&ReadInputFile::new(file.path(), None))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(value.len(), 1);
        assert_eq!(value[0].names, vec!["shop", "cafe"]);
    }

    #[tokio::test]
    async fn test_missing_input_file_fails_run() {
        let mut progress = Progress::new(MemoryReporter::new());
        let err = progress
            .run_action(&ReadInputFile::new("does/not/exist.yaml", None))
            .await
            .unwrap_err();

        assert!(err.message().contains("Cannot read input file"));
    }
}
