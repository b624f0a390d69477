//! The full availability run, one action after another.

use crate::error::DomainAvailError;
use crate::ops::{
    default_output_path, BuildRequest, FetchData, OpenOutputFile, ReadInputFile, ReadInputParam,
    WriteOutputFile,
};
use crate::progress::Progress;
use crate::protocols::RegistrarClient;
use crate::types::{RunConfig, RunSummary};
use crate::Result;

/// Run every pipeline action under `progress`.
///
/// Names given in `names` are checked under the configured default TLD;
/// without them the configured input file is read instead. The caller owns
/// `begin`/`end` of the run.
///
/// # Errors
///
/// Fails with the first fault raised by an action, or with
/// [`DomainAvailError::NoInput`] when neither source produced a name.
pub async fn run_pipeline(
    progress: &mut Progress,
    config: &RunConfig,
    names: Vec<String>,
) -> Result<RunSummary> {
    let client = RegistrarClient::with_config(config.api.clone())?;

    let from_args = progress
        .run_action(&ReadInputParam::new(names, config.default_tld.clone()))
        .await?;
    let from_file = progress
        .run_action(&ReadInputFile::new(
            &config.input_file,
            from_args.as_deref(),
        ))
        .await?;

    let input = match from_args.or(from_file) {
        Some(input) if input.iter().any(|entry| !entry.names.is_empty()) => input,
        _ => {
            return Err(DomainAvailError::no_input(
                "No input data were found in arguments or input file",
            ))
        }
    };
    let domains_checked = input.iter().map(|entry| entry.names.len()).sum();

    let output_path = config
        .output_file
        .clone()
        .unwrap_or_else(|| default_output_path(&config.output_dir));
    let target = progress
        .run_action(&OpenOutputFile::new(output_path))
        .await?
        .ok_or_else(|| DomainAvailError::internal("Output file was not opened"))?;

    let requests = progress
        .run_action(&BuildRequest::new(&input, config.chunk_size, &client))
        .await?
        .unwrap_or_default();

    let available = progress
        .run_action(&FetchData::new(&requests, &client, config.fetch_retry))
        .await?
        .unwrap_or_default();

    let bytes_written = progress
        .run_action(&WriteOutputFile::new(&target, &available))
        .await?
        .unwrap_or(0);

    tracing::debug!(
        domains_checked,
        requests = requests.len(),
        available = available.len(),
        "pipeline finished"
    );

    Ok(RunSummary {
        domains_checked,
        requests: requests.len(),
        available,
        output: target.path,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Event, MemoryReporter};

    #[tokio::test]
    async fn test_no_input_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.yaml");
        std::fs::write(&input, "in.th:\n").unwrap();

        let config = RunConfig::default()
            .with_input_file(&input)
            .with_output_dir(dir.path());
        let reporter = MemoryReporter::new();
        let mut progress = Progress::new(reporter.clone());

        let err = run_pipeline(&mut progress, &config, vec![]).await.unwrap_err();

        assert!(matches!(err, DomainAvailError::NoInput { .. }));
        assert_eq!(
            reporter.count(|e| matches!(e, Event::ActionStopped { .. })),
            2
        );
    }
}
