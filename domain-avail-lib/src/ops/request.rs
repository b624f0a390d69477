//! Turning collected names into registrar requests.

use crate::outcome::Outcome;
use crate::progress::{Action, Progress, Settings};
use crate::protocols::RegistrarClient;
use crate::types::{AvailabilityRequest, TldNames};
use crate::utils::chunks;
use crate::Result;
use async_trait::async_trait;

/// Split every TLD's names into chunks and build one registrar URL per chunk.
pub struct BuildRequest<'a> {
    input: &'a [TldNames],
    chunk_size: usize,
    client: &'a RegistrarClient,
}

impl<'a> BuildRequest<'a> {
    pub fn new(input: &'a [TldNames], chunk_size: usize, client: &'a RegistrarClient) -> Self {
        Self {
            input,
            chunk_size,
            client,
        }
    }
}

#[async_trait]
impl<'a> Action for BuildRequest<'a> {
    type Value = Vec<AvailabilityRequest>;

    fn name(&self) -> String {
        "build_request".to_string()
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(0)
    }

    fn stop_message(&self, value: &Self::Value) -> Option<String> {
        Some(format!("Built {} requests", value.len()))
    }

    async fn run(&self, _progress: &mut Progress) -> Result<Outcome<Self::Value>> {
        let mut requests = Vec::new();
        for entry in self.input {
            for names in chunks(&entry.names, self.chunk_size) {
                let url = self.client.availability_url(&entry.tld, &names)?;
                requests.push(AvailabilityRequest {
                    tld: entry.tld.clone(),
                    names,
                    url,
                });
            }
        }
        Ok(Outcome::Success(requests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryReporter;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_build_request_chunks_per_tld() {
        let client = RegistrarClient::new().unwrap();
        let input = vec![
            TldNames::new("in.th", names(&["a", "b", "c", "d", "e", "f", "g"])),
            TldNames::new("co.th", names(&["shop"])),
            TldNames::new("ac.th", vec![]),
        ];

        let mut progress = Progress::new(MemoryReporter::new());
        let requests = progress
            .run_action(&BuildRequest::new(&input, 5, &client))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].names, names(&["a", "b", "c", "d", "e"]));
        assert_eq!(requests[1].names, names(&["f", "g"]));
        assert_eq!(requests[2].tld, "co.th");
        assert!(requests[2]
            .url
            .query_pairs()
            .any(|(k, v)| k == "domain_name[]" && v == "shop"));
    }
}
