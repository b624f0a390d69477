//! Fetching availability from the registrar.
//!
//! [`FetchData`] is the action; each request inside it runs as its own
//! [`GetAvailability`] step so that retries are tracked per request.

use crate::error::DomainAvailError;
use crate::outcome::Outcome;
use crate::progress::{Action, Attempt, Progress, Settings, Step, StepRetry};
use crate::protocols::RegistrarClient;
use crate::types::{ApiResponse, ApiStatus, AvailabilityRequest};
use crate::Result;
use async_trait::async_trait;

pub struct FetchData<'a> {
    requests: &'a [AvailabilityRequest],
    client: &'a RegistrarClient,
    retry: u32,
}

impl<'a> FetchData<'a> {
    /// `retry` is the budget of every request, not of the whole action.
    pub fn new(requests: &'a [AvailabilityRequest], client: &'a RegistrarClient, retry: u32) -> Self {
        Self {
            requests,
            client,
            retry,
        }
    }
}

#[async_trait]
impl<'a> Action for FetchData<'a> {
    type Value = Vec<String>;

    fn name(&self) -> String {
        "fetch_data".to_string()
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(0)
    }

    fn stop_message(&self, value: &Self::Value) -> Option<String> {
        Some(format!("Found {} available domain(s)", value.len()))
    }

    async fn run(&self, progress: &mut Progress) -> Result<Outcome<Self::Value>> {
        let mut available = Vec::new();
        for (index, request) in self.requests.iter().enumerate() {
            let step = GetAvailability::new(index, request, self.client, self.retry);
            let response = progress.run_step(&step).await?;
            available.extend(response.available_domains());
        }
        Ok(Outcome::Success(available))
    }
}

/// One registrar call, retried until the registrar reports `success`.
pub struct GetAvailability<'a> {
    index: usize,
    request: &'a AvailabilityRequest,
    client: &'a RegistrarClient,
    retry: u32,
}

impl<'a> GetAvailability<'a> {
    pub fn new(
        index: usize,
        request: &'a AvailabilityRequest,
        client: &'a RegistrarClient,
        retry: u32,
    ) -> Self {
        Self {
            index,
            request,
            client,
            retry,
        }
    }
}

#[async_trait]
impl<'a> Step for GetAvailability<'a> {
    type Output = ApiResponse;

    fn name(&self) -> String {
        format!("get_availability({})", self.index)
    }

    fn settings(&self) -> Settings {
        Settings::with_retry(self.retry)
    }

    fn start_message(&self) -> Option<String> {
        Some(format!(
            "Fetching... domains=[{}]",
            self.request.names.join(",")
        ))
    }

    fn stop_message(&self, attempt: Attempt<'_, Self::Output>) -> Option<String> {
        match attempt {
            Attempt::Returned(response) => Some(format!(
                "{} of {} available",
                response.available_domains().len(),
                self.request.names.len()
            )),
            Attempt::Failed(_) => None,
        }
    }

    fn need_retry(&self, attempt: Attempt<'_, Self::Output>) -> StepRetry {
        match attempt {
            Attempt::Failed(error) => StepRetry::Retry(Some(error.clone())),
            Attempt::Returned(response) if response.status != ApiStatus::Success => {
                StepRetry::Retry(Some(DomainAvailError::api(format!(
                    "Response status is not success: {}",
                    response.raw
                ))))
            }
            Attempt::Returned(_) => StepRetry::Accept,
        }
    }

    async fn run(&self) -> Result<Self::Output> {
        self.client.get_availability(&self.request.url).await
    }
}
