//! Internal HTTP client for the inventory collaborator.
//!
//! Wraps `reqwest` with the collaborator's response-envelope convention so
//! the rest of the crate never branches on envelope shape, and applies
//! optional client-side rate limiting.

use crate::core::domain::{
    error::{FleetError, FleetResult, ValidationError},
    value_object::EndpointUrl,
};
use crate::inventory::application::response::ApiEnvelope;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Client-side rate limiting configuration for collaborator requests.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Envelope-aware HTTP client used by the inventory service.
#[derive(Debug)]
pub(crate) struct ApiClient {
    http_client: Client,
    base_url: EndpointUrl,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient` rooted at `base_url`.
    ///
    /// # Errors
    /// Returns `FleetError::Connection` if the HTTP client cannot be built,
    /// or `FleetError::Validation` for a zero rate-limit quota.
    pub fn new(base_url: EndpointUrl, rate_limit: Option<RateLimitConfig>) -> FleetResult<Self> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| FleetError::Connection(e.to_string()))?;

        let rate_limiter = match rate_limit {
            Some(rl) => {
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    ValidationError::Field {
                        field: "requests_per_second".to_string(),
                        message: "Rate limit cannot be zero".to_string(),
                    }
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    ValidationError::Field {
                        field: "burst_size".to_string(),
                        message: "Burst size cannot be zero".to_string(),
                    }
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            base_url,
            rate_limiter,
        })
    }

    /// Returns the collaborator base URL.
    pub fn base_url(&self) -> &EndpointUrl {
        &self.base_url
    }

    /// Performs a GET request and unwraps the envelope.
    pub async fn get<T>(&self, path: &str) -> FleetResult<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::GET, path, None::<&()>)
            .await
    }

    /// Performs a POST request with a JSON body and unwraps the envelope.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> FleetResult<ApiEnvelope<T>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::POST, path, Some(body))
            .await
    }

    /// Performs a PUT request with a JSON body and unwraps the envelope.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> FleetResult<ApiEnvelope<T>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::PUT, path, Some(body))
            .await
    }

    /// Performs a PATCH request without a body and unwraps the envelope.
    pub async fn patch<T>(&self, path: &str) -> FleetResult<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::PATCH, path, None::<&()>)
            .await
    }

    /// Performs a DELETE request and unwraps the envelope.
    pub async fn delete<T>(&self, path: &str) -> FleetResult<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::DELETE, path, None::<&()>)
            .await
    }

    /// Core request execution: applies rate limiting, sends the request,
    /// and parses the response envelope.
    ///
    /// A non-success HTTP status is an API failure (the collaborator
    /// rejected the call), unless the body is not even an envelope, in
    /// which case it surfaces as a connection or decode failure.
    async fn execute_request<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> FleetResult<ApiEnvelope<T>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        if let Some(limiter) = &self.rate_limiter {
            // Completes when quota capacity is available.
            limiter.until_ready().await;
        }

        let url = self.base_url.join(path);
        let mut req_builder = self.http_client.request(method, &url);
        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| FleetError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FleetError::Connection(format!("Failed to read response: {}", e)))?;

        match serde_json::from_str::<ApiEnvelope<T>>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => {
                Err(FleetError::Decode(format!("Failed to parse response: {}", e)))
            }
            Err(_) => Err(FleetError::Api(format!(
                "Request failed with status {}",
                status
            ))),
        }
    }
}
