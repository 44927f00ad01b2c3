//! HTTP backend for the provider's REST APIs
//!
//! Requests are sent unsigned: signing belongs to whatever sits in front of
//! the endpoints (for example a local signing proxy reached through
//! [`OciEndpoints::single`]). No pagination headers are followed and no
//! request is retried.

use super::{async_trait, ComputeApi, IdentityApi, MonitoringApi, UsageApi};
use crate::error::{ReportError, Result};
use crate::models::{Compartment, Instance, MetricData, MetricQuery, UsageAggregation, UsageRequest};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

const IDENTITY_API_VERSION: &str = "20160918";
const CORE_API_VERSION: &str = "20160918";
const MONITORING_API_VERSION: &str = "20180401";
const USAGE_API_VERSION: &str = "20200107";

/// Base URLs for each service
#[derive(Debug, Clone, PartialEq)]
pub struct OciEndpoints {
    pub identity: Url,
    pub compute: Url,
    pub monitoring: Url,
    pub usage: Url,
}

impl OciEndpoints {
    /// Public endpoints for a region, e.g. `us-ashburn-1`
    pub fn for_region(region: &str) -> Result<Self> {
        Ok(Self {
            identity: parse_base(&format!("https://identity.{}.oraclecloud.com", region))?,
            compute: parse_base(&format!("https://iaas.{}.oraclecloud.com", region))?,
            monitoring: parse_base(&format!("https://telemetry.{}.oraclecloud.com", region))?,
            usage: parse_base(&format!("https://usageapi.{}.oci.oraclecloud.com", region))?,
        })
    }

    /// Route every service to the same base URL
    pub fn single(base_url: &str) -> Result<Self> {
        let base = parse_base(base_url)?;
        Ok(Self {
            identity: base.clone(),
            compute: base.clone(),
            monitoring: base.clone(),
            usage: base,
        })
    }
}

/// Parse a base URL, making sure relative joins append to its path
fn parse_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// reqwest-backed client implementing all four service traits
pub struct OciClient {
    client: Client,
    endpoints: OciEndpoints,
}

impl OciClient {
    /// Create a new client
    pub fn new(endpoints: OciEndpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ReportError::Http {
                service: "client",
                source,
            })?;

        Ok(Self { client, endpoints })
    }

    /// Send a request and decode the JSON body, failing on non-2xx
    async fn send<T: DeserializeOwned>(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|source| ReportError::Http { service, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ReportError::Http { service, source })?;

        if !status.is_success() {
            return Err(ReportError::Api {
                service,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ReportError::Decode { service, source })
    }
}

#[async_trait]
impl IdentityApi for OciClient {
    async fn list_compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>> {
        let url = self
            .endpoints
            .identity
            .join(&format!("{}/compartments", IDENTITY_API_VERSION))?;
        debug!(%url, "Listing compartments");

        let request = self.client.get(url).query(&[
            ("compartmentId", tenancy_id),
            ("compartmentIdInSubtree", "true"),
            ("lifecycleState", "ACTIVE"),
        ]);
        self.send("identity", request).await
    }
}

#[async_trait]
impl ComputeApi for OciClient {
    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>> {
        let url = self
            .endpoints
            .compute
            .join(&format!("{}/instances", CORE_API_VERSION))?;
        debug!(%url, compartment_id, "Listing instances");

        let request = self
            .client
            .get(url)
            .query(&[("compartmentId", compartment_id)]);
        self.send("compute", request).await
    }
}

#[async_trait]
impl MonitoringApi for OciClient {
    async fn summarize_metrics_data(
        &self,
        compartment_id: &str,
        query: &MetricQuery,
    ) -> Result<Vec<MetricData>> {
        let url = self.endpoints.monitoring.join(&format!(
            "{}/metrics/actions/summarizeMetricsData",
            MONITORING_API_VERSION
        ))?;
        debug!(%url, compartment_id, query = %query.query, "Summarizing metrics");

        let request = self
            .client
            .post(url)
            .query(&[("compartmentId", compartment_id)])
            .json(query);
        self.send("monitoring", request).await
    }
}

#[async_trait]
impl UsageApi for OciClient {
    async fn request_summarized_usages(&self, request: &UsageRequest) -> Result<UsageAggregation> {
        let url = self
            .endpoints
            .usage
            .join(&format!("{}/usage", USAGE_API_VERSION))?;
        debug!(%url, granularity = %request.granularity, "Requesting summarized usages");

        let http_request = self.client.post(url).json(request);
        self.send("usage", http_request).await
    }
}
