//! `reqwest` implementation of [`SimulationApi`]
//!
//! Endpoints, relative to the API base URL:
//!
//! | method | path | payload |
//! |---|---|---|
//! | `GET` | `run?datacenters=..&hostsPerDatacenter=..&vms=..&cloudlets=..` | run acknowledgement |
//! | `GET` | `datacenter-stats` | `[DatacenterStat]` |
//! | `GET` | `cloudlet-stats` | `[WorkUnitRecord]` |
//! | `GET` | `vm-stats` | `[VmStat]` |
//! | `GET` | `summary` | `SummarySnapshot` |
//!
//! The pricing catalog lives at its own URL.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use simdash_core::api::SimulationApi;
use simdash_core::error::{Result, SimdashError};
use simdash_core::types::{
    CatalogEntry, DatacenterStat, RunAck, RunParams, SummarySnapshot, VmStat,
};
use simdash_core::work_unit::WorkUnitRecord;
use std::time::Duration;
use tracing::debug;

/// Default simulation API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/cloudsim";

/// Default pricing catalog URL
pub const DEFAULT_PRICING_URL: &str = "http://localhost:8080/pricing";

/// HTTP client for the simulation backend
pub struct HttpSimulationApi {
    client: reqwest::Client,
    api_base: Url,
    pricing_url: Url,
}

impl HttpSimulationApi {
    /// Create a client
    ///
    /// Requests never time out unless `timeout` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_base: Url, pricing_url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_base,
            pricing_url,
        })
    }

    /// Absolute URL of an endpoint below the API base
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the joined URL does not parse.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.api_base.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| SimdashError::Config(format!("invalid endpoint {raw}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SimdashError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SimulationApi for HttpSimulationApi {
    async fn run_simulation(&self, params: &RunParams) -> Result<RunAck> {
        let mut url = self.endpoint_url("run")?;
        url.query_pairs_mut()
            .append_pair("datacenters", &params.datacenters.to_string())
            .append_pair("hostsPerDatacenter", &params.hosts_per_datacenter.to_string())
            .append_pair("vms", &params.vms.to_string())
            .append_pair("cloudlets", &params.cloudlets.to_string());
        self.get_json(url, "run").await
    }

    async fn datacenter_stats(&self) -> Result<Vec<DatacenterStat>> {
        self.get_json(self.endpoint_url("datacenter-stats")?, "datacenter-stats")
            .await
    }

    async fn work_unit_stats(&self) -> Result<Vec<WorkUnitRecord>> {
        self.get_json(self.endpoint_url("cloudlet-stats")?, "cloudlet-stats")
            .await
    }

    async fn summary(&self) -> Result<SummarySnapshot> {
        self.get_json(self.endpoint_url("summary")?, "summary").await
    }

    async fn vm_stats(&self) -> Result<Vec<VmStat>> {
        self.get_json(self.endpoint_url("vm-stats")?, "vm-stats").await
    }

    async fn pricing_catalog(&self) -> Result<Vec<CatalogEntry>> {
        self.get_json(self.pricing_url.clone(), "pricing").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the request line
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            let request = String::from_utf8_lossy(&request).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });

        let base = Url::parse(&format!("http://{addr}/api/cloudsim")).unwrap();
        (base, handle)
    }

    fn client(base: Url) -> HttpSimulationApi {
        let pricing = base.join("/pricing").unwrap();
        HttpSimulationApi::new(base, pricing, Some(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let api = HttpSimulationApi::new(
            Url::parse("http://localhost:8080/api/cloudsim/").unwrap(),
            Url::parse(DEFAULT_PRICING_URL).unwrap(),
            None,
        )
        .unwrap();
        assert_eq!(
            api.endpoint_url("summary").unwrap().as_str(),
            "http://localhost:8080/api/cloudsim/summary"
        );
    }

    #[tokio::test]
    async fn test_run_sends_size_parameters() {
        let (base, request) = serve_once("200 OK", r#"{"accepted":true,"runId":"r-1"}"#).await;
        let params = RunParams {
            datacenters: 2,
            hosts_per_datacenter: 4,
            vms: 8,
            cloudlets: 16,
        };

        let ack = client(base).run_simulation(&params).await.unwrap();
        assert!(ack.accepted);

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /api/cloudsim/run?"));
        assert!(request_line.contains("datacenters=2"));
        assert!(request_line.contains("hostsPerDatacenter=4"));
        assert!(request_line.contains("vms=8"));
        assert!(request_line.contains("cloudlets=16"));
    }

    #[tokio::test]
    async fn test_cloudlet_stats_decoded() {
        let (base, request) = serve_once(
            "200 OK",
            r#"[{"id":1,"pes":2,"execTime":60},{"id":2,"pes":1,"executionTime":30}]"#,
        )
        .await;

        let records = client(base).work_unit_stats().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 2);
        assert!(request.await.unwrap().starts_with("GET /api/cloudsim/cloudlet-stats"));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base, _request) = serve_once("503 Service Unavailable", "{}").await;

        let err = client(base).summary().await.unwrap_err();
        assert!(matches!(
            err,
            SimdashError::HttpStatus { ref endpoint, status: 503 } if endpoint == "summary"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let (base, _request) = serve_once("200 OK", r#"{"not":"a list"}"#).await;

        let err = client(base).datacenter_stats().await.unwrap_err();
        assert!(matches!(err, SimdashError::Network(_)));
    }

    #[tokio::test]
    async fn test_pricing_uses_its_own_url() {
        let (base, request) =
            serve_once("200 OK", r#"[{"provider":"aws","peCost":0.09,"ramCost":0.02}]"#).await;

        let catalog = client(base).pricing_catalog().await.unwrap();
        assert_eq!(catalog[0].pe_cost, 0.09);
        assert!(request.await.unwrap().starts_with("GET /pricing"));
    }
}
