// src/infrastructure/engine/mod.rs
// Trading engine repository over its JSON HTTP API

use std::time::Duration;

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, Uri};
use hyper_tls::HttpsConnector;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::dto::parser::parse_body;
use crate::application::dto::{
    AckResponse, StartRequest, StatsResponse, StatusResponse, StopRequest, TradesResponse,
};
use crate::domain::errors::{DashboardResult, TransportError, TransportResult};
use crate::domain::model::{EngineStatus, StartCommand, StatsSnapshot, TradeRecord};
use crate::domain::repository::EngineRepository;

const JSON: &str = "application/json";
const ERROR_BODY_PREVIEW: usize = 200;

pub struct HttpEngineRepository {
    client: Client<HttpsConnector<HttpConnector>>,
    base_url: String,
    timeout: Duration,
}

impl HttpEngineRepository {
    /// `base_url` is the engine origin, e.g. `http://127.0.0.1:5000`
    pub fn new(base_url: &str, timeout: Duration) -> DashboardResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let uri: Uri = base_url
            .parse()
            .map_err(|e| TransportError::InvalidUri(format!("{}: {}", base_url, e)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(TransportError::InvalidUri(format!("{}: scheme and host required", base_url)).into());
        }

        let client = Client::builder().build::<_, Body>(HttpsConnector::new());
        log::info!("Engine API at {} (timeout {:?})", base_url, timeout);

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn uri(&self, path: &str) -> TransportResult<Uri> {
        let url = format!("{}{}", self.base_url, path);
        url.parse()
            .map_err(|e| TransportError::InvalidUri(format!("{}: {}", url, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> DashboardResult<T> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.uri(path)?)
            .header(ACCEPT, JSON)
            .body(Body::empty())
            .map_err(|e| TransportError::Request(e.to_string()))?;

        self.send(path, request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, payload: &B) -> DashboardResult<T> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.uri(path)?)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(Body::from(body))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        self.send(path, request).await
    }

    // A JSON body is decoded whatever the status; the engine answers a refused
    // command with `{ok: false}` and a 4xx.
    async fn send<T: DeserializeOwned>(&self, path: &str, request: Request<Body>) -> DashboardResult<T> {
        log::debug!("{} {}", request.method(), path);

        let exchange = async {
            let response = self.client.request(request).await?;
            let status = response.status();
            let body = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout(path.to_string()).into()),
        };

        match parse_body(&body) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(e),
            Err(_) => Err(TransportError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).chars().take(ERROR_BODY_PREVIEW).collect(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl EngineRepository for HttpEngineRepository {
    async fn start(&self, command: &StartCommand) -> DashboardResult<bool> {
        let ack: AckResponse = self.post("/api/start", &StartRequest::from(command)).await?;
        Ok(ack.ok)
    }

    async fn stop(&self) -> DashboardResult<bool> {
        let ack: AckResponse = self.post("/api/stop", &StopRequest::default()).await?;
        Ok(ack.ok)
    }

    async fn status(&self) -> DashboardResult<EngineStatus> {
        let response: StatusResponse = self.get("/api/status").await?;
        EngineStatus::try_from(response)
    }

    async fn stats(&self) -> DashboardResult<StatsSnapshot> {
        let response: StatsResponse = self.get("/api/stats").await?;
        StatsSnapshot::try_from(response)
    }

    async fn trades(&self) -> DashboardResult<Vec<TradeRecord>> {
        let response: TradesResponse = self.get("/api/trades").await?;
        Vec::<TradeRecord>::try_from(response)
    }
}
