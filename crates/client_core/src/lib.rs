use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::protocol::{
    HealthResponse, ModelVersionResponse, PredictionRequest, PredictionResponse,
    ServiceInfoResponse,
};
use tracing::debug;

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod view;

pub use config::{load_settings, ClientSettings};
pub use controller::{ControllerEvent, FormController};
pub use error::{Alert, PredictionError, SubmitError, PREDICTION_FAILED_ALERT};
pub use form::FormState;
pub use view::FormView;

/// The remote prediction service as seen by the form controller.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn model_version(&self) -> Result<String, PredictionError>;
    async fn predict(&self, request: &PredictionRequest) -> Result<f64, PredictionError>;
}

pub struct HttpPredictionService {
    http: Client,
    api_url: String,
}

impl HttpPredictionService {
    pub fn new(settings: &ClientSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            api_url: settings.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn health(&self) -> Result<HealthResponse, PredictionError> {
        self.get_json("/health").await
    }

    pub async fn service_info(&self) -> Result<ServiceInfoResponse, PredictionError> {
        self.get_json("/").await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PredictionError> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(PredictionError::transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(PredictionError::Server {
                status: status.as_u16(),
            });
        }
        res.json().await.map_err(PredictionError::from_body)
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn model_version(&self) -> Result<String, PredictionError> {
        let body: ModelVersionResponse = self.get_json("/version").await?;
        Ok(body.model_version)
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<f64, PredictionError> {
        let url = self.endpoint("/predict");
        debug!(%url, size = request.size, bedrooms = request.bedrooms, age = request.age, "POST");
        let res = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(PredictionError::transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(PredictionError::Server {
                status: status.as_u16(),
            });
        }
        let body: PredictionResponse = res.json().await.map_err(PredictionError::from_body)?;
        Ok(body.predicted_price)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
