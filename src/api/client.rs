//! reqwest-backed implementation of the admin API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::errors::extract_message;
use super::{AdminApi, ApiError};
use crate::config::Config;
use crate::models::{
    ApiResponse, Driver, DriverListPayload, DriverPayload, DriverPayloadBody, Travel,
    TravelPayload,
};

/// HTTP client for the travel backend
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
}

impl HttpAdminApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a relative API path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.endpoint(path))
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("{} -> {}", path, status);

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let message = extract_message(&body);
            warn!(
                "Request to {} failed with status {}: {}",
                path,
                status,
                message.as_deref().unwrap_or("<no message>")
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.execute(self.request(Method::GET, path), path).await?;
        decode(path, &body)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<(), ApiError> {
        let request = self.request(method, path).json(payload);
        self.execute(request, path).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path), path)
            .await
            .map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn list_travels(&self) -> Result<Vec<Travel>, ApiError> {
        let response: ApiResponse<Vec<Travel>> = self.get_json("/travel").await?;
        Ok(response.data)
    }

    async fn get_travel(&self, id: u64) -> Result<Travel, ApiError> {
        let response: ApiResponse<Travel> = self.get_json(&format!("/admin/travel/{}", id)).await?;
        Ok(response.data)
    }

    async fn create_travel(&self, payload: &TravelPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/admin/travel", payload).await
    }

    async fn update_travel(&self, id: u64, payload: &TravelPayload) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/admin/travel/{}", id), payload)
            .await
    }

    async fn delete_travel(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/travel/{}", id)).await
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, ApiError> {
        let payload: DriverListPayload = self.get_json("/driver").await?;
        Ok(payload.drivers)
    }

    async fn get_driver(&self, id: u64) -> Result<Driver, ApiError> {
        let payload: DriverPayloadBody = self.get_json(&format!("/driver/{}", id)).await?;
        Ok(payload.into_driver())
    }

    async fn create_driver(&self, payload: &DriverPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/driver", payload).await
    }

    async fn update_driver(&self, id: u64, payload: &DriverPayload) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/driver/{}", id), payload)
            .await
    }

    async fn delete_driver(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/driver/{}", id)).await
    }
}
