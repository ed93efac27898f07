use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_RANGE, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use shared::{
    domain::EntityId,
    error::GatewayError,
    protocol::{page_window, total_pages_for, RecordPage},
};
use tracing::debug;
use url::Url;

use super::{check_entity_name, Gateway};
use crate::config::ClientSettings;

const REST_PREFIX: &str = "rest/v1/";

/// PostgREST-style data API client.
pub struct RestGateway {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    page_size: u32,
}

impl RestGateway {
    pub fn new(base_url: &str, page_size: u32) -> Result<Self, GatewayError> {
        Self::with_client(Client::new(), base_url, page_size)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|err| GatewayError::transport(format!("failed to build http client: {err}")))?;
        let gateway = Self::with_client(http, &settings.base_url, settings.page_size)?;
        Ok(match &settings.api_key {
            Some(key) => gateway.with_api_key(key.clone()),
            None => gateway,
        })
    }

    fn with_client(http: Client, base_url: &str, page_size: u32) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(base_url.trim()).map_err(|err| {
            GatewayError::new(format!("invalid base url '{base_url}': {err}"))
                .with_code("invalid_url")
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            api_key: None,
            page_size: page_size.max(1),
        })
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn table_url(&self, entity: &str) -> Result<Url, GatewayError> {
        check_entity_name(entity)?;
        self.base_url
            .join(&format!("{REST_PREFIX}{entity}"))
            .map_err(|err| GatewayError::new(format!("invalid table url for '{entity}': {err}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }

    async fn send_for_representation(&self, builder: RequestBuilder) -> Result<Value, GatewayError> {
        let response = builder
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(transport_error)?;
        let rows: Vec<Value> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found("no row matched the request"))
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn list(&self, entity: &str, page: u32) -> Result<RecordPage, GatewayError> {
        let url = self.table_url(entity)?;
        let (offset, limit) = page_window(page, self.page_size);
        debug!(entity, page, offset, limit, "gateway: list");
        let response = self
            .request(Method::GET, url)
            .query(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ])
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(transport_error)?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total);
        // An offset past the last row is answered with 416 and `*/<count>`.
        if let (StatusCode::RANGE_NOT_SATISFIABLE, Some(count)) = (response.status(), total) {
            debug!(entity, page, count, "gateway: page beyond the last row");
            return Ok(RecordPage {
                items: Vec::new(),
                total_pages: total_pages_for(count, self.page_size),
            });
        }
        let response = ensure_success(response).await?;
        let items: Vec<Value> = response.json().await.map_err(decode_error)?;
        let count = total.unwrap_or_else(|| {
            debug!(entity, "gateway: no exact count in response, estimating");
            offset + items.len() as u64
        });
        Ok(RecordPage {
            items,
            total_pages: total_pages_for(count, self.page_size),
        })
    }

    async fn create(&self, entity: &str, payload: Value) -> Result<Value, GatewayError> {
        let url = self.table_url(entity)?;
        debug!(entity, "gateway: create");
        self.send_for_representation(self.request(Method::POST, url).json(&payload))
            .await
    }

    async fn update(
        &self,
        entity: &str,
        id: &EntityId,
        payload: Value,
    ) -> Result<Value, GatewayError> {
        let url = self.table_url(entity)?;
        debug!(entity, id = %id, "gateway: update");
        let builder = self
            .request(Method::PATCH, url)
            .query(&[("id", format!("eq.{id}"))])
            .json(&payload);
        self.send_for_representation(builder).await
    }

    async fn delete(&self, entity: &str, id: &EntityId) -> Result<(), GatewayError> {
        let url = self.table_url(entity)?;
        debug!(entity, id = %id, "gateway: delete");
        let response = self
            .request(Method::DELETE, url)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Total row count from a `Content-Range` header such as `0-9/42` or `*/0`.
pub fn parse_content_range_total(raw: &str) -> Option<u64> {
    let (_, total) = raw.trim().rsplit_once('/')?;
    total.parse().ok()
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if let Ok(err) = serde_json::from_str::<GatewayError>(&body) {
        return Err(err);
    }
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };
    Err(GatewayError::new(message).with_code(format!("http_{}", status.as_u16())))
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::transport(err.to_string())
}

fn decode_error(err: reqwest::Error) -> GatewayError {
    GatewayError::decode(format!("invalid response body: {err}"))
}

#[cfg(test)]
#[path = "../tests/rest_gateway_tests.rs"]
mod tests;
