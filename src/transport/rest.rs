use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, AppResult};

use super::Transport;

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, path: &str) -> AppResult<Value> {
        let url = self.url(path);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body: Value = resp.json().await?;
        tracing::trace!(%url, "fetch ok");
        Ok(body)
    }

    async fn fetch_and_push(&self, path: &str, body: &Value) -> AppResult<()> {
        let url = self.url(path);
        tracing::info!(%url, "Pushing write");
        let resp = self.http.put(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), body = %text, "Write rejected");
            return Err(AppError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let transport = HttpTransport::new("http://127.0.0.1:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:8080");
        assert_eq!(
            transport.url("/api/v1/strategies/x"),
            "http://127.0.0.1:8080/api/v1/strategies/x"
        );
    }
}
