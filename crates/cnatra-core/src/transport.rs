use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::TransportError;
use crate::page_state::PostbackRequest;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Carries one postback to the schedule server and returns the decoded response page.
pub trait Transport {
    fn postback(
        &self,
        url: &str,
        request: &PostbackRequest,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

pub fn squadron_url(schedule_url: &str, squadron_id: &str) -> String {
    format!("{schedule_url}{squadron_id}")
}

/// reqwest-backed transport sharing one pooled client across sessions.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    fallback_charset: String,
}

impl HttpTransport {
    pub fn new(config: &ScraperConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            fallback_charset: config.fallback_charset.clone(),
        })
    }
}

impl Transport for HttpTransport {
    async fn postback(&self, url: &str, request: &PostbackRequest) -> Result<String, TransportError> {
        let mut builder = self.client.post(url);
        if request.has_body() {
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.encode_body());
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%url, %status, "postback completed");
        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                url: url.to_string(),
            });
        }

        // Decodes with the Content-Type charset when the server declares one.
        Ok(response.text_with_charset(&self.fallback_charset).await?)
    }
}
