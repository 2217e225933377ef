//! reqwest-backed implementation of the report gateway.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use crate::auth::AccessToken;
use crate::constants::{REPORT_PATH, SUBSCRIPTION_KEY_HEADER};
use crate::http_client::endpoint;

use super::{GatewayError, ReportGateway, ReportHandle, ReportRequest, ReportStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReportResponse {
    report_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportStatusResponse {
    status: Option<String>,
    report_url: Option<String>,
}

/// Report gateway talking to the platform's report API over HTTP.
///
/// Stateless apart from connection pooling; every call takes the token to use.
#[derive(Debug, Clone)]
pub struct HttpReportGateway {
    client: Client,
    report_url: Url,
    subscription_key: String,
}

impl HttpReportGateway {
    /// Creates a gateway rooted at `{base_url}/vipps-report/v1/report`.
    #[must_use]
    pub fn new(client: Client, base_url: &Url, subscription_key: impl Into<String>) -> Self {
        Self {
            client,
            report_url: endpoint(base_url, REPORT_PATH),
            subscription_key: subscription_key.into(),
        }
    }

    fn authorized(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request
            .bearer_auth(token.value())
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
    }

    fn status_url(&self, handle: &ReportHandle) -> Result<Url, GatewayError> {
        let mut url = self.report_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::invalid_url(self.report_url.as_str()))?
            .pop_if_empty()
            .push(handle.report_id());
        Ok(url)
    }
}

#[async_trait]
impl ReportGateway for HttpReportGateway {
    #[instrument(skip(self, token, request), fields(start = %request.start_date(), end = %request.end_date()))]
    async fn create_report(
        &self,
        token: &AccessToken,
        request: &ReportRequest,
    ) -> Result<ReportHandle, GatewayError> {
        let url = self.report_url.as_str();
        let response = self
            .authorized(self.client.post(self.report_url.clone()), token)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::transport(url, e))?;

        let body: CreateReportResponse = read_json(response, url).await?;
        let report_id = body
            .report_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| GatewayError::malformed(url, "missing reportId"))?;

        info!(report_id = %report_id, "report requested");
        Ok(ReportHandle::new(report_id))
    }

    #[instrument(skip(self, token, handle), fields(report_id = %handle))]
    async fn get_status(
        &self,
        token: &AccessToken,
        handle: &ReportHandle,
    ) -> Result<ReportStatus, GatewayError> {
        let status_url = self.status_url(handle)?;
        let url = status_url.as_str();
        let response = self
            .authorized(self.client.get(status_url.clone()), token)
            .send()
            .await
            .map_err(|e| GatewayError::transport(url, e))?;

        let body: ReportStatusResponse = read_json(response, url).await?;
        let raw_status = body
            .status
            .ok_or_else(|| GatewayError::malformed(url, "missing status"))?;
        let status = ReportStatus::from_parts(&raw_status, body.report_url)
            .map_err(|reason| GatewayError::malformed(url, reason))?;

        debug!(status = status.label(), "report status");
        Ok(status)
    }

    #[instrument(skip(self))]
    async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        let parsed = Url::parse(url).map_err(|_| GatewayError::invalid_url(url))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| GatewayError::transport(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::non_ok(url, status.as_u16(), body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::transport(url, e))?;
        info!(bytes = bytes.len(), "report downloaded");
        Ok(bytes.to_vec())
    }
}

/// Checks for a 200 response and decodes its JSON body.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::transport(url, e))?;

    if status != StatusCode::OK {
        return Err(GatewayError::non_ok(url, status.as_u16(), body));
    }

    serde_json::from_str(&body).map_err(|e| GatewayError::malformed(url, format!("invalid JSON: {e}")))
}
