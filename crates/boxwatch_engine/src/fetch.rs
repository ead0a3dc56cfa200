use std::time::Duration;

use async_trait::async_trait;
use boxwatch_core::{LogEntry, StateChange, UnitId};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sync_logging::sync_trace;
use url::Url;

use crate::types::{LogRecord, ResetReply, StateRecord};
use crate::{FailureKind, FetchError};

pub const DEFAULT_PORT: u16 = 3753;

const LAST_LOG_HEADER: &str = "lastLog";
const INDEX_HEADER: &str = "index";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub default_port: u16,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 1024 * 1024,
            default_port: DEFAULT_PORT,
        }
    }
}

/// Turns `host`, `host:port` or a full URL into the service base URL.
///
/// A missing scheme means `http://` and a missing port means `default_port`.
pub fn server_base_url(address: &str, default_port: u16) -> Result<Url, FetchError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(FetchError::new(FailureKind::InvalidAddress, "empty address"));
    }
    let raw = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    let mut url = Url::parse(&raw)
        .map_err(|err| FetchError::new(FailureKind::InvalidAddress, err.to_string()))?;
    if url.host_str().is_none() {
        return Err(FetchError::new(FailureKind::InvalidAddress, "missing host"));
    }
    if !has_explicit_port(&raw) {
        url.set_port(Some(default_port))
            .map_err(|()| FetchError::new(FailureKind::InvalidAddress, "cannot carry a port"))?;
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

// `Url::port` hides ports equal to the scheme default, so look at the authority text.
fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    match host_port.rfind(']') {
        Some(end) => host_port[end..].contains(':'),
        None => host_port.contains(':'),
    }
}

/// The job-runner service as seen by the dashboard.
#[async_trait]
pub trait JobRunnerApi: Send + Sync {
    async fn unit_count(&self) -> Result<u32, FetchError>;

    /// Log entries newer than `after`.
    async fn logs(&self, after: i64) -> Result<Vec<LogEntry>, FetchError>;

    /// State changes newer than `after`.
    async fn states(&self, after: i64) -> Result<Vec<StateChange>, FetchError>;

    async fn unit_detail(&self, unit: UnitId) -> Result<Value, FetchError>;

    /// Asks the service to reset a unit and returns its acknowledgement text.
    async fn reset(&self, unit_id: i64) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobRunner {
    settings: ClientSettings,
    base: Result<Url, FetchError>,
}

impl ReqwestJobRunner {
    /// An invalid address is reported by every request instead of here.
    pub fn new(settings: ClientSettings, address: &str) -> Self {
        let base = server_base_url(address, settings.default_port);
        Self { settings, base }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    async fn get(&self, path: &str, header: Option<(&str, String)>) -> Result<Vec<u8>, FetchError> {
        let url = self
            .base
            .clone()?
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidAddress, err.to_string()))?;
        let client = self.build_client()?;

        let mut request = client.get(url);
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = read_capped(response, self.settings.max_bytes).await?;
        sync_trace!("GET /{} returned {} bytes", path, bytes.len());
        Ok(bytes)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        header: Option<(&str, String)>,
    ) -> Result<T, FetchError> {
        let bytes = self.get(path, header).await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Malformed, err.to_string()))
    }
}

#[async_trait]
impl JobRunnerApi for ReqwestJobRunner {
    async fn unit_count(&self) -> Result<u32, FetchError> {
        let bytes = self.get("getNum", None).await?;
        let text = String::from_utf8_lossy(&bytes);
        text.trim()
            .parse()
            .map_err(|_| FetchError::new(FailureKind::Malformed, format!("not a count: {text:?}")))
    }

    async fn logs(&self, after: i64) -> Result<Vec<LogEntry>, FetchError> {
        let records: Vec<LogRecord> = self
            .get_json("logs", Some((LAST_LOG_HEADER, after.to_string())))
            .await?;
        Ok(records.into_iter().map(LogEntry::from).collect())
    }

    async fn states(&self, after: i64) -> Result<Vec<StateChange>, FetchError> {
        let records: Vec<StateRecord> = self
            .get_json("status", Some((LAST_LOG_HEADER, after.to_string())))
            .await?;
        Ok(records.into_iter().map(StateChange::from).collect())
    }

    async fn unit_detail(&self, unit: UnitId) -> Result<Value, FetchError> {
        self.get_json("info", Some((INDEX_HEADER, unit.to_string())))
            .await
    }

    async fn reset(&self, unit_id: i64) -> Result<String, FetchError> {
        let reply: ResetReply = self
            .get_json("reset", Some((INDEX_HEADER, unit_id.to_string())))
            .await?;
        Ok(reply.text)
    }
}

async fn read_capped(response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, content_len));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, next_len));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Malformed, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_normalization() {
        let cases = [
            ("localhost", "http://localhost:3753/"),
            ("10.0.0.5:8080", "http://10.0.0.5:8080/"),
            ("https://runner.lab", "https://runner.lab:3753/"),
            ("http://runner.lab:80/dashboard?x=1", "http://runner.lab/"),
            ("  box-host  ", "http://box-host:3753/"),
            ("[::1]", "http://[::1]:3753/"),
            ("[::1]:9000", "http://[::1]:9000/"),
        ];
        for (input, expected) in cases {
            let url = server_base_url(input, DEFAULT_PORT).unwrap();
            assert_eq!(url.as_str(), expected, "normalizing {input:?}");
        }
    }

    #[test]
    fn empty_or_broken_address_is_invalid() {
        for input in ["", "   ", "http://", "http://exa mple"] {
            let err = server_base_url(input, DEFAULT_PORT).unwrap_err();
            assert_eq!(err.kind, FailureKind::InvalidAddress, "address {input:?}");
        }
    }
}
