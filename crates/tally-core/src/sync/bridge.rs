//! Spreadsheet bridge client
//!
//! Talks to a single HTTP endpoint that exposes a spreadsheet as a JSON
//! read/write surface. Reads are a bare GET returning an array; writes
//! POST an `{action, ...}` envelope and get back
//! `{success, message?, entries?}`.
//!
//! Hosted script endpoints reject direct cross-origin requests, so a
//! request can be routed through a list of CORS relays, tried in order
//! until one answers.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SyncError;
use crate::models::{entries_from_value, Entry};

/// Rewrites a target URL to pass through one CORS relay
type ProxyTransform = fn(&str) -> String;

/// Relays tried in priority order when the endpoint needs proxying
const CORS_PROXIES: &[ProxyTransform] = &[
    |u| format!("https://api.cors.lol/?url={}", urlencoding::encode(u)),
    |u| format!("https://corsproxy.io/?url={}", urlencoding::encode(u)),
];

/// Hosts that indicate the URL already passes through a relay
const PROXY_HOSTS: &[&str] = &["corsproxy.io", "cors.sh", "cors.lol"];

/// How many characters of an unparseable body to quote back
const PREVIEW_LEN: usize = 50;

/// Candidate URLs for one request, in the order they should be tried
///
/// The endpoint goes through the relays only when proxying is enabled,
/// the host is one known to reject direct requests, and the URL is not
/// already relayed. Otherwise the original URL is the only candidate.
pub fn candidate_urls(url: &str, use_proxy: bool) -> Vec<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let already_proxied = PROXY_HOSTS.iter().any(|host| trimmed.contains(host));
    let needs_proxy = trimmed.contains("script.google.com");

    if use_proxy && needs_proxy && !already_proxied {
        CORS_PROXIES.iter().map(|rewrite| rewrite(trimmed)).collect()
    } else {
        vec![trimmed.to_string()]
    }
}

/// Request envelope for bridge writes
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum BridgeRequest<'a> {
    Add { entry: &'a Entry },
    Delete { id: &'a str },
}

/// Client for the spreadsheet bridge protocol
#[derive(Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
}

impl BridgeClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Read the full collection
    ///
    /// A payload that parses but is not an array is an empty
    /// collection, not an error.
    pub async fn fetch_all(&self, url: &str, use_proxy: bool) -> Result<Vec<Entry>, SyncError> {
        let body = self.request(url, use_proxy, None).await?;
        let value = parse_payload(&body)?;
        Ok(entries_from_value(&value))
    }

    /// Append one entry, returning the authoritative collection
    pub async fn add(
        &self,
        url: &str,
        use_proxy: bool,
        entry: &Entry,
    ) -> Result<Vec<Entry>, SyncError> {
        self.write(
            url,
            use_proxy,
            &BridgeRequest::Add { entry },
            "the add request failed",
        )
        .await
    }

    /// Delete by id, returning the authoritative collection
    pub async fn delete(
        &self,
        url: &str,
        use_proxy: bool,
        id: &str,
    ) -> Result<Vec<Entry>, SyncError> {
        self.write(
            url,
            use_proxy,
            &BridgeRequest::Delete { id },
            "the delete request failed",
        )
        .await
    }

    /// POST a write envelope and unwrap the response contract
    ///
    /// A missing or false `success` flag fails with the server-supplied
    /// message when there is one, else the generic failure message for
    /// the operation. A missing `entries` field on success is an empty
    /// collection.
    async fn write(
        &self,
        url: &str,
        use_proxy: bool,
        request: &BridgeRequest<'_>,
        failure: &str,
    ) -> Result<Vec<Entry>, SyncError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| SyncError::Remote(format!("could not encode request: {}", e)))?;
        let body = self.request(url, use_proxy, Some(&payload)).await?;
        let value = parse_payload(&body)?;

        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !success {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(failure);
            return Err(SyncError::Remote(message.to_string()));
        }

        Ok(entries_from_value(value.get("entries").unwrap_or(&Value::Null)))
    }

    async fn request(
        &self,
        url: &str,
        use_proxy: bool,
        payload: Option<&str>,
    ) -> Result<String, SyncError> {
        let candidates = candidate_urls(url, use_proxy);
        if candidates.is_empty() {
            return Err(SyncError::Config(
                "spreadsheet endpoint not configured".to_string(),
            ));
        }
        self.request_first_success(&candidates, payload).await
    }

    /// Try each candidate in order, returning the first 2xx body
    ///
    /// A non-2xx response or transport error is recorded and the next
    /// candidate tried; once every candidate is exhausted the last
    /// recorded error is surfaced.
    pub async fn request_first_success(
        &self,
        candidates: &[String],
        payload: Option<&str>,
    ) -> Result<String, SyncError> {
        let mut last_error = SyncError::Config("no candidate URLs to try".to_string());

        for candidate in candidates {
            debug!(url = %candidate, "attempting bridge request");

            let request = match payload {
                Some(body) => self
                    .http
                    .post(candidate)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body.to_string()),
                None => self.http.get(candidate),
            };

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .text()
                        .await
                        .map_err(|e| SyncError::Remote(e.to_string()));
                }
                Ok(response) => {
                    debug!(url = %candidate, status = %response.status(), "candidate answered non-2xx");
                    last_error = SyncError::Remote(status_message(response.status()));
                }
                Err(e) => {
                    debug!(url = %candidate, error = %e, "candidate request failed");
                    last_error = SyncError::Remote(e.to_string());
                }
            }
        }

        Err(last_error)
    }
}

/// Human-readable message for a non-success status
///
/// 403 gets its own wording: the usual cause is a bridge deployment
/// that is not shared with anonymous callers.
fn status_message(status: StatusCode) -> String {
    if status == StatusCode::FORBIDDEN {
        "HTTP 403: the endpoint denied access; make sure the bridge deployment allows anyone to call it"
            .to_string()
    } else {
        format!("HTTP {}", status.as_u16())
    }
}

/// Parse a response body as JSON, distinguishing markup from garbage
///
/// A body that opens with `<` is an error page (wrong endpoint, or a
/// relay answering with HTML) and gets its own diagnostic before any
/// JSON parsing is attempted; anything else that fails to parse is
/// quoted back truncated.
pub fn parse_payload(text: &str) -> Result<Value, SyncError> {
    let trimmed = text.trim();
    if trimmed.starts_with('<') {
        return Err(SyncError::HtmlResponse);
    }

    serde_json::from_str(trimmed).map_err(|_| SyncError::UnparseableResponse {
        preview: preview(trimmed),
    })
}

/// First `PREVIEW_LEN` characters, cut on a char boundary
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_LEN) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryDraft, EntryKind};

    const SCRIPT_URL: &str = "https://script.google.com/macros/s/abc123/exec";

    #[test]
    fn test_candidates_for_script_endpoint() {
        let candidates = candidate_urls(SCRIPT_URL, true);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].starts_with("https://api.cors.lol/?url="));
        assert!(candidates[1].starts_with("https://corsproxy.io/?url="));
        // The target is percent-encoded into the relay URL
        assert!(candidates[0].contains("script.google.com%2Fmacros"));
    }

    #[test]
    fn test_candidates_proxy_disabled() {
        assert_eq!(candidate_urls(SCRIPT_URL, false), vec![SCRIPT_URL]);
    }

    #[test]
    fn test_candidates_other_hosts_go_direct() {
        let url = "https://example.com/api";
        assert_eq!(candidate_urls(url, true), vec![url]);
    }

    #[test]
    fn test_candidates_already_proxied() {
        for url in [
            "https://corsproxy.io/?url=https%3A%2F%2Fscript.google.com%2Fx",
            "https://proxy.cors.sh/https://script.google.com/x",
            "https://api.cors.lol/?url=https%3A%2F%2Fscript.google.com%2Fx",
        ] {
            assert_eq!(candidate_urls(url, true), vec![url]);
        }
    }

    #[test]
    fn test_candidates_blank_url() {
        assert!(candidate_urls("", true).is_empty());
        assert!(candidate_urls("   ", true).is_empty());
    }

    #[test]
    fn test_candidates_trim_whitespace() {
        let padded = format!("  {}  ", SCRIPT_URL);
        let candidates = candidate_urls(&padded, false);
        assert_eq!(candidates, vec![SCRIPT_URL]);
    }

    #[test]
    fn test_parse_payload_markup() {
        assert!(matches!(
            parse_payload("<html><body>error</body></html>"),
            Err(SyncError::HtmlResponse)
        ));
        assert!(matches!(
            parse_payload("<!DOCTYPE html><html></html>"),
            Err(SyncError::HtmlResponse)
        ));
        assert!(matches!(
            parse_payload("\n  <html>"),
            Err(SyncError::HtmlResponse)
        ));
    }

    #[test]
    fn test_parse_payload_garbage_quotes_preview() {
        let err = parse_payload("definitely not json").unwrap_err();
        match err {
            SyncError::UnparseableResponse { preview } => {
                assert_eq!(preview, "definitely not json");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_preview_truncates_on_char_boundary() {
        let body = "錯".repeat(80);
        let err = parse_payload(&body).unwrap_err();
        match err {
            SyncError::UnparseableResponse { preview } => {
                assert_eq!(preview.chars().count(), 50);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_valid_json() {
        let value = parse_payload(r#"[{"id": "a"}]"#).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_status_messages() {
        let forbidden = status_message(StatusCode::FORBIDDEN);
        assert!(forbidden.contains("403"));
        assert!(forbidden.contains("denied access"));

        assert_eq!(status_message(StatusCode::BAD_GATEWAY), "HTTP 502");
        assert_eq!(status_message(StatusCode::NOT_FOUND), "HTTP 404");
    }

    #[test]
    fn test_write_envelope_shape() {
        let entry = Entry::from_draft(&EntryDraft::new("Lunch", 120.0, EntryKind::Expense, "飲食"));
        let add = serde_json::to_value(BridgeRequest::Add { entry: &entry }).unwrap();
        assert_eq!(add["action"], "add");
        assert_eq!(add["entry"]["description"], "Lunch");
        assert_eq!(add["entry"]["type"], "expense");

        let delete = serde_json::to_value(BridgeRequest::Delete { id: "abc" }).unwrap();
        assert_eq!(delete["action"], "delete");
        assert_eq!(delete["id"], "abc");
    }
}
