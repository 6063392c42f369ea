//! Loads results and expectations files for the engine.
//!
//! Supported URL schemes:
//! - `http`, `https`: fetched with `reqwest`
//! - `file`: read from the local filesystem
//!
//! Files may be plain JSON or wrapped in a JSONP callback
//! (`ADD_RESULTS({...});`), as the bots publish them.

use anyhow::{Error, anyhow, bail};
use log::{debug, warn};
use page_sync::{EngineEvent, EventSender, LoadRequest, ResourceId, ResourceLoader};
use reqwest::get as reqwest_get;
use serde_json::Value;
use tokio::fs::read as tokio_fs_read;
use tokio::spawn;
use url::Url;

/// Starts one tokio task per request and sends the parsed payload back to
/// the engine. Failed loads are logged; the engine keeps waiting for them.
pub struct FetchLoader {
    page_url: Url,
    events: EventSender,
}

impl FetchLoader {
    pub const fn new(page_url: Url, events: EventSender) -> Self {
        Self { page_url, events }
    }
}

impl ResourceLoader for FetchLoader {
    fn request_load(&mut self, request: LoadRequest) {
        let url = match self.page_url.join(&request.path) {
            Ok(url) => url,
            Err(err) => {
                warn!("FetchLoader: cannot resolve {}: {err}", request.path);
                return;
            }
        };
        debug!("FetchLoader: loading {} from {url}", request.id);
        let events = self.events.clone();
        spawn(async move {
            let payload = match fetch_json(&url).await {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("FetchLoader: failed to load {url}: {err:#}");
                    return;
                }
            };
            let event = match request.id {
                ResourceId::Results(_) => EngineEvent::Results(payload),
                id @ ResourceId::Expectations => EngineEvent::Arrived { id, payload },
            };
            if events.send(event).is_err() {
                debug!("FetchLoader: engine stopped before {url} arrived");
            }
        });
    }
}

/// Fetch `url` and parse it as (possibly JSONP-wrapped) JSON.
///
/// # Errors
/// Returns an error if the scheme is unsupported, the fetch fails or the
/// body is not JSON.
pub async fn fetch_json(url: &Url) -> Result<Value, Error> {
    let text = match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| anyhow!("Invalid file path for file url: {url}"))?;
            let bytes = tokio_fs_read(path).await?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        "http" | "https" => {
            let response = reqwest_get(url.clone())
                .await
                .map_err(|err| anyhow!("Failed to fetch URL {url}: {err}"))?;
            if !response.status().is_success() {
                bail!("Failed to fetch URL: {url} (Status: {})", response.status());
            }
            response.text().await?
        }
        scheme => bail!("Unsupported url scheme {scheme}"),
    };
    parse_payload(&text)
}

/// Parse a payload, unwrapping a `CALLBACK(...)` JSONP wrapper if present.
///
/// # Errors
/// Returns an error if the (unwrapped) body is not valid JSON.
pub fn parse_payload(text: &str) -> Result<Value, Error> {
    Ok(serde_json::from_str(strip_jsonp(text))?)
}

fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find('(') else {
        return trimmed;
    };
    let (callback, rest) = trimmed.split_at(open);
    let is_callback = !callback.is_empty()
        && callback
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '_' | '$'));
    if !is_callback {
        return trimmed;
    }
    let body = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    body.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_sync::event_channel;
    use serde_json::json;
    use std::fs::write as write_file;
    use std::io::Write as _;

    #[test]
    fn plain_json() {
        assert_eq!(parse_payload(" {\"a\": [1]} \n").unwrap(), json!({"a": [1]}));
    }

    #[test]
    fn jsonp_wrapper() {
        assert_eq!(
            parse_payload("ADD_RESULTS({\"Webkit\": {\"tests\": {}}, \"version\": 3});\n").unwrap(),
            json!({"Webkit": {"tests": {}}, "version": 3})
        );
        assert_eq!(parse_payload("ADD_EXPECTATIONS([1,2])").unwrap(), json!([1, 2]));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_payload("ADD_RESULTS({").is_err());
        assert!(parse_payload("not json").is_err());
    }

    #[tokio::test]
    async fn fetches_file_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ADD_EXPECTATIONS({{\"fast/a.html\": \"PASS\"}});").unwrap();
        let url = Url::from_file_path(file.path()).unwrap();

        let payload = fetch_json(&url).await.unwrap();

        assert_eq!(payload, json!({"fast/a.html": "PASS"}));
    }

    #[tokio::test]
    async fn unsupported_scheme() {
        let url = Url::parse("ftp://example.com/results.json").unwrap();
        assert!(fetch_json(&url).await.is_err());
    }

    #[tokio::test]
    async fn delivers_results_as_bundles() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.json");
        write_file(&results, "ADD_RESULTS({\"A\": {}, \"version\": 1});").unwrap();
        let page_url = Url::from_file_path(dir.path().join("dashboard.html")).unwrap();
        let (sender, mut receiver) = event_channel();
        let mut loader = FetchLoader::new(page_url, sender);

        loader.request_load(LoadRequest {
            id: ResourceId::results("A"),
            path: String::from("results.json"),
        });

        assert_eq!(
            receiver.recv().await,
            Some(EngineEvent::Results(json!({"A": {}, "version": 1})))
        );
    }
}
