use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use common::{DeliverySink, Error, Payload, Result};

/// A file name or destination must be a single plain path component.
fn plain_component<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let path = Path::new(value);
    if path.components().count() == 1 && path.file_name().is_some() {
        Ok(value)
    } else {
        Err(Error::Config(format!("invalid {what} '{value}'")))
    }
}

/// Writes payloads to `<root>[/<destination>]/<file_name>`, replacing any
/// previous file of the same name.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn target(&self, payload: &Payload, destination: Option<&str>) -> Result<PathBuf> {
        let mut dir = self.root.clone();
        if let Some(dest) = destination {
            dir.push(plain_component("destination", dest)?);
        }
        Ok(dir.join(plain_component("file name", &payload.file_name)?))
    }
}

#[async_trait]
impl DeliverySink for DirectorySink {
    async fn deliver(&self, payload: &Payload, destination: Option<&str>) -> Result<()> {
        let path = self.target(payload, destination)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &payload.bytes).await?;
        debug!(path = %path.display(), "Payload written");
        Ok(())
    }
}

/// POSTs each payload to a webhook endpoint.
///
/// The body is the serialized table; the file name and destination travel in
/// `X-File-Name` / `X-Destination` headers. Authentication, if any, is part of
/// the URL handed in by the caller.
pub struct WebhookSink {
    url: String,
    http: Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self::with_client(url, http))
    }

    pub fn with_client(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    fn request(&self, payload: &Payload, destination: Option<&str>) -> RequestBuilder {
        let request = self
            .http
            .post(&self.url)
            .header("Content-Type", &payload.content_type)
            .header("X-File-Name", &payload.file_name)
            .body(payload.bytes.clone());
        match destination {
            Some(dest) => request.header("X-Destination", dest),
            None => request,
        }
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    async fn deliver(&self, payload: &Payload, destination: Option<&str>) -> Result<()> {
        debug!(file = %payload.file_name, "Posting payload to webhook");
        let resp = self
            .request(payload, destination)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> Payload {
        Payload {
            file_name: name.to_string(),
            content_type: "text/csv".to_string(),
            bytes: b"Date,Code\n".to_vec(),
        }
    }

    #[test]
    fn target_nests_destination_under_root() {
        let sink = DirectorySink::new("/srv/out");
        let path = sink.target(&payload("stock_analysis_20240628.csv"), Some("daily")).unwrap();
        assert_eq!(path, PathBuf::from("/srv/out/daily/stock_analysis_20240628.csv"));
        let path = sink.target(&payload("x.csv"), None).unwrap();
        assert_eq!(path, PathBuf::from("/srv/out/x.csv"));
    }

    #[test]
    fn webhook_request_carries_name_and_destination_headers() {
        let sink = WebhookSink::new("https://hooks.example.com/upload?token=abc").unwrap();
        let request = sink
            .request(&payload("stock_candidates_20240628.csv"), Some("folder-123"))
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://hooks.example.com/upload?token=abc");
        let headers = request.headers();
        assert_eq!(headers["content-type"], "text/csv");
        assert_eq!(headers["x-file-name"], "stock_candidates_20240628.csv");
        assert_eq!(headers["x-destination"], "folder-123");
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"Date,Code\n");
    }

    #[test]
    fn webhook_request_omits_destination_when_unset() {
        let sink = WebhookSink::new("https://hooks.example.com/upload").unwrap();
        let request = sink.request(&payload("x.csv"), None).build().unwrap();
        assert!(request.headers().get("x-destination").is_none());
    }

    #[test]
    fn target_rejects_traversal() {
        let sink = DirectorySink::new("/srv/out");
        assert!(sink.target(&payload("../escape.csv"), None).is_err());
        assert!(sink.target(&payload("ok.csv"), Some("a/b")).is_err());
    }
}
