use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::OutputSink;
use crate::config::{HttpConfig, RemoteConfig};
use crate::error::{Error, Result};

/// Writes documents into a local directory, creating it when needed.
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    directory: PathBuf,
}

impl LocalFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl OutputSink for LocalFileSink {
    async fn persist(&self, filename: &str, markdown: &str) -> Result<String> {
        check_bare_filename(filename)?;
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(filename);
        tokio::fs::write(&path, markdown).await?;
        info!("Saved {} bytes to {}", markdown.len(), path.display());
        Ok(path.display().to_string())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Rejects names that would land outside the sink directory: absolute
/// paths, separators and `..`.
fn check_bare_filename(filename: &str) -> Result<()> {
    let bare = Path::new(filename)
        .file_name()
        .is_some_and(|name| name == filename);
    if bare && !filename.contains(['/', '\\']) {
        Ok(())
    } else {
        Err(Error::Invalid(format!("Not a plain file name: {}", filename)))
    }
}

/// PUTs documents to `<endpoint>/<folder>/<filename>` on a remote document
/// store.
#[derive(Debug, Clone)]
pub struct RemoteSink {
    client: Client,
    endpoint: Url,
    token: String,
    folder: String,
}

impl RemoteSink {
    pub fn new(remote: &RemoteConfig, http: &HttpConfig) -> Result<Self> {
        if remote.endpoint.is_empty() {
            return Err(Error::Config(
                "No remote endpoint configured (set remote.endpoint)".to_string(),
            ));
        }
        let endpoint =
            Url::parse(&remote.endpoint).map_err(|_| Error::InvalidUrl(remote.endpoint.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout))
            .user_agent(http.user_agent.clone())
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            token: remote.token.clone(),
            folder: remote.folder.clone(),
        })
    }

    /// Target URL for `filename`, with every path segment percent-encoded.
    pub fn target_url(&self, filename: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidUrl(self.endpoint.to_string()))?;
            segments.pop_if_empty();
            segments.extend(self.folder.split('/').filter(|s| !s.is_empty()));
            segments.push(filename);
        }
        Ok(url)
    }
}

#[async_trait]
impl OutputSink for RemoteSink {
    async fn persist(&self, filename: &str, markdown: &str) -> Result<String> {
        let url = self.target_url(filename)?;
        debug!("Uploading {} bytes to {}", markdown.len(), url);

        let mut request = self
            .client
            .put(url.clone())
            .header("Content-Type", "text/markdown")
            .body(markdown.to_string());
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                Error::Unreachable(format!("{} ({})", self.endpoint, e))
            } else {
                Error::HttpError(format!("Request failed: {}", e))
            }
        })?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                info!("Uploaded {} to {}", filename, url);
                Ok(url.to_string())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized(format!(
                "HTTP {} from {}; check remote.token",
                response.status().as_u16(),
                self.endpoint
            ))),
            status => Err(Error::HttpError(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                status.canonical_reason().unwrap_or("Unknown error")
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote(endpoint: &str, token: &str, folder: &str) -> RemoteConfig {
        RemoteConfig {
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            folder: folder.to_string(),
        }
    }

    fn remote_sink(endpoint: &str, token: &str, folder: &str) -> RemoteSink {
        RemoteSink::new(&remote(endpoint, token, folder), &HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_local_sink_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out").join("articles");
        let sink = LocalFileSink::new(&dir);

        let location = sink.persist("Hello.md", "# Hello\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("Hello.md")).unwrap(), "# Hello\n");
        assert!(location.ends_with("Hello.md"));
    }

    #[tokio::test]
    async fn test_local_sink_rejects_paths_outside_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out");
        let sink = LocalFileSink::new(&dir);

        let outside = temp.path().join("outside.md");
        let result = sink.persist(outside.to_str().unwrap(), "x").await;
        assert!(matches!(result, Err(Error::Invalid(_))));
        assert!(!outside.exists());

        let result = sink.persist("../escaped.md", "x").await;
        assert!(matches!(result, Err(Error::Invalid(_))));
        assert!(!temp.path().join("escaped.md").exists());

        for name in ["nested/a.md", "..", ""] {
            assert!(matches!(sink.persist(name, "x").await, Err(Error::Invalid(_))));
        }
        assert!(sink.persist("2024-02-10 - a.md", "x").await.is_ok());
    }

    #[test]
    fn test_target_url_encodes_segments() {
        let sink = remote_sink("https://notes.example.com/vault/", "", "Reading/Medium");
        let url = sink.target_url("A title.md").unwrap();
        assert_eq!(
            url.as_str(),
            "https://notes.example.com/vault/Reading/Medium/A%20title.md"
        );

        let bare = remote_sink("http://localhost:27123", "", "");
        assert_eq!(
            bare.target_url("x.md").unwrap().as_str(),
            "http://localhost:27123/x.md"
        );
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let result = RemoteSink::new(&remote("", "", ""), &HttpConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_upload_with_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/Clippings/Hello.md"))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "text/markdown"))
            .and(body_string("# Hello\n"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = remote_sink(&mock_server.uri(), "secret", "Clippings");
        let location = sink.persist("Hello.md", "# Hello\n").await.unwrap();
        assert!(location.ends_with("/Clippings/Hello.md"));
    }

    #[tokio::test]
    async fn test_upload_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let result = remote_sink(&mock_server.uri(), "wrong", "").persist("a.md", "x").await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_upload_other_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        match remote_sink(&mock_server.uri(), "", "").persist("a.md", "x").await {
            Err(Error::HttpError(message)) => assert!(message.contains("500")),
            other => panic!("expected HttpError, got {:?}", other),
        }

        let created = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&created)
            .await;
        assert!(remote_sink(&created.uri(), "", "").persist("a.md", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_upload_unreachable() {
        let result = remote_sink("http://127.0.0.1:1", "", "").persist("a.md", "x").await;
        assert!(matches!(result, Err(Error::Unreachable(_))));
    }
}
