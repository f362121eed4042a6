// Version feed and artifact fetcher collaborators.
// The supervisor talks to both through traits so the update cycle can be
// exercised without a live HTTP server.

use async_trait::async_trait;
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use updater_common::{HttpClientFactory, ReleaseInfo, UpdateError};

/// Reports the latest available client version.
#[async_trait]
pub trait VersionFeed: Send + Sync {
    /// Fetch the latest release descriptor from the feed.
    async fn latest(&self) -> Result<ReleaseInfo, UpdateError>;
}

/// Downloads a release artifact to a local file.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `url` to `dest`, overwriting any existing file of that name.
    /// `dest` must never be left holding a partial download.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), UpdateError>;
}

// ---------------------------------------------------------------------------
// HTTP implementations
// ---------------------------------------------------------------------------

/// [`VersionFeed`] backed by an HTTP GET against a configured URL.
pub struct HttpVersionFeed {
    client: Client,
    feed_url: String,
}

impl HttpVersionFeed {
    pub fn new(feed_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client()?,
            feed_url: feed_url.into(),
        })
    }
}

#[async_trait]
impl VersionFeed for HttpVersionFeed {
    async fn latest(&self) -> Result<ReleaseInfo, UpdateError> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| UpdateError::feed(format!("request to '{}' failed: {e}", self.feed_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::feed(format!(
                "'{}' answered HTTP {}",
                self.feed_url,
                status.as_u16()
            )));
        }

        let release: ReleaseInfo = response
            .json()
            .await
            .map_err(|e| UpdateError::feed(format!("malformed feed body: {e}")))?;

        if release.version.is_empty() {
            return Err(UpdateError::feed("feed reported an empty version"));
        }

        Ok(release)
    }
}

/// [`ArtifactFetcher`] backed by an HTTP GET, written out via temp file and
/// rename so a failed transfer never leaves a truncated artifact in place.
pub struct HttpArtifactFetcher {
    client: Client,
}

impl HttpArtifactFetcher {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client()?,
        })
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), UpdateError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::download(
                url,
                format!("server answered HTTP {}", status.as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpdateError::download(url, format!("reading body failed: {e}")))?;

        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| UpdateError::download(url, e.to_string()))?;
        tmp.write_all(&bytes)
            .map_err(|e| UpdateError::download(url, e.to_string()))?;
        tmp.persist(dest)
            .map_err(|e| UpdateError::download(url, e.error.to_string()))?;

        tracing::debug!(url, dest = %dest.display(), bytes = bytes.len(), "artifact downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn http_feed_parses_release() {
        let base = serve(Router::new().route(
            "/update",
            get(|| async { r#"{"version":"1.1.0","url":"http://host/app-1.1.0.jar"}"# }),
        ))
        .await;

        let feed = HttpVersionFeed::new(format!("{base}/update")).unwrap();
        let release = feed.latest().await.unwrap();
        assert_eq!(release.version, "1.1.0");
        assert_eq!(release.url, "http://host/app-1.1.0.jar");
    }

    #[tokio::test]
    async fn http_feed_rejects_malformed_body() {
        let base = serve(Router::new().route("/update", get(|| async { "not json" }))).await;

        let feed = HttpVersionFeed::new(format!("{base}/update")).unwrap();
        assert!(matches!(
            feed.latest().await,
            Err(UpdateError::Feed { .. })
        ));
    }

    #[tokio::test]
    async fn http_feed_rejects_empty_version() {
        let base = serve(Router::new().route(
            "/update",
            get(|| async { r#"{"version":"","url":"http://host/x.jar"}"# }),
        ))
        .await;

        let feed = HttpVersionFeed::new(format!("{base}/update")).unwrap();
        assert!(matches!(
            feed.latest().await,
            Err(UpdateError::Feed { .. })
        ));
    }

    #[tokio::test]
    async fn http_fetcher_writes_artifact() {
        let base =
            serve(Router::new().route("/app.jar", get(|| async { "artifact-bytes" }))).await;
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("1_1_0_client.jar");

        let fetcher = HttpArtifactFetcher::new().unwrap();
        fetcher
            .fetch(&format!("{base}/app.jar"), &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "artifact-bytes");
    }

    #[tokio::test]
    async fn http_fetcher_leaves_no_file_on_http_error() {
        let base = serve(Router::new()).await; // nothing routed: 404
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("1_1_0_client.jar");

        let fetcher = HttpArtifactFetcher::new().unwrap();
        let result = fetcher.fetch(&format!("{base}/app.jar"), &dest).await;
        assert!(matches!(result, Err(UpdateError::Download { .. })));
        assert!(!dest.exists());
    }
}
