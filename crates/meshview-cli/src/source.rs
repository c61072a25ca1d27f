//! Snapshot sources: local files, stdin and the explorer backend.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use tracing::{debug, info};
use url::Url;

use meshview_core::{Error, Result, Snapshot};

use crate::options::SourceSpec;

/// Backend endpoint serving the peer graph as a JSON array of nodes.
pub const PEER_GRAPH_PATH: &str = "api/network/peergraph";

/// Backend endpoint serving a prebuilt DAG description as plain text.
pub const DAG_PATH: &str = "api/network/dag";

/// Something that can produce one refresh worth of network data.
pub trait SnapshotSource {
    /// Human readable location for log lines.
    fn describe(&self) -> String;

    /// Fetch and validate the peer adjacency snapshot.
    fn peer_graph(&self) -> Result<Snapshot>;

    /// Fetch the raw DAG text, passed through without interpretation.
    fn dag(&self) -> Result<String>;
}

/// Open the source a resolved [`SourceSpec`] points at.
pub fn open_source(spec: &SourceSpec) -> Result<Box<dyn SnapshotSource>> {
    Ok(match spec {
        SourceSpec::Stdin => Box::new(FileSource::stdin()),
        SourceSpec::File(path) => Box::new(FileSource::path(path.clone())),
        SourceSpec::Http { url, timeout } => Box::new(HttpSource::new(url, *timeout)?),
    })
}

// ============================================================================
// Files
// ============================================================================

/// Reads the whole resource from a file or stdin.
///
/// The same content serves both `peer_graph` (parsed as JSON) and `dag`
/// (returned as is).
pub struct FileSource {
    path: Option<PathBuf>,
}

impl FileSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn stdin() -> Self {
        Self { path: None }
    }

    fn read(&self) -> Result<String> {
        match &self.path {
            Some(path) => fs::read_to_string(path).map_err(|err| {
                Error::from(err)
                    .with_operation("source::file")
                    .with_context("path", path.display().to_string())
            }),
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|err| Error::from(err).with_operation("source::stdin"))?;
                Ok(text)
            }
        }
    }
}

impl SnapshotSource for FileSource {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "<stdin>".to_string(),
        }
    }

    fn peer_graph(&self) -> Result<Snapshot> {
        let text = self.read()?;
        Snapshot::from_json(&text).map_err(|err| err.with_context("source", self.describe()))
    }

    fn dag(&self) -> Result<String> {
        self.read()
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Blocking client for the explorer backend.
pub struct HttpSource {
    base: Url,
    client: Client,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            Error::config_invalid("unable to build http client")
                .with_operation("source::http")
                .set_source(err)
        })?;
        Self::with_client(base, client)
    }

    /// Use a preconfigured client, e.g. one without proxy lookup.
    pub fn with_client(base: &str, client: Client) -> Result<Self> {
        Ok(Self {
            base: parse_base_url(base)?,
            client,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|err| {
            Error::invalid_argument(format!("invalid endpoint path '{path}'"))
                .with_operation("source::http")
                .set_source(err)
        })
    }

    fn get(&self, path: &str, accept: &str) -> Result<(Url, Response)> {
        let url = self.endpoint(path)?;
        debug!(%url, "fetching");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, accept)
            .send()
            .map_err(|err| transport_error(err, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch_failed(format!("unexpected status {status}"))
                .with_operation("source::http")
                .with_context("url", url.to_string())
                .with_context("status", status.as_u16().to_string()));
        }
        Ok((url, response))
    }
}

impl SnapshotSource for HttpSource {
    fn describe(&self) -> String {
        self.base.to_string()
    }

    fn peer_graph(&self) -> Result<Snapshot> {
        let (url, response) = self.get(PEER_GRAPH_PATH, "application/json")?;
        let body = response.bytes().map_err(|err| transport_error(err, &url))?;
        let snapshot = Snapshot::from_slice(&body)
            .map_err(|err| err.with_context("url", url.to_string()))?;
        info!(%url, nodes = snapshot.len(), "fetched peer graph");
        Ok(snapshot)
    }

    fn dag(&self) -> Result<String> {
        let (url, response) = self.get(DAG_PATH, "text/plain")?;
        let text = response.text().map_err(|err| transport_error(err, &url))?;
        info!(%url, bytes = text.len(), "fetched dag");
        Ok(text)
    }
}

/// Parse the backend base URL, keeping any path prefix as a directory.
fn parse_base_url(base: &str) -> Result<Url> {
    let mut url = Url::parse(base.trim()).map_err(|err| {
        Error::invalid_argument(format!("invalid backend url '{base}'"))
            .with_operation("source::http")
            .set_source(err)
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(
            Error::invalid_argument(format!("unsupported url scheme '{}'", url.scheme()))
                .with_operation("source::http")
                .with_context("url", base),
        );
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn transport_error(err: reqwest::Error, url: &Url) -> Error {
    let error = if err.is_timeout() {
        Error::timeout(format!("request to {url} timed out"))
    } else {
        Error::fetch_failed(format!("request to {url} failed"))
    };
    error
        .with_operation("source::http")
        .with_context("url", url.to_string())
        .set_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_core::ErrorKind;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve exactly one canned HTTP response and return the base URL.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/explorer"), handle)
    }

    fn local_source(base: &str) -> HttpSource {
        local_source_with_timeout(base, Duration::from_secs(5))
    }

    fn local_source_with_timeout(base: &str, timeout: Duration) -> HttpSource {
        let client = Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpSource::with_client(base, client).unwrap()
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let source = local_source("http://node:8080/explorer");
        assert_eq!(
            source.endpoint(PEER_GRAPH_PATH).unwrap().as_str(),
            "http://node:8080/explorer/api/network/peergraph"
        );

        let source = local_source("http://node:8080");
        assert_eq!(
            source.endpoint(DAG_PATH).unwrap().as_str(),
            "http://node:8080/api/network/dag"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = parse_base_url("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = parse_base_url("ftp://node").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_fetch_peer_graph() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":"a-1","peers":["b-2"],"self":true},{"id":"b-2","peers":["a-1"],"self":false}]"#,
        );
        let snapshot = local_source(&base).peer_graph().unwrap();
        assert_eq!(snapshot.len(), 2);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /explorer/api/network/peergraph "));
    }

    #[test]
    fn test_fetch_dag_passthrough() {
        let (base, server) = serve_once("200 OK", "digraph { a -> b }");
        let text = local_source(&base).dag().unwrap();
        assert_eq!(text, "digraph { a -> b }");
        server.join().unwrap();
    }

    #[test]
    fn test_non_success_status() {
        let (base, server) = serve_once("500 Internal Server Error", "boom");
        let err = local_source(&base).peer_graph().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FetchFailed);
        assert_eq!(err.context_value("status"), Some("500"));
        server.join().unwrap();
    }

    #[test]
    fn test_silent_backend_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (release, held) = mpsc::channel::<()>();
        let server = thread::spawn(move || {
            // hold the connection open without answering
            let (_stream, _) = listener.accept().unwrap();
            let _ = held.recv();
        });

        let source =
            local_source_with_timeout(&format!("http://{addr}"), Duration::from_millis(300));
        let err = source.peer_graph().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());
        assert_eq!(
            err.context_value("url"),
            Some(format!("http://{addr}/api/network/peergraph").as_str())
        );

        release.send(()).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_malformed_body() {
        let (base, server) = serve_once("200 OK", r#"{"nodes": []}"#);
        let err = local_source(&base).peer_graph().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSnapshot);
        assert!(err.context_value("url").is_some());
        server.join().unwrap();
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id":"x","peers":[],"self":true}}]"#).unwrap();
        let source = FileSource::path(file.path());
        assert_eq!(source.peer_graph().unwrap().len(), 1);
        assert!(source.dag().unwrap().starts_with('['));

        let err = FileSource::path("/nonexistent/graph.json").peer_graph().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }
}
