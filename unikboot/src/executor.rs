//! # Low-Level Access to the Container Runtime
//!
//! The executor is the component that talks to the container engine. It
//! shapes requests for the handful of container operations the boot workflow
//! needs and interprets the answers, nothing more.
//!
//! ## Design
//!
//! [ContainerRuntime] is the seam between the workflow and the engine. The
//! [crate::runner::ContainerRunner] and [crate::image::ImageBuilder] only
//! depend on the trait, so a fake runtime can stand in for the engine in
//! tests.
//!
//! ## Implementation
//!
//! [DockerExecutor] implements the trait against the Docker Engine API served
//! on a Unix socket. Its connection settings are given explicitly, see
//! [crate::builder::executor::DockerExecutorBuilder] to discover them from the
//! environment.
use std::path::PathBuf;

use async_trait::async_trait;
use hyper::{Body, Client, Method, Request, StatusCode};
use hyperlocal::{UnixClientExt, UnixConnector, Uri};
use tracing::{debug, error, instrument, trace};
use url::form_urlencoded;

use unikboot_models::models::{
    ContainerCreateResponse, ContainerSpec, ContainerWaitResponse, ErrorResponse,
};

/// Engine API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "1.41";

/// Operations the boot workflow performs on a container engine
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create an anonymous container and return its ID
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ExecuteError>;
    async fn start_container(&self, id: &str) -> Result<(), ExecuteError>;
    /// Block until the container stops and return its exit code
    async fn wait_container(&self, id: &str) -> Result<i64, ExecuteError>;
    /// Read the container output, stdout and stderr combined
    async fn container_logs(&self, id: &str, options: &LogsOptions)
        -> Result<String, ExecuteError>;
    async fn remove_container(&self, id: &str) -> Result<(), ExecuteError>;
}

#[derive(thiserror::Error, Debug)]
pub enum ExecuteError {
    #[error("Could not send request on {}, reason: {}", endpoint(.0), .1)]
    Request(hyper::Uri, String),
    #[error("Request on {} failed with status {}: {}", endpoint(.0), .1, .2)]
    Status(hyper::Uri, StatusCode, String),
    #[error("Could not process json payload, reason: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected answer from the container engine: {0}")]
    Response(String),
    #[error("Returned non zero status")]
    NonZeroExit,
}

/// Path and query of an engine url, the socket part is hex encoded by
/// hyperlocal and unreadable
fn endpoint(url: &hyper::Uri) -> &str {
    url.path_and_query().map(|p| p.as_str()).unwrap_or("/")
}

/// Selects which part of the container output is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsOptions {
    pub stdout: bool,
    pub stderr: bool,
    /// Keep the stream open until the container stops
    pub follow: bool,
    /// Number of lines from the end, or `all`
    pub tail: String,
}

impl LogsOptions {
    /// stdout and stderr, whole history, followed until the container stops
    pub fn combined() -> LogsOptions {
        LogsOptions {
            stdout: true,
            stderr: true,
            follow: true,
            tail: "all".to_string(),
        }
    }

    fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("stdout", &self.stdout.to_string())
            .append_pair("stderr", &self.stderr.to_string())
            .append_pair("follow", &self.follow.to_string())
            .append_pair("tail", &self.tail)
            .finish()
    }
}

impl Default for LogsOptions {
    fn default() -> Self {
        Self::combined()
    }
}

/// Docker Engine API client bound to a Unix socket
#[derive(Debug)]
pub struct DockerExecutor {
    /// Path to the engine socket, usually `/var/run/docker.sock`
    socket: PathBuf,
    /// Engine API version, without the `v` prefix
    api_version: String,
    client: Client<UnixConnector>,
}

impl DockerExecutor {
    pub fn new(socket: PathBuf, api_version: String) -> DockerExecutor {
        DockerExecutor {
            socket,
            api_version,
            client: Client::unix(),
        }
    }

    pub fn socket(&self) -> &PathBuf {
        &self.socket
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn url(&self, path: &str) -> hyper::Uri {
        Uri::new(&self.socket, &format!("/v{}{}", self.api_version, path)).into()
    }

    /// Send a request to the engine and return the body of a successful answer
    #[instrument(skip_all, fields(method = %method, url = %url))]
    async fn send_request(
        &self,
        method: Method,
        url: hyper::Uri,
        body: Option<String>,
    ) -> Result<hyper::body::Bytes, ExecuteError> {
        debug!("Send request to engine");
        let mut request = Request::builder()
            .method(method)
            .uri(url.clone())
            .header("Accept", "application/json");
        let body = match body {
            Some(body) => {
                trace!("Request body: {}", body);
                request = request.header("Content-Type", "application/json");
                Body::from(body)
            }
            None => Body::empty(),
        };
        let request = request
            .body(body)
            .map_err(|e| ExecuteError::Request(url.clone(), e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ExecuteError::Request(url.clone(), e.to_string()))?;

        let status = response.status();
        trace!("Response status: {:#?}", status);
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| ExecuteError::Request(url.clone(), e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ErrorResponse>(&bytes) {
                Ok(err) => err.message,
                Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
            };
            error!("Request to engine failed [{}]: {}", status, message);
            return Err(ExecuteError::Status(url, status, message));
        }

        Ok(bytes)
    }
}

#[async_trait]
impl ContainerRuntime for DockerExecutor {
    #[instrument(skip_all, fields(image = %spec.image))]
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ExecuteError> {
        let json = serde_json::to_string(spec)?;
        let body = self
            .send_request(Method::POST, self.url("/containers/create"), Some(json))
            .await?;
        let created: ContainerCreateResponse = serde_json::from_slice(&body)?;
        for warning in created.warnings.iter().flatten() {
            debug!("Engine warning on create: {}", warning);
        }
        if created.id.is_empty() {
            return Err(ExecuteError::Response(
                "container created without an id".to_string(),
            ));
        }
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn start_container(&self, id: &str) -> Result<(), ExecuteError> {
        let url = self.url(&format!("/containers/{}/start", id));
        self.send_request(Method::POST, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn wait_container(&self, id: &str) -> Result<i64, ExecuteError> {
        let url = self.url(&format!("/containers/{}/wait", id));
        let body = self.send_request(Method::POST, url, None).await?;
        let waited: ContainerWaitResponse = serde_json::from_slice(&body)?;
        if let Some(message) = waited.error.and_then(|e| e.message) {
            if !message.is_empty() {
                return Err(ExecuteError::Response(message));
            }
        }
        Ok(waited.status_code)
    }

    #[instrument(skip(self, options))]
    async fn container_logs(
        &self,
        id: &str,
        options: &LogsOptions,
    ) -> Result<String, ExecuteError> {
        let url = self.url(&format!("/containers/{}/logs?{}", id, options.to_query()));
        let body = self.send_request(Method::GET, url, None).await?;
        Ok(demux_logs(&body))
    }

    #[instrument(skip(self))]
    async fn remove_container(&self, id: &str) -> Result<(), ExecuteError> {
        let url = self.url(&format!("/containers/{}", id));
        self.send_request(Method::DELETE, url, None).await?;
        Ok(())
    }
}

/// Length of the header preceding each frame of a non-TTY log stream
const FRAME_HEADER_LEN: usize = 8;

/// Flatten the engine log stream into plain text.
///
/// Containers without a TTY get their output multiplexed in frames: one byte
/// for the stream (0 stdin, 1 stdout, 2 stderr), three zero bytes, then the
/// big-endian payload length. Anything that doesn't look like a frame is
/// taken as raw TTY output.
pub fn demux_logs(raw: &[u8]) -> String {
    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        if rest.len() < FRAME_HEADER_LEN || rest[0] > 2 || rest[1..4] != [0, 0, 0] {
            out.extend_from_slice(rest);
            break;
        }
        let len = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let end = (FRAME_HEADER_LEN + len).min(rest.len());
        out.extend_from_slice(&rest[FRAME_HEADER_LEN..end]);
        rest = &rest[end..];
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        os::unix::net::UnixListener,
        path::Path,
        thread,
    };

    use super::*;

    fn frame(stream: u8, payload: &str) -> Vec<u8> {
        let mut f = vec![stream, 0, 0, 0];
        f.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        f.extend_from_slice(payload.as_bytes());
        f
    }

    #[test]
    fn demux_interleaved_frames() {
        let mut raw = frame(1, "creating image\n");
        raw.extend(frame(2, "losetup: no free loop device\n"));
        raw.extend(frame(1, "done\n"));
        assert_eq!(
            demux_logs(&raw),
            "creating image\nlosetup: no free loop device\ndone\n"
        );
    }

    #[test]
    fn demux_raw_tty_output() {
        assert_eq!(demux_logs(b"plain output\n"), "plain output\n");
    }

    #[test]
    fn demux_truncated_frame() {
        let mut raw = frame(1, "complete\n");
        raw.extend_from_slice(&[2, 0, 0, 0, 0, 0, 0, 100]);
        raw.extend_from_slice(b"cut");
        assert_eq!(demux_logs(&raw), "complete\ncut");
    }

    #[test]
    fn demux_empty() {
        assert_eq!(demux_logs(&[]), "");
    }

    #[test]
    fn logs_query() {
        assert_eq!(
            LogsOptions::combined().to_query(),
            "stdout=true&stderr=true&follow=true&tail=all"
        );
    }

    #[test]
    fn versioned_url() {
        let executor = DockerExecutor::new(
            PathBuf::from("/var/run/docker.sock"),
            DEFAULT_API_VERSION.to_string(),
        );
        let url = executor.url("/containers/create");
        assert_eq!(url.path(), "/v1.41/containers/create");
    }

    #[tokio::test]
    async fn unreachable_socket_is_a_request_error() {
        let dir = tempfile::tempdir().unwrap();
        let executor = DockerExecutor::new(
            dir.path().join("missing.sock"),
            DEFAULT_API_VERSION.to_string(),
        );
        let result = executor.start_container("abc").await;
        let err = result.unwrap_err();
        assert!(matches!(err, ExecuteError::Request(_, _)));
        let message = err.to_string();
        assert!(message.contains("/v1.41/containers/abc/start"));
        assert!(!message.contains("unix://"));
    }

    /// Engine answering a single request on a Unix socket with a canned
    /// response. The join handle gives back the raw request it received.
    fn fake_engine(
        dir: &Path,
        status: &str,
        body: &[u8],
    ) -> (DockerExecutor, thread::JoinHandle<String>) {
        let sock = dir.join("engine.sock");
        let listener = UnixListener::bind(&sock).unwrap();
        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let head_end = request.windows(4).position(|w| w == b"\r\n\r\n");
                if let Some(end) = head_end {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .map(|v| v.trim().parse::<usize>().unwrap())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            stream.write_all(&response).unwrap();
            String::from_utf8(request).unwrap()
        });

        let executor = DockerExecutor::new(sock, DEFAULT_API_VERSION.to_string());
        (executor, handle)
    }

    fn boot_creator_spec() -> ContainerSpec {
        let mut spec = ContainerSpec::new("boot-creator".to_string());
        spec.cmd = vec!["-d".to_string(), "/opt/vol".to_string()];
        spec.host_config.binds = vec!["/tmp/stage:/opt/vol".to_string()];
        spec.host_config.privileged = true;
        spec
    }

    #[tokio::test]
    async fn create_posts_spec_and_returns_id() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) = fake_engine(
            dir.path(),
            "201 Created",
            br#"{"Id":"abc","Warnings":["low memory"]}"#,
        );

        let id = executor
            .create_container(&boot_creator_spec())
            .await
            .unwrap();
        assert_eq!(id, "abc");

        let request = engine.join().unwrap();
        assert!(request.starts_with("POST /v1.41/containers/create HTTP/1.1\r\n"));
        assert!(request.ends_with(
            r#"{"Image":"boot-creator","Cmd":["-d","/opt/vol"],"HostConfig":{"Binds":["/tmp/stage:/opt/vol"],"Privileged":true}}"#
        ));
    }

    #[tokio::test]
    async fn create_without_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) =
            fake_engine(dir.path(), "201 Created", br#"{"Id":"","Warnings":null}"#);

        let result = executor.create_container(&boot_creator_spec()).await;
        assert!(matches!(result, Err(ExecuteError::Response(_))));
        engine.join().unwrap();
    }

    #[tokio::test]
    async fn engine_error_message_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) = fake_engine(
            dir.path(),
            "404 Not Found",
            br#"{"message":"No such image: boot-creator"}"#,
        );

        let result = executor.create_container(&boot_creator_spec()).await;
        match result {
            Err(ExecuteError::Status(_, status, message)) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "No such image: boot-creator");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        engine.join().unwrap();
    }

    #[tokio::test]
    async fn engine_error_without_json_body() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) =
            fake_engine(dir.path(), "500 Internal Server Error", b"daemon exploded");

        let result = executor.remove_container("abc").await;
        match result {
            Err(ExecuteError::Status(_, status, message)) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "daemon exploded");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        engine.join().unwrap();
    }

    #[tokio::test]
    async fn start_posts_to_container() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) = fake_engine(dir.path(), "204 No Content", b"");

        executor.start_container("abc").await.unwrap();
        let request = engine.join().unwrap();
        assert!(request.starts_with("POST /v1.41/containers/abc/start HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn wait_returns_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) =
            fake_engine(dir.path(), "200 OK", br#"{"StatusCode":137,"Error":null}"#);

        assert_eq!(executor.wait_container("abc").await.unwrap(), 137);
        let request = engine.join().unwrap();
        assert!(request.starts_with("POST /v1.41/containers/abc/wait HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn wait_error_message_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) = fake_engine(
            dir.path(),
            "200 OK",
            br#"{"StatusCode":0,"Error":{"Message":"container vanished"}}"#,
        );

        let result = executor.wait_container("abc").await;
        match result {
            Err(ExecuteError::Response(message)) => assert_eq!(message, "container vanished"),
            other => panic!("unexpected result: {:?}", other),
        }
        engine.join().unwrap();
    }

    #[tokio::test]
    async fn logs_are_fetched_and_demuxed() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = frame(1, "building volume\n");
        body.extend(frame(2, "mount: permission denied\n"));
        let (executor, engine) = fake_engine(dir.path(), "200 OK", &body);

        let logs = executor
            .container_logs("abc", &LogsOptions::combined())
            .await
            .unwrap();
        assert_eq!(logs, "building volume\nmount: permission denied\n");
        let request = engine.join().unwrap();
        assert!(request.starts_with(
            "GET /v1.41/containers/abc/logs?stdout=true&stderr=true&follow=true&tail=all HTTP/1.1\r\n"
        ));
    }

    #[tokio::test]
    async fn remove_deletes_container() {
        let dir = tempfile::tempdir().unwrap();
        let (executor, engine) = fake_engine(dir.path(), "204 No Content", b"");

        executor.remove_container("abc").await.unwrap();
        let request = engine.join().unwrap();
        assert!(request.starts_with("DELETE /v1.41/containers/abc HTTP/1.1\r\n"));
    }
}
