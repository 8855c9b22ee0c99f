//! HTTP transport for the MCP server.
//!
//! The server listens on the loopback interface only and answers:
//!
//! - `GET /health`: `200` with `{"status":"ok"}`
//! - any other `GET`: `404` with an empty body
//! - `POST` to any path: the body is a JSON-RPC request; the reply is
//!   `200` for results and unknown methods, `500` for every other error
//! - any other HTTP method: `501`
//!
//! # Threading
//!
//! Two background threads make up a running server. The accept thread owns
//! the listener and queues incoming requests; the handler thread answers
//! them one at a time, so two snapshots are never built concurrently and
//! the thread that calls [`HttpServer::start`] is never blocked by network
//! I/O.
//!
//! Only the accept thread holds the listener. A client that stalls in the
//! middle of its body blocks the handler thread, never the accept thread,
//! so [`HttpServer::stop`] always releases the port.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::error::TransportError;
use crate::mcp::protocol::{ErrorCode, JsonRpcError};
use crate::mcp::server::{reply_to_json, McpServer};

/// Interface the server binds to.
pub const LOOPBACK: &str = "127.0.0.1";

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8765;

/// Largest request body the server will read.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How long [`HttpServer::stop`] waits for the accept thread to exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type HttpResponse = Response<io::Cursor<Vec<u8>>>;

/// Lifecycle state of an [`HttpServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No listener is open.
    Stopped,
    /// The accept thread is taking requests.
    Running,
}

/// Resources owned while the server is up.
struct RunningServer {
    server: Arc<Server>,
    addr: Option<SocketAddr>,
    shutdown: Arc<AtomicBool>,
    thread: JoinHandle<()>,
    exited: mpsc::Receiver<()>,
}

/// A loopback HTTP server feeding requests to an [`McpServer`].
pub struct HttpServer {
    port: u16,
    dispatcher: Arc<McpServer>,
    running: Mutex<Option<RunningServer>>,
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("port", &self.port)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl HttpServer {
    /// Creates a stopped server that will listen on `port`.
    ///
    /// Port `0` asks the OS for a free port; see [`Self::local_addr`].
    #[must_use]
    pub fn new(port: u16, dispatcher: Arc<McpServer>) -> Self {
        Self {
            port,
            dispatcher,
            running: Mutex::new(None),
        }
    }

    /// The configured port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServerState {
        if self.lock().is_some() {
            ServerState::Running
        } else {
            ServerState::Stopped
        }
    }

    /// The address the listener is bound to, while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock().as_ref().and_then(|r| r.addr)
    }

    /// Binds the listener and starts the accept and handler threads.
    ///
    /// Does nothing if the server is already running. A bind failure is
    /// logged and returned; the server stays stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the thread cannot be
    /// spawned.
    pub fn start(&self) -> Result<(), TransportError> {
        let mut running = self.lock();
        if running.is_some() {
            tracing::debug!(port = self.port, "Server already running");
            return Ok(());
        }

        let addr = format!("{LOOPBACK}:{}", self.port);
        let server = match Server::http(&addr) {
            Ok(server) => Arc::new(server),
            Err(e) => {
                let err = TransportError::Bind {
                    addr,
                    reason: e.to_string(),
                };
                tracing::error!(error = %err, "Failed to start server");
                return Err(err);
            }
        };
        let bound = server.server_addr().to_ip();

        let (queue, pending) = mpsc::channel::<Request>();
        let dispatcher = Arc::clone(&self.dispatcher);
        thread::Builder::new()
            .name("editor-context-mcp-handler".to_string())
            .spawn(move || {
                for request in pending {
                    handle_connection(&dispatcher, request);
                }
                tracing::debug!("Request handler exited");
            })
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to spawn request handler thread");
                TransportError::ThreadSpawn(e)
            })?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let (exited_tx, exited) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("editor-context-mcp".to_string())
            .spawn({
                let server = Arc::clone(&server);
                let shutdown = Arc::clone(&shutdown);
                move || {
                    accept(server, &queue, &shutdown);
                    let _ = exited_tx.send(());
                }
            })
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to spawn server thread");
                TransportError::ThreadSpawn(e)
            })?;

        match bound {
            Some(ip) => tracing::info!("Server started on http://{ip}"),
            None => tracing::info!("Server started on {addr}"),
        }

        *running = Some(RunningServer {
            server,
            addr: bound,
            shutdown,
            thread,
            exited,
        });
        Ok(())
    }

    /// Stops the accept thread and closes the listener.
    ///
    /// Safe to call when the server was never started. A request still
    /// being read from a slow client is left to the handler thread, which
    /// exits once that client finishes or disconnects.
    pub fn stop(&self) {
        let mut running = self.lock();
        let Some(RunningServer {
            server,
            shutdown,
            thread,
            exited,
            ..
        }) = running.take()
        else {
            return;
        };

        shutdown.store(true, Ordering::SeqCst);
        server.unblock();

        match exited.recv_timeout(SHUTDOWN_GRACE) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                if thread.join().is_err() {
                    tracing::warn!("Server thread panicked");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    grace = ?SHUTDOWN_GRACE,
                    "Server thread did not exit in time; detaching"
                );
            }
        }

        // Last reference: dropping it closes the listening socket.
        drop(server);
        tracing::info!("Server stopped");
    }

    fn lock(&self) -> MutexGuard<'_, Option<RunningServer>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Accept loop run on the server thread.
///
/// Takes ownership of its `Server` handle so the listener is released as
/// soon as the loop ends.
fn accept(server: Arc<Server>, queue: &mpsc::Sender<Request>, shutdown: &AtomicBool) {
    loop {
        match server.recv() {
            Ok(request) => {
                if queue.send(request).is_err() {
                    tracing::error!("Request handler is gone; no longer accepting");
                    break;
                }
            }
            Err(e) => {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                tracing::warn!(error = %e, "Failed to receive request");
            }
        }
    }
    drop(server);
}

/// Answers one HTTP request.
fn handle_connection(dispatcher: &McpServer, mut request: Request) {
    let method = request.method().clone();
    let response = match method {
        Method::Get => handle_get(request.url()),
        Method::Post => handle_post(dispatcher, &mut request),
        _ => Response::from_data(Vec::new()).with_status_code(501_u16),
    };

    tracing::debug!(
        %method,
        url = request.url(),
        status = response.status_code().0,
        "Handled request"
    );

    if let Err(e) = request.respond(response) {
        tracing::debug!(error = %e, "Failed to write response");
    }
}

fn handle_get(url: &str) -> HttpResponse {
    if url == "/health" {
        json_response(200, &json!({"status": "ok"}))
    } else {
        Response::from_data(Vec::new()).with_status_code(404_u16)
    }
}

fn handle_post(dispatcher: &McpServer, request: &mut Request) -> HttpResponse {
    let reply = match read_body(request) {
        Ok(body) => dispatcher.handle_body(&body),
        Err(e) => Err(JsonRpcError::internal_error(None, e.to_string())),
    };

    let status = match &reply {
        Err(error) if !error.is(ErrorCode::MethodNotFound) => {
            tracing::warn!(
                code = error.error.code,
                message = %error.error.message,
                "Request failed"
            );
            500
        }
        _ => 200,
    };

    match reply_to_json(&reply) {
        Ok(value) => json_response(status, &value),
        Err(e) => {
            let fallback = JsonRpcError::internal_error(None, e.to_string());
            json_response(500, &json!(fallback))
        }
    }
}

/// Reads exactly `Content-Length` bytes of body.
fn read_body(request: &mut Request) -> io::Result<Vec<u8>> {
    let len = request.body_length().unwrap_or(0);
    if len > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request body of {len} bytes exceeds the {MAX_BODY_BYTES} byte limit"),
        ));
    }

    let mut body = vec![0; len];
    request.as_reader().read_exact(&mut body)?;
    Ok(body)
}

fn json_response(status: u16, value: &serde_json::Value) -> HttpResponse {
    let response = Response::from_data(value.to_string().into_bytes()).with_status_code(status);
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
