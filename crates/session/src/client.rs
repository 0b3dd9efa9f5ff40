//! CDP client - the core communication layer.
//!
//! Design decisions:
//! 1. One WebSocket per client. A single spawned reader task owns the
//!    receive side for the life of the connection.
//! 2. Request/response matching via id with a oneshot per pending
//!    command - waiters are notified, never busy-polled.
//! 3. Writers serialize on a lock around the sink so concurrent senders
//!    cannot interleave partial frames.
//! 4. When the stream closes, pending waiters fail immediately with
//!    `Closed` instead of running out their timeouts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, RwLock};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;
use uuid::Uuid;

use crate::codec::{self, FrameDecoder};
use crate::error::{CdpError, Result};
use crate::protocol::{
    AttachToTargetResult, CdpCommand, CdpMessage, CdpResponse, CommandId, SessionId, TargetInfo,
};
use crate::registry::{CallbackRegistry, EventCallback};
use crate::store::MessageStore;
use crate::versions::{self, VersionCatalog};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Instance id used in log context.
    pub id: String,
    /// Debugging endpoint, `ws://` or `wss://`.
    pub url: String,
    /// Requested protocol major version; resolved to the nearest
    /// supported one.
    pub version: u32,
    /// Per-command response window.
    pub command_timeout: Duration,
    /// Worker tasks in the event dispatch pool.
    pub dispatch_workers: usize,
    /// Dispatch queue depth before backpressure.
    pub dispatch_queue: usize,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, version: u32) -> Self {
        Self {
            url: url.into(),
            version,
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            url: "ws://localhost:9222/devtools/browser".to_string(),
            version: versions::LATEST_VERSION,
            command_timeout: Duration::from_secs(10),
            dispatch_workers: 4,
            dispatch_queue: 1024,
        }
    }
}

/// CDP client bound to one page target over one WebSocket connection.
pub struct CdpClient {
    config: ClientConfig,
    catalog: &'static VersionCatalog,
    next_id: AtomicU64,
    pending: DashMap<CommandId, oneshot::Sender<CdpResponse>>,
    store: MessageStore,
    registry: CallbackRegistry,
    ws_sink: RwLock<WsSink>,
    session_id: OnceLock<SessionId>,
}

impl CdpClient {
    /// Connects to the debugging endpoint, starts the reader loop, and
    /// binds a session to the first page target.
    ///
    /// Handshake failure is fatal - no retry is attempted here.
    pub async fn connect(config: ClientConfig) -> Result<Arc<Self>> {
        let endpoint = Url::parse(&config.url)
            .map_err(|e| CdpError::InvalidEndpoint(format!("{}: {e}", config.url)))?;
        if endpoint.scheme() != "ws" && endpoint.scheme() != "wss" {
            return Err(CdpError::InvalidEndpoint(format!(
                "{}: expected a ws:// or wss:// URL",
                config.url
            )));
        }

        let catalog = versions::load(config.version);
        tracing::info!(
            client = %config.id,
            url = %config.url,
            requested = config.version,
            loaded = catalog.version,
            "connecting to debugging endpoint"
        );

        let (ws_stream, _) = connect_async(config.url.as_str()).await?;
        let (sink, stream) = ws_stream.split();

        let client = Arc::new(Self {
            catalog,
            next_id: AtomicU64::new(1),
            pending: DashMap::new(),
            store: MessageStore::new(),
            registry: CallbackRegistry::new(config.dispatch_workers, config.dispatch_queue),
            ws_sink: RwLock::new(sink),
            session_id: OnceLock::new(),
            config,
        });

        tokio::spawn(Self::run_reader(Arc::clone(&client), stream));

        if let Err(e) = client.bind_session().await {
            // The reader task holds its own Arc; shut the sink so it
            // observes end-of-stream and exits instead of leaking the
            // socket on a failed construction.
            let _ = client.close().await;
            return Err(e);
        }
        Ok(client)
    }

    /// Sends a command scoped to the bound session and waits for its
    /// response.
    pub async fn send_command(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> Result<Value> {
        let session_id = self.session_id.get().cloned();
        self.send_with_session(method.into(), params, session_id).await
    }

    /// Sends a command with no session scope. Used for `Target.*`
    /// bootstrap traffic and browser-level methods.
    pub async fn send_command_unscoped(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> Result<Value> {
        self.send_with_session(method.into(), params, None).await
    }

    /// Subscribes `callback` to every inbound event named `event`. The
    /// callback receives the event's `params` and runs on the dispatch
    /// pool, never on the reader loop.
    pub fn on<F>(&self, event: impl Into<String>, callback: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.registry.on(event, Arc::new(callback) as EventCallback);
    }

    /// Session id recorded at bind time.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    /// Domain catalog for the loaded protocol version.
    pub fn catalog(&self) -> &'static VersionCatalog {
        self.catalog
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of inbound messages ledgered since connection start.
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// Ledger lookup by command id. Responses stay queryable even after
    /// their caller timed out, which is the main diagnostic use.
    pub fn response_for(&self, id: CommandId) -> Option<CdpResponse> {
        self.store.response_for(id)
    }

    /// Closes the connection gracefully. Pending commands fail with
    /// `Closed` once the reader loop observes the shutdown.
    pub async fn close(&self) -> Result<()> {
        let mut sink = self.ws_sink.write().await;
        sink.close().await.map_err(CdpError::Connection)
    }

    async fn send_with_session(
        &self,
        method: String,
        params: Option<Value>,
        session_id: Option<SessionId>,
    ) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let command = CdpCommand {
            id,
            method,
            params,
            session_id,
        };
        if !self.catalog.supports_method(&command.method) {
            tracing::trace!(method = %command.method, "method not in the loaded catalog");
        }
        let frame = codec::encode(&command)?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        tracing::debug!(id, method = %command.method, "sending command");
        {
            let mut sink = self.ws_sink.write().await;
            if let Err(e) = sink.send(frame).await {
                self.pending.remove(&id);
                return Err(CdpError::Connection(e));
            }
        }

        match timeout(self.config.command_timeout, rx).await {
            Ok(Ok(response)) => {
                if let Some(error) = response.error {
                    Err(CdpError::Protocol {
                        code: error.code,
                        message: error.message,
                        data: error.data,
                    })
                } else {
                    Ok(response.result.unwrap_or(Value::Null))
                }
            }
            // Sender dropped: the reader loop exited.
            Ok(Err(_)) => Err(CdpError::Closed),
            Err(_) => {
                self.pending.remove(&id);
                Err(CdpError::Timeout {
                    method: command.method,
                    id,
                })
            }
        }
    }

    /// One-time startup sequence: enumerate targets, attach to the first
    /// page, record the session id for all subsequent commands.
    async fn bind_session(&self) -> Result<()> {
        let targets = self
            .send_command_unscoped("Target.getTargets", None)
            .await?;
        let infos: Vec<TargetInfo> = serde_json::from_value(targets["targetInfos"].clone())?;
        let page = infos
            .into_iter()
            .find(|info| info.target_type == "page")
            .ok_or(CdpError::NoPageTarget)?;

        let attached = self
            .send_command_unscoped(
                "Target.attachToTarget",
                Some(json!({"targetId": page.target_id, "flatten": true})),
            )
            .await?;
        let result: AttachToTargetResult = serde_json::from_value(attached)?;

        tracing::info!(
            client = %self.config.id,
            target = %page.target_id,
            session = %result.session_id,
            "attached to page target"
        );
        let _ = self.session_id.set(result.session_id);
        Ok(())
    }

    /// Reader loop: decode frames, classify, ledger, notify waiters,
    /// fan events out. Runs until the stream ends or errors.
    async fn run_reader(self: Arc<Self>, mut stream: WsStream) {
        let mut decoder = FrameDecoder::new();
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    decoder.push(text.as_bytes());
                    self.drain_frames(&mut decoder).await;
                }
                Ok(Message::Binary(data)) => {
                    decoder.push(&data);
                    self.drain_frames(&mut decoder).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(client = %self.config.id, "remote closed the connection");
                    break;
                }
                // Ping/pong are answered by the transport.
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(client = %self.config.id, "read failed: {e}");
                    break;
                }
            }
        }

        // Dropping the pending senders wakes every waiter with Closed
        // instead of letting them run out their timeouts.
        self.pending.clear();
        tracing::info!(client = %self.config.id, "reader loop stopped");
    }

    async fn drain_frames(&self, decoder: &mut FrameDecoder) {
        loop {
            let frame = match decoder.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("skipping malformed input: {e}");
                    continue;
                }
            };
            let message: CdpMessage = match serde_json::from_slice(&frame) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("skipping unparseable frame: {e}");
                    continue;
                }
            };
            self.store.append(message.clone());
            match message {
                CdpMessage::Response(response) => {
                    tracing::debug!(id = response.id, "received response");
                    match self.pending.remove(&response.id) {
                        Some((_, tx)) => {
                            // Receiver may have timed out already.
                            let _ = tx.send(response);
                        }
                        None => {
                            tracing::warn!(id = response.id, "response for unknown command");
                        }
                    }
                }
                CdpMessage::Event(event) => {
                    tracing::debug!(method = %event.method, "received event");
                    self.registry
                        .dispatch(&event.method, event.params.unwrap_or(Value::Null))
                        .await;
                }
            }
        }
    }
}
