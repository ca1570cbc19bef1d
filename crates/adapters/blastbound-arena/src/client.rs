use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use blastbound_core::events::ArenaEvent;
use blastbound_core::session::Session;

use crate::config::ArenaClientConfig;
use crate::protocol::{
    InitRequest, InitResponse, decode_frame, encode_auth_frame, encode_join_frame,
    normalize_realtime_url,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors surfaced by the arena client's HTTP and realtime operations.
#[derive(Debug)]
pub enum ArenaError {
    /// Session init was refused or reported `success: false`.
    InitFailed(String),
    /// An outbound command failed at the network layer.
    Http(String),
    /// An outbound command was rejected by the server.
    Rejected { status: u16 },
    /// The realtime endpoint could not be interpreted.
    InvalidEndpoint(String),
}

impl std::fmt::Display for ArenaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitFailed(m) => write!(f, "arena init failed: {m}"),
            Self::Http(m) => write!(f, "arena request failed: {m}"),
            Self::Rejected { status } => write!(f, "arena rejected request: HTTP {status}"),
            Self::InvalidEndpoint(url) => write!(f, "invalid arena endpoint: {url}"),
        }
    }
}

impl std::error::Error for ArenaError {}

/// Client for one arena-backed match: the session-init call, the realtime
/// event channel, and the outbound viewer-command endpoints.
///
/// Outbound commands share nothing with the realtime channel; either side
/// can fail without affecting the other.
pub struct ArenaClient {
    http: reqwest::Client,
    api_base: String,
    session: Session,
    config: ArenaClientConfig,
}

impl ArenaClient {
    pub fn new(api_base: impl Into<String>, session: Session, config: ArenaClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("blastbound-arena/0.1")
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            api_base: api_base.into(),
            session,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Initialize the arena session for this match's stream URL.
    ///
    /// A failure here is non-fatal to the match: the orchestrator falls
    /// back to standalone mode.
    pub async fn initialize(&self) -> Result<InitResponse, ArenaError> {
        let url = format!("{}/init", self.api_base);
        let body = InitRequest {
            stream_url: self.session.stream_url.clone(),
        };
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.session.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ArenaError::InitFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ArenaError::InitFailed(format!("HTTP {status}")));
        }
        let init: InitResponse = resp
            .json()
            .await
            .map_err(|e| ArenaError::InitFailed(e.to_string()))?;
        if !init.success {
            return Err(ArenaError::InitFailed(
                "server reported unsuccessful init".to_string(),
            ));
        }
        tracing::info!(game_id = %init.game_id, arena_active = init.arena_active, "Arena session initialized");
        Ok(init)
    }

    /// Spawn the realtime connection task. Decoded events and connection
    /// transitions arrive on `tx`; the task owns reconnection.
    pub fn start_realtime(&self, tx: mpsc::UnboundedSender<ArenaEvent>) -> RealtimeHandle {
        let session = self.session.clone();
        let config = self.config.clone();
        let task = tokio::spawn(async move {
            run_connection(session, config, tx).await;
        });
        RealtimeHandle { task }
    }

    /// Send a boost on behalf of a viewer. Failure is reported to the
    /// caller and never retried.
    pub async fn send_boost(
        &self,
        player_id: &str,
        amount: u32,
        username: &str,
    ) -> Result<(), ArenaError> {
        let url = format!(
            "{}/boost/{}/{}",
            self.api_base, self.session.game_id, player_id
        );
        self.post_command(&url, &serde_json::json!({ "amount": amount, "username": username }))
            .await
    }

    /// Purchase-and-drop an item for the target player.
    pub async fn send_item_drop(
        &self,
        item_id: &str,
        target_player: &str,
    ) -> Result<(), ArenaError> {
        let url = format!("{}/items/drop/{}", self.api_base, self.session.game_id);
        self.post_command(
            &url,
            &serde_json::json!({ "itemId": item_id, "targetPlayer": target_player }),
        )
        .await
    }

    /// Point the arena session at a new stream URL.
    pub async fn update_stream_url(&self, stream_url: &str, old_url: &str) -> Result<(), ArenaError> {
        let url = format!("{}/stream-url", self.api_base);
        self.post_command(
            &url,
            &serde_json::json!({ "streamUrl": stream_url, "oldStreamUrl": old_url }),
        )
        .await
    }

    async fn post_command(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<(), ArenaError> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.session.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ArenaError::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ArenaError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Handle to the spawned realtime task. Shutting down (or dropping)
/// aborts the task; no further events will be delivered.
pub struct RealtimeHandle {
    task: JoinHandle<()>,
}

impl RealtimeHandle {
    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Connection loop: dial, authenticate, join the session room, then relay
/// frames until the socket drops. Reconnects with capped backoff; the
/// join handshake is re-executed explicitly on every successful dial.
async fn run_connection(
    session: Session,
    config: ArenaClientConfig,
    tx: mpsc::UnboundedSender<ArenaEvent>,
) {
    let url = match normalize_realtime_url(&session.websocket_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "Arena realtime endpoint unusable");
            return;
        },
    };

    let mut failures = 0u32;
    loop {
        match connect(&url, &session, &config).await {
            Ok(mut ws) => {
                match join_session(&mut ws, &session.game_id).await {
                    Ok(()) => {
                        failures = 0;
                        tracing::info!(game_id = %session.game_id, "Arena realtime connected");
                        if tx
                            .send(ArenaEvent::ConnectionChanged { connected: true })
                            .is_err()
                        {
                            return;
                        }
                        read_loop(&mut ws, &tx).await;
                        if tx
                            .send(ArenaEvent::ConnectionChanged { connected: false })
                            .is_err()
                        {
                            return;
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Arena room join failed");
                    },
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, attempt = failures + 1, "Arena connect failed");
            },
        }

        failures += 1;
        if failures > config.max_reconnect_attempts {
            tracing::error!(
                attempts = config.max_reconnect_attempts,
                "Arena reconnect budget exhausted; realtime channel stays down"
            );
            return;
        }
        let delay = jittered_ms(config.backoff_delay_ms(failures - 1), config.jitter);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// Phase one: dial the socket and present credentials.
async fn connect(
    url: &str,
    session: &Session,
    config: &ArenaClientConfig,
) -> Result<WsStream, String> {
    let dial = connect_async(url);
    let (mut ws, _) = tokio::time::timeout(Duration::from_millis(config.connect_timeout_ms), dial)
        .await
        .map_err(|_| "connect timed out".to_string())?
        .map_err(|e| e.to_string())?;
    ws.send(Message::Text(encode_auth_frame(session).into()))
        .await
        .map_err(|e| e.to_string())?;
    Ok(ws)
}

/// Phase two: join the session-scoped room so events reach this match.
async fn join_session(ws: &mut WsStream, game_id: &str) -> Result<(), String> {
    ws.send(Message::Text(encode_join_frame(game_id).into()))
        .await
        .map_err(|e| e.to_string())
}

async fn read_loop(ws: &mut WsStream, tx: &mpsc::UnboundedSender<ArenaEvent>) {
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => match decode_frame(text.as_str()) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                },
                Ok(None) => {},
                Err(e) => {
                    tracing::warn!(error = %e, "Undecodable arena frame");
                },
            },
            Ok(Message::Close(_)) => return,
            Ok(_) => {},
            Err(e) => {
                tracing::warn!(error = %e, "Arena socket error");
                return;
            },
        }
    }
}

/// Apply ±jitter to a backoff delay.
fn jittered_ms(delay_ms: u64, jitter: f64) -> u64 {
    let factor = 1.0 + jitter * rand::rng().random_range(-1.0..=1.0);
    (delay_ms as f64 * factor).max(0.0) as u64
}
