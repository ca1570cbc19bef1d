use serde::{Deserialize, Serialize};

/// Identity of one arena-backed match, created once at orchestrator start
/// and immutable afterwards.
///
/// Passed explicitly to whoever needs it; there is no ambient global
/// carrying session state between screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Server-assigned match identifier, also the realtime room to join.
    pub game_id: String,
    /// Stream URL the match was initialized against.
    pub stream_url: String,
    /// Opaque bearer token for the arena API and the realtime handshake.
    pub token: String,
    /// Owning application id required by the join handshake.
    pub app_id: String,
    /// Arcade-game id required by the join handshake.
    pub arcade_game_id: String,
    /// Realtime endpoint returned by session initialization.
    pub websocket_url: String,
}
