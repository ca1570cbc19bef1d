use serde::{Deserialize, Serialize};
use serde_json::Value;

use blastbound_core::events::{
    ArenaEvent, BoostEvent, EncounterEvent, ItemDropEvent, ItemEffects,
};
use blastbound_core::session::Session;

/// Errors raised while decoding or building realtime frames.
#[derive(Debug)]
pub enum ProtocolError {
    EmptyFrame,
    MissingData(&'static str),
    InvalidUrl(String),
    Json(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFrame => write!(f, "empty frame"),
            Self::MissingData(field) => write!(f, "frame missing field: {field}"),
            Self::InvalidUrl(url) => write!(f, "invalid realtime url: {url}"),
            Self::Json(e) => write!(f, "frame decode error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// One JSON text frame on the realtime channel.
#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountdownData {
    #[serde(default)]
    seconds_remaining: u32,
}

/// Item-drop payloads arrive in two shapes: flat fields, or nested under
/// an `item` object. Both are accepted; missing stats default to empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemDrop {
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default)]
    item: Option<RawItem>,
    target_player: String,
    #[serde(default)]
    target_player_name: Option<String>,
    purchaser_username: String,
    #[serde(default)]
    cost: u32,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    effects: Option<ItemEffects>,
}

impl RawItemDrop {
    fn into_event(self) -> Result<ItemDropEvent, ProtocolError> {
        let nested = self.item;
        let item_id = self
            .item_id
            .or_else(|| nested.as_ref().and_then(|i| i.id.clone()))
            .ok_or(ProtocolError::MissingData("itemId"))?;
        let item_name = self
            .item_name
            .or_else(|| nested.as_ref().and_then(|i| i.name.clone()))
            .ok_or(ProtocolError::MissingData("itemName"))?;
        let effects = nested.and_then(|i| i.effects).unwrap_or_default();
        let target_player_name = self
            .target_player_name
            .unwrap_or_else(|| self.target_player.clone());
        Ok(ItemDropEvent {
            item_id,
            item_name,
            target_player: self.target_player,
            target_player_name,
            purchaser_username: self.purchaser_username,
            cost: self.cost,
            effects,
        })
    }
}

/// Decode an inbound text frame into a typed event.
///
/// Unrecognized event names are not an error; the server is free to add
/// events this client does not consume. Returns `Ok(None)` for those.
pub fn decode_frame(text: &str) -> Result<Option<ArenaEvent>, ProtocolError> {
    if text.is_empty() {
        return Err(ProtocolError::EmptyFrame);
    }
    let frame: Frame = serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))?;

    let event = match frame.event.as_str() {
        "arena_countdown_started" => Some(ArenaEvent::CountdownStarted),
        "countdown_update" => {
            let data: CountdownData = serde_json::from_value(frame.data)
                .map_err(|e| ProtocolError::Json(e.to_string()))?;
            Some(ArenaEvent::CountdownUpdate {
                seconds_remaining: data.seconds_remaining,
            })
        },
        "arena_begins" => Some(ArenaEvent::MatchBegins),
        "arena_ends" => Some(ArenaEvent::MatchEnds),
        "player_boost_activated" => {
            let boost: BoostEvent = serde_json::from_value(frame.data)
                .map_err(|e| ProtocolError::Json(e.to_string()))?;
            Some(ArenaEvent::Boost(boost))
        },
        "immediate_item_drop" => {
            let raw: RawItemDrop = serde_json::from_value(frame.data)
                .map_err(|e| ProtocolError::Json(e.to_string()))?;
            Some(ArenaEvent::ItemDrop(raw.into_event()?))
        },
        "event_triggered" => {
            let event: EncounterEvent = serde_json::from_value(frame.data)
                .map_err(|e| ProtocolError::Json(e.to_string()))?;
            Some(ArenaEvent::Encounter(event))
        },
        "game_completed" => Some(ArenaEvent::MatchCompleted),
        other => {
            tracing::debug!(event = other, "Ignoring unhandled arena event");
            None
        },
    };
    Ok(event)
}

/// Authentication payload sent immediately after the socket opens.
pub fn encode_auth_frame(session: &Session) -> String {
    serde_json::json!({
        "event": "authenticate",
        "data": {
            "token": session.token,
            "gameId": session.game_id,
            "appId": session.app_id,
            "arenaGameId": session.arcade_game_id,
        }
    })
    .to_string()
}

/// Room-join command scoping subsequent events to this match.
pub fn encode_join_frame(game_id: &str) -> String {
    serde_json::json!({
        "event": "join_game",
        "data": game_id,
    })
    .to_string()
}

/// Normalize the advertised realtime endpoint to a ws(s) dial URL.
///
/// The coordinator hands out either ws(s) or http(s) forms depending on
/// deployment; the transport here dials WebSocket directly.
pub fn normalize_realtime_url(url: &str) -> Result<String, ProtocolError> {
    if let Some(rest) = url.strip_prefix("https://") {
        Ok(format!("wss://{rest}"))
    } else if let Some(rest) = url.strip_prefix("http://") {
        Ok(format!("ws://{rest}"))
    } else if url.starts_with("wss://") || url.starts_with("ws://") {
        Ok(url.to_string())
    } else {
        Err(ProtocolError::InvalidUrl(url.to_string()))
    }
}

/// Body of the session-init HTTP call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    pub stream_url: String,
}

/// Response of the session-init HTTP call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub websocket_url: String,
    #[serde(default)]
    pub status: String,
    /// Opaque match details (players, packages, events, cycle config);
    /// surfaced to the presentation layer untouched.
    #[serde(default)]
    pub eva_game_details: Value,
    #[serde(default)]
    pub arena_active: bool,
    #[serde(default)]
    pub countdown_started: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_boost_frame() {
        let text = r#"{
            "event": "player_boost_activated",
            "data": {
                "boosterUsername": "Viewer1",
                "playerName": "blaster",
                "playerId": "p-1",
                "boostAmount": 500
            }
        }"#;
        let event = decode_frame(text).unwrap().unwrap();
        match event {
            ArenaEvent::Boost(b) => {
                assert_eq!(b.boost_amount, 500);
                assert_eq!(b.booster_username, "Viewer1");
            },
            other => panic!("expected boost, got {other:?}"),
        }
    }

    #[test]
    fn decode_flat_item_drop() {
        let text = r#"{
            "event": "immediate_item_drop",
            "data": {
                "itemId": "itm-1",
                "itemName": "Health Potion",
                "targetPlayer": "p-1",
                "purchaserUsername": "Viewer2",
                "cost": 50
            }
        }"#;
        let event = decode_frame(text).unwrap().unwrap();
        match event {
            ArenaEvent::ItemDrop(drop) => {
                assert_eq!(drop.item_name, "Health Potion");
                assert_eq!(drop.target_player_name, "p-1");
                assert!(drop.effects.stats.is_empty());
            },
            other => panic!("expected item drop, got {other:?}"),
        }
    }

    #[test]
    fn decode_nested_item_drop() {
        let text = r#"{
            "event": "immediate_item_drop",
            "data": {
                "item": {
                    "id": "itm-2",
                    "name": "Shield Generator",
                    "effects": {
                        "stats": [{"name": "shield", "currentValue": 25, "maxValue": 100}]
                    }
                },
                "targetPlayer": "p-1",
                "targetPlayerName": "blaster",
                "purchaserUsername": "Viewer3",
                "cost": 250
            }
        }"#;
        let event = decode_frame(text).unwrap().unwrap();
        match event {
            ArenaEvent::ItemDrop(drop) => {
                assert_eq!(drop.item_id, "itm-2");
                assert_eq!(drop.effects.stats[0].current_value, 25);
            },
            other => panic!("expected item drop, got {other:?}"),
        }
    }

    #[test]
    fn decode_encounter_frame() {
        let text = r#"{
            "event": "event_triggered",
            "data": {"eventId": "evt-1", "eventName": "Final Showdown", "isFinal": true}
        }"#;
        let event = decode_frame(text).unwrap().unwrap();
        match event {
            ArenaEvent::Encounter(e) => {
                assert!(e.is_final);
                assert_eq!(e.event_name, "Final Showdown");
            },
            other => panic!("expected encounter, got {other:?}"),
        }
    }

    #[test]
    fn lifecycle_frames_decode_without_data() {
        for (name, expected) in [
            ("arena_countdown_started", ArenaEvent::CountdownStarted),
            ("arena_begins", ArenaEvent::MatchBegins),
            ("arena_ends", ArenaEvent::MatchEnds),
            ("game_completed", ArenaEvent::MatchCompleted),
        ] {
            let text = format!("{{\"event\": \"{name}\"}}");
            assert_eq!(decode_frame(&text).unwrap(), Some(expected));
        }
    }

    #[test]
    fn unknown_event_is_not_an_error() {
        let text = r#"{"event": "boost_cycle_update", "data": {"cycle": 3}}"#;
        assert_eq!(decode_frame(text).unwrap(), None);
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert!(matches!(decode_frame(""), Err(ProtocolError::EmptyFrame)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            decode_frame("{nope"),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn url_normalization() {
        assert_eq!(
            normalize_realtime_url("https://arena.example/rt").unwrap(),
            "wss://arena.example/rt"
        );
        assert_eq!(
            normalize_realtime_url("http://localhost:9000").unwrap(),
            "ws://localhost:9000"
        );
        assert_eq!(
            normalize_realtime_url("wss://arena.example").unwrap(),
            "wss://arena.example"
        );
        assert!(normalize_realtime_url("ftp://nope").is_err());
    }

    #[test]
    fn auth_frame_carries_handshake_identifiers() {
        let session = blastbound_core::test_helpers::make_session();
        let frame = encode_auth_frame(&session);
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "authenticate");
        assert_eq!(value["data"]["token"], "test-token");
        assert_eq!(value["data"]["gameId"], "g-test");
        assert_eq!(value["data"]["appId"], "app-test");
        assert_eq!(value["data"]["arenaGameId"], "blastbound");
    }

    #[test]
    fn init_response_defaults() {
        let resp: InitResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.success);
        assert!(!resp.arena_active);
        let resp: InitResponse =
            serde_json::from_str(r#"{"success": false, "gameId": "g-1"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.game_id, "g-1");
    }
}
