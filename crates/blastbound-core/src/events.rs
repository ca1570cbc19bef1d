use serde::{Deserialize, Serialize};

/// A viewer-funded boost aimed at the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostEvent {
    pub booster_username: String,
    pub player_name: String,
    pub player_id: String,
    pub boost_amount: u32,
}

/// One stat entry attached to a dropped item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEffect {
    pub name: String,
    pub current_value: u32,
    pub max_value: u32,
    #[serde(default)]
    pub description: String,
}

/// Effects payload of a dropped item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemEffects {
    #[serde(default)]
    pub stats: Vec<StatEffect>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A viewer-purchased item drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDropEvent {
    pub item_id: String,
    pub item_name: String,
    pub target_player: String,
    #[serde(default)]
    pub target_player_name: String,
    pub purchaser_username: String,
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub effects: ItemEffects,
}

/// A named gameplay instruction triggered from the Arena side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterEvent {
    pub event_id: String,
    pub event_name: String,
    #[serde(default)]
    pub target_player: Option<String>,
    #[serde(default)]
    pub is_final: bool,
}

/// Typed event stream delivered by the arena session client.
///
/// `ConnectionChanged` is synthesized locally on every transport
/// transition; everything else is decoded from the realtime channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaEvent {
    CountdownStarted,
    CountdownUpdate { seconds_remaining: u32 },
    MatchBegins,
    MatchEnds,
    Boost(BoostEvent),
    ItemDrop(ItemDropEvent),
    Encounter(EncounterEvent),
    MatchCompleted,
    ConnectionChanged { connected: bool },
}
