pub mod events;
pub mod grid;
pub mod level;
pub mod session;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::{BoostEvent, EncounterEvent, ItemDropEvent, ItemEffects, StatEffect};
    use crate::grid::{GridPos, TileMap};
    use crate::level::{EnemyAxis, EnemySpawn, LevelSpec, WinCondition};
    use crate::session::Session;

    /// Boost event with the given amount from a fixed test viewer.
    pub fn make_boost(amount: u32) -> BoostEvent {
        BoostEvent {
            booster_username: "Viewer1".to_string(),
            player_name: "blaster".to_string(),
            player_id: "p-1".to_string(),
            boost_amount: amount,
        }
    }

    /// Item drop with an optional first stat value.
    pub fn make_drop(name: &str, cost: u32, stat_value: Option<u32>) -> ItemDropEvent {
        let stats = stat_value
            .map(|v| {
                vec![StatEffect {
                    name: "stat".to_string(),
                    current_value: v,
                    max_value: 100,
                    description: String::new(),
                }]
            })
            .unwrap_or_default();
        ItemDropEvent {
            item_id: format!("itm-{}", name.to_lowercase().replace(' ', "-")),
            item_name: name.to_string(),
            target_player: "p-1".to_string(),
            target_player_name: "blaster".to_string(),
            purchaser_username: "Viewer2".to_string(),
            cost,
            effects: ItemEffects {
                stats,
                image: None,
            },
        }
    }

    /// Encounter event with the given free-text name.
    pub fn make_encounter(name: &str, is_final: bool) -> EncounterEvent {
        EncounterEvent {
            event_id: format!("evt-{}", name.to_lowercase().replace(' ', "-")),
            event_name: name.to_string(),
            target_player: None,
            is_final,
        }
    }

    /// Session config pointing at nothing in particular.
    pub fn make_session() -> Session {
        Session {
            game_id: "g-test".to_string(),
            stream_url: "https://streams.example/test".to_string(),
            token: "test-token".to_string(),
            app_id: "app-test".to_string(),
            arcade_game_id: "blastbound".to_string(),
            websocket_url: "wss://arena.example/rt".to_string(),
        }
    }

    /// A small fully-open bordered level with one crate and one enemy.
    pub fn open_level() -> LevelSpec {
        let rows: Vec<Vec<u8>> = vec![
            vec![70, 70, 70, 70, 70, 70, 70, 70],
            vec![70, 1, 1, 1, 1, 1, 1, 70],
            vec![70, 1, 1, 1, 1, 1, 1, 70],
            vec![70, 1, 1, 1, 1, 1, 1, 70],
            vec![70, 1, 1, 1, 1, 1, 1, 70],
            vec![70, 1, 1, 1, 1, 1, 1, 70],
            vec![70, 1, 1, 1, 1, 1, 1, 70],
            vec![70, 70, 70, 70, 70, 70, 70, 70],
        ];
        LevelSpec {
            id: 900,
            name: "Test Arena".to_string(),
            tiles: TileMap::from_raw(&rows),
            crates: vec![GridPos::new(5, 5)],
            player_start: GridPos::new(1, 1),
            enemies: vec![EnemySpawn {
                pos: GridPos::new(6, 6),
                axis: EnemyAxis::Horizontal,
            }],
            win_condition: WinCondition::ClearAllCrates,
        }
    }
}
