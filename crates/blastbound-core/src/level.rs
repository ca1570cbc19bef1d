use serde::{Deserialize, Serialize};

use crate::grid::{GridPos, TileMap};

/// Patrol axis for an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyAxis {
    Horizontal,
    Vertical,
}

/// Enemy placement declared by a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub pos: GridPos,
    pub axis: EnemyAxis,
}

/// Win condition for a single level, polled by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinCondition {
    ClearAllCrates,
    DefeatAllEnemies,
}

impl WinCondition {
    pub fn description(self) -> &'static str {
        match self {
            WinCondition::ClearAllCrates => "Destroy all crates!",
            WinCondition::DefeatAllEnemies => "Defeat all enemies!",
        }
    }
}

/// Complete static description of one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub id: u32,
    pub name: String,
    pub tiles: TileMap,
    pub crates: Vec<GridPos>,
    pub player_start: GridPos,
    pub enemies: Vec<EnemySpawn>,
    pub win_condition: WinCondition,
}

/// The two shipped levels.
pub fn builtin_levels() -> Vec<LevelSpec> {
    vec![level_one(), level_two()]
}

fn level_one() -> LevelSpec {
    let rows: Vec<Vec<u8>> = vec![
        vec![85, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![85, 1, 70, 1, 70, 70, 1, 70, 1, 70, 70, 1, 1, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![85, 1, 70, 1, 70, 70, 1, 70, 1, 70, 70, 1, 1, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![85, 1, 70, 1, 70, 70, 1, 70, 1, 70, 70, 1, 1, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70],
    ];
    LevelSpec {
        id: 1,
        name: "Level 1".to_string(),
        tiles: TileMap::from_raw(&rows),
        crates: vec![
            GridPos::new(3, 1),
            GridPos::new(10, 1),
            GridPos::new(1, 3),
            GridPos::new(12, 3),
            GridPos::new(6, 5),
            GridPos::new(8, 5),
            GridPos::new(1, 7),
            GridPos::new(12, 7),
            GridPos::new(6, 8),
        ],
        player_start: GridPos::new(5, 1),
        enemies: vec![
            EnemySpawn {
                pos: GridPos::new(7, 3),
                axis: EnemyAxis::Horizontal,
            },
            EnemySpawn {
                pos: GridPos::new(10, 5),
                axis: EnemyAxis::Horizontal,
            },
            EnemySpawn {
                pos: GridPos::new(7, 7),
                axis: EnemyAxis::Vertical,
            },
            EnemySpawn {
                pos: GridPos::new(12, 5),
                axis: EnemyAxis::Vertical,
            },
        ],
        win_condition: WinCondition::ClearAllCrates,
    }
}

fn level_two() -> LevelSpec {
    let rows: Vec<Vec<u8>> = vec![
        vec![70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70],
        vec![85, 1, 1, 1, 1, 70, 1, 1, 70, 1, 1, 1, 1, 85],
        vec![85, 1, 70, 1, 1, 1, 1, 1, 1, 1, 1, 70, 1, 85],
        vec![85, 1, 1, 1, 70, 1, 70, 70, 1, 70, 1, 1, 1, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![85, 70, 1, 70, 1, 70, 1, 1, 70, 1, 70, 1, 70, 85],
        vec![85, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 85],
        vec![85, 1, 1, 1, 70, 1, 70, 70, 1, 70, 1, 1, 1, 85],
        vec![85, 1, 70, 1, 1, 1, 1, 1, 1, 1, 1, 70, 1, 85],
        vec![70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70],
    ];
    LevelSpec {
        id: 2,
        name: "Level 2".to_string(),
        tiles: TileMap::from_raw(&rows),
        crates: vec![
            GridPos::new(3, 2),
            GridPos::new(10, 2),
            GridPos::new(2, 3),
            GridPos::new(11, 3),
            GridPos::new(6, 5),
            GridPos::new(7, 5),
            GridPos::new(2, 7),
            GridPos::new(11, 7),
            GridPos::new(3, 8),
            GridPos::new(10, 8),
        ],
        player_start: GridPos::new(1, 1),
        enemies: vec![
            EnemySpawn {
                pos: GridPos::new(5, 2),
                axis: EnemyAxis::Horizontal,
            },
            EnemySpawn {
                pos: GridPos::new(8, 4),
                axis: EnemyAxis::Vertical,
            },
            EnemySpawn {
                pos: GridPos::new(3, 6),
                axis: EnemyAxis::Horizontal,
            },
            EnemySpawn {
                pos: GridPos::new(11, 6),
                axis: EnemyAxis::Vertical,
            },
            EnemySpawn {
                pos: GridPos::new(5, 7),
                axis: EnemyAxis::Horizontal,
            },
        ],
        win_condition: WinCondition::DefeatAllEnemies,
    }
}
