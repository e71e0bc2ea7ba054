use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::GameConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "players")]
    Players(PlayersMsg),
    #[serde(rename = "state")]
    State(StateMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub self_id: u32,
    pub player_count: u32,
    pub config: GameConfig,
}

/// Number of connected players, sent whenever someone joins or leaves.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
pub struct PlayersMsg {
    pub count: u32,
}

/// Full world snapshot, sent once per tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
pub struct StateMsg {
    pub ships: Vec<ShipWire>,
    pub asteroids: Vec<AsteroidWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ShipWire {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub x_vel: f64,
    pub y_vel: f64,
    pub angle: f64,
    pub radius: f64,
    pub color: u32,
    pub hit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct AsteroidWire {
    #[ts(type = "number")]
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub radius: f64,
    pub hit: bool,
    pub expired: bool,
    pub invincible: u32,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Thrust intent. `angle` is the raw stick/touch angle in radians.
    #[serde(rename = "change")]
    Change {
        force: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[ts(optional)]
        angle: Option<f64>,
    },
    #[serde(rename = "release")]
    Release,
}

// === Conversion helpers ===

/// Round to 4 decimal places (keeps snapshots small, well below arena precision needs)
#[inline]
pub fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}
