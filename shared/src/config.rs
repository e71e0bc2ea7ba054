/// Gameplay tuning shared by server and clients.
/// Distances are in arena units (the arena spans [-1, 1] on both axes),
/// speeds in arena units per tick.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Per-tick velocity multiplier while coasting
    pub drag: f64,
    pub top_speed: f64,
    pub ship_radius: f64,
    /// Distance from the origin where new ships appear
    pub ship_spawn_radius: f64,
    pub asteroid_radius_min: f64,
    pub asteroid_radius_max: f64,
    /// Upper bound of asteroid speed
    pub asteroid_speed_max: f64,
    /// Random asteroid speed is drawn from [0, asteroid_speed_scale) and capped
    pub asteroid_speed_scale: f64,
    /// Live asteroid population is topped up to this count every tick
    pub asteroid_floor: u32,
    /// Ticks after spawning during which an asteroid cannot collide
    pub asteroid_invincible_ticks: u32,
    /// Time for thrust to ramp from zero to full (milliseconds)
    pub thrust_ramp_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            drag: 0.955,
            top_speed: 1.0 / 80.0,
            ship_radius: 1.0 / 40.0,
            ship_spawn_radius: 0.5,
            asteroid_radius_min: 1.0 / 90.0,
            asteroid_radius_max: 1.0 / 15.0,
            asteroid_speed_max: 1.0 / 800.0,
            asteroid_speed_scale: 1.0 / 600.0,
            asteroid_floor: 10,
            asteroid_invincible_ticks: 100,
            thrust_ramp_ms: 1000,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.drag.is_finite() || self.drag <= 0.0 || self.drag >= 1.0 {
            return Err("drag must be finite and in (0, 1)".to_string());
        }
        if !self.top_speed.is_finite() || self.top_speed <= 0.0 {
            return Err("top_speed must be finite and > 0".to_string());
        }
        if !self.ship_radius.is_finite() || self.ship_radius <= 0.0 {
            return Err("ship_radius must be finite and > 0".to_string());
        }
        if !self.ship_spawn_radius.is_finite()
            || self.ship_spawn_radius < 0.0
            || self.ship_spawn_radius > 1.0
        {
            return Err("ship_spawn_radius must be in [0, 1]".to_string());
        }
        if !self.asteroid_radius_min.is_finite() || self.asteroid_radius_min <= 0.0 {
            return Err("asteroid_radius_min must be finite and > 0".to_string());
        }
        if !self.asteroid_radius_max.is_finite()
            || self.asteroid_radius_max < self.asteroid_radius_min
        {
            return Err("asteroid_radius_max must be finite and >= asteroid_radius_min".to_string());
        }
        if !self.asteroid_speed_max.is_finite() || self.asteroid_speed_max < 0.0 {
            return Err("asteroid_speed_max must be finite and >= 0".to_string());
        }
        if !self.asteroid_speed_scale.is_finite() || self.asteroid_speed_scale < 0.0 {
            return Err("asteroid_speed_scale must be finite and >= 0".to_string());
        }
        if self.thrust_ramp_ms == 0 {
            return Err("thrust_ramp_ms must be > 0".to_string());
        }
        Ok(())
    }
}
