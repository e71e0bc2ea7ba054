use asteroids_shared::config::GameConfig;
use asteroids_shared::vec2::{Circle, Vec2};
use rand::Rng;
use std::f64::consts::TAU;

/// A player's ship. Owned by exactly one session; `id` is the session id.
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians
    pub angle: f64,
    pub radius: f64,
    /// 0xRRGGBB
    pub color: u32,
    /// Set only during the tick an asteroid struck this ship
    pub hit: bool,
}

impl Ship {
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// Build a ship for a joining session: on a circle around the origin at a
/// random angle, at rest, with a random hue.
pub fn create_ship(session_id: u32, config: &GameConfig, rng: &mut impl Rng) -> Ship {
    let spawn_angle = rng.gen::<f64>() * TAU;
    let hue = rng.gen::<f64>() * 360.0;
    Ship {
        id: session_id,
        pos: Vec2::new(
            spawn_angle.cos() * config.ship_spawn_radius,
            spawn_angle.sin() * config.ship_spawn_radius,
        ),
        vel: Vec2::ZERO,
        angle: 0.0,
        radius: config.ship_radius,
        color: color_from_hue(hue),
        hit: false,
    }
}

/// Fully saturated, full brightness colour for a hue in degrees.
pub fn color_from_hue(hue: f64) -> u32 {
    hsv_to_rgb(hue.rem_euclid(360.0), 1.0, 1.0)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> u32 {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let ri = ((r + m) * 255.0).round() as u32;
    let gi = ((g + m) * 255.0).round() as u32;
    let bi = ((b + m) * 255.0).round() as u32;

    (ri << 16) | (gi << 8) | bi
}
