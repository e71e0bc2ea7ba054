use asteroids_shared::config::GameConfig;
use asteroids_shared::vec2::{Circle, Vec2};
use rand::Rng;
use std::f64::consts::TAU;

/// Free-floating asteroid.
#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    /// Unique for the lifetime of the process, never reused
    pub id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f64,
    /// Added to `angle` every tick
    pub rotation_speed: f64,
    pub radius: f64,
    pub hit: bool,
    /// Once set the asteroid is removed at the end of the tick
    pub expired: bool,
    /// Remaining ticks during which collisions are ignored
    pub invincible: u32,
}

impl Asteroid {
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// A struck asteroid splits only if its halves stay at or above the minimum size.
    pub fn can_fragment(&self, config: &GameConfig) -> bool {
        self.radius / 2.0 >= config.asteroid_radius_min
    }
}

/// Fixed placement for a new asteroid. Used for fragments.
#[derive(Debug, Clone, Copy)]
pub struct Spawn {
    pub pos: Vec2,
    pub radius: f64,
}

/// Build an asteroid with random heading, speed and spin.
///
/// Without a `spawn`, position is uniform over the arena and radius is
/// `max_radius * U[0,1)` floored at `min_radius`.
pub fn create_asteroid(
    id: u64,
    spawn: Option<Spawn>,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Asteroid {
    let Spawn { pos, radius } = spawn.unwrap_or_else(|| Spawn {
        pos: Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
        radius: (config.asteroid_radius_max * rng.gen::<f64>()).max(config.asteroid_radius_min),
    });

    let angle = rng.gen::<f64>() * TAU;
    let speed = (rng.gen::<f64>() * config.asteroid_speed_scale).min(config.asteroid_speed_max);
    let spin = if rng.gen_bool(0.5) { speed } else { -speed };

    Asteroid {
        id,
        pos,
        vel: Vec2::new(angle.cos() * speed, angle.sin() * speed),
        angle,
        rotation_speed: spin,
        radius,
        hit: false,
        expired: false,
        invincible: config.asteroid_invincible_ticks,
    }
}

/// Two half-size children at the parent's position. Ids are taken from `next_id`.
pub fn fragments(
    parent: &Asteroid,
    next_id: &mut u64,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> [Asteroid; 2] {
    let spawn = Spawn {
        pos: parent.pos,
        radius: parent.radius / 2.0,
    };
    let mut child = || {
        let id = *next_id;
        *next_id += 1;
        create_asteroid(id, Some(spawn), config, rng)
    };
    [child(), child()]
}
