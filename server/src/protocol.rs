//! Wire protocol. Message types live in the shared crate; this module adds
//! the conversions from simulation entities.

pub use asteroids_shared::protocol::*;

use crate::asteroid::Asteroid;
use crate::ship::Ship;

impl From<&Ship> for ShipWire {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id,
            x: round4(ship.pos.x),
            y: round4(ship.pos.y),
            x_vel: ship.vel.x,
            y_vel: ship.vel.y,
            angle: round4(ship.angle),
            radius: ship.radius,
            color: ship.color,
            hit: ship.hit,
        }
    }
}

impl From<&Asteroid> for AsteroidWire {
    fn from(asteroid: &Asteroid) -> Self {
        Self {
            id: asteroid.id,
            x: round4(asteroid.pos.x),
            y: round4(asteroid.pos.y),
            angle: round4(asteroid.angle),
            radius: asteroid.radius,
            hit: asteroid.hit,
            expired: asteroid.expired,
            invincible: asteroid.invincible,
        }
    }
}
