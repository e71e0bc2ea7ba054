//! Ship movement.
//!
//! Ships have two flight regimes. While a player holds thrust the velocity is
//! set directly from heading, force and the ramp-up factor, so there is no
//! inertia. Once released the ship coasts and its velocity decays by `drag`
//! every tick.

use crate::session::{Session, Sessions};
use crate::ship::Ship;
use asteroids_shared::config::GameConfig;
use asteroids_shared::vec2::{add, scale, wrap, Vec2};
use std::collections::BTreeMap;

/// Advance every session's ship by one tick.
pub fn tick_ships(
    ships: &mut BTreeMap<u32, Ship>,
    sessions: &Sessions,
    config: &GameConfig,
    now_ms: u64,
) {
    for session in sessions.iter() {
        if let Some(ship) = ships.get_mut(&session.id) {
            step_ship(ship, session, config, now_ms);
        }
    }
}

/// Move, wrap, then update velocity for the next tick.
pub fn step_ship(ship: &mut Ship, session: &Session, config: &GameConfig, now_ms: u64) {
    ship.pos = wrap(add(ship.pos, ship.vel));

    ship.vel = if session.is_thrusting() {
        let magnitude = session.force * session.ramp(now_ms, config.thrust_ramp_ms) * config.top_speed;
        scale(Vec2::from_angle(ship.angle), magnitude)
    } else {
        scale(ship.vel, config.drag)
    };
}
