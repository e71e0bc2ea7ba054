use crate::asteroid::{create_asteroid, Asteroid};
use crate::collision::{tick_asteroids, CollisionReport};
use crate::config::ServerConfig;
use crate::physics::tick_ships;
use crate::protocol::{AsteroidWire, ShipWire, StateMsg};
use crate::session::{heading_from_input, Sessions};
use crate::ship::{create_ship, Ship};
use asteroids_shared::config::GameConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Outcome of one simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub collisions: CollisionReport,
    /// Expired asteroids removed
    pub pruned: usize,
    /// Asteroids created to restore the population floor
    pub replenished: usize,
}

/// Central game state owned by the game loop task.
pub struct GameState {
    pub config: GameConfig,
    pub sessions: Sessions,
    pub ships: BTreeMap<u32, Ship>,
    pub asteroids: Vec<Asteroid>,
    pub rng: ChaCha8Rng,
    next_asteroid_id: u64,
}

impl GameState {
    pub fn new(server_config: &ServerConfig) -> Self {
        let rng = match server_config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut state = Self {
            config: server_config.game,
            sessions: Sessions::new(),
            ships: BTreeMap::new(),
            asteroids: Vec::new(),
            rng,
            next_asteroid_id: 0,
        };
        state.replenish_asteroids();
        state
    }

    /// Register a session and give it a ship. Returns (session_id, Ship).
    pub fn add_player(&mut self) -> (u32, Ship) {
        let id = self.sessions.open();
        let ship = create_ship(id, &self.config, &mut self.rng);
        self.ships.insert(id, ship.clone());
        (id, ship)
    }

    /// Drop a session and its ship. Returns false if the session was unknown.
    pub fn remove_player(&mut self, id: u32) -> bool {
        let had_session = self.sessions.close(id).is_some();
        let had_ship = self.ships.remove(&id).is_some();
        had_session || had_ship
    }

    /// Thrust update from a player. Unknown sessions are ignored.
    pub fn control_change(&mut self, id: u32, force: f64, angle: Option<f64>, now_ms: u64) -> bool {
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        session.change(force, now_ms);
        if let (Some(heading), Some(ship)) = (heading_from_input(angle), self.ships.get_mut(&id)) {
            ship.angle = heading;
        }
        true
    }

    /// Player let go of the controls. Unknown sessions are ignored.
    pub fn control_release(&mut self, id: u32) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.release();
                true
            }
            None => false,
        }
    }

    /// Run one full simulation step: ships, asteroids and collisions, pruning,
    /// then the population floor.
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        tick_ships(&mut self.ships, &self.sessions, &self.config, now_ms);
        let collisions = tick_asteroids(
            &mut self.asteroids,
            &mut self.ships,
            &mut self.next_asteroid_id,
            &self.config,
            &mut self.rng,
        );
        let pruned = self.prune_expired();
        let replenished = self.replenish_asteroids();

        if collisions.destroyed > 0 {
            tracing::debug!(
                "{} asteroid(s) destroyed, {} fragment(s) spawned",
                collisions.destroyed,
                collisions.fragments
            );
        }

        TickReport {
            collisions,
            pruned,
            replenished,
        }
    }

    /// Remove asteroids flagged `expired`. Returns how many were removed.
    pub fn prune_expired(&mut self) -> usize {
        let before = self.asteroids.len();
        self.asteroids.retain(|a| !a.expired);
        before - self.asteroids.len()
    }

    /// Top the asteroid population back up to the floor.
    pub fn replenish_asteroids(&mut self) -> usize {
        let floor = self.config.asteroid_floor as usize;
        let mut created = 0;
        while self.asteroids.len() < floor {
            let id = self.next_asteroid_id;
            self.next_asteroid_id += 1;
            self.asteroids
                .push(create_asteroid(id, None, &self.config, &mut self.rng));
            created += 1;
        }
        created
    }

    pub fn player_count(&self) -> u32 {
        self.sessions.len() as u32
    }

    /// Get full world state for broadcasting
    pub fn snapshot(&self) -> StateMsg {
        StateMsg {
            ships: self.ships.values().map(ShipWire::from).collect(),
            asteroids: self.asteroids.iter().map(AsteroidWire::from).collect(),
        }
    }
}
