use crate::asteroid::{fragments, Asteroid};
use crate::ship::Ship;
use asteroids_shared::config::GameConfig;
use asteroids_shared::vec2::{add, circles_overlap, wrap};
use rand::Rng;
use std::collections::BTreeMap;

/// What happened during one collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Asteroids struck this tick
    pub destroyed: usize,
    /// Children spawned by splitting struck asteroids
    pub fragments: usize,
}

/// Move asteroids and resolve asteroid/ship hits for one tick.
///
/// Struck asteroids are only flagged `expired`; removing them is left to the
/// caller. Fragments are appended after the pass and are not moved or tested
/// until the next tick.
pub fn tick_asteroids(
    asteroids: &mut Vec<Asteroid>,
    ships: &mut BTreeMap<u32, Ship>,
    next_asteroid_id: &mut u64,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    for ship in ships.values_mut() {
        ship.hit = false;
    }

    let mut spawned = Vec::new();
    for asteroid in asteroids.iter_mut() {
        asteroid.pos = wrap(add(asteroid.pos, asteroid.vel));
        asteroid.angle += asteroid.rotation_speed;

        if asteroid.invincible > 0 {
            asteroid.invincible -= 1;
            continue;
        }
        if asteroid.expired {
            continue;
        }

        let circle = asteroid.circle();
        for ship in ships.values_mut() {
            if circles_overlap(ship.circle(), circle) {
                ship.hit = true;
                asteroid.hit = true;
                asteroid.expired = true;
            }
        }

        if asteroid.hit {
            report.destroyed += 1;
            if asteroid.can_fragment(config) {
                spawned.extend(fragments(asteroid, next_asteroid_id, config, rng));
            }
        }
    }

    report.fragments = spawned.len();
    asteroids.extend(spawned);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroid::{create_asteroid, Spawn};
    use asteroids_shared::vec2::{vec2, Vec2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn ship_at(id: u32, x: f64, y: f64) -> Ship {
        Ship {
            id,
            pos: vec2(x, y),
            vel: Vec2::ZERO,
            angle: 0.0,
            radius: 1.0 / 40.0,
            color: 0xffffff,
            hit: false,
        }
    }

    /// Stationary, vulnerable asteroid
    fn asteroid_at(id: u64, x: f64, y: f64, radius: f64) -> Asteroid {
        Asteroid {
            id,
            pos: vec2(x, y),
            vel: Vec2::ZERO,
            angle: 0.0,
            rotation_speed: 0.0,
            radius,
            hit: false,
            expired: false,
            invincible: 0,
        }
    }

    fn ships(list: Vec<Ship>) -> BTreeMap<u32, Ship> {
        list.into_iter().map(|s| (s.id, s)).collect()
    }

    #[test]
    fn struck_asteroid_splits_in_two() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, 0.0, 0.0)]);
        let mut asteroids = vec![asteroid_at(0, 0.03, 0.0, 0.05)];
        let mut next_id = 1;

        let report = tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);

        assert_eq!(report, CollisionReport { destroyed: 1, fragments: 2 });
        assert!(ships[&1].hit);
        assert!(asteroids[0].hit && asteroids[0].expired);
        assert_eq!(asteroids.len(), 3);
        for child in &asteroids[1..] {
            assert_eq!(child.radius, 0.025);
            assert_eq!(child.pos, vec2(0.03, 0.0));
            assert_eq!(child.invincible, config.asteroid_invincible_ticks);
            assert!(!child.expired);
        }
        assert_eq!(next_id, 3);
    }

    #[test]
    fn small_asteroid_is_destroyed_without_children() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, 0.0, 0.0)]);
        let radius = config.asteroid_radius_min * 1.5;
        let mut asteroids = vec![asteroid_at(0, 0.01, 0.0, radius)];
        let mut next_id = 1;

        let report = tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);

        assert_eq!(report, CollisionReport { destroyed: 1, fragments: 0 });
        assert_eq!(asteroids.len(), 1);
        assert!(asteroids[0].expired);
        assert_eq!(next_id, 1);
    }

    #[test]
    fn invincible_asteroid_ignores_overlap() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, 0.0, 0.0)]);
        let mut asteroid = asteroid_at(0, 0.0, 0.0, 0.05);
        asteroid.invincible = 3;
        let mut asteroids = vec![asteroid];
        let mut next_id = 1;

        for expected in [2, 1, 0] {
            tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);
            assert_eq!(asteroids[0].invincible, expected);
            assert!(!asteroids[0].hit);
            assert!(!asteroids[0].expired);
            assert!(!ships[&1].hit);
        }

        // Vulnerable from the next tick on
        tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);
        assert_eq!(asteroids[0].invincible, 0);
        assert!(asteroids[0].expired);
        assert!(ships[&1].hit);
    }

    #[test]
    fn fresh_fragments_cannot_be_hit() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, 0.0, 0.0)]);
        let mut asteroids = vec![asteroid_at(0, 0.0, 0.0, 0.06)];
        let mut next_id = 1;

        tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);
        asteroids.retain(|a| !a.expired);
        assert_eq!(asteroids.len(), 2);

        let report = tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);
        assert_eq!(report.destroyed, 0);
        assert!(!ships[&1].hit);
        for a in &asteroids {
            assert_eq!(a.invincible, config.asteroid_invincible_ticks - 1);
        }
    }

    #[test]
    fn asteroid_hitting_two_ships_splits_once() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, -0.02, 0.0), ship_at(2, 0.02, 0.0)]);
        let mut asteroids = vec![asteroid_at(0, 0.0, 0.0, 0.05)];
        let mut next_id = 1;

        let report = tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);

        assert_eq!(report, CollisionReport { destroyed: 1, fragments: 2 });
        assert!(ships[&1].hit && ships[&2].hit);
        assert_eq!(asteroids.len(), 3);
    }

    #[test]
    fn one_ship_breaks_two_asteroids() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, 0.0, 0.0)]);
        let mut asteroids = vec![
            asteroid_at(0, 0.04, 0.0, 0.05),
            asteroid_at(1, -0.04, 0.0, 0.05),
        ];
        let mut next_id = 2;

        let report = tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);

        assert!(ships[&1].hit);
        assert!(asteroids[0].expired && asteroids[1].expired);
        assert_eq!(report, CollisionReport { destroyed: 2, fragments: 4 });
        let children: Vec<_> = asteroids.iter().filter(|a| !a.expired).collect();
        assert_eq!(children.len(), 4);
        assert!(children.iter().all(|c| c.radius == 0.025));
    }

    #[test]
    fn hit_flag_clears_next_tick() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = ships(vec![ship_at(1, 0.0, 0.0)]);
        let mut asteroids = vec![asteroid_at(0, 0.0, 0.0, 0.015)];
        let mut next_id = 1;

        tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);
        assert!(ships[&1].hit);
        asteroids.retain(|a| !a.expired);

        tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);
        assert!(!ships[&1].hit);
    }

    #[test]
    fn asteroids_drift_spin_and_wrap() {
        let config = GameConfig::default();
        let mut rng = test_rng();
        let mut ships = BTreeMap::new();
        let mut a = create_asteroid(
            0,
            Some(Spawn {
                pos: vec2(0.9995, 0.0),
                radius: 0.03,
            }),
            &config,
            &mut rng,
        );
        a.vel = vec2(0.001, 0.0005);
        a.rotation_speed = 0.01;
        let start_angle = a.angle;
        let mut asteroids = vec![a];
        let mut next_id = 1;

        tick_asteroids(&mut asteroids, &mut ships, &mut next_id, &config, &mut rng);

        assert_eq!(asteroids[0].pos.x, -1.0);
        assert!((asteroids[0].pos.y - 0.0005).abs() < 1e-12);
        assert!((asteroids[0].angle - start_angle - 0.01).abs() < 1e-12);
    }
}
