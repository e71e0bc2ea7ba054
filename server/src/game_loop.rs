use crate::config::ServerConfig;
use crate::protocol::{PlayersMsg, StateMsg, WelcomeMsg, PROTOCOL_VERSION};
use crate::state::GameState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

/// Commands from client connections to the game loop
#[derive(Debug)]
pub enum GameCommand {
    PlayerJoin {
        response: oneshot::Sender<(u32, WelcomeMsg)>,
    },
    PlayerLeave {
        id: u32,
    },
    Change {
        id: u32,
        force: f64,
        angle: Option<f64>,
    },
    Release {
        id: u32,
    },
}

/// Broadcasts from game loop to all clients
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    PlayerCount(PlayersMsg),
    State(Arc<StateMsg>),
}

/// Run the main game loop. Owns all game state.
///
/// Every tick runs physics, collisions, pruning and replenishment to
/// completion, then publishes a full snapshot. Commands are applied between
/// ticks, one at a time. Returns once every command sender is dropped.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut state = GameState::new(&server_config);
    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;

    let mut tick_interval =
        tokio::time::interval(Duration::from_millis(server_config.tick_interval_ms));
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "Game loop started ({} ms ticks, {} asteroids)",
        server_config.tick_interval_ms,
        state.asteroids.len()
    );

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                state.tick(now_ms());
                publish_state(&state, &broadcast_tx);
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    GameCommand::PlayerJoin { response } => {
                        let (player_id, _ship) = state.add_player();
                        let welcome = WelcomeMsg {
                            protocol_version: PROTOCOL_VERSION,
                            server_version: env!("CARGO_PKG_VERSION").to_string(),
                            self_id: player_id,
                            player_count: state.player_count(),
                            config: state.config,
                        };
                        if response.send((player_id, welcome)).is_err() {
                            // Connection went away before the welcome arrived
                            state.remove_player(player_id);
                            continue;
                        }
                        tracing::info!("Player {} joined ({} connected)", player_id, state.player_count());
                        publish_player_count(&state, &broadcast_tx);
                    }
                    GameCommand::PlayerLeave { id } => {
                        if state.remove_player(id) {
                            tracing::info!("Player {} left ({} connected)", id, state.player_count());
                            publish_player_count(&state, &broadcast_tx);
                        }
                    }
                    GameCommand::Change { id, force, angle } => {
                        state.control_change(id, force, angle, now_ms());
                    }
                    GameCommand::Release { id } => {
                        state.control_release(id);
                    }
                }
            }
        }
    }

    tracing::info!("Game loop ended");
}

/// State itself only goes out on ticks; membership changes show up in the
/// next snapshot.
fn publish_player_count(state: &GameState, broadcast_tx: &broadcast::Sender<GameBroadcast>) {
    let _ = broadcast_tx.send(GameBroadcast::PlayerCount(PlayersMsg {
        count: state.player_count(),
    }));
}

fn publish_state(state: &GameState, broadcast_tx: &broadcast::Sender<GameBroadcast>) {
    // No subscribers is not an error
    let _ = broadcast_tx.send(GameBroadcast::State(Arc::new(state.snapshot())));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            rng_seed: Some(7),
            ..Default::default()
        }
    }

    async fn join(game_tx: &mpsc::Sender<GameCommand>) -> (u32, WelcomeMsg) {
        let (resp_tx, resp_rx) = oneshot::channel();
        game_tx
            .send(GameCommand::PlayerJoin { response: resp_tx })
            .await
            .unwrap();
        resp_rx.await.unwrap()
    }

    /// Skips snapshots until the next player count
    async fn next_count(rx: &mut broadcast::Receiver<GameBroadcast>) -> u32 {
        loop {
            if let GameBroadcast::PlayerCount(msg) = rx.recv().await.unwrap() {
                return msg.count;
            }
        }
    }

    async fn next_state(rx: &mut broadcast::Receiver<GameBroadcast>) -> Arc<StateMsg> {
        loop {
            if let GameBroadcast::State(msg) = rx.recv().await.unwrap() {
                return msg;
            }
        }
    }

    #[tokio::test]
    async fn join_then_leave_reports_counts() {
        let (game_tx, game_rx) = mpsc::channel(16);
        let (broadcast_tx, mut rx) = broadcast::channel(1024);
        tokio::spawn(run_game_loop(game_rx, broadcast_tx, test_config()));

        let (id, welcome) = join(&game_tx).await;
        assert_eq!(welcome.self_id, id);
        assert_eq!(welcome.player_count, 1);
        assert_eq!(welcome.protocol_version, PROTOCOL_VERSION);
        game_tx.send(GameCommand::PlayerLeave { id }).await.unwrap();

        assert_eq!(next_count(&mut rx).await, 1);
        assert_eq!(next_count(&mut rx).await, 0);

        // Every snapshot after the leave is free of the ship
        for _ in 0..5 {
            let snap = next_state(&mut rx).await;
            assert!(snap.ships.iter().all(|s| s.id != id));
        }
    }

    #[tokio::test]
    async fn join_then_leave_between_ticks_never_shows_ship() {
        let config = ServerConfig {
            tick_interval_ms: 1_000,
            ..test_config()
        };
        let (game_tx, game_rx) = mpsc::channel(16);
        let (broadcast_tx, mut rx) = broadcast::channel(1024);
        tokio::spawn(run_game_loop(game_rx, broadcast_tx, config));

        // First tick fires immediately; join and leave land before the second
        let first = next_state(&mut rx).await;
        assert!(first.ships.is_empty());

        let (id, _) = join(&game_tx).await;
        game_tx.send(GameCommand::PlayerLeave { id }).await.unwrap();

        let mut counts = Vec::new();
        let mut states = 0;
        while states < 1 {
            match rx.recv().await.unwrap() {
                GameBroadcast::PlayerCount(msg) => counts.push(msg.count),
                GameBroadcast::State(snap) => {
                    assert!(snap.ships.iter().all(|s| s.id != id), "ship {} in snapshot", id);
                    states += 1;
                }
            }
        }
        assert_eq!(counts, vec![1, 0]);
    }

    #[tokio::test]
    async fn snapshots_hold_population_floor() {
        let (_game_tx, game_rx) = mpsc::channel(16);
        let (broadcast_tx, mut rx) = broadcast::channel(1024);
        tokio::spawn(run_game_loop(game_rx, broadcast_tx, test_config()));

        for _ in 0..20 {
            let snap = next_state(&mut rx).await;
            assert!(snap.asteroids.len() >= 10);
        }
    }

    #[tokio::test]
    async fn joined_ship_appears_in_next_snapshot() {
        let (game_tx, game_rx) = mpsc::channel(16);
        let (broadcast_tx, mut rx) = broadcast::channel(1024);
        tokio::spawn(run_game_loop(game_rx, broadcast_tx, test_config()));

        let (id, _) = join(&game_tx).await;
        assert_eq!(next_count(&mut rx).await, 1);
        let snap = next_state(&mut rx).await;
        assert_eq!(snap.ships.iter().filter(|s| s.id == id).count(), 1);
    }

    #[tokio::test]
    async fn thrust_moves_ship() {
        let (game_tx, game_rx) = mpsc::channel(16);
        let (broadcast_tx, mut rx) = broadcast::channel(1024);
        tokio::spawn(run_game_loop(game_rx, broadcast_tx, test_config()));

        let (id, _) = join(&game_tx).await;
        game_tx
            .send(GameCommand::Change {
                id,
                force: 1.0,
                angle: Some(0.0),
            })
            .await
            .unwrap();

        let mut moving = false;
        for _ in 0..100 {
            let snap = next_state(&mut rx).await;
            if let Some(ship) = snap.ships.iter().find(|s| s.id == id) {
                if ship.x_vel > 0.0 {
                    moving = true;
                    break;
                }
            }
        }
        assert!(moving, "Ship should pick up speed while thrusting");
    }

    #[tokio::test]
    async fn loop_ends_when_all_senders_drop() {
        let (game_tx, game_rx) = mpsc::channel(16);
        let (broadcast_tx, _rx) = broadcast::channel(16);
        let handle = tokio::spawn(run_game_loop(game_rx, broadcast_tx, test_config()));
        drop(game_tx);
        let finished = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(finished.is_ok(), "Game loop should stop without command senders");
    }
}
