//! Load test for the asteroids server.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Connect to the server
//! - Periodically steer (change) and let go (release)
//! - Receive and count state snapshots
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of clients to spawn (default: 100)
//!   --duration S     Test duration in seconds (default: 30)
//!   --input-rate R   Control messages per second per client (default: 4)
//!   --url URL        Server URL (default: ws://127.0.0.1:3000/ws)

use futures_util::{SinkExt, StreamExt};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Nominal server tick rate used for the delivery estimate
const EXPECTED_STATES_PER_SEC: f64 = 100.0;

// === Protocol types (minimal subset) ===

#[derive(Serialize)]
#[serde(tag = "type")]
enum ControlMsg {
    #[serde(rename = "change")]
    Change { force: f64, angle: f64 },
    #[serde(rename = "release")]
    Release,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome {},
    #[serde(rename = "players")]
    Players {},
    #[serde(rename = "state")]
    State {
        ships: Vec<serde_json::Value>,
        asteroids: Vec<serde_json::Value>,
    },
}

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    states_received: AtomicU64,
    player_counts_received: AtomicU64,
    inputs_sent: AtomicU64,
    errors: AtomicU64,
    total_asteroids_seen: AtomicU64,
    ship_hits_seen: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    input_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let input_interval = if input_rate > 0.0 {
        Duration::from_secs_f64(1.0 / input_rate)
    } else {
        Duration::from_secs(3600) // Effectively never
    };
    let mut input_timer = tokio::time::interval(input_interval);
    input_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut rng = ChaCha8Rng::seed_from_u64(client_id as u64);
    let test_end = Instant::now() + duration;

    while Instant::now() < test_end {
        tokio::select! {
            _ = input_timer.tick() => {
                // Mostly steer, sometimes coast
                let msg = if rng.gen_bool(0.75) {
                    ControlMsg::Change { force: rng.gen(), angle: rng.gen::<f64>() * TAU }
                } else {
                    ControlMsg::Release
                };
                let Ok(json) = serde_json::to_string(&msg) else { continue };
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.inputs_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::State { ships, asteroids }) => {
                                metrics.states_received.fetch_add(1, Ordering::Relaxed);
                                metrics.total_asteroids_seen.fetch_add(asteroids.len() as u64, Ordering::Relaxed);
                                let hits = ships
                                    .iter()
                                    .filter(|s| s.get("hit").and_then(|v| v.as_bool()) == Some(true))
                                    .count();
                                metrics.ship_hits_seen.fetch_add(hits as u64, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Players {}) => {
                                metrics.player_counts_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Welcome {}) => {}
                            Err(_) => {
                                metrics.errors.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 100;
    let mut duration_secs: u64 = 30;
    let mut input_rate: f64 = 4.0;
    let mut url = "ws://127.0.0.1:3000/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--input-rate" => {
                i += 1;
                input_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(4.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Asteroids Server Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    println!("Input rate: {}/s per client", input_rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);
        handles.push(tokio::spawn(run_client(
            client_id, url, input_rate, duration, metrics,
        )));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();
        loop {
            interval.tick().await;
            println!(
                "[{:3}s] connected={}, msgs={}, states={}, inputs={}, errors={}",
                start.elapsed().as_secs(),
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.states_received.load(Ordering::Relaxed),
                metrics_clone.inputs_sent.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }
    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let states = metrics.states_received.load(Ordering::Relaxed);
    let asteroids = metrics.total_asteroids_seen.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total state messages: {}", states);
    println!(
        "Total players messages: {}",
        metrics.player_counts_received.load(Ordering::Relaxed)
    );
    println!("Total inputs sent: {}", metrics.inputs_sent.load(Ordering::Relaxed));
    println!("Ship hits seen: {}", metrics.ship_hits_seen.load(Ordering::Relaxed));
    println!("Total errors: {}", metrics.errors.load(Ordering::Relaxed));
    if states > 0 {
        println!("Average asteroids per snapshot: {}", asteroids / states);
    }
    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let states_per_client = states as f64 / num_clients.max(1) as f64;
    let expected = duration_secs as f64 * EXPECTED_STATES_PER_SEC;
    println!();
    println!("Messages/sec (total): {:.0}", msgs as f64 / duration_secs.max(1) as f64);
    println!("States per client: {:.1}", states_per_client);
    println!("Expected states per client: {:.1}", expected);
    if expected > 0.0 {
        println!("Delivery rate: {:.1}%", states_per_client / expected * 100.0);
    }
}
