use asteroids_shared::config::GameConfig;
use std::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_interval_ms: u64,
    /// Fixed seed for reproducible worlds; `None` seeds from OS entropy
    pub rng_seed: Option<u64>,
    pub max_connections: usize,
    /// Capacity of the snapshot broadcast channel
    pub broadcast_capacity: usize,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            tick_interval_ms: 10,
            rng_seed: None,
            max_connections: 256,
            broadcast_capacity: 64,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by environment variables.
    ///
    /// `PORT` wins over `LISTEN_ADDR` so hosting platforms that inject a port
    /// work without extra setup.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            config.listen_addr = format!("0.0.0.0:{}", port);
        } else if let Ok(addr) = env::var("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(v) = parse_var::<u64>("TICK_INTERVAL_MS")? {
            config.tick_interval_ms = v;
        }
        if let Some(v) = parse_var::<u64>("RNG_SEED")? {
            config.rng_seed = Some(v);
        }
        if let Some(v) = parse_var::<usize>("MAX_CONNECTIONS")? {
            config.max_connections = v;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("listen_addr '{}' is not a socket address", self.listen_addr));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be > 0".to_string());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }
        if self.broadcast_capacity == 0 {
            return Err("broadcast_capacity must be > 0".to_string());
        }
        self.game.validate()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{} has invalid value '{}'", name, raw)),
        Err(_) => Ok(None),
    }
}
