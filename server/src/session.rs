use std::collections::BTreeMap;

/// Control intent of one connected player.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: u32,
    /// Requested thrust in [0, 1]
    pub force: f64,
    /// Time (ms) continuous thrust started, `None` while coasting
    pub on_time: Option<u64>,
}

impl Session {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            force: 0.0,
            on_time: None,
        }
    }

    pub fn is_thrusting(&self) -> bool {
        self.on_time.is_some()
    }

    /// Apply a thrust update. Starts the ramp if the session was coasting.
    /// Non-finite force counts as zero.
    pub fn change(&mut self, force: f64, now_ms: u64) {
        if self.on_time.is_none() {
            self.on_time = Some(now_ms);
        }
        self.force = if force.is_finite() {
            force.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn release(&mut self) {
        self.on_time = None;
    }

    /// Fraction of full thrust reached after holding input until `now_ms`.
    pub fn ramp(&self, now_ms: u64, ramp_ms: u32) -> f64 {
        match self.on_time {
            Some(start) => {
                let held = now_ms.saturating_sub(start) as f64;
                (held / ramp_ms as f64).min(1.0)
            }
            None => 0.0,
        }
    }
}

/// Heading for a raw input angle. Client angles are mirrored; malformed
/// angles are dropped so the current heading stays.
pub fn heading_from_input(angle: Option<f64>) -> Option<f64> {
    angle.filter(|a| a.is_finite()).map(|a| -a)
}

/// Active sessions, ordered by id.
#[derive(Debug)]
pub struct Sessions {
    sessions: BTreeMap<u32, Session>,
    next_id: u32,
}

impl Sessions {
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register a new session and return its id.
    pub fn open(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, Session::new(id));
        id
    }

    /// Returns the session if it was registered.
    pub fn close(&mut self, id: u32) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for Sessions {
    fn default() -> Self {
        Self::new()
    }
}
