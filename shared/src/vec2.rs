/// 2D vector utilities for the wrapped arena.
/// The arena is the square [-1, 1] x [-1, 1] with toroidal edges.

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }
}

/// Shorthand constructor
pub fn vec2(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// Add two vectors
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x + b.x, a.y + b.y)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x - b.x, a.y - b.y)
}

/// Scale vector by scalar
pub fn scale(v: Vec2, s: f64) -> Vec2 {
    Vec2::new(v.x * s, v.y * s)
}

/// Vector length
pub fn length(v: Vec2) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Wrap a single coordinate: anything past an edge lands exactly on the
/// opposite edge.
#[inline]
pub fn wrap_coord(v: f64) -> f64 {
    if v.abs() > 1.0 {
        -v.signum()
    } else {
        v
    }
}

/// Wrap a point back into the arena, each axis independently.
pub fn wrap(p: Vec2) -> Vec2 {
    Vec2::new(wrap_coord(p.x), wrap_coord(p.y))
}

/// Collision circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// True iff the distance between centres is strictly less than the sum of radii.
/// Touching circles do not overlap.
pub fn circles_overlap(a: Circle, b: Circle) -> bool {
    length(sub(a.center, b.center)) < a.radius + b.radius
}
