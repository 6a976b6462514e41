/// All game entity types — plain data, plus the snapshot handed to the renderer.

use crate::error::{GameError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Waiting for the first flap.
    Idle,
    Flying,
    GameOver,
}

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Logical coordinate space, fixed at startup. Origin top-left, y grows down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    width: f32,
    height: f32,
}

impl Playfield {
    /// Refuses degenerate sizes so physics never sees NaN or empty ranges.
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GameError::InvalidPlayfield { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

/// Axis-aligned rectangle in playfield units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Half-open on the right/bottom edges.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

// ── Avatar ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Avatar {
    /// Centre position.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical velocity in units/tick; positive is downward.
    pub velocity: f32,
    /// Current wing-flap frame.
    pub frame: usize,
    /// Ticks since the frame last advanced.
    pub anim_counter: u32,
    /// Whether the activate signal was high on the previous tick.
    pub activate_latch: bool,
}

impl Avatar {
    pub fn bounds(&self) -> Rect {
        Rect {
            left: self.x - self.width / 2.0,
            top: self.y - self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Lowest centre position that keeps the bird above `ground_y`.
    pub fn floor(&self, ground_y: f32) -> f32 {
        ground_y - self.height / 2.0
    }

    /// Bottom edge has reached the ground line.
    pub fn is_grounded(&self, ground_y: f32) -> bool {
        self.y >= self.floor(ground_y)
    }

    /// Degrees, counter-clockwise: nose up while rising, down while falling.
    pub fn rotation(&self) -> f32 {
        self.velocity * -2.0
    }
}

// ── Obstacle ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    /// Centre position.
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Obstacle {
    pub fn right(&self) -> f32 {
        self.x + self.radius
    }

    /// Circle vs rectangle: the closest point of `rect` lies inside the circle.
    pub fn overlaps(&self, rect: &Rect) -> bool {
        let nearest_x = self.x.clamp(rect.left, rect.right());
        let nearest_y = self.y.clamp(rect.top, rect.bottom());
        let dx = self.x - nearest_x;
        let dy = self.y - nearest_y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

// ── Per-tick input ────────────────────────────────────────────────────────────

/// Everything the core reads from the outside world on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Hand closed / button pressed.
    pub activate: bool,
    /// Only honoured while the game is over.
    pub restart_requested: bool,
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct AvatarSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub frame: usize,
}

impl AvatarSnapshot {
    /// The hitbox the simulation collided with.
    pub fn bounds(&self) -> Rect {
        Rect {
            left: self.x - self.width / 2.0,
            top: self.y - self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Read-only view of one simulated frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub avatar: AvatarSnapshot,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub score: u32,
    pub status: GameStatus,
    pub ground_scroll: f32,
    /// Ground line in playfield units.
    pub ground_y: f32,
    pub playfield: Playfield,
    /// The restart control shown on the game-over screen.
    pub restart_button: Rect,
}
