/// Obstacle spawning, scrolling and collision.

use std::time::Duration;

use rand::Rng;

use crate::config::ObstacleConfig;
use crate::entities::{Avatar, Obstacle, Playfield};

#[derive(Clone, Debug)]
pub struct ObstacleManager {
    config: ObstacleConfig,
    interval: Duration,
    /// In insertion (spawn) order.
    obstacles: Vec<Obstacle>,
    /// `None` until the first spawn of a round, which is therefore immediate.
    last_spawn: Option<Duration>,
}

impl ObstacleManager {
    pub fn new(config: ObstacleConfig) -> Self {
        let interval = config.spawn_interval();
        Self {
            config,
            interval,
            obstacles: Vec::new(),
            last_spawn: None,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn last_spawn(&self) -> Option<Duration> {
        self.last_spawn
    }

    /// Place an obstacle directly; used by scripted scenarios and tests.
    pub fn insert(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Spawn one obstacle on the right edge if a full interval has elapsed
    /// since the previous one. Returns whether a spawn happened.
    pub fn spawn_if_due(&mut self, now: Duration, playfield: &Playfield, rng: &mut impl Rng) -> bool {
        let due = match self.last_spawn {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        };
        if !due {
            return false;
        }

        let lo = playfield.height() * self.config.spawn_min_fraction;
        let hi = playfield.height() * self.config.spawn_max_fraction;
        let y = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        let obstacle = Obstacle {
            x: playfield.width(),
            y,
            radius: self.config.radius,
        };
        log::debug!("spawned obstacle at y={:.1} (t={}ms)", y, now.as_millis());
        self.obstacles.push(obstacle);
        self.last_spawn = Some(now);
        true
    }

    /// Scroll everything left, then drop obstacles whose right edge has
    /// passed x = 0. An edge sitting exactly on 0 survives one more tick.
    pub fn advance_all(&mut self) {
        let speed = self.config.scroll_speed;
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }
        self.prune();
    }

    pub fn prune(&mut self) {
        self.obstacles.retain(|o| o.right() >= 0.0);
    }

    /// Remove and return every obstacle touching the avatar.
    pub fn test_collision(&mut self, avatar: &Avatar) -> Vec<Obstacle> {
        let bounds = avatar.bounds();
        let (hit, kept): (Vec<Obstacle>, Vec<Obstacle>) = self
            .obstacles
            .drain(..)
            .partition(|o| o.overlaps(&bounds));
        self.obstacles = kept;
        if !hit.is_empty() {
            log::debug!("avatar consumed {} obstacle(s)", hit.len());
        }
        hit
    }

    /// Empty the field and restart the spawn timer.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.last_spawn = None;
    }
}
