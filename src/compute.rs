/// The game-state engine.
///
/// `Game` owns every piece of mutable state (bird, obstacles, score, clock)
/// and advances it one fixed tick at a time.  Rendering only ever sees the
/// `Snapshot` it hands out.  Randomness comes in through an injected RNG so
/// tests can run with a seeded or stepped generator.

use std::time::Duration;

use rand::Rng;

use crate::avatar::AvatarController;
use crate::clock::SimClock;
use crate::config::{GameConfig, WorldConfig};
use crate::entities::{
    Avatar, AvatarSnapshot, FrameInput, GameStatus, ObstacleSnapshot, Playfield, Rect, Snapshot,
};
use crate::obstacles::ObstacleManager;

/// Size of the restart control on the game-over screen.
pub const RESTART_BUTTON_WIDTH: f32 = 100.0;
pub const RESTART_BUTTON_HEIGHT: f32 = 50.0;

/// The restart button, centred in the playfield.
pub fn restart_button_rect(playfield: &Playfield) -> Rect {
    Rect {
        left: playfield.width() / 2.0 - RESTART_BUTTON_WIDTH / 2.0,
        top: playfield.height() / 2.0 - RESTART_BUTTON_HEIGHT / 2.0,
        width: RESTART_BUTTON_WIDTH,
        height: RESTART_BUTTON_HEIGHT,
    }
}

// ── Score ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
}

impl ScoreTracker {
    pub fn score(&self) -> u32 {
        self.score
    }

    /// One point per obstacle consumed this tick.
    pub fn on_pass_or_collision(&mut self, count: usize) {
        let gained = u32::try_from(count).unwrap_or(u32::MAX);
        self.score = self.score.saturating_add(gained);
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

// ── State machine ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Game {
    playfield: Playfield,
    world: WorldConfig,
    scroll_speed: f32,
    ground_y: f32,
    restart_button: Rect,
    controller: AvatarController,
    avatar: Avatar,
    obstacles: ObstacleManager,
    score: ScoreTracker,
    status: GameStatus,
    ground_scroll: f32,
    clock: SimClock,
}

impl Game {
    pub fn new(config: &GameConfig, playfield: Playfield) -> Self {
        let controller = AvatarController::new(config.physics.clone(), config.avatar.clone());
        let avatar = controller.spawn(&playfield);
        Self {
            ground_y: playfield.height() * config.world.ground_fraction,
            restart_button: restart_button_rect(&playfield),
            world: config.world.clone(),
            scroll_speed: config.obstacles.scroll_speed,
            controller,
            avatar,
            obstacles: ObstacleManager::new(config.obstacles.clone()),
            score: ScoreTracker::default(),
            status: GameStatus::Idle,
            ground_scroll: 0.0,
            clock: SimClock::default(),
            playfield,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn obstacles(&self) -> &ObstacleManager {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleManager {
        &mut self.obstacles
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    pub fn ground_scroll(&self) -> f32 {
        self.ground_scroll
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn restart_button(&self) -> Rect {
        self.restart_button
    }

    /// Simulated time since the game was created.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Advance the simulation by one tick of length `dt`.
    pub fn advance(&mut self, input: FrameInput, dt: Duration, rng: &mut impl Rng) {
        let now = self.clock.advance(dt);

        match self.status {
            GameStatus::Idle => {
                self.controller.animate(&mut self.avatar);
                if self.controller.service_activate(&mut self.avatar, input.activate) {
                    self.status = GameStatus::Flying;
                    log::info!("first flap, game started");
                }
            }
            GameStatus::Flying => {
                self.controller.apply_gravity(&mut self.avatar, self.ground_y);
                self.controller.service_activate(&mut self.avatar, input.activate);
                self.controller.animate(&mut self.avatar);

                let consumed = self.obstacles.test_collision(&self.avatar);
                self.score.on_pass_or_collision(consumed.len());

                if self.avatar.is_grounded(self.ground_y) {
                    self.status = GameStatus::GameOver;
                    log::info!("bird hit the ground, final score {}", self.score.score());
                    return;
                }

                self.obstacles.spawn_if_due(now, &self.playfield, rng);
                self.scroll_ground();
                self.obstacles.advance_all();
            }
            GameStatus::GameOver => {
                if input.restart_requested {
                    self.restart();
                    // A hand still closed from pressing restart must open
                    // again before it can launch the next round.
                    self.avatar.activate_latch = input.activate;
                }
            }
        }
    }

    /// `advance` followed by `snapshot`.
    pub fn step(&mut self, input: FrameInput, dt: Duration, rng: &mut impl Rng) -> Snapshot {
        self.advance(input, dt, rng);
        self.snapshot()
    }

    /// Back to a fresh, flap-to-start round.
    pub fn restart(&mut self) {
        self.obstacles.clear();
        self.controller.reposition(&mut self.avatar, &self.playfield);
        self.score.reset();
        self.ground_scroll = 0.0;
        self.status = GameStatus::Idle;
        log::info!("game restarted");
    }

    fn scroll_ground(&mut self) {
        self.ground_scroll -= self.scroll_speed;
        if self.ground_scroll.abs() > self.world.scroll_wrap {
            self.ground_scroll = 0.0;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            avatar: AvatarSnapshot {
                x: self.avatar.x,
                y: self.avatar.y,
                width: self.avatar.width,
                height: self.avatar.height,
                rotation: self.avatar.rotation(),
                frame: self.avatar.frame,
            },
            obstacles: self
                .obstacles
                .obstacles()
                .iter()
                .map(|o| ObstacleSnapshot { x: o.x, y: o.y, radius: o.radius })
                .collect(),
            score: self.score.score(),
            status: self.status,
            ground_scroll: self.ground_scroll,
            ground_y: self.ground_y,
            playfield: self.playfield,
            restart_button: self.restart_button,
        }
    }
}
