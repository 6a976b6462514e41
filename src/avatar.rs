/// Bird physics and animation.

use crate::config::{AvatarConfig, PhysicsConfig};
use crate::entities::{Avatar, Playfield};

/// Owns the tuning for the bird; the `Avatar` itself lives in the game state.
#[derive(Clone, Debug)]
pub struct AvatarController {
    physics: PhysicsConfig,
    avatar: AvatarConfig,
}

impl AvatarController {
    pub fn new(physics: PhysicsConfig, avatar: AvatarConfig) -> Self {
        Self { physics, avatar }
    }

    pub fn flap_impulse(&self) -> f32 {
        self.physics.flap_impulse
    }

    pub fn max_fall_speed(&self) -> f32 {
        self.physics.max_fall_speed
    }

    /// A bird at rest at its start position, scaled to the playfield.
    pub fn spawn(&self, playfield: &Playfield) -> Avatar {
        let mut avatar = Avatar {
            x: 0.0,
            y: 0.0,
            width: playfield.width() * self.avatar.width_fraction,
            height: playfield.height() * self.avatar.height_fraction,
            velocity: 0.0,
            frame: 0,
            anim_counter: 0,
            activate_latch: false,
        };
        self.reposition(&mut avatar, playfield);
        avatar
    }

    /// Back to the start coordinates with no momentum. Animation and the
    /// activate latch are left alone.
    pub fn reposition(&self, avatar: &mut Avatar, playfield: &Playfield) {
        avatar.x = self.avatar.start_x;
        avatar.y = playfield.height() / 2.0;
        avatar.velocity = 0.0;
    }

    /// Accelerate downward, then fall unless already resting on `ground_y`.
    /// The move is clamped so the bottom edge never passes the ground line.
    pub fn apply_gravity(&self, avatar: &mut Avatar, ground_y: f32) {
        avatar.velocity = (avatar.velocity + self.physics.gravity).min(self.physics.max_fall_speed);
        if !avatar.is_grounded(ground_y) {
            avatar.y = (avatar.y + avatar.velocity).min(avatar.floor(ground_y));
        }
    }

    pub fn apply_impulse(&self, avatar: &mut Avatar) {
        avatar.velocity = self.physics.flap_impulse;
    }

    /// Feed this tick's activate signal through the edge latch. Returns true
    /// (and flaps) only on a low-to-high transition.
    pub fn service_activate(&self, avatar: &mut Avatar, activate: bool) -> bool {
        let rising = activate && !avatar.activate_latch;
        avatar.activate_latch = activate;
        if rising {
            self.apply_impulse(avatar);
        }
        rising
    }

    /// Cycle the wing frame; purely cosmetic.
    pub fn animate(&self, avatar: &mut Avatar) {
        avatar.anim_counter += 1;
        if avatar.anim_counter > self.avatar.flap_cooldown {
            avatar.anim_counter = 0;
            avatar.frame = (avatar.frame + 1) % self.avatar.frame_count;
        }
    }
}
