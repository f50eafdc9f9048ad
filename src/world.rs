use glam::Vec2;

use crate::config::WorldConfig;

/// Side length of the player's footprint, used for clamping to bounds.
pub const PLAYER_SIZE: f32 = 48.0;
/// Footprint of a transient effect.
pub const EFFECT_SIZE: f32 = 32.0;
/// Seconds a transient effect stays live before it resolves.
pub const EFFECT_LIFETIME: f32 = 2.1;
/// Per-axis distance at which a resolving effect catches the player.
pub const DANGER_RANGE: f32 = 32.0;

/// A short-lived effect placed by a script or the host.
#[derive(Debug, Clone, Copy)]
pub struct TransientEffect {
    pub position: Vec2,
    pub remaining: f32,
}

/// The host state scripts observe through the facade, plus the small
/// simulation around it: player, bounds, transient effects and the
/// end-of-run rule.
pub struct GameWorld {
    player: Vec2,
    bounds: Vec2,
    hard_mode: bool,
    effects: Vec<TransientEffect>,
    messages: Vec<String>,
    game_over: bool,
}

impl GameWorld {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            player: Vec2::from(config.player_start),
            bounds: Vec2::new(config.width, config.height),
            hard_mode: config.hard_mode,
            effects: Vec::new(),
            messages: Vec::new(),
            game_over: false,
        }
    }

    pub fn player_position(&self) -> Vec2 {
        self.player
    }

    pub fn hard_mode(&self) -> bool {
        self.hard_mode
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn effects(&self) -> &[TransientEffect] {
        &self.effects
    }

    /// Moves the player along `direction`, clamped to the world bounds.
    pub fn move_player(&mut self, direction: Vec2, speed: f32, dt: f32) {
        let next = self.player + direction * speed * dt;
        self.player = clamp_to_bounds(next, self.bounds, PLAYER_SIZE);
    }

    /// Places a transient effect, clamped into bounds.
    pub fn spawn_effect(&mut self, position: Vec2) {
        let position = clamp_to_bounds(position, self.bounds, EFFECT_SIZE);
        self.effects.push(TransientEffect { position, remaining: EFFECT_LIFETIME });
    }

    /// Records one line from a script; the host drains these each tick.
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Ages transient effects. An effect that resolves close enough to the
    /// player ends the run.
    pub fn update(&mut self, dt: f32) {
        if self.game_over {
            return;
        }
        let player = self.player;
        let mut caught = false;
        self.effects.retain_mut(|effect| {
            effect.remaining -= dt;
            if effect.remaining > 0.0 {
                return true;
            }
            let delta = (effect.position - player).abs();
            if delta.x < DANGER_RANGE && delta.y < DANGER_RANGE {
                caught = true;
            }
            false
        });
        if caught {
            self.game_over = true;
        }
    }
}

fn clamp_to_bounds(position: Vec2, bounds: Vec2, footprint: f32) -> Vec2 {
    Vec2::new(
        position.x.clamp(0.0, (bounds.x - footprint).max(0.0)),
        position.y.clamp(0.0, (bounds.y - footprint).max(0.0)),
    )
}
