/*!
Runtime configuration, loaded from TOML.

Every field has a default (see [`crate::constants`]), so an empty file is a
valid configuration. A top-level `preset` fills the explosion distance and the
`[transition]` table unless those are given explicitly.

```toml
preset = "energetic"
seed = 42

[physics]
spring_stiffness = 12.0

[collision]
enabled = true
```
*/

use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::constants::*;
use crate::easing::Easing;
use crate::error::{ConfigError, Result};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplosionConfig {
    /// Travel every part gets before jitter and size terms (meters).
    pub base_distance: f32,
    /// Upper bound of the random extra travel. Zero disables jitter.
    pub jitter_range: f32,
    /// Extra travel per meter of collision radius.
    pub radius_factor: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            base_distance: DEFAULT_EXPLOSION_DISTANCE,
            jitter_range: DEFAULT_JITTER_RANGE,
            radius_factor: DEFAULT_RADIUS_FACTOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub duration_ms: u32,
    pub easing: Easing,
    /// Start delay added per part index.
    pub stagger_ms: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_TRANSITION_MS,
            easing: Easing::default(),
            stagger_ms: 0,
        }
    }
}

impl TransitionConfig {
    #[inline]
    pub fn duration_secs(&self) -> f32 {
        self.duration_ms as f32 / 1000.0
    }

    #[inline]
    pub fn stagger_secs(&self) -> f32 {
        self.stagger_ms as f32 / 1000.0
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    pub spring_stiffness: f32,
    pub linear_drag: f32,
    pub quadratic_drag: f32,
    pub angular_drag: f32,
    pub angular_quadratic_drag: f32,
    pub idle_angular_drag: f32,
    pub rotation_return_rate: f32,
    pub settle_speed: f32,
    pub settle_distance: f32,
    pub settle_angle: f32,
    /// Largest frame delta consumed by one step (seconds).
    pub max_dt: f32,
    pub bob_amplitude: f32,
    pub bob_scale: f32,
    pub idle_spin_weights: [f32; 3],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            spring_stiffness: SPRING_STIFFNESS,
            linear_drag: LINEAR_DRAG,
            quadratic_drag: QUADRATIC_DRAG,
            angular_drag: ANGULAR_DRAG,
            angular_quadratic_drag: ANGULAR_QUADRATIC_DRAG,
            idle_angular_drag: IDLE_ANGULAR_DRAG,
            rotation_return_rate: ROTATION_RETURN_RATE,
            settle_speed: SETTLE_SPEED,
            settle_distance: SETTLE_DISTANCE,
            settle_angle: SETTLE_ANGLE,
            max_dt: MAX_FRAME_DT,
            bob_amplitude: BOB_AMPLITUDE,
            bob_scale: BOB_SCALE,
            idle_spin_weights: IDLE_SPIN_WEIGHTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    pub enabled: bool,
    /// Only allow grabbing while the object is exploded.
    pub exploded_only: bool,
    pub hold_threshold_ms: u32,
    pub drag_epsilon: f32,
    pub history_len: usize,
    pub sample_window_ms: u32,
    pub throw_scale: f32,
    pub max_throw_speed: f32,
    pub torque_gain: f32,
    /// Allow grabbing a part while another one is still flying after a throw.
    pub allow_grab_during_free_flight: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exploded_only: true,
            hold_threshold_ms: HOLD_THRESHOLD_MS,
            drag_epsilon: DRAG_EPSILON,
            history_len: DRAG_HISTORY_LEN,
            sample_window_ms: THROW_SAMPLE_WINDOW_MS,
            throw_scale: THROW_SCALE,
            max_throw_speed: MAX_THROW_SPEED,
            torque_gain: TORQUE_GAIN,
            allow_grab_during_free_flight: true,
        }
    }
}

impl InteractionConfig {
    #[inline]
    pub fn hold_threshold_secs(&self) -> f32 {
        self.hold_threshold_ms as f32 / 1000.0
    }

    #[inline]
    pub fn sample_window_secs(&self) -> f32 {
        self.sample_window_ms as f32 / 1000.0
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionConfig {
    pub enabled: bool,
    /// Also resolve overlaps while assembled. Off by default.
    pub when_assembled: bool,
    /// Confirm sphere hits with an AABB overlap test.
    pub box_confirm: bool,
    pub push_fraction: f32,
    pub max_push_step: f32,
    pub restitution: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            when_assembled: false,
            box_confirm: false,
            push_fraction: PUSH_FRACTION,
            max_push_step: MAX_PUSH_STEP,
            restitution: RESTITUTION,
        }
    }
}

/// Named bundles of explosion distance and transition timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPreset {
    Gentle,
    Normal,
    Energetic,
    Dramatic,
}

impl AnimationPreset {
    pub fn explosion_distance(self) -> f32 {
        match self {
            AnimationPreset::Gentle => 1.0,
            AnimationPreset::Normal => 1.5,
            AnimationPreset::Energetic => 2.5,
            AnimationPreset::Dramatic => 3.5,
        }
    }

    pub fn transition(self) -> TransitionConfig {
        let (duration_ms, easing, stagger_ms) = match self {
            AnimationPreset::Gentle => (1200, Easing::EaseOut, 20),
            AnimationPreset::Normal => (800, Easing::EaseInOut, 15),
            AnimationPreset::Energetic => (600, Easing::EaseOut, 10),
            AnimationPreset::Dramatic => (1500, Easing::EaseOutQuart, 30),
        };
        TransitionConfig {
            duration_ms,
            easing,
            stagger_ms,
        }
    }
}

/// Complete runtime configuration of an [`crate::Exploder`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExploderConfig {
    pub preset: Option<AnimationPreset>,
    /// Seed for the random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub explosion: ExplosionConfig,
    pub transition: TransitionConfig,
    pub physics: PhysicsConfig,
    pub interaction: InteractionConfig,
    pub collision: CollisionConfig,
}

/// On-disk shape. Tables a preset can fill stay optional so we can tell whether
/// the file set them.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    preset: Option<AnimationPreset>,
    seed: Option<u64>,
    explosion: Option<ExplosionConfig>,
    transition: Option<TransitionConfig>,
    physics: PhysicsConfig,
    interaction: InteractionConfig,
    collision: CollisionConfig,
}

impl ExploderConfig {
    /// Defaults with `preset` applied.
    pub fn with_preset(preset: AnimationPreset) -> Self {
        let mut cfg = Self::default();
        cfg.apply_preset(preset);
        cfg
    }

    /// Overwrite the explosion distance and transition with the preset's values.
    pub fn apply_preset(&mut self, preset: AnimationPreset) {
        self.preset = Some(preset);
        self.explosion.base_distance = preset.explosion_distance();
        self.transition = preset.transition();
    }

    pub fn from_toml_str(src: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(src)?;

        let mut cfg = ExploderConfig {
            preset: file.preset,
            seed: file.seed,
            explosion: ExplosionConfig::default(),
            transition: TransitionConfig::default(),
            physics: file.physics,
            interaction: file.interaction,
            collision: file.collision,
        };
        if let Some(preset) = file.preset {
            cfg.apply_preset(preset);
        }
        if let Some(explosion) = file.explosion {
            cfg.explosion = explosion;
        }
        if let Some(transition) = file.transition {
            cfg.transition = transition;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&src)?;
        info!("loaded exploder config from {}", path.display());
        Ok(cfg)
    }

    /// Reject values the integrator can't run with; warn about values that merely look odd.
    pub fn validate(&self) -> Result<()> {
        let e = &self.explosion;
        non_negative("explosion.base_distance", e.base_distance)?;
        non_negative("explosion.jitter_range", e.jitter_range)?;
        non_negative("explosion.radius_factor", e.radius_factor)?;

        let p = &self.physics;
        positive("physics.max_dt", p.max_dt)?;
        non_negative("physics.spring_stiffness", p.spring_stiffness)?;
        non_negative("physics.linear_drag", p.linear_drag)?;
        non_negative("physics.quadratic_drag", p.quadratic_drag)?;
        non_negative("physics.angular_drag", p.angular_drag)?;
        non_negative("physics.angular_quadratic_drag", p.angular_quadratic_drag)?;
        non_negative("physics.idle_angular_drag", p.idle_angular_drag)?;
        non_negative("physics.rotation_return_rate", p.rotation_return_rate)?;
        positive("physics.settle_speed", p.settle_speed)?;
        positive("physics.settle_distance", p.settle_distance)?;
        positive("physics.settle_angle", p.settle_angle)?;
        non_negative("physics.bob_amplitude", p.bob_amplitude)?;
        non_negative("physics.bob_scale", p.bob_scale)?;
        if p.idle_spin_weights.iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::invalid(
                "physics.idle_spin_weights",
                "weights must be finite",
            ));
        }

        let i = &self.interaction;
        if i.history_len == 0 {
            return Err(ConfigError::invalid(
                "interaction.history_len",
                "must keep at least one sample",
            ));
        }
        non_negative("interaction.drag_epsilon", i.drag_epsilon)?;
        non_negative("interaction.throw_scale", i.throw_scale)?;
        non_negative("interaction.max_throw_speed", i.max_throw_speed)?;
        non_negative("interaction.torque_gain", i.torque_gain)?;

        let c = &self.collision;
        if !(0.0..=1.0).contains(&c.restitution) {
            return Err(ConfigError::invalid(
                "collision.restitution",
                format!("{} is outside [0, 1]", c.restitution),
            ));
        }
        if !(0.0..=1.0).contains(&c.push_fraction) {
            return Err(ConfigError::invalid(
                "collision.push_fraction",
                format!("{} is outside [0, 1]", c.push_fraction),
            ));
        }
        non_negative("collision.max_push_step", c.max_push_step)?;

        // Soft checks.
        if self.transition.duration_ms < MIN_SMOOTH_TRANSITION_MS {
            warn!(
                "transition.duration_ms = {} is shorter than {} ms; parts will appear to jump",
                self.transition.duration_ms, MIN_SMOOTH_TRANSITION_MS
            );
        }
        if p.max_dt > 0.25 {
            warn!(
                "physics.max_dt = {} allows very large frame steps; a stalled frame may look like a jump",
                p.max_dt
            );
        }
        if i.enabled && i.max_throw_speed == 0.0 {
            warn!("interaction.max_throw_speed is 0; thrown parts will drop in place");
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be >= 0")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be > 0")))
    }
}
