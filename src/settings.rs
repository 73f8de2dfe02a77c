//! Game configuration
//!
//! Dimensions and speeds for paddle and ball. Every field has a default, so a
//! page can override just the values it cares about with a partial JSON object.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::BreakoutError;

/// Tunable game dimensions (pixels, pixels per frame, degrees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Paddle ===
    pub paddle_width: f64,
    pub paddle_height: f64,
    /// Distance from the paddle's bottom edge to the viewport bottom
    pub paddle_from_bottom: f64,

    // === Ball ===
    /// Diameter of the ball's bounding square
    pub ball_size: f64,
    /// Speed after a paddle bounce
    pub ball_speed: f64,
    /// Velocity at game start
    pub ball_start_velocity: DVec2,

    // === Blocks ===
    /// Elements must start above `viewport height - band_margin` to become blocks
    pub band_margin: f64,

    // === Paddle redirection ===
    pub paddle_angle_min_deg: f64,
    pub paddle_angle_span_deg: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_from_bottom: PADDLE_FROM_BOTTOM,

            ball_size: BALL_SIZE,
            ball_speed: BALL_SPEED,
            ball_start_velocity: DVec2::new(BALL_START_DX, BALL_START_DY),

            band_margin: BAND_MARGIN,

            paddle_angle_min_deg: PADDLE_ANGLE_MIN_DEG,
            paddle_angle_span_deg: PADDLE_ANGLE_SPAN_DEG,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON object over the defaults and validate it
    pub fn from_json(json: &str) -> Result<Self, BreakoutError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot work with.
    ///
    /// A paddle wider than the viewport is allowed; the paddle then pins to x = 0.
    pub fn validate(&self) -> Result<(), BreakoutError> {
        let positive = [
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("ball_size", self.ball_size),
            ("ball_speed", self.ball_speed),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(BreakoutError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !(self.band_margin >= 0.0) || !(self.paddle_from_bottom >= 0.0) {
            return Err(BreakoutError::InvalidConfig(
                "band_margin and paddle_from_bottom must not be negative".to_string(),
            ));
        }

        if !self.ball_start_velocity.is_finite() {
            return Err(BreakoutError::InvalidConfig(
                "ball_start_velocity must be finite".to_string(),
            ));
        }

        Ok(())
    }
}
