//! Page Breakout - a Breakout overlay for arbitrary web pages
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball motion, collisions, game status)
//! - `settings`: Data-driven game dimensions and speeds
//! - `platform`: Browser integration (DOM discovery, overlay, frame loop)
//! - `error`: Crate error type

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::BreakoutError;
pub use settings::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Paddle defaults (pixels)
    pub const PADDLE_WIDTH: f64 = 160.0;
    pub const PADDLE_HEIGHT: f64 = 14.0;
    /// Gap between the paddle's bottom edge and the viewport bottom
    pub const PADDLE_FROM_BOTTOM: f64 = 20.0;

    /// Ball defaults
    pub const BALL_SIZE: f64 = 20.0;
    /// Speed magnitude applied when the paddle redirects the ball
    pub const BALL_SPEED: f64 = 8.0;
    pub const BALL_START_DX: f64 = 5.0;
    pub const BALL_START_DY: f64 = -5.0;

    /// Blocks must start above `viewport height - BAND_MARGIN`
    pub const BAND_MARGIN: f64 = 250.0;

    /// Paddle redirection maps the hit offset onto [MIN, MIN + SPAN] degrees
    pub const PADDLE_ANGLE_MIN_DEG: f64 = 20.0;
    pub const PADDLE_ANGLE_SPAN_DEG: f64 = 140.0;
}

/// Map a hit offset along the paddle to a launch angle in degrees
#[inline]
pub fn paddle_angle_deg(offset: f64, paddle_width: f64, min_deg: f64, span_deg: f64) -> f64 {
    offset / paddle_width * span_deg + min_deg
}
