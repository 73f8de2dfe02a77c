//! Collision detection and response
//!
//! Everything here works on the ball's bounding square. That keeps the tests
//! cheap but has two known gaps:
//! - corners collide as squares, not circles
//! - a ball moving further than a block's smallest dimension in one frame can
//!   pass straight through it (tunnelling)

use glam::DVec2;

use super::block::Block;
use crate::paddle_angle_deg;
use crate::settings::GameConfig;

/// Index of the first block in `blocks` overlapping the ball, in stored order.
///
/// Stored order is the tie-break when the ball overlaps several blocks at once.
pub fn first_overlap(blocks: &[Block], ball_pos: DVec2, ball_size: f64) -> Option<usize> {
    blocks
        .iter()
        .position(|b| b.rect.overlaps_square(ball_pos.x, ball_pos.y, ball_size))
}

/// Ball's top edge above the viewport top
#[inline]
pub fn hits_top_edge(ball_pos: DVec2) -> bool {
    ball_pos.y < 0.0
}

/// Ball past the left or right viewport edge
#[inline]
pub fn hits_side_edge(ball_pos: DVec2, ball_size: f64, viewport_width: f64) -> bool {
    ball_pos.x + ball_size > viewport_width || ball_pos.x < 0.0
}

/// Check whether the ball landed on the paddle's top face this frame.
///
/// Returns the hit offset from the paddle's left edge. Only a ball that was above
/// the paddle top before this frame's vertical move counts, so a ball that already
/// slipped past the paddle falls through. The offset is not clamped and can be
/// slightly negative when the ball clips the paddle's left corner.
pub fn paddle_hit(
    ball_pos: DVec2,
    ball_vel: DVec2,
    ball_size: f64,
    paddle_x: f64,
    paddle_width: f64,
    paddle_top: f64,
) -> Option<f64> {
    let spans_overlap = ball_pos.x + ball_size >= paddle_x && ball_pos.x <= paddle_x + paddle_width;
    let on_or_below = ball_pos.y + ball_size >= paddle_top;
    let was_above = ball_pos.y - ball_vel.y < paddle_top;

    if spans_overlap && on_or_below && was_above {
        Some(ball_pos.x - paddle_x)
    } else {
        None
    }
}

/// Velocity leaving the paddle for a hit at `offset` from its left edge.
///
/// Returns the velocity and the launch angle in degrees. Left-edge hits go up and
/// left, right-edge hits go up and right.
pub fn paddle_deflection(offset: f64, config: &GameConfig) -> (DVec2, f64) {
    let angle_deg = paddle_angle_deg(
        offset,
        config.paddle_width,
        config.paddle_angle_min_deg,
        config.paddle_angle_span_deg,
    );
    let angle = angle_deg.to_radians();
    let vel = DVec2::new(
        -config.ball_speed * angle.cos(),
        -config.ball_speed * angle.sin(),
    );
    (vel, angle_deg)
}
