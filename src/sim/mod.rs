//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One call to `advance` is one frame, no delta time
//! - Blocks are scanned in construction order
//! - No DOM or platform dependencies

pub mod block;
pub mod collision;
pub mod session;
pub mod state;
pub mod tick;

pub use block::{Block, BlockHandle, Rect};
pub use collision::{first_overlap, paddle_deflection, paddle_hit};
pub use session::{Frame, Session};
pub use state::{Ball, FrameReport, Game, GameEvent, GameStatus, Paddle, Viewport};
pub use tick::advance;
