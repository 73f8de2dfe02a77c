//! Game state and core simulation types
//!
//! One `Game` is one round: a paddle, a ball, the blocks still standing and the
//! current status. Nothing in here touches the page.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockHandle};
use crate::error::BreakoutError;
use crate::settings::GameConfig;

/// Current viewport size in pixels. Read fresh every call, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Status of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Ball in play
    Running,
    /// Every block destroyed
    Won,
    /// Ball fell below the viewport
    Lost,
}

impl GameStatus {
    /// Won and Lost are final; nothing advances afterwards
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Running)
    }
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Block left the active collection; the element should be hidden
    BlockDestroyed { handle: BlockHandle },
    /// Paddle redirected the ball
    PaddleHit { offset: f64, angle_deg: f64 },
}

/// Everything a frame produces for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Ball top-left corner
    pub ball: DVec2,
    /// Paddle left edge
    pub paddle_x: f64,
    pub status: GameStatus,
    pub events: Vec<GameEvent>,
}

impl FrameReport {
    /// Handles of blocks destroyed this frame, in destruction order
    pub fn destroyed(&self) -> impl Iterator<Item = BlockHandle> + '_ {
        self.events.iter().filter_map(|e| match e {
            GameEvent::BlockDestroyed { handle } => Some(*handle),
            _ => None,
        })
    }
}

/// The player's paddle. Only `x` moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f64,
    pub width: f64,
    pub height: f64,
    /// Gap between the paddle's bottom edge and the viewport bottom
    pub from_bottom: f64,
}

impl Paddle {
    /// Follow the pointer, centering the paddle under it and keeping it on screen.
    ///
    /// A paddle wider than the viewport pins to x = 0.
    pub fn follow(&mut self, pointer_x: f64, viewport_width: f64) {
        let target = pointer_x - self.width / 2.0;
        self.x = target.min(viewport_width - self.width).max(0.0);
    }

    /// Top face for the given viewport height
    #[inline]
    pub fn top(&self, viewport_height: f64) -> f64 {
        viewport_height - self.from_bottom - self.height
    }
}

/// The ball, tracked by the top-left corner of its bounding square
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Side of the bounding square
    pub size: f64,
    /// Speed after a paddle bounce
    pub speed: f64,
}

/// A single round of Breakout
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) paddle: Paddle,
    pub(crate) ball: Ball,
    /// Active blocks in construction order
    pub(crate) blocks: Vec<Block>,
    pub(crate) status: GameStatus,
}

impl Game {
    /// Start a round with the default dimensions
    pub fn new(viewport: Viewport, blocks: Vec<Block>) -> Result<Self, BreakoutError> {
        Self::with_config(GameConfig::default(), viewport, blocks)
    }

    /// Start a round.
    ///
    /// `blocks` must already be filtered to the play band; they are stored as
    /// given. An empty list means there is nothing to play and no game is created.
    pub fn with_config(
        config: GameConfig,
        viewport: Viewport,
        blocks: Vec<Block>,
    ) -> Result<Self, BreakoutError> {
        if blocks.is_empty() {
            return Err(BreakoutError::NoBlocks);
        }

        let paddle_x = ((viewport.width - config.paddle_width) / 2.0).round();
        let paddle = Paddle {
            x: paddle_x,
            width: config.paddle_width,
            height: config.paddle_height,
            from_bottom: config.paddle_from_bottom,
        };

        // Ball rests on the paddle, its left edge at the paddle's center
        let ball = Ball {
            pos: DVec2::new(
                paddle_x + (config.paddle_width / 2.0).round(),
                paddle.top(viewport.height) - config.ball_size,
            ),
            vel: config.ball_start_velocity,
            size: config.ball_size,
            speed: config.ball_speed,
        };

        log::info!(
            "Starting game with {} blocks in {}x{} viewport",
            blocks.len(),
            viewport.width,
            viewport.height
        );

        Ok(Self {
            config,
            paddle,
            ball,
            blocks,
            status: GameStatus::Running,
        })
    }

    /// Move the paddle under the pointer. Does not touch the ball.
    pub fn move_paddle(&mut self, pointer_x: f64, viewport: Viewport) {
        self.paddle.follow(pointer_x, viewport.width);
    }

    /// Remove the block at `index` from the active collection.
    ///
    /// Records a destroy event and flips the status to `Won` when the last block
    /// goes. Out-of-range indices are ignored.
    pub fn destroy_block(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        if index >= self.blocks.len() {
            return;
        }
        let block = self.blocks.remove(index);
        log::debug!(
            "Destroyed block {:?}, {} remaining",
            block.handle,
            self.blocks.len()
        );
        events.push(GameEvent::BlockDestroyed {
            handle: block.handle,
        });

        if self.blocks.is_empty() {
            self.status = GameStatus::Won;
            log::info!("All blocks destroyed");
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Blocks still standing, in construction order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Place the ball directly (serve setups, tests)
    pub fn set_ball(&mut self, pos: DVec2, vel: DVec2) {
        self.ball.pos = pos;
        self.ball.vel = vel;
    }

    /// Snapshot of the current positions with no events
    pub fn report(&self) -> FrameReport {
        FrameReport {
            ball: self.ball.pos,
            paddle_x: self.paddle.x,
            status: self.status,
            events: Vec::new(),
        }
    }
}
