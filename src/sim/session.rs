//! Frame session
//!
//! Owns a running game on behalf of whatever schedules frames (an animation
//! frame loop in the browser, a plain loop natively). The scheduler asks for a
//! frame and keeps asking only while it gets `Frame::Running` back.

use super::state::{FrameReport, Game, GameStatus, Viewport};

/// Outcome of one scheduled frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Game continues; schedule another frame
    Running(FrameReport),
    /// Game ended this frame; show the result and stop scheduling
    Finished(FrameReport),
    /// Nothing happened: the game already finished or was torn down
    Stopped,
}

impl Frame {
    /// Whether the scheduler should request another frame
    pub fn wants_next(&self) -> bool {
        matches!(self, Frame::Running(_))
    }

    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Frame::Running(report) | Frame::Finished(report) => Some(report),
            Frame::Stopped => None,
        }
    }
}

/// A game plus the bookkeeping that keeps frames from running after it ends
#[derive(Debug)]
pub struct Session {
    game: Game,
    torn_down: bool,
    frames: u64,
}

impl Session {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            torn_down: false,
            frames: 0,
        }
    }

    /// Run one frame if the game is still live
    pub fn frame(&mut self, viewport: Viewport) -> Frame {
        if !self.is_active() {
            return Frame::Stopped;
        }

        let report = self.game.advance(viewport);
        self.frames += 1;

        if report.status.is_terminal() {
            log::info!(
                "Game finished after {} frames: {:?}",
                self.frames,
                report.status
            );
            Frame::Finished(report)
        } else {
            Frame::Running(report)
        }
    }

    /// Forward pointer movement. Ignored once the session is no longer active.
    pub fn move_paddle(&mut self, pointer_x: f64, viewport: Viewport) {
        if self.is_active() {
            self.game.move_paddle(pointer_x, viewport);
        }
    }

    /// Cancel the game from outside. Later frames are no-ops.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            log::info!("Session torn down after {} frames", self.frames);
            self.torn_down = true;
        }
    }

    /// True while frames still advance the game
    pub fn is_active(&self) -> bool {
        !self.torn_down && self.game.is_running()
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn game(&self) -> &Game {
        &self.game
    }
}
