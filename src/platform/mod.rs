//! Platform abstraction layer
//!
//! The simulation never touches the page. On wasm32 the `web` module plays the
//! collaborator role: it picks elements to become blocks, draws the overlay,
//! forwards mouse movement and drives frames from `requestAnimationFrame`.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// CSS class names and element ids shared by the overlay markup and stylesheet
pub mod names {
    pub const GAME_CONTAINER: &str = "breakout-game";
    pub const BODY_CLASS: &str = "breakout-body";
    pub const PADDLE: &str = "breakout-paddle";
    pub const BALL: &str = "breakout-ball";
    pub const BLOCK: &str = "breakout-block";
    /// Added to a block element once it is destroyed
    pub const DESTROYED: &str = "transparent";
    pub const STYLE_ID: &str = "breakoutStyles";
    /// Attribute marking overlay elements that end the game when clicked
    pub const END_GAME_ATTR: &str = "data-end-game";
}

use crate::error::BreakoutError;
use crate::settings::GameConfig;
use crate::sim::BlockHandle;
use names::*;

/// Page changes made when a game starts, each one undone by `restore`
pub trait OverlayPage {
    fn inject_styles(&mut self) -> Result<(), BreakoutError>;
    fn append_overlay(&mut self) -> Result<(), BreakoutError>;
    fn mark_body(&mut self) -> Result<(), BreakoutError>;
    fn mark_block(&mut self, handle: BlockHandle) -> Result<(), BreakoutError>;
    fn listen_mouse_move(&mut self) -> Result<(), BreakoutError>;
    fn listen_click(&mut self) -> Result<(), BreakoutError>;

    /// Remove every listener registered so far
    fn unlisten(&mut self);
    fn remove_overlay(&mut self);
    /// Put back saved inline styles and drop the block classes
    fn restore_blocks(&mut self);
    fn unmark_body(&mut self);
}

/// Apply every page change, undoing all of them if any step fails.
///
/// Blocks are marked only after the caller measured them all: the block class
/// changes their layout.
pub fn install<P: OverlayPage>(page: &mut P, blocks: &[BlockHandle]) -> Result<(), BreakoutError> {
    let result = apply(page, blocks);
    if let Err(err) = &result {
        log::error!("Overlay setup failed, restoring page: {err}");
        restore(page);
    }
    result
}

fn apply<P: OverlayPage>(page: &mut P, blocks: &[BlockHandle]) -> Result<(), BreakoutError> {
    page.inject_styles()?;
    page.append_overlay()?;
    page.mark_body()?;
    for &handle in blocks {
        page.mark_block(handle)?;
    }
    page.listen_mouse_move()?;
    page.listen_click()
}

/// Undo the page changes. Safe after a partial install and safe to repeat.
///
/// The injected stylesheet stays; it only targets classes removed here.
pub fn restore<P: OverlayPage>(page: &mut P) {
    page.unlisten();
    page.remove_overlay();
    page.restore_blocks();
    page.unmark_body();
}

/// Stylesheet injected once per page
pub fn overlay_css(config: &GameConfig) -> String {
    format!(
        r#"
.{BODY_CLASS} {{
    overflow: hidden;
}}
.{PADDLE} {{
    background-color: #1b9dd0;
    border: 2px solid white;
    border-radius: 5px;
    bottom: {from_bottom}px;
    height: {paddle_height}px;
    position: fixed;
    width: {paddle_width}px;
    z-index: 999999;
}}
.{BALL} {{
    background-color: #1b9dd0;
    border: 2px solid white;
    border-radius: {ball_radius}px;
    height: {ball_size}px;
    position: fixed;
    width: {ball_size}px;
    z-index: 999999;
}}
.{BLOCK} {{
    z-index: 99999;
}}
.{BLOCK}.{DESTROYED} {{
    opacity: 0 !important;
}}
.{BLOCK}::before {{
    background: #74a636;
    border: 1px solid white;
    content: "";
    display: block;
    height: 100%;
    opacity: 0.5;
    position: absolute;
    width: 100%;
    z-index: 99999;
}}
.{GAME_CONTAINER} .exit {{
    background: red;
    color: white;
    font-weight: bold;
    border: 0;
    border-radius: 0 0 0 5px;
    padding: 10px 20px;
    position: fixed;
    right: 0;
    top: 0;
    z-index: 99999;
}}
.{GAME_CONTAINER} .gameOver, .{GAME_CONTAINER} .gameWon {{
    background: red;
    color: white;
    cursor: pointer;
    display: none;
    font-size: 60px;
    font-weight: bold;
    font-family: Impact;
    left: 50%;
    padding: 0px 10px;
    position: fixed;
    top: 50%;
    transform: translate(-50%, -50%);
    z-index: 999999;
}}
"#,
        from_bottom = config.paddle_from_bottom,
        paddle_height = config.paddle_height,
        paddle_width = config.paddle_width,
        ball_radius = config.ball_size / 2.0,
        ball_size = config.ball_size,
    )
}

/// Inner markup of the overlay container
pub fn overlay_markup(paddle_x: f64, ball_x: f64, ball_y: f64) -> String {
    format!(
        r#"<button class="exit" {END_GAME_ATTR}>exit</button>
<div class="gameOver" {END_GAME_ATTR}>Game Over</div>
<div class="gameWon" {END_GAME_ATTR}>YOU WIN</div>
<div class="{PADDLE}" style="left:{paddle_x}px"></div>
<div class="{BALL}" style="left:{ball_x}px; top:{ball_y}px"></div>"#
    )
}
