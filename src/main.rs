//! Page Breakout entry point
//!
//! The real game runs in the browser through the wasm exports in
//! `platform::web`. Natively this plays a headless round against a demo page
//! layout with a paddle that chases the ball, which is handy for checking
//! tuning changes.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Page Breakout (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Could not load config from {path}: {err}");
                std::process::exit(1);
            }
        },
        None => page_breakout::GameConfig::default(),
    };

    demo::run(config);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> Result<page_breakout::GameConfig, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(page_breakout::GameConfig::from_json(&json)?)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use page_breakout::GameConfig;
    use page_breakout::sim::{Block, BlockHandle, Frame, Game, GameEvent, Rect, Session, Viewport};

    /// Give up after this many frames (about five minutes at 60 fps)
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    /// Rows of page "cards" like a typical listing page, filtered to the play band
    fn demo_page(viewport: Viewport, band_margin: f64) -> Vec<Block> {
        let (cols, rows) = (8u32, 5u32);
        let (width, height, gap) = (84.0, 28.0, 12.0);
        let left_margin = (viewport.width - f64::from(cols) * (width + gap) + gap) / 2.0;

        (0..rows * cols)
            .map(|i| {
                let col = f64::from(i % cols);
                let row = f64::from(i / cols);
                Rect::from_origin_size(
                    left_margin + col * (width + gap),
                    40.0 + row * (height + gap),
                    width,
                    height,
                )
            })
            .filter(|rect| rect.in_play_band(viewport.height, band_margin))
            .enumerate()
            .map(|(i, rect)| Block::new(BlockHandle(i as u32), rect))
            .collect()
    }

    pub fn run(config: GameConfig) {
        let viewport = Viewport::new(800.0, 600.0);
        let blocks = demo_page(viewport, config.band_margin);

        let game = match Game::with_config(config, viewport, blocks) {
            Ok(game) => game,
            Err(err) => {
                log::warn!("No game: {err}");
                return;
            }
        };
        let mut session = Session::new(game);
        let total = session.game().block_count();
        let mut paddle_hits = 0u32;

        loop {
            // Keep the paddle under the ball's center, slightly off so angles vary
            let ball = session.game().ball();
            let pointer = ball.pos.x + ball.size / 2.0 + (session.frames() % 60) as f64 - 30.0;
            session.move_paddle(pointer, viewport);

            match session.frame(viewport) {
                Frame::Running(report) => {
                    let frame = session.frames();
                    for event in &report.events {
                        match event {
                            GameEvent::BlockDestroyed { handle } => {
                                log::debug!("frame {frame}: block {handle:?} destroyed");
                            }
                            GameEvent::PaddleHit { angle_deg, .. } => {
                                paddle_hits += 1;
                                log::debug!("frame {frame}: paddle hit at {angle_deg:.1} deg");
                            }
                        }
                    }
                }
                Frame::Finished(report) => {
                    match serde_json::to_string(&report) {
                        Ok(json) => log::debug!("final frame: {json}"),
                        Err(err) => log::warn!("Could not serialize final frame: {err}"),
                    }
                    println!(
                        "{:?} after {} frames and {paddle_hits} paddle hits, {}/{total} blocks",
                        report.status,
                        session.frames(),
                        total - session.game().block_count(),
                    );
                    return;
                }
                Frame::Stopped => return,
            }

            if session.frames() >= MAX_FRAMES {
                session.teardown();
                println!(
                    "Stopped after {} frames and {paddle_hits} paddle hits, {}/{total} blocks",
                    session.frames(),
                    total - session.game().block_count(),
                );
                return;
            }
        }
    }
}
