//! Browser integration
//!
//! Turns matching page elements into blocks, draws the paddle and ball as fixed
//! position boxes and drives the simulation from `requestAnimationFrame`.
//! Everything the game changes on the page is put back on teardown.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent, Window};

use super::names::*;
use super::{OverlayPage, install, overlay_css, overlay_markup, restore};
use crate::error::BreakoutError;
use crate::settings::GameConfig;
use crate::sim::{Block, BlockHandle, Frame, FrameReport, Game, GameStatus, Rect, Session, Viewport};

thread_local! {
    /// The one live game on this page, if any
    static ACTIVE: RefCell<Option<Rc<RefCell<Overlay>>>> = const { RefCell::new(None) };
}

fn dom_err(context: &'static str) -> impl Fn(JsValue) -> BreakoutError {
    move |err| BreakoutError::Dom(format!("{context}: {err:?}"))
}

fn window() -> Result<Window, BreakoutError> {
    web_sys::window().ok_or_else(|| BreakoutError::Dom("no window".to_string()))
}

fn document(window: &Window) -> Result<Document, BreakoutError> {
    window
        .document()
        .ok_or_else(|| BreakoutError::Dom("no document".to_string()))
}

fn current_viewport(window: &Window) -> Result<Viewport, BreakoutError> {
    let width = window.inner_width().ok().and_then(|v| v.as_f64());
    let height = window.inner_height().ok().and_then(|v| v.as_f64());
    match (width, height) {
        (Some(width), Some(height)) => Ok(Viewport::new(width, height)),
        _ => Err(BreakoutError::Dom("window size unavailable".to_string())),
    }
}

/// A page element turned into a block, with the inline style it had before
struct SavedBlock {
    element: HtmlElement,
    style: String,
}

/// Live game plus every page change needed to undo it
struct Overlay {
    session: Session,
    container: Element,
    paddle: HtmlElement,
    ball: HtmlElement,
    blocks: HashMap<BlockHandle, SavedBlock>,
    on_mouse_move: Option<Closure<dyn FnMut(MouseEvent)>>,
    on_click: Option<Closure<dyn FnMut(MouseEvent)>>,
}

impl Overlay {
    fn frame(&mut self, viewport: Viewport) -> Frame {
        let frame = self.session.frame(viewport);
        if let Some(report) = frame.report() {
            self.render(report);
        }
        if let Frame::Finished(report) = &frame {
            self.show_result(report.status);
        }
        frame
    }

    fn render(&self, report: &FrameReport) {
        set_px(&self.ball, "left", report.ball.x);
        set_px(&self.ball, "top", report.ball.y);
        set_px(&self.paddle, "left", report.paddle_x);

        for handle in report.destroyed() {
            if let Some(saved) = self.blocks.get(&handle) {
                if let Err(err) = saved.element.class_list().add_1(DESTROYED) {
                    log::warn!("Failed to hide block {handle:?}: {err:?}");
                }
            }
        }
    }

    fn show_result(&self, status: GameStatus) {
        let selector = match status {
            GameStatus::Won => ".gameWon",
            GameStatus::Lost => ".gameOver",
            GameStatus::Running => return,
        };
        let banner = self
            .container
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        match banner {
            Some(banner) => {
                if let Err(err) = banner.style().set_property("display", "block") {
                    log::warn!("Failed to show {selector} banner: {err:?}");
                }
            }
            None => log::warn!("Result banner {selector} missing from overlay"),
        }
    }
}

/// The live page behind `platform::install` and `platform::restore`
struct DomPage<'a> {
    overlay: &'a Rc<RefCell<Overlay>>,
    document: &'a Document,
}

impl DomPage<'_> {
    fn body(&self) -> Result<HtmlElement, BreakoutError> {
        self.document
            .body()
            .ok_or_else(|| BreakoutError::Dom("no <body>".to_string()))
    }
}

impl OverlayPage for DomPage<'_> {
    fn inject_styles(&mut self) -> Result<(), BreakoutError> {
        let o = self.overlay.borrow();
        inject_styles(self.document, o.session.game().config())
    }

    fn append_overlay(&mut self) -> Result<(), BreakoutError> {
        self.body()?
            .append_child(&self.overlay.borrow().container)
            .map_err(dom_err("append overlay"))?;
        Ok(())
    }

    fn mark_body(&mut self) -> Result<(), BreakoutError> {
        self.body()?
            .class_list()
            .add_1(BODY_CLASS)
            .map_err(dom_err("mark body"))
    }

    fn mark_block(&mut self, handle: BlockHandle) -> Result<(), BreakoutError> {
        let o = self.overlay.borrow();
        match o.blocks.get(&handle) {
            Some(saved) => saved
                .element
                .class_list()
                .add_1(BLOCK)
                .map_err(dom_err("mark block")),
            None => Ok(()),
        }
    }

    fn listen_mouse_move(&mut self) -> Result<(), BreakoutError> {
        let weak = Rc::downgrade(self.overlay);
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(overlay) = weak.upgrade() else { return };
            let Ok(viewport) = window().and_then(|w| current_viewport(&w)) else {
                return;
            };
            if let Ok(mut o) = overlay.try_borrow_mut() {
                o.session.move_paddle(f64::from(event.client_x()), viewport);
                let x = o.session.game().paddle().x;
                set_px(&o.paddle, "left", x);
            }
        });

        // Owned by the overlay before registering, so unlisten can always remove it
        let mut o = self.overlay.borrow_mut();
        let closure = o.on_mouse_move.insert(closure);
        self.document
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
            .map_err(dom_err("add mousemove"))
    }

    fn listen_click(&mut self) -> Result<(), BreakoutError> {
        let weak = Rc::downgrade(self.overlay);
        let end_selector = format!("[{END_GAME_ATTR}]");
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let hit_end = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&end_selector).ok().flatten())
                .is_some();
            if hit_end {
                // Teardown drops this closure, so it must not run inside it
                schedule_teardown(weak.clone());
            }
        });

        let mut guard = self.overlay.borrow_mut();
        let o = &mut *guard;
        let closure = o.on_click.insert(closure);
        o.container
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(dom_err("add click"))
    }

    fn unlisten(&mut self) {
        let mut o = self.overlay.borrow_mut();
        if let Some(closure) = o.on_mouse_move.take() {
            if let Err(err) = self
                .document
                .remove_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove mousemove listener: {err:?}");
            }
        }
        if let Some(closure) = o.on_click.take() {
            if let Err(err) = o
                .container
                .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove click listener: {err:?}");
            }
        }
    }

    fn remove_overlay(&mut self) {
        self.overlay.borrow().container.remove();
    }

    fn restore_blocks(&mut self) {
        let mut o = self.overlay.borrow_mut();
        for saved in o.blocks.values() {
            saved.element.style().set_css_text(&saved.style);
            if let Err(err) = saved.element.class_list().remove_2(BLOCK, DESTROYED) {
                log::warn!("Failed to unmark block element: {err:?}");
            }
        }
        o.blocks.clear();
    }

    fn unmark_body(&mut self) {
        if let Some(body) = self.document.body() {
            if let Err(err) = body.class_list().remove_1(BODY_CLASS) {
                log::warn!("Failed to unmark body: {err:?}");
            }
        }
    }
}

fn set_px(element: &HtmlElement, property: &str, value: f64) {
    if let Err(err) = element.style().set_property(property, &format!("{value}px")) {
        log::warn!("Failed to set {property}: {err:?}");
    }
}

/// Elements matching `selector` that can become blocks, in document order.
///
/// Hidden elements and elements whose top is off screen or inside the bottom
/// band are skipped.
fn collect_blocks(
    document: &Document,
    selector: &str,
    viewport: Viewport,
    band_margin: f64,
) -> Result<(Vec<Block>, HashMap<BlockHandle, SavedBlock>), BreakoutError> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(dom_err("invalid selector"))?;

    let mut blocks = Vec::new();
    let mut saved = HashMap::new();
    for i in 0..nodes.length() {
        let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        if element.offset_width() == 0 && element.offset_height() == 0 {
            continue;
        }

        let bounds = element.get_bounding_client_rect();
        let rect = Rect::new(bounds.left(), bounds.right(), bounds.top(), bounds.bottom());
        if !rect.in_play_band(viewport.height, band_margin) {
            continue;
        }

        let handle = BlockHandle(blocks.len() as u32);
        blocks.push(Block::new(handle, rect));
        let style = element.style().css_text();
        saved.insert(handle, SavedBlock { element, style });
    }

    Ok((blocks, saved))
}

fn inject_styles(document: &Document, config: &GameConfig) -> Result<(), BreakoutError> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document
        .create_element("style")
        .map_err(dom_err("create style"))?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(&overlay_css(config)));
    let head = document
        .head()
        .ok_or_else(|| BreakoutError::Dom("no <head>".to_string()))?;
    head.append_child(&style).map_err(dom_err("append style"))?;
    Ok(())
}

fn find_html(container: &Element, class: &str) -> Result<HtmlElement, BreakoutError> {
    container
        .query_selector(&format!(".{class}"))
        .map_err(dom_err("query overlay"))?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| BreakoutError::Dom(format!("overlay element .{class} missing")))
}

fn request_animation_frame(overlay: Weak<RefCell<Overlay>>) {
    let Ok(window) = window() else { return };
    let callback = Closure::once_into_js(move |_time: f64| {
        game_loop(overlay);
    });
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {err:?}");
    }
}

fn game_loop(overlay: Weak<RefCell<Overlay>>) {
    let Some(overlay) = overlay.upgrade() else { return };
    let viewport = match window().and_then(|w| current_viewport(&w)) {
        Ok(viewport) => viewport,
        Err(err) => {
            log::error!("Stopping game loop: {err}");
            return;
        }
    };

    let frame = overlay.borrow_mut().frame(viewport);
    if frame.wants_next() {
        request_animation_frame(Rc::downgrade(&overlay));
    }
}

fn schedule_teardown(overlay: Weak<RefCell<Overlay>>) {
    let Ok(window) = window() else { return };
    let callback = Closure::once_into_js(move |_time: f64| {
        if let Some(overlay) = overlay.upgrade() {
            teardown(&overlay);
        }
    });
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        log::error!("Could not schedule teardown: {err:?}");
    }
}

fn teardown(overlay: &Rc<RefCell<Overlay>>) {
    overlay.borrow_mut().session.teardown();
    match window().and_then(|w| document(&w)) {
        Ok(document) => restore(&mut DomPage {
            overlay,
            document: &document,
        }),
        Err(err) => log::warn!("Page left as is: {err}"),
    }

    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.as_ref().is_some_and(|active| Rc::ptr_eq(active, overlay)) {
            *slot = None;
        }
    });
    log::info!("Breakout overlay removed");
}

fn start_game(selector: &str, config: GameConfig) -> Result<bool, BreakoutError> {
    if ACTIVE.with(|slot| slot.borrow().is_some()) {
        log::warn!("A game is already running on this page");
        return Ok(false);
    }

    let window = window()?;
    let document = document(&window)?;
    let viewport = current_viewport(&window)?;

    let (blocks, saved) = collect_blocks(&document, selector, viewport, config.band_margin)?;
    let game = match Game::with_config(config, viewport, blocks) {
        Ok(game) => game,
        Err(err) if err.is_nothing_to_play() => {
            log::info!("Nothing to play for selector {selector:?}");
            return Ok(false);
        }
        Err(err) => return Err(err),
    };

    // Built detached: nothing on the page changes until install
    let container = document
        .create_element("div")
        .map_err(dom_err("create container"))?;
    container.set_class_name(GAME_CONTAINER);
    let ball = game.ball().pos;
    let handles: Vec<BlockHandle> = game.blocks().iter().map(|block| block.handle).collect();
    container.set_inner_html(&overlay_markup(game.paddle().x, ball.x, ball.y));

    let overlay = Rc::new(RefCell::new(Overlay {
        session: Session::new(game),
        paddle: find_html(&container, PADDLE)?,
        ball: find_html(&container, BALL)?,
        container,
        blocks: saved,
        on_mouse_move: None,
        on_click: None,
    }));

    install(
        &mut DomPage {
            overlay: &overlay,
            document: &document,
        },
        &handles,
    )?;

    ACTIVE.with(|slot| *slot.borrow_mut() = Some(overlay.clone()));
    request_animation_frame(Rc::downgrade(&overlay));
    Ok(true)
}

/// Module init: route `log` to the browser console and panics to `console.error`
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Start a game using the elements matching `selector` as blocks.
///
/// `config` is an optional JSON object overriding any `GameConfig` field.
/// Resolves to `false` when there is nothing to play or a game is already running.
#[wasm_bindgen]
pub fn start(selector: &str, config: Option<String>) -> Result<bool, JsValue> {
    let config = match config {
        Some(json) => GameConfig::from_json(&json)?,
        None => GameConfig::default(),
    };
    Ok(start_game(selector, config)?)
}

/// Tear down the running game, restoring the page
#[wasm_bindgen]
pub fn stop() {
    let active = ACTIVE.with(|slot| slot.borrow().clone());
    if let Some(overlay) = active {
        teardown(&overlay);
    }
}

/// Whether a game overlay is currently on the page
#[wasm_bindgen(js_name = isRunning)]
pub fn is_running() -> bool {
    ACTIVE.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_some_and(|overlay| overlay.borrow().session.is_active())
    })
}
