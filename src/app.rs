//! Browser glue: canvas, input listeners and the requestAnimationFrame loop.
//! All state lives in one thread-local `App`; every callback borrows it for the
//! duration of one event, so nothing else touches it concurrently.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent,
    MouseEvent, window,
};

use crate::game::{Game, Input, RuleSet};
use crate::render::draw_frame;
use crate::storage::LocalStore;

const CANVAS_ID: &str = "sc-canvas";

struct App {
    ctx: CanvasRenderingContext2d,
    game: Game<LocalStore>,
    keys: Input,
    pointer: Input,
    last_frame_ms: Option<f64>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    // listeners and the frame loop are installed once per page
    static LOOP_STARTED: Cell<bool> = const { Cell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Option<T> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn not_started() -> JsValue {
    JsValue::from_str("game not started; call start_game() first")
}

/// Start (or replace) the running game with `rules`.
pub(crate) fn start(rules: RuleSet) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the play-field canvas
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_attribute("style", "display:block; margin:24px auto; border:2px solid #222; border-radius:12px; box-shadow:0 0 32px 0 rgba(0,0,0,0.25); touch-action:none;").ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    canvas.set_width(rules.field_width as u32);
    canvas.set_height(rules.field_height as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let game = Game::new(rules, LocalStore::default(), SmallRng::from_entropy())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::info!("starting '{}'", game.session().rules().name);

    APP.with(|cell| {
        *cell.borrow_mut() = Some(App {
            ctx,
            game,
            keys: Input::NONE,
            pointer: Input::NONE,
            last_frame_ms: None,
        });
    });

    if !LOOP_STARTED.with(Cell::get) {
        bind_keyboard(&doc)?;
        bind_pointer(&canvas)?;
        start_loop();
        LOOP_STARTED.with(|started| started.set(true));
    }
    Ok(())
}

pub(crate) fn toggle_pause() -> Result<bool, JsValue> {
    with_app(|app| app.game.toggle_pause()).ok_or_else(not_started)
}

pub(crate) fn restart() -> Result<(), JsValue> {
    with_app(|app| {
        app.game.restart();
        app.keys = Input::NONE;
        app.pointer = Input::NONE;
    })
    .ok_or_else(not_started)
}

/// Form controls that take typed text.
fn is_text_entry(tag: &str) -> bool {
    ["INPUT", "TEXTAREA", "SELECT"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag))
}

/// Keys typed into a text field or an editable element belong to the page.
fn typing_into_field(evt: &KeyboardEvent) -> bool {
    let Some(el) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    is_text_entry(&el.tag_name())
        || el
            .dyn_ref::<HtmlElement>()
            .is_some_and(HtmlElement::is_content_editable)
}

fn bind_keyboard(doc: &Document) -> Result<(), JsValue> {
    let down = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        if typing_into_field(&evt) {
            return;
        }
        with_app(|app| {
            match evt.key().as_str() {
                "ArrowLeft" | "a" | "A" => app.keys.left = true,
                "ArrowRight" | "d" | "D" => app.keys.right = true,
                "p" | "P" | " " => {
                    if !evt.repeat() {
                        app.game.toggle_pause();
                    }
                }
                "r" | "R" | "Enter" => {
                    if !evt.repeat() {
                        app.game.restart();
                    }
                }
                _ => return,
            }
            evt.prevent_default();
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", down.as_ref().unchecked_ref())?;
    down.forget();

    let up = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        with_app(|app| match evt.key().as_str() {
            "ArrowLeft" | "a" | "A" => app.keys.left = false,
            "ArrowRight" | "d" | "D" => app.keys.right = false,
            _ => {}
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keyup", up.as_ref().unchecked_ref())?;
    up.forget();
    Ok(())
}

/// Pressing on the left / right half of the canvas steers that way.
fn bind_pointer(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    fn side(app: &App, evt: &MouseEvent) -> Input {
        let half = app.game.session().rules().field_width / 2.0;
        if (evt.offset_x() as f64) < half {
            Input::LEFT
        } else {
            Input::RIGHT
        }
    }

    let down = Closure::wrap(Box::new(move |evt: MouseEvent| {
        with_app(|app| app.pointer = side(app, &evt));
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousedown", down.as_ref().unchecked_ref())?;
    down.forget();

    let drag = Closure::wrap(Box::new(move |evt: MouseEvent| {
        with_app(|app| {
            if evt.buttons() & 1 == 1 {
                app.pointer = side(app, &evt);
            }
        });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousemove", drag.as_ref().unchecked_ref())?;
    drag.forget();

    let release = Closure::wrap(Box::new(move |_evt: MouseEvent| {
        with_app(|app| app.pointer = Input::NONE);
    }) as Box<dyn FnMut(_)>);
    for event in ["mouseup", "mouseleave"] {
        canvas.add_event_listener_with_callback(event, release.as_ref().unchecked_ref())?;
    }
    release.forget();
    Ok(())
}

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_app(|app| frame(app, ts));
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(callback: &FrameCallback) {
    let Some(win) = window() else {
        return;
    };
    if let Some(closure) = callback.borrow().as_ref() {
        if let Err(e) = win.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

fn frame(app: &mut App, now_ms: f64) {
    let dt = app
        .last_frame_ms
        .map_or(0.0, |last| (now_ms - last) / 1000.0);
    app.last_frame_ms = Some(now_ms);
    app.game.advance(dt, app.keys.merge(app.pointer));
    draw_frame(&app.ctx, app.game.session());
}
