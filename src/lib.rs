#![cfg(target_arch = "wasm32")]
use bgnet_core::{adapt, Config, Engine, Environment, Lifecycle, RegionMode};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod api;
mod canvas;
mod constants;
mod dom;
mod events;
mod frame;
mod input;

pub use api::{bg_net, BgNet};

static STARTED: AtomicBool = AtomicBool::new(false);

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let Some((_, document)) = dom::window_document() else {
        return Ok(());
    };
    if dom::is_loading(&document) {
        add_document_listener(&document, "DOMContentLoaded", when_visible);
    } else {
        when_visible();
    }
    Ok(())
}

fn add_document_listener(document: &web::Document, event: &str, handler: fn()) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    _ = document.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Start now if the page is visible, otherwise on the first visibility change.
fn when_visible() {
    let Some((_, document)) = dom::window_document() else {
        return;
    };
    if dom::is_visible(&document) {
        boot();
    } else {
        add_document_listener(&document, "visibilitychange", || {
            if dom::window_document().is_some_and(|(_, d)| dom::is_visible(&d)) {
                boot();
            }
        });
    }
}

fn boot() {
    if STARTED.swap(true, Ordering::SeqCst) {
        return;
    }
    if let Err(e) = init() {
        log::warn!("[bg-net] init error: {:?}", e);
    }
}

fn init() -> anyhow::Result<()> {
    let (window, document) =
        dom::window_document().ok_or_else(|| anyhow::anyhow!("no window or document"))?;

    let Some(canvas) = dom::find_canvas(&document) else {
        log::debug!("[bg-net] no #{} canvas; not starting", constants::CANVAS_ID);
        return Ok(());
    };
    let Some(ctx) = dom::context_2d(&canvas) else {
        log::debug!("[bg-net] 2d context unavailable; not starting");
        return Ok(());
    };

    let viewport = dom::viewport(&window);
    let env = Environment {
        viewport_width: viewport.width,
        device_pixel_ratio: window.device_pixel_ratio() as f32,
        reduced_motion: dom::media_matches(&window, constants::REDUCED_MOTION_QUERY),
        theme: dom::read_theme(&window, &document),
    };
    let config = adapt(Config::default(), &env);

    let engine = Engine::with_mode(config, viewport, RegionMode::Custom, rand::random());

    let slot: frame::FrameCallback = Rc::new(RefCell::new(None));
    let app = Rc::new(RefCell::new(frame::App {
        window: window.clone(),
        canvas,
        surface: canvas::CanvasSurface::new(ctx),
        engine,
        lifecycle: Lifecycle::new(frame::RafScheduler::new(window.clone(), slot.clone())),
    }));
    frame::install_frame_callback(&app, &slot);
    app.borrow_mut().sync_backing_store();

    api::install(&app);
    let handle = JsValue::from(BgNet::new(app.clone()));
    if js_sys::Reflect::set(&window, &JsValue::from_str(constants::GLOBAL_NAME), &handle).is_err() {
        log::warn!("[bg-net] could not publish window.{}", constants::GLOBAL_NAME);
    }

    events::wire_resize(&app);
    events::wire_pointermove(&app);
    events::wire_low_power(&app);
    events::wire_reduced_motion(&app);
    events::apply_save_data(&app);
    events::wire_visibility(&app, &document);

    app.borrow_mut().lifecycle.start();
    log::info!(
        "[bg-net] started: {} particles, running={}",
        app.borrow().engine.population().len(),
        app.borrow().lifecycle.is_running()
    );
    Ok(())
}
