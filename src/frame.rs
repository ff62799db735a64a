use crate::canvas::CanvasSurface;
use crate::constants::{COARSE_POINTER_QUERY, SLOW_REBUILD_MS};
use crate::dom;
use bgnet_core::{surface_scale, Engine, FrameScheduler, Lifecycle, PauseReason, Viewport};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` behind [`FrameScheduler`].
pub struct RafScheduler {
    window: web::Window,
    callback: FrameCallback,
}

impl RafScheduler {
    pub fn new(window: web::Window, callback: FrameCallback) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request(&mut self) -> i32 {
        let slot = self.callback.borrow();
        let Some(cb) = slot.as_ref() else {
            log::warn!("[frame] no frame callback installed");
            return 0;
        };
        match self
            .window
            .request_animation_frame(cb.as_ref().unchecked_ref())
        {
            Ok(id) => id,
            Err(e) => {
                log::warn!("[frame] requestAnimationFrame failed: {:?}", e);
                0
            }
        }
    }

    fn cancel(&mut self, handle: i32) {
        _ = self.window.cancel_animation_frame(handle);
    }
}

/// Everything the running page instance owns.
pub struct App {
    pub window: web::Window,
    pub canvas: web::HtmlCanvasElement,
    pub surface: CanvasSurface,
    pub engine: Engine,
    pub lifecycle: Lifecycle<RafScheduler>,
}

impl App {
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        if !self.lifecycle.begin_frame() {
            return;
        }
        self.engine.frame(timestamp_ms, &mut self.surface);
        self.lifecycle.end_frame();
    }

    pub fn set_paused(&mut self, reason: PauseReason, paused: bool) {
        self.lifecycle.set_paused(reason, paused);
    }

    /// Match the canvas backing store to the window without touching the
    /// population. Returns the measured viewport and scale.
    pub fn sync_backing_store(&mut self) -> (Viewport, f32) {
        let viewport = dom::viewport(&self.window);
        let coarse = dom::media_matches(&self.window, COARSE_POINTER_QUERY);
        let scale = surface_scale(self.window.device_pixel_ratio() as f32, coarse);
        dom::sync_canvas_backing_size(&self.canvas, self.surface.context(), viewport, scale);
        (viewport, scale)
    }

    /// Re-measure the window, resize the backing store and rebuild the
    /// population. Pause state is untouched.
    pub fn resize(&mut self) {
        let started = Instant::now();
        let (viewport, scale) = self.sync_backing_store();
        self.engine.resize(viewport);

        let ms = started.elapsed().as_secs_f64() * 1000.0;
        let level = if ms > SLOW_REBUILD_MS {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(
            level,
            "[frame] resize {}x{} scale={:.2} rebuilt {} particles in {:.1}ms",
            viewport.width,
            viewport.height,
            scale,
            self.engine.population().len(),
            ms
        );
    }
}

/// Install the frame callback that drives `app`.
pub fn install_frame_callback(app: &Rc<RefCell<App>>, slot: &FrameCallback) {
    let weak = Rc::downgrade(app);
    let closure = Closure::wrap(Box::new(move |ts: f64| {
        if let Some(app) = weak.upgrade() {
            app.borrow_mut().on_frame(ts);
        }
    }) as Box<dyn FnMut(f64)>);
    *slot.borrow_mut() = Some(closure);
}
