use crate::constants::{CANVAS_ID, THEME_GOLD_1, THEME_GOLD_2, THEME_GOLD_LINE};
use crate::input;
use bgnet_core::{ThemeColors, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

#[inline]
pub fn window_document() -> Option<(web::Window, web::Document)> {
    let window = web::window()?;
    let document = window.document()?;
    Some((window, document))
}

pub fn find_canvas(document: &web::Document) -> Option<web::HtmlCanvasElement> {
    document
        .get_element_by_id(CANVAS_ID)?
        .dyn_into::<web::HtmlCanvasElement>()
        .ok()
}

pub fn context_2d(canvas: &web::HtmlCanvasElement) -> Option<web::CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .ok()
}

/// Inner window size in CSS pixels.
pub fn viewport(window: &web::Window) -> Viewport {
    let px = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    Viewport::new(px(window.inner_width()), px(window.inner_height()))
}

pub fn match_media(window: &web::Window, query: &str) -> Option<web::MediaQueryList> {
    window.match_media(query).ok().flatten()
}

pub fn media_matches(window: &web::Window, query: &str) -> bool {
    match_media(window, query).is_some_and(|q| q.matches())
}

pub fn is_loading(document: &web::Document) -> bool {
    document.ready_state() == "loading"
}

pub fn is_visible(document: &web::Document) -> bool {
    document.visibility_state() == web::VisibilityState::Visible
}

/// `navigator.connection.saveData`, false when the API is missing.
pub fn save_data(window: &web::Window) -> bool {
    let navigator = window.navigator();
    js_sys::Reflect::get(&navigator, &JsValue::from_str("connection"))
        .ok()
        .filter(|c| c.is_object())
        .and_then(|c| js_sys::Reflect::get(&c, &JsValue::from_str("saveData")).ok())
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

pub fn read_theme(window: &web::Window, document: &web::Document) -> ThemeColors {
    let style = document
        .document_element()
        .and_then(|root| window.get_computed_style(&root).ok().flatten());
    let prop = |name: &str| {
        style
            .as_ref()
            .and_then(|s| s.get_property_value(name).ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    ThemeColors {
        gold_1: prop(THEME_GOLD_1),
        gold_2: prop(THEME_GOLD_2),
        gold_line: prop(THEME_GOLD_LINE),
    }
}

/// Size the backing store for `viewport` at `scale` and map drawing units to
/// CSS pixels.
pub fn sync_canvas_backing_size(
    canvas: &web::HtmlCanvasElement,
    ctx: &web::CanvasRenderingContext2d,
    viewport: Viewport,
    scale: f32,
) {
    canvas.set_width(input::backing_px(viewport.width, scale));
    canvas.set_height(input::backing_px(viewport.height, scale));
    let style = canvas.style();
    _ = style.set_property("width", &format!("{}px", viewport.width));
    _ = style.set_property("height", &format!("{}px", viewport.height));
    let s = scale as f64;
    _ = ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0);
}

pub fn set_disabled_flag(canvas: &web::HtmlCanvasElement, attr: &str, on: bool) {
    if on {
        _ = canvas.set_attribute(attr, "true");
    } else {
        _ = canvas.remove_attribute(attr);
    }
}

pub fn client_rect(canvas: &web::HtmlCanvasElement) -> input::ClientRect {
    let r = canvas.get_bounding_client_rect();
    input::ClientRect {
        left: r.left() as f32,
        top: r.top() as f32,
        width: r.width() as f32,
        height: r.height() as f32,
    }
}
