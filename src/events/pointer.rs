use crate::dom;
use crate::frame::App;
use crate::input;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_pointermove(app: &Rc<RefCell<App>>) {
    let app = app.clone();
    let window = app.borrow().window.clone();

    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let mut app = app.borrow_mut();
        let rect = dom::client_rect(&app.canvas);
        if let Some(uv) = input::pointer_uv(ev.client_x() as f32, ev.client_y() as f32, rect) {
            app.engine.set_pointer(uv);
        }
    }) as Box<dyn FnMut(_)>);

    _ = window.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn wire_resize(app: &Rc<RefCell<App>>) {
    let app = app.clone();
    let window = app.borrow().window.clone();

    let closure = Closure::wrap(Box::new(move || {
        app.borrow_mut().resize();
    }) as Box<dyn FnMut()>);

    _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}
