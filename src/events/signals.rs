//! Environment signals that own one pause reason each.

use crate::constants::{DISABLED_ATTR, LOW_POWER_QUERY, REDUCED_MOTION_QUERY};
use crate::dom;
use crate::frame::App;
use bgnet_core::PauseReason;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Apply the query's current state to `reason`, then follow its changes.
fn wire_media_reason(
    app: &Rc<RefCell<App>>,
    query: &str,
    reason: PauseReason,
    on_change: impl Fn(&mut App, bool) + 'static,
) {
    let window = app.borrow().window.clone();
    let Some(list) = dom::match_media(&window, query) else {
        log::debug!("[signals] matchMedia unavailable for {query}");
        return;
    };

    {
        let mut a = app.borrow_mut();
        on_change(&mut *a, list.matches());
        a.set_paused(reason, list.matches());
    }

    let app = app.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::MediaQueryListEvent| {
        let matches = ev.matches();
        let mut a = app.borrow_mut();
        on_change(&mut *a, matches);
        a.set_paused(reason, matches);
    }) as Box<dyn FnMut(_)>);
    _ = list.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn wire_low_power(app: &Rc<RefCell<App>>) {
    wire_media_reason(app, LOW_POWER_QUERY, PauseReason::LowPower, |a, on| {
        dom::set_disabled_flag(&a.canvas, DISABLED_ATTR, on);
    });
}

pub fn wire_reduced_motion(app: &Rc<RefCell<App>>) {
    wire_media_reason(app, REDUCED_MOTION_QUERY, PauseReason::ReducedMotion, |_, _| {});
}

/// The data-saver hint is read once; browsers do not fire a change event.
pub fn apply_save_data(app: &Rc<RefCell<App>>) {
    let mut a = app.borrow_mut();
    if dom::save_data(&a.window) {
        log::info!("[signals] save-data requested; staying paused");
        a.set_paused(PauseReason::SaveData, true);
    }
}

pub fn wire_visibility(app: &Rc<RefCell<App>>, document: &web::Document) {
    let update = {
        let app = app.clone();
        let document = document.clone();
        move || {
            let hidden = !dom::is_visible(&document);
            app.borrow_mut().set_paused(PauseReason::Visibility, hidden);
        }
    };
    update();

    let closure = Closure::wrap(Box::new(update) as Box<dyn FnMut()>);
    _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
    closure.forget();
}
