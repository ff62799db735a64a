use crate::frame::App;
use bgnet_core::{PauseReason, PercentsUpdate, RegionError, RegionMode};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

thread_local! {
    static INSTANCE: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
}

pub(crate) fn install(app: &Rc<RefCell<App>>) {
    INSTANCE.with(|slot| *slot.borrow_mut() = Some(app.clone()));
}

/// Control handle for the running background network.
#[wasm_bindgen]
pub struct BgNet {
    app: Rc<RefCell<App>>,
}

impl BgNet {
    pub(crate) fn new(app: Rc<RefCell<App>>) -> Self {
        Self { app }
    }
}

/// The running instance, if the page has one.
#[wasm_bindgen(js_name = bgNet)]
pub fn bg_net() -> Option<BgNet> {
    INSTANCE.with(|slot| slot.borrow().clone().map(BgNet::new))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

#[wasm_bindgen]
impl BgNet {
    /// `full`, `right`, `topRight` or `custom`; unknown names are ignored.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&self, mode: &str) {
        match mode.parse::<RegionMode>() {
            Ok(mode) => self.app.borrow_mut().engine.set_region_mode(mode),
            Err(e) => log::warn!("[api] {e}"),
        }
    }

    /// Takes `{ xMin, xMax, yMin, yMax }`, any subset; switches to `custom`.
    #[wasm_bindgen(js_name = setCustomPercents)]
    pub fn set_custom_percents(&self, percents: JsValue) {
        let result = js_sys::JSON::stringify(&percents)
            .ok()
            .and_then(|json| json.as_string())
            .ok_or_else(|| RegionError::Malformed("expected an object".into()))
            .and_then(|json| PercentsUpdate::from_json(&json))
            .and_then(|update| self.app.borrow_mut().engine.set_custom_percents(&update));
        if let Err(e) = result {
            log::warn!("[api] {e}");
        }
    }

    pub fn pause(&self) {
        self.app.borrow_mut().set_paused(PauseReason::Manual, true);
    }

    pub fn resume(&self) {
        self.app.borrow_mut().set_paused(PauseReason::Manual, false);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.app.borrow().lifecycle.is_running()
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        to_js(self.app.borrow().engine.config())
    }

    pub fn region(&self) -> Result<JsValue, JsValue> {
        to_js(self.app.borrow().engine.region())
    }
}
