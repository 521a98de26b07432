use std::cell::RefCell;
use std::rc::Rc;

use backdrop_core::{LayerSequencer, SectionConfig};
use backdrop_protocol::SubsectionId;
use wasm_bindgen::prelude::*;

mod dom;

pub use dom::{DomHost, SCROLL_CONTAINER_ID, WRAPPER_SELECTOR};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn parse_config(config_json: &str) -> Result<SectionConfig, JsError> {
    SectionConfig::from_json(config_json).map_err(|e| JsError::new(&e.to_string()))
}

/// Background layers mounted for one section page.
///
/// Dropping the handle (or calling [`unmount`](Backdrop::unmount)) removes
/// the layers, listeners and pending frames.
#[wasm_bindgen]
pub struct Backdrop {
    sequencer: Rc<RefCell<LayerSequencer<DomHost>>>,
}

#[wasm_bindgen]
impl Backdrop {
    /// Mount the layers for a section config given as JSON.
    pub fn mount(config_json: &str) -> Result<Backdrop, JsError> {
        let config = parse_config(config_json)?;
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("no document"))?;

        let sequencer = Rc::new_cyclic(|weak| {
            RefCell::new(LayerSequencer::new(
                DomHost::new(window, document, weak),
                &config,
            ))
        });
        sequencer.borrow_mut().start();
        Ok(Self { sequencer })
    }

    /// Swap to another section's config, resetting scroll to the top.
    pub fn reconfigure(&self, config_json: &str) -> Result<(), JsError> {
        let config = parse_config(config_json)?;
        self.sequencer
            .try_borrow_mut()
            .map_err(|e| JsError::new(&e.to_string()))?
            .reconfigure(&config);
        Ok(())
    }

    /// Smoothly scroll to a subsection. Returns `false` when the page is not
    /// ready or the subsection is not on it.
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&self, id: &str) -> Result<bool, JsError> {
        let id = id
            .parse::<SubsectionId>()
            .map_err(|e| JsError::new(&e.to_string()))?;
        let jumped = self
            .sequencer
            .try_borrow_mut()
            .map_err(|e| JsError::new(&e.to_string()))?
            .jump_to(id);
        Ok(jumped)
    }

    pub fn unmount(self) {
        drop(self);
    }
}
