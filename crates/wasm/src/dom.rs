//! [`Host`] backed by the live page.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Weak;

use backdrop_core::{FrameHandle, FrameScheduler, Host, LayerSequencer};
use backdrop_protocol::{ElementRect, LayerCommand, LayerSpec, LayerStyle, SubsectionId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

pub const SCROLL_CONTAINER_ID: &str = "main-content";
pub const WRAPPER_SELECTOR: &str = ".scroll-sections-wrapper";
/// Pinned-section fallback for the hero when it has no `#about` anchor.
const HERO_FALLBACK_SELECTOR: &str = ".scroll-pin-section";

const ROOT_STYLE: &str = "position: fixed; top: 4rem; left: 0; right: 0; bottom: 0; \
     z-index: 0; overflow: hidden; pointer-events: none;";
const LAYER_STYLE: &str = "position: absolute; inset: 0; background-size: cover; \
     background-position: center; background-repeat: no-repeat; \
     will-change: transform, opacity;";

pub(crate) type SharedSequencer = Weak<RefCell<LayerSequencer<DomHost>>>;

/// Run `f` on the sequencer unless it is gone or already running a handler.
fn dispatch(sequencer: &SharedSequencer, f: impl FnOnce(&mut LayerSequencer<DomHost>)) {
    let Some(sequencer) = sequencer.upgrade() else {
        return;
    };
    let Ok(mut sequencer) = sequencer.try_borrow_mut() else {
        return;
    };
    f(&mut sequencer);
}

fn warn(context: &str, err: &JsValue) {
    web_sys::console::warn_2(&JsValue::from_str(context), err);
}

pub struct DomHost {
    window: Window,
    document: Document,
    container: Option<Element>,
    wrapper: Option<Element>,
    /// Container the scroll listener is attached to, if any.
    listening: Option<Element>,
    root: Option<Element>,
    layers: BTreeMap<SubsectionId, HtmlElement>,
    // Listener closures live as long as the host; detach only unhooks them,
    // since a handler may be running when the sequencer stops.
    on_scroll: Closure<dyn FnMut()>,
    on_resize: Closure<dyn FnMut()>,
    on_frame: Closure<dyn FnMut(f64)>,
}

impl DomHost {
    pub(crate) fn new(window: Window, document: Document, sequencer: &SharedSequencer) -> Self {
        let weak = sequencer.clone();
        let on_scroll = Closure::new(move || dispatch(&weak, LayerSequencer::on_scroll));
        let weak = sequencer.clone();
        let on_resize = Closure::new(move || dispatch(&weak, LayerSequencer::on_resize));
        let weak = sequencer.clone();
        let on_frame = Closure::new(move |_timestamp: f64| dispatch(&weak, LayerSequencer::on_frame));
        Self {
            window,
            document,
            container: None,
            wrapper: None,
            listening: None,
            root: None,
            layers: BTreeMap::new(),
            on_scroll,
            on_resize,
            on_frame,
        }
    }

    /// The scroll container, re-queried when the cached one left the page or
    /// was never looked up.
    fn container(&self) -> Option<Element> {
        self.container
            .as_ref()
            .filter(|container| container.is_connected())
            .cloned()
            .or_else(|| self.document.get_element_by_id(SCROLL_CONTAINER_ID))
    }

    fn wrapper(&self) -> Option<&Element> {
        self.wrapper.as_ref().filter(|wrapper| wrapper.is_connected())
    }

    fn foreground(&self, id: SubsectionId) -> Option<Element> {
        let wrapper = self.wrapper()?;
        let mut selectors = vec![format!("#{id}"), format!("[data-subsection=\"{id}\"]")];
        if id.is_hero() {
            selectors.push(HERO_FALLBACK_SELECTOR.to_owned());
        }
        selectors
            .iter()
            .find_map(|selector| wrapper.query_selector(selector).ok().flatten())
    }

    fn mount(&mut self, layers: &[LayerSpec]) -> Result<(), JsValue> {
        self.unmount();
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let root = self.document.create_element("div")?;
        root.set_attribute("aria-hidden", "true")?;
        root.set_attribute("style", ROOT_STYLE)?;
        for spec in layers {
            let layer: HtmlElement = self.document.create_element("div")?.dyn_into()?;
            layer.set_attribute("data-subsection-id", spec.id.as_str())?;
            layer.set_attribute("style", LAYER_STYLE)?;
            layer
                .style()
                .set_property("background-image", &format!("url(/{})", spec.image))?;
            write_style(&layer, LayerStyle::parked_below())?;
            root.append_child(&layer)?;
            self.layers.insert(spec.id, layer);
        }
        body.insert_before(&root, body.first_child().as_ref())?;
        self.root = Some(root);
        Ok(())
    }

    fn unmount(&mut self) {
        self.layers.clear();
        if let Some(root) = self.root.take() {
            root.remove();
        }
    }

    fn detach_listeners(&mut self) {
        if let Some(container) = self.listening.take() {
            if let Err(err) = container.remove_event_listener_with_callback(
                "scroll",
                self.on_scroll.as_ref().unchecked_ref(),
            ) {
                warn("backdrop: could not stop listening for scroll", &err);
            }
            if let Err(err) = self.window.remove_event_listener_with_callback(
                "resize",
                self.on_resize.as_ref().unchecked_ref(),
            ) {
                warn("backdrop: could not stop listening for resize", &err);
            }
        }
    }

    fn scroll_container_to(&self, top: f64) {
        if let Some(container) = self.container() {
            container.scroll_to_with_x_and_y(f64::from(container.scroll_left()), top);
        }
    }
}

fn write_style(layer: &HtmlElement, style: LayerStyle) -> Result<(), JsValue> {
    let css = layer.style();
    css.set_property("transform", &style.transform_css())?;
    css.set_property("opacity", &style.opacity.to_string())?;
    css.set_property("z-index", &style.stack.z_index().to_string())
}

impl FrameScheduler for DomHost {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        match self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameHandle(id)),
            Err(err) => {
                warn("backdrop: requestAnimationFrame failed", &err);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            warn("backdrop: cancelAnimationFrame failed", &err);
        }
    }
}

impl Host for DomHost {
    fn viewport_height(&self) -> Option<f64> {
        self.window.inner_height().ok()?.as_f64()
    }

    fn scroll_top(&self) -> Option<f64> {
        self.container()
            .map(|container| f64::from(container.scroll_top()))
    }

    fn container_top(&self) -> Option<f64> {
        self.container()
            .map(|container| container.get_bounding_client_rect().top())
    }

    fn locate(&mut self) -> bool {
        self.container = self.document.get_element_by_id(SCROLL_CONTAINER_ID);
        self.wrapper = self.document.query_selector(WRAPPER_SELECTOR).ok().flatten();
        self.container.is_some() && self.wrapper.is_some()
    }

    fn attach(&mut self) {
        self.detach_listeners();
        let Some(container) = self.container() else {
            return;
        };
        if let Err(err) = container
            .add_event_listener_with_callback("scroll", self.on_scroll.as_ref().unchecked_ref())
        {
            warn("backdrop: could not listen for scroll", &err);
            return;
        }
        if let Err(err) = self
            .window
            .add_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
        {
            warn("backdrop: could not listen for resize", &err);
        }
        self.listening = Some(container);
    }

    fn detach(&mut self) {
        self.detach_listeners();
        self.wrapper = None;
    }

    fn subsection_rect(&self, id: SubsectionId) -> Option<ElementRect> {
        let rect = self.foreground(id)?.get_bounding_client_rect();
        Some(ElementRect::new(rect.top(), rect.bottom()))
    }

    fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map_or_else(js_sys::Date::now, |performance| performance.now())
    }

    fn apply(&mut self, command: &LayerCommand) {
        match command {
            LayerCommand::MountLayers { layers } => {
                if let Err(err) = self.mount(layers) {
                    warn("backdrop: could not mount background layers", &err);
                    self.unmount();
                }
            }
            LayerCommand::SetStyle { id, style } => {
                let Some(layer) = self.layers.get(id) else {
                    return;
                };
                if let Err(err) = write_style(layer, *style) {
                    warn("backdrop: could not style layer", &err);
                }
            }
            LayerCommand::ClearLayers => self.unmount(),
            LayerCommand::ScrollTo { top } => self.scroll_container_to(*top),
        }
    }
}
