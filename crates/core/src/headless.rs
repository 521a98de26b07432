//! A [`Host`] that models a section page without a browser.
//!
//! The page is a fixed header of `header_height` pixels followed by the
//! scroll container, which fills the rest of the viewport and holds the
//! subsections stacked in order. The container is there from the start;
//! only the subsection wrapper can mount late. Frames do not run on their
//! own: callers drain them with [`HeadlessPage::take_frames`] and feed each
//! one to the sequencer.

use std::collections::BTreeMap;

use backdrop_protocol::{ElementRect, LayerCommand, LayerStyle, SubsectionId};

use crate::geometry::CONTENT_TOP_PX;
use crate::host::Host;
use crate::retry::{FrameHandle, FrameScheduler};

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessLayer {
    pub image: String,
    pub style: LayerStyle,
}

#[derive(Debug, Clone)]
pub struct HeadlessPage {
    viewport_height: f64,
    header_height: f64,
    sections: Vec<(SubsectionId, f64)>,
    scroll_top: f64,
    /// The scroll container exists. Scroll reads and writes need it, the
    /// wrapper does not.
    container: bool,
    /// `locate` calls that still fail before the wrapper shows up.
    wrapper_delay: u32,
    located: bool,
    listening: bool,
    next_frame: i32,
    frames: Vec<FrameHandle>,
    now_ms: f64,
    layers: BTreeMap<SubsectionId, HeadlessLayer>,
    layer_order: Vec<SubsectionId>,
}

impl HeadlessPage {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            header_height: CONTENT_TOP_PX,
            sections: Vec::new(),
            scroll_top: 0.0,
            container: true,
            wrapper_delay: 0,
            located: false,
            listening: false,
            next_frame: 0,
            frames: Vec::new(),
            now_ms: 0.0,
            layers: BTreeMap::new(),
            layer_order: Vec::new(),
        }
    }

    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    /// Append a subsection of the given height below the previous ones.
    pub fn with_section(mut self, id: SubsectionId, height: f64) -> Self {
        self.sections.push((id, height));
        self
    }

    /// Make the first `attempts` lookups of the wrapper fail.
    pub fn with_wrapper_delay(mut self, attempts: u32) -> Self {
        self.wrapper_delay = attempts;
        self
    }

    /// The wrapper never mounts.
    pub fn without_wrapper(self) -> Self {
        self.with_wrapper_delay(u32::MAX)
    }

    /// The page has no scroll container at all.
    pub fn without_container(mut self) -> Self {
        self.container = false;
        self
    }

    pub fn content_height(&self) -> f64 {
        self.sections.iter().map(|(_, h)| h).sum()
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.content_height() - (self.viewport_height - self.header_height)).max(0.0)
    }

    pub fn current_scroll(&self) -> f64 {
        self.scroll_top
    }

    /// Scroll the container as a user would, clamped to the scrollable range.
    pub fn scroll_to(&mut self, top: f64) {
        self.scroll_top = top.clamp(0.0, self.max_scroll());
    }

    pub fn resize(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
        self.scroll_to(self.scroll_top);
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    /// Drain the frames requested so far.
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.frames)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_located(&self) -> bool {
        self.located
    }

    pub fn layer(&self, id: SubsectionId) -> Option<&HeadlessLayer> {
        self.layers.get(&id)
    }

    /// Mounted layers in mount order.
    pub fn layers(&self) -> impl Iterator<Item = (SubsectionId, &HeadlessLayer)> {
        self.layer_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|layer| (*id, layer)))
    }

    fn section_offset(&self, id: SubsectionId) -> Option<(f64, f64)> {
        let mut offset = 0.0;
        for &(section, height) in &self.sections {
            if section == id {
                return Some((offset, height));
            }
            offset += height;
        }
        None
    }
}

impl FrameScheduler for HeadlessPage {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.frames.push(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|h| *h != handle);
    }
}

impl Host for HeadlessPage {
    fn viewport_height(&self) -> Option<f64> {
        Some(self.viewport_height)
    }

    fn scroll_top(&self) -> Option<f64> {
        self.container.then_some(self.scroll_top)
    }

    fn container_top(&self) -> Option<f64> {
        self.container.then_some(self.header_height)
    }

    fn locate(&mut self) -> bool {
        if !self.container {
            return false;
        }
        if self.wrapper_delay > 0 {
            self.wrapper_delay -= 1;
            return false;
        }
        self.located = true;
        true
    }

    fn attach(&mut self) {
        self.listening = true;
    }

    fn detach(&mut self) {
        self.listening = false;
        self.located = false;
    }

    fn subsection_rect(&self, id: SubsectionId) -> Option<ElementRect> {
        if !self.located {
            return None;
        }
        let (offset, height) = self.section_offset(id)?;
        Some(ElementRect::from_top(
            self.header_height + offset - self.scroll_top,
            height,
        ))
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn apply(&mut self, command: &LayerCommand) {
        match command {
            LayerCommand::MountLayers { layers } => {
                self.layers.clear();
                self.layer_order.clear();
                for spec in layers {
                    self.layer_order.push(spec.id);
                    self.layers.insert(
                        spec.id,
                        HeadlessLayer {
                            image: spec.image.clone(),
                            style: LayerStyle::parked_below(),
                        },
                    );
                }
            }
            LayerCommand::SetStyle { id, style } => {
                if let Some(layer) = self.layers.get_mut(id) {
                    layer.style = *style;
                }
            }
            LayerCommand::ClearLayers => {
                self.layers.clear();
                self.layer_order.clear();
            }
            LayerCommand::ScrollTo { top } => {
                if self.container {
                    self.scroll_to(*top);
                }
            }
        }
    }
}
