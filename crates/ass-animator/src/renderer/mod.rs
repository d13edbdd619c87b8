//! Boundary towards the external renderer
//!
//! The timeline never touches pixels. It hands finished
//! [`FrameRenderState`]s to a [`RenderTarget`] once per tick and asks it for
//! layer geometry and text measurement while building bundles.

mod frame;

pub use frame::{FontDescriptor, FrameRenderState, Word};

use crate::layout::TextMeasurer;

/// Geometry of a render layer (one canvas per event layer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Layer id, matches `DialogueEvent::layer`
    pub id: u32,
    /// Canvas width in pixels
    pub width: f32,
    /// Canvas height in pixels
    pub height: f32,
}

/// Hook invoked by the render target right before a frame is drawn
pub type PreDrawHook = dyn Fn(&FrameRenderState, u32);

/// External renderer drawing frame states
pub trait RenderTarget {
    /// Look up a layer; `None` makes layout fall back to the default canvas
    fn layer(&self, id: u32) -> Option<Layer>;

    /// Measurer backed by the layer's rendering context
    fn measurer(&self) -> &dyn TextMeasurer;

    /// Draw one frame state on a layer
    fn draw_frame(&mut self, frame: &FrameRenderState, layer: u32, pre_draw: Option<&PreDrawHook>);
}
