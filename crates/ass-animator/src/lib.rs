//! Frame-accurate animation timeline for ASS subtitles
//!
//! `ass-animator` turns parsed dialogue events into precomputed per-frame
//! render states and hands the right state to a renderer as video plays:
//!
//! - [`layout`] computes the pure, unanimated placement of an event's words
//! - [`animation`] bakes `\fad`, `\fade`, `\move` and `\org` into frame arrays
//! - [`bundle`] builds and caches those arrays per event content hash
//! - [`timeline`] schedules bundles and draws the frame matching playback time
//!
//! Drawing pixels is left to the host through [`renderer::RenderTarget`].
//!
//! # Example
//!
//! ```rust
//! use ass_animator::{DialogueEvent, StyleTable, TimelineConfig, BundleBuilder};
//! use ass_animator::layout::{Canvas, EstimatedMeasurer};
//!
//! let event = DialogueEvent::new(0.0, 2.0, "Default", "Hello")
//!     .with_animation("fad", &[250.0, 250.0]);
//! let styles = StyleTable::new();
//! let measurer = EstimatedMeasurer::default();
//! let canvas = Canvas { width: 1280.0, height: 720.0 };
//!
//! let bundle = BundleBuilder::new(&TimelineConfig::default(), &styles, &measurer, canvas)
//!     .build(&event)
//!     .unwrap();
//! assert_eq!(bundle.frame_count(), 120);
//! assert_eq!(bundle.frames[0].opacity(), 0.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod animation;
pub mod bundle;
pub mod config;
pub mod event;
pub mod layout;
pub mod renderer;
pub mod scheduler;
pub mod timeline;
pub mod utils;

pub use animation::Animation;
pub use bundle::{Bundle, BundleBuilder, BundleCache, BundleKey, CacheStats};
pub use config::TimelineConfig;
pub use event::{DialogueEvent, Style, StyleTable};
pub use renderer::{FrameRenderState, Layer, RenderTarget};
pub use scheduler::{Scheduler, TaskId};
pub use timeline::{
    DriverState, FrameHandle, FrameRequester, PlaybackEvent, TimelineDriver, VideoClock,
};
pub use utils::AnimatorError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
