//! Timeline driver owning the bundle cache and the scheduler

use super::{FrameHandle, FrameRequester, PlaybackEvent, VideoClock};
use crate::bundle::{Bundle, BundleBuilder, BundleCache, BundleKey};
use crate::config::TimelineConfig;
use crate::event::{DialogueEvent, StyleTable};
use crate::layout::Canvas;
use crate::renderer::{FrameRenderState, PreDrawHook, RenderTarget};
use crate::scheduler::{Scheduler, TaskId};
use crate::utils::AnimatorError;

/// Lifecycle state of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing scheduled and no frame requested
    Idle,
    /// Tasks scheduled, loop not running
    Scheduled,
    /// A frame request is pending
    Running,
}

/// Schedules bundles and draws the frame matching playback time every tick
///
/// Each driver owns its cache and scheduler, so independent timelines can run
/// side by side.
pub struct TimelineDriver {
    config: TimelineConfig,
    cache: BundleCache,
    scheduler: Scheduler<BundleKey>,
    pending: Option<FrameHandle>,
    armed: bool,
    pre_draw: Option<Box<PreDrawHook>>,
}

impl TimelineDriver {
    /// Create a driver from a validated configuration
    pub fn new(config: TimelineConfig) -> Result<Self, AnimatorError> {
        config.validate()?;
        Ok(Self {
            cache: BundleCache::new(config.cache_capacity),
            config,
            scheduler: Scheduler::new(),
            pending: None,
            armed: false,
            pre_draw: None,
        })
    }

    /// Build (or reuse) bundles for `events` and schedule them
    ///
    /// Starts the frame loop if it is not running and arms the one-time
    /// playback listeners.
    pub fn request_animation(
        &mut self,
        events: &[DialogueEvent],
        styles: &StyleTable,
        target: &dyn RenderTarget,
        frames: &mut dyn FrameRequester,
    ) -> Result<(), AnimatorError> {
        for event in events {
            let canvas = target
                .layer(event.layer)
                .map(|layer| Canvas {
                    width: layer.width,
                    height: layer.height,
                })
                .unwrap_or_else(|| self.default_canvas());
            let builder = BundleBuilder::new(&self.config, styles, target.measurer(), canvas);
            let key = self.cache.get_or_build(event, &builder)?;
            self.schedule(key);
        }

        if !self.scheduler.is_empty() && self.pending.is_none() {
            self.pending = Some(frames.request_frame());
            log::trace!("frame loop started");
        }
        self.armed = true;
        Ok(())
    }

    fn schedule(&mut self, key: BundleKey) {
        let Some(bundle) = self.cache.get_mut(key) else {
            return;
        };
        if bundle.task_id.is_none() {
            bundle.task_id = Some(self.scheduler.add_task(key));
        }
    }

    /// Deschedule the bundle of `event`; returns whether it was scheduled
    pub fn remove_animation(&mut self, event: &DialogueEvent) -> Result<bool, AnimatorError> {
        let key = BundleKey::of(event)?;
        let Some(bundle) = self.cache.get_mut(key) else {
            return Ok(false);
        };
        match bundle.task_id.take() {
            Some(id) => {
                bundle.active = false;
                self.scheduler.remove_task(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Draw every scheduled bundle at the clock's time
    ///
    /// Bundles whose window no longer contains playback time are retired.
    /// The next frame is always requested, even when nothing is left.
    pub fn tick(
        &mut self,
        clock: &dyn VideoClock,
        target: &mut dyn RenderTarget,
        frames: &mut dyn FrameRequester,
    ) {
        self.pending = None;
        let now_ms = clock.current_time() * 1000.0;
        let fps = self.config.fps;

        let tasks: Vec<(TaskId, BundleKey)> = self
            .scheduler
            .iter()
            .map(|task| (task.id, task.payload))
            .collect();

        for (id, key) in tasks {
            let Some(bundle) = self.cache.get_mut(key) else {
                self.scheduler.remove_task(id);
                continue;
            };

            if !bundle.contains_ms(now_ms) {
                bundle.active = false;
                bundle.task_id = None;
                self.scheduler.remove_task(id);
                log::trace!("retired bundle {key} at {now_ms:.1}ms");
                continue;
            }

            bundle.active = true;
            match bundle.frame_at(now_ms, fps) {
                Some(frame) => target.draw_frame(frame, bundle.layer, self.pre_draw.as_deref()),
                None => log::trace!(
                    "bundle {key} has no frame {} of {}",
                    bundle.frame_index(now_ms, fps),
                    bundle.frame_count()
                ),
            }
        }

        self.pending = Some(frames.request_frame());
    }

    /// React to a media notification
    ///
    /// Seeking, pausing and ending clear the timeline once per
    /// [`TimelineDriver::request_animation`]. Returns whether it cleared.
    pub fn handle_playback_event(&mut self, event: PlaybackEvent) -> bool {
        if !(self.armed && event.interrupts_playback()) {
            return false;
        }
        log::debug!("{event:?}: clearing {} scheduled bundles", self.scheduler.len());
        self.armed = false;
        self.clear();
        true
    }

    /// Deschedule everything; bundles stay cached
    pub fn clear(&mut self) {
        for task in self.scheduler.drain() {
            if let Some(bundle) = self.cache.get_mut(task.payload) {
                bundle.active = false;
                bundle.task_id = None;
            }
        }
    }

    /// Cancel the pending frame request
    pub fn stop(&mut self, frames: &mut dyn FrameRequester) {
        if let Some(handle) = self.pending.take() {
            frames.cancel_frame(handle);
            log::trace!("frame loop stopped");
        }
    }

    /// Stop, clear and drop every cached bundle
    pub fn reset(&mut self, frames: &mut dyn FrameRequester) {
        self.stop(frames);
        self.clear();
        self.cache.clear();
        self.armed = false;
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        if self.pending.is_some() {
            DriverState::Running
        } else if !self.scheduler.is_empty() {
            DriverState::Scheduled
        } else {
            DriverState::Idle
        }
    }

    /// Install a hook run by the render target before each draw
    pub fn set_pre_draw_hook(&mut self, hook: impl Fn(&FrameRenderState, u32) + 'static) {
        self.pre_draw = Some(Box::new(hook));
    }

    /// Remove the pre-draw hook
    pub fn clear_pre_draw_hook(&mut self) {
        self.pre_draw = None;
    }

    /// Bundle of `event`, if cached
    pub fn bundle(&self, event: &DialogueEvent) -> Result<Option<&Bundle>, AnimatorError> {
        Ok(self.cache.get(BundleKey::of(event)?))
    }

    /// Check whether the playback listeners are armed
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Pending frame request
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Active configuration
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Bundle cache, including unscheduled bundles
    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    /// Scheduled bundle keys in draw order
    pub fn scheduler(&self) -> &Scheduler<BundleKey> {
        &self.scheduler
    }

    fn default_canvas(&self) -> Canvas {
        let (width, height) = self.config.default_canvas;
        Canvas { width, height }
    }
}
