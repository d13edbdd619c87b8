//! Playback scenarios driving the timeline with a mock host

use ass_animator::layout::{EstimatedMeasurer, TextMeasurer};
use ass_animator::renderer::PreDrawHook;
use ass_animator::{
    DialogueEvent, DriverState, FrameHandle, FrameRenderState, FrameRequester, Layer,
    PlaybackEvent, RenderTarget, StyleTable, TimelineConfig, TimelineDriver, VideoClock,
};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
struct Draw {
    layer: u32,
    text: String,
    timestamp_ms: f64,
    opacity: f32,
}

#[derive(Default)]
struct MockTarget {
    measurer: EstimatedMeasurer,
    layers: Vec<Layer>,
    draws: Vec<Draw>,
}

impl RenderTarget for MockTarget {
    fn layer(&self, id: u32) -> Option<Layer> {
        self.layers.iter().find(|layer| layer.id == id).copied()
    }

    fn measurer(&self) -> &dyn TextMeasurer {
        &self.measurer
    }

    fn draw_frame(&mut self, frame: &FrameRenderState, layer: u32, pre_draw: Option<&PreDrawHook>) {
        if let Some(hook) = pre_draw {
            hook(frame, layer);
        }
        self.draws.push(Draw {
            layer,
            text: frame.words.iter().map(|word| word.text.as_str()).collect(),
            timestamp_ms: frame.timestamp_ms,
            opacity: frame.opacity(),
        });
    }
}

#[derive(Default)]
struct MockFrames {
    issued: u64,
    cancelled: Vec<FrameHandle>,
}

impl FrameRequester for MockFrames {
    fn request_frame(&mut self) -> FrameHandle {
        self.issued += 1;
        FrameHandle(self.issued)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled.push(handle);
    }
}

struct Clock(Cell<f64>);

impl Clock {
    fn at(seconds: f64) -> Self {
        Self(Cell::new(seconds))
    }

    fn seek(&self, seconds: f64) {
        self.0.set(seconds);
    }
}

impl VideoClock for Clock {
    fn current_time(&self) -> f64 {
        self.0.get()
    }
}

struct Host {
    driver: TimelineDriver,
    target: MockTarget,
    frames: MockFrames,
    styles: StyleTable,
}

impl Host {
    fn new() -> Self {
        init_logging();
        Self {
            driver: TimelineDriver::new(TimelineConfig::default()).unwrap(),
            target: MockTarget::default(),
            frames: MockFrames::default(),
            styles: StyleTable::new(),
        }
    }

    fn request(&mut self, events: &[DialogueEvent]) {
        self.driver
            .request_animation(events, &self.styles, &self.target, &mut self.frames)
            .unwrap();
    }

    fn tick(&mut self, clock: &dyn VideoClock) {
        self.driver.tick(clock, &mut self.target, &mut self.frames);
    }
}

#[test]
fn draws_frame_matching_playback_time() {
    let mut host = Host::new();
    let event = DialogueEvent::new(0.0, 5.0, "Default", "Fading")
        .with_animation("fad", &[1200.0, 250.0]);
    host.request(&[event]);

    host.tick(&Clock::at(0.5));
    assert_eq!(host.target.draws.len(), 1);
    let draw = &host.target.draws[0];
    assert_eq!((draw.layer, draw.text.as_str()), (0, "Fading"));
    assert_eq!(draw.timestamp_ms, 500.0);
    assert!((draw.opacity - 30.0 / 72.0).abs() < 1e-6);

    host.tick(&Clock::at(2.0));
    assert_eq!(host.target.draws[1].opacity, 1.0);
    assert_eq!(host.target.draws[1].timestamp_ms, 2000.0);
}

#[test]
fn retires_bundles_after_their_end() {
    let mut host = Host::new();
    let event = DialogueEvent::new(0.0, 1.0, "Default", "short");
    host.request(&[event.clone()]);
    let clock = Clock::at(0.25);

    host.tick(&clock);
    assert!(host.driver.bundle(&event).unwrap().unwrap().active);
    assert_eq!(host.target.draws.len(), 1);

    clock.seek(1.5);
    host.tick(&clock);
    let bundle = host.driver.bundle(&event).unwrap().unwrap();
    assert!(!bundle.active);
    assert!(bundle.task_id.is_none());
    assert!(host.driver.scheduler().is_empty());
    assert_eq!(host.target.draws.len(), 1);

    // The loop keeps running with nothing scheduled
    assert_eq!(host.driver.state(), DriverState::Running);
    assert_eq!(host.frames.issued, 3);
}

#[test]
fn seek_clears_and_reuses_cached_bundle() {
    let mut host = Host::new();
    let event = DialogueEvent::new(1.0, 4.0, "Default", "seek me");
    host.request(&[event.clone()]);
    host.tick(&Clock::at(1.5));

    assert!(host.driver.handle_playback_event(PlaybackEvent::Seeked));
    assert!(host.driver.scheduler().is_empty());
    assert!(!host.driver.is_armed());
    let bundle = host.driver.bundle(&event).unwrap().unwrap();
    assert!(!bundle.active);
    assert!(bundle.task_id.is_none());

    // Listeners fire once per request
    assert!(!host.driver.handle_playback_event(PlaybackEvent::Seeked));

    host.request(&[event.clone()]);
    assert_eq!(host.driver.scheduler().len(), 1);
    assert_eq!(host.driver.cache().len(), 1);
    let stats = host.driver.cache().stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));

    host.tick(&Clock::at(3.0));
    assert_eq!(host.target.draws.last().unwrap().timestamp_ms, 2000.0);
}

#[test]
fn pause_and_end_clear_but_other_events_do_not() {
    let mut host = Host::new();
    let event = DialogueEvent::new(0.0, 2.0, "Default", "x");

    host.request(&[event.clone()]);
    assert!(!host.driver.handle_playback_event(PlaybackEvent::TimeUpdate));
    assert!(!host.driver.handle_playback_event(PlaybackEvent::Play));
    assert!(!host.driver.handle_playback_event(PlaybackEvent::RateChange(2.0)));
    assert_eq!(host.driver.scheduler().len(), 1);

    assert!(host.driver.handle_playback_event(PlaybackEvent::Pause));
    assert!(host.driver.scheduler().is_empty());

    host.request(&[event]);
    assert!(host.driver.handle_playback_event(PlaybackEvent::Ended));
    assert!(host.driver.scheduler().is_empty());
}

#[test]
fn draws_in_insertion_order() {
    let mut host = Host::new();
    let mut second = DialogueEvent::new(0.0, 2.0, "Default", "second");
    second.layer = 2;
    let first = DialogueEvent::new(0.0, 2.0, "Default", "first");
    host.request(&[first, second]);

    host.tick(&Clock::at(1.0));
    let drawn: Vec<_> = host
        .target
        .draws
        .iter()
        .map(|draw| (draw.layer, draw.text.as_str()))
        .collect();
    assert_eq!(drawn, vec![(0, "first"), (2, "second")]);
}

#[test]
fn missing_frame_draws_nothing() {
    let mut host = Host::new();
    let instant = DialogueEvent::new(1.0, 1.0, "Default", "instant");
    let normal = DialogueEvent::new(0.0, 1.0, "Default", "normal");
    host.request(&[instant.clone(), normal]);

    // At the exact end both windows still contain playback time
    host.tick(&Clock::at(1.0));
    assert!(host.target.draws.is_empty());
    assert_eq!(host.driver.scheduler().len(), 2);
    assert!(host.driver.bundle(&instant).unwrap().unwrap().active);
}

#[test]
fn stop_cancels_pending_frame() {
    let mut host = Host::new();
    host.request(&[DialogueEvent::new(0.0, 1.0, "Default", "x")]);
    assert_eq!(host.driver.pending_frame(), Some(FrameHandle(1)));

    host.driver.stop(&mut host.frames);
    assert_eq!(host.frames.cancelled, vec![FrameHandle(1)]);
    assert_eq!(host.driver.state(), DriverState::Scheduled);

    // Stopping twice cancels nothing more
    host.driver.stop(&mut host.frames);
    assert_eq!(host.frames.cancelled.len(), 1);
}

#[test]
fn reset_drops_cached_bundles() {
    let mut host = Host::new();
    let event = DialogueEvent::new(0.0, 1.0, "Default", "x");
    host.request(&[event.clone()]);

    host.driver.reset(&mut host.frames);
    assert_eq!(host.driver.state(), DriverState::Idle);
    assert!(host.driver.cache().is_empty());
    assert!(host.driver.bundle(&event).unwrap().is_none());
    assert!(!host.driver.is_armed());
}

#[test]
fn pre_draw_hook_sees_every_draw() {
    let mut host = Host::new();
    let calls = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&calls);
    host.driver
        .set_pre_draw_hook(move |_frame, _layer| seen.set(seen.get() + 1));

    host.request(&[
        DialogueEvent::new(0.0, 1.0, "Default", "a"),
        DialogueEvent::new(0.0, 1.0, "Default", "b"),
    ]);
    host.tick(&Clock::at(0.5));
    assert_eq!(calls.get(), 2);

    host.driver.clear_pre_draw_hook();
    host.tick(&Clock::at(0.5));
    assert_eq!(calls.get(), 2);
    assert_eq!(host.target.draws.len(), 4);
}

#[test]
fn layout_uses_layer_canvas() {
    let mut host = Host::new();
    host.target.layers.push(Layer {
        id: 1,
        width: 320.0,
        height: 240.0,
    });
    let mut event = DialogueEvent::new(0.0, 1.0, "Default", "abcd");
    event.layer = 1;
    let fallback = DialogueEvent::new(0.0, 1.0, "Default", "abcd");
    host.request(&[event.clone(), fallback.clone()]);

    let frame = &host.driver.bundle(&event).unwrap().unwrap().frames[0];
    assert_eq!((frame.canvas_width, frame.canvas_height), (320.0, 240.0));
    // Bottom-center with 10px margins: (320 - 20 - 40) / 2 + 10
    assert_eq!(frame.x, 140.0);
    assert_eq!(frame.y, 210.0);

    let frame = &host.driver.bundle(&fallback).unwrap().unwrap().frames[0];
    assert_eq!((frame.canvas_width, frame.canvas_height), (1920.0, 1080.0));
}

#[test]
fn drivers_are_independent() {
    let mut a = Host::new();
    let mut b = Host::new();
    let event = DialogueEvent::new(0.0, 3.0, "Default", "shared");
    a.request(&[event.clone()]);
    b.request(&[event.clone()]);

    assert!(a.driver.handle_playback_event(PlaybackEvent::Seeked));
    assert!(a.driver.scheduler().is_empty());
    assert_eq!(b.driver.scheduler().len(), 1);

    b.tick(&Clock::at(1.0));
    assert_eq!(b.target.draws.len(), 1);
    assert!(a.target.draws.is_empty());
}

#[test]
fn remove_animation_deschedules() {
    let mut host = Host::new();
    let keep = DialogueEvent::new(0.0, 2.0, "Default", "keep");
    let drop = DialogueEvent::new(0.0, 2.0, "Default", "drop");
    host.request(&[keep, drop.clone()]);

    assert!(host.driver.remove_animation(&drop).unwrap());
    host.tick(&Clock::at(1.0));
    assert_eq!(host.target.draws.len(), 1);
    assert_eq!(host.target.draws[0].text, "keep");
    assert_eq!(host.driver.cache().len(), 2);
}

#[test]
fn move_offsets_reach_the_target() {
    let mut host = Host::new();
    let event = DialogueEvent::new(0.0, 5.0, "Default", "mover")
        .with_animation("move", &[100.0, 150.0, 300.0, 350.0]);
    host.request(&[event.clone()]);

    let bundle = host.driver.bundle(&event).unwrap().unwrap();
    let first = &bundle.frames[0];
    let last = bundle.frames.last().unwrap();
    assert_eq!(first.offset.x, 0.0);
    assert!((last.offset.x - 200.0).abs() < 1e-3);
    assert!((last.offset.y - 200.0).abs() < 1e-3);
}
