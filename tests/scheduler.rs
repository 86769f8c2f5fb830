#![allow(missing_docs)]
//! Host-level tests for frame pacing, remap throttling, and coordinate events.

use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};
use led_projector::color::RGB8;
use led_projector::fixture::{Fixture, Layout, OutputRange, RemapFlag, RowConfig};
use led_projector::scheduler::{
    CoordinateEvent, CoordinateSignal, CoordinateTarget, FrameScheduler, PixelDriver,
    SchedulerConfig,
};
use led_projector::{Coord3D, Error, Result};

#[derive(Default)]
struct RecordingDriver {
    bindings: usize,
    frames: usize,
    last_lit: usize,
}

impl PixelDriver for RecordingDriver {
    fn bind_outputs(&mut self, outputs: &[OutputRange]) -> Result<()> {
        assert!(!outputs.is_empty());
        self.bindings += 1;
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<()> {
        self.frames += 1;
        self.last_lit = pixels.iter().filter(|pixel| **pixel != RGB8::default()).count();
        Ok(())
    }
}

struct FailingDriver;

impl PixelDriver for FailingDriver {
    fn bind_outputs(&mut self, _outputs: &[OutputRange]) -> Result<()> {
        Ok(())
    }

    fn emit(&mut self, _pixels: &[RGB8]) -> Result<()> {
        Err(Error::Driver)
    }
}

fn strip_fixture() -> Fixture<16, 2> {
    let mut fixture = Fixture::new(Layout::linear_x(16, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(0, 1, Coord3D::ZERO, Coord3D::new(7, 0, 0)))
        .unwrap();
    fixture
}

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

#[test]
fn frames_are_paced_without_catch_up() {
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), RecordingDriver::default(), SchedulerConfig::default(), at(0))
            .unwrap();

    let mut frame_times = Vec::new();
    for ms in 0..1000 {
        if scheduler.poll(at(ms)).unwrap().rendered {
            frame_times.push(ms);
        }
    }
    assert_eq!(frame_times[0], 0);
    assert!(frame_times.windows(2).all(|pair| (16..=17).contains(&(pair[1] - pair[0]))));
    assert_eq!(scheduler.frame_count() as usize, frame_times.len());
    assert_eq!(scheduler.driver().frames, frame_times.len());
    assert_eq!(scheduler.driver().last_lit, 8);

    // A stall of 100 ms yields one frame, not six.
    let resume = frame_times[frame_times.len() - 1] + 100;
    assert!(scheduler.poll(at(resume)).unwrap().rendered);
    assert!(!scheduler.poll(at(resume + 1)).unwrap().rendered);
    assert_eq!(scheduler.next_frame_at(), at(resume) + SchedulerConfig::default().frame_period());
}

#[test]
fn external_remap_requests_are_throttled() {
    static REMAP: RemapFlag = RemapFlag::new();
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), RecordingDriver::default(), SchedulerConfig::default(), at(0))
            .unwrap()
            .with_remap_flag(&REMAP);

    let mut remaps = Vec::new();
    for ms in 0..=3500 {
        REMAP.request();
        if scheduler.poll(at(ms)).unwrap().remapped {
            remaps.push(ms);
        }
    }
    assert_eq!(remaps, [1000, 2000, 3000]);
    assert_eq!(scheduler.driver().bindings, 1 + remaps.len());
}

#[test]
fn nothing_pending_means_no_remap() {
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), RecordingDriver::default(), SchedulerConfig::default(), at(0))
            .unwrap();
    for ms in 0..3000 {
        assert!(!scheduler.poll(at(ms)).unwrap().remapped);
    }
    assert_eq!(scheduler.driver().bindings, 1);
}

#[test]
fn fixture_edits_remap_after_the_interval() {
    let config = SchedulerConfig {
        fps: 50,
        remap_interval: Duration::from_millis(200),
    };
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), RecordingDriver::default(), config, at(0)).unwrap();
    scheduler.poll(at(0)).unwrap();

    scheduler.fixture_mut().set_bounds(0, Coord3D::ZERO, Coord3D::new(15, 0, 0)).unwrap();
    assert!(!scheduler.poll(at(150)).unwrap().remapped);
    assert!(scheduler.poll(at(200)).unwrap().remapped);
    assert_eq!(scheduler.fixture().row(0).unwrap().mapping().len(), 16);

    scheduler.poll(at(260)).unwrap();
    assert_eq!(scheduler.driver().last_lit, 16);
}

#[test]
fn coordinate_events_move_the_row() {
    static COORDINATES: CoordinateSignal = Signal::new();
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), RecordingDriver::default(), SchedulerConfig::default(), at(0))
            .unwrap()
            .with_coordinates(&COORDINATES);

    let tick = scheduler.poll(at(0)).unwrap();
    assert!(!tick.event_applied);

    COORDINATES.signal(CoordinateEvent::parse("end:120").unwrap());
    // Between frame ticks the event stays in the mailbox.
    let tick = scheduler.poll(at(10)).unwrap();
    assert!(!tick.event_applied);
    assert_eq!(scheduler.fixture().row(0).unwrap().config().end, Coord3D::new(7, 0, 0));

    let tick = scheduler.poll(at(17)).unwrap();
    assert!(tick.rendered);
    assert!(tick.event_applied);
    assert!(!tick.remapped);
    assert_eq!(scheduler.fixture().row(0).unwrap().config().end, Coord3D::new(12, 0, 0));
    assert!(scheduler.fixture().remap_flag().is_set());

    assert!(scheduler.poll(at(1000)).unwrap().remapped);
    assert_eq!(scheduler.fixture().row(0).unwrap().mapping().len(), 13);

    COORDINATES.signal(CoordinateEvent {
        row: 5,
        target: CoordinateTarget::Start,
        position: Coord3D::ZERO,
    });
    let tick = scheduler.poll(at(1017)).unwrap();
    assert!(tick.rendered);
    assert!(!tick.event_applied);
}

#[test]
fn only_the_newest_event_reaches_the_next_frame() {
    static COORDINATES: CoordinateSignal = Signal::new();
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), RecordingDriver::default(), SchedulerConfig::default(), at(0))
            .unwrap()
            .with_coordinates(&COORDINATES);
    scheduler.poll(at(0)).unwrap();

    for (ms, text) in [(2, "end:90"), (5, "end:110"), (9, "start:30")] {
        COORDINATES.signal(CoordinateEvent::parse(text).unwrap());
        assert!(!scheduler.poll(at(ms)).unwrap().event_applied);
    }
    assert!(scheduler.poll(at(17)).unwrap().event_applied);
    let config = *scheduler.fixture().row(0).unwrap().config();
    assert_eq!(config.start, Coord3D::new(3, 0, 0));
    assert_eq!(config.end, Coord3D::new(7, 0, 0));
}

#[test]
fn coordinate_text_parsing() {
    let start = CoordinateEvent::parse("start:140,150,0").unwrap();
    assert_eq!(start.row, 0);
    assert_eq!(start.target, CoordinateTarget::Start);
    assert_eq!(start.position, Coord3D::new(14, 15, 0));

    let end = CoordinateEvent::parse("end:95").unwrap();
    assert_eq!(end.target, CoordinateTarget::End);
    assert_eq!(end.position, Coord3D::new(9, 0, 0));

    let sloppy = CoordinateEvent::parse("start:abc,20").unwrap();
    assert_eq!(sloppy.position, Coord3D::new(0, 2, 0));

    assert!(CoordinateEvent::parse("bogus").is_none());
    assert!(CoordinateEvent::parse("middle:1").is_none());
}

#[test]
fn driver_failures_stop_the_loop() {
    let mut scheduler =
        FrameScheduler::start(strip_fixture(), FailingDriver, SchedulerConfig::default(), at(0)).unwrap();
    assert_eq!(scheduler.poll(at(0)), Err(Error::Driver));
}

#[test]
fn run_returns_the_first_error() {
    let scheduler =
        FrameScheduler::start(strip_fixture(), FailingDriver, SchedulerConfig::default(), Instant::now())
            .unwrap();
    assert_eq!(embassy_futures::block_on(scheduler.run()), Err(Error::Driver));
}

#[test]
fn scheduler_config_survives_postcard() {
    let config = SchedulerConfig {
        fps: 120,
        remap_interval: Duration::from_millis(250),
    };
    let mut buffer = [0_u8; 16];
    let bytes = postcard::to_slice(&config, &mut buffer).unwrap();
    let decoded: SchedulerConfig = postcard::from_bytes(bytes).unwrap();
    assert_eq!(decoded, config);
    assert_eq!(decoded.frame_period(), Duration::from_micros(8333));
}
