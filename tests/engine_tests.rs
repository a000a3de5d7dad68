// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 紧急度引擎端到端测试

use std::time::{Duration, Instant};

use navguard_rs::announce::narration::Direction;
use navguard_rs::detection::types::Velocity;
use navguard_rs::priority::scorer;
use navguard_rs::{
    BBox, Detection, EngineConfig, FrameInput, PathStatus, TrackedObject, Tracker, UrgencyEngine,
    UrgencyReason,
};

fn at(t0: Instant, millis: u64) -> Instant {
    t0 + Duration::from_millis(millis)
}

fn person(cx: f32, distance: f32) -> Detection {
    Detection::new("person", 0.9, BBox::new(cx - 25.0, 150.0, 50.0, 150.0)).with_distance(distance)
}

fn input(frame_id: u64, t0: Instant, millis: u64, detections: Vec<Detection>) -> FrameInput {
    FrameInput::new(frame_id, at(t0, millis), 640.0, detections).with_user_speed(1.0)
}

#[test]
fn test_frame_count_is_monotonic() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();

    for i in 0..20u64 {
        let update = engine
            .process_frame(&input(i, t0, i * 33, vec![person(300.0 + i as f32, 2.5)]))
            .unwrap();
        let event = update.event.expect("person in path should be selected");
        assert_eq!(event.tracking.track_id, 1);
        assert_eq!(event.tracking.frame_count, i as u32 + 1);
    }
}

#[test]
fn test_eviction_then_new_higher_id() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();

    engine.process_frame(&input(0, t0, 0, vec![person(320.0, 2.0)]));
    for i in 1..=6u64 {
        engine.process_frame(&input(i, t0, i * 100, vec![]));
    }
    assert_eq!(engine.tracker().track_count(), 0);

    let update = engine
        .process_frame(&input(7, t0, 700, vec![person(320.0, 2.0)]))
        .unwrap();
    let event = update.event.unwrap();
    assert_eq!(event.tracking.track_id, 2);
    assert_eq!(event.tracking.frame_count, 1);
}

#[test]
fn test_different_labels_same_place_two_tracks() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();
    let dog = Detection::new("dog", 0.8, BBox::new(295.0, 150.0, 50.0, 150.0)).with_distance(2.0);

    let update = engine
        .process_frame(&input(0, t0, 0, vec![person(320.0, 2.0), dog]))
        .unwrap();
    assert_eq!(update.track_count, 2);
    assert_eq!(engine.tracker().tracks().count(), 2);
}

#[test]
fn test_critical_car_case() {
    // 近距离汽车, 位于画面中心, 正在快速靠近
    let t0 = Instant::now();
    let det = Detection::new("car", 0.9, BBox::new(220.0, 170.0, 200.0, 300.0)).with_distance(1.2);
    let mut track = TrackedObject::new(1, det, t0);
    track.frame_count = 10;
    track.velocity = Velocity::new(0.0, 40.0);
    track.range_rate = Some(-0.8);

    let result = scorer::score(&track, 640.0, 1.0);
    assert!(result.urgency > 0.85, "urgency {}", result.urgency);
    assert_eq!(result.reason, UrgencyReason::CriticalProximity);
}

#[test]
fn test_critical_car_through_engine() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();
    let car = |distance: f32| {
        Detection::new("car", 0.9, BBox::new(220.0, 170.0, 200.0, 300.0)).with_distance(distance)
    };

    engine.process_frame(&input(0, t0, 0, vec![car(2.0)]));
    let update = engine.process_frame(&input(1, t0, 100, vec![car(1.2)])).unwrap();
    let event = update.event.unwrap();

    assert!(event.urgency > 0.85);
    assert_eq!(event.reason, UrgencyReason::CriticalProximity);
    assert!(event.cue.is_critical());
    assert_eq!(event.cue.direction, Direction::Ahead);
    assert_eq!(event.cue.phrase, "car very close ahead");
    assert_eq!(update.path, PathStatus::Blocked);
}

#[test]
fn test_debounce_through_engine() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();
    let car = Detection::new("car", 0.9, BBox::new(270.0, 170.0, 100.0, 200.0)).with_distance(1.0);

    let spoken: Vec<bool> = [0u64, 300, 600, 900]
        .iter()
        .enumerate()
        .map(|(i, &ms)| {
            let update = engine
                .process_frame(&input(i as u64, t0, ms, vec![car.clone()]))
                .unwrap();
            let event = update.event.unwrap();
            assert!(event.urgency >= 0.85);
            event.announce
        })
        .collect();

    // 紧急间隔500ms: 0 播报, 300 抑制, 600 播报, 900 抑制
    assert_eq!(spoken, vec![true, false, true, false]);
    assert_eq!(engine.announced_count(), 2);
}

#[test]
fn test_repeated_frame_keeps_ids() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();
    let frame = vec![person(100.0, 3.0), person(400.0, 2.0)];

    let first = engine.process_frame(&input(0, t0, 0, frame.clone())).unwrap();
    let mut ids: Vec<u64> = engine.tracker().tracks().map(|t| t.id).collect();

    let second = engine.process_frame(&input(1, t0, 33, frame)).unwrap();
    let ids_after: Vec<u64> = engine.tracker().tracks().map(|t| t.id).collect();

    assert_eq!(first.track_count, second.track_count);
    ids.sort_unstable();
    assert_eq!(ids, ids_after);
    assert_eq!(
        first.event.unwrap().tracking.track_id,
        second.event.unwrap().tracking.track_id
    );
}

#[test]
fn test_identical_frame_near_zero_elapsed() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();
    let dog = Detection::new("dog", 0.8, BBox::new(480.0, 200.0, 60.0, 50.0)).with_distance(2.5);
    let frame = vec![person(100.0, 3.0), person(320.0, 2.0), dog];

    engine.process_frame(&FrameInput::new(0, t0, 640.0, frame.clone()));
    let ids: Vec<u64> = engine.tracker().tracks().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // 10µs 后同一组检测: 帧间隔被抬到下限, 身份与数量不变
    let update = engine
        .process_frame(&FrameInput::new(1, t0 + Duration::from_micros(10), 640.0, frame))
        .unwrap();
    assert_eq!(update.track_count, 3);

    let tracks: Vec<&TrackedObject> = engine.tracker().tracks().collect();
    assert_eq!(tracks.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
    for track in tracks {
        assert_eq!(track.frame_count, 2);
        assert!(track.velocity.vx.is_finite() && track.velocity.vy.is_finite());
        assert_eq!(track.speed(), 0.0);
        assert!(track.height_rate.is_finite());
    }
}

#[test]
fn test_bus_fan_out_and_shutdown() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let ui = engine.subscribe();
    let speech = engine.subscribe();
    let gone = engine.subscribe();
    assert!(engine.unsubscribe(gone.id()));

    let t0 = Instant::now();
    engine.process_frame(&input(0, t0, 0, vec![]));
    engine.process_frame(&input(1, t0, 33, vec![person(320.0, 2.0)]));

    for sub in [&ui, &speech] {
        let updates = sub.drain();
        assert_eq!(updates.len(), 2);
        assert!(updates[0].event.is_none());
        assert!(updates[1].event.is_some());
    }
    assert!(gone.try_recv().is_err());

    engine.shutdown();
    assert!(ui.recv().is_err());
    assert!(speech.recv().is_err());
}

#[test]
fn test_path_status_reported_per_frame() {
    let mut engine = UrgencyEngine::new(&EngineConfig::default());
    let t0 = Instant::now();

    let clear = engine
        .process_frame(&input(0, t0, 0, vec![person(40.0, 1.5)]))
        .unwrap();
    assert_eq!(clear.path, PathStatus::Clear);

    let blocked = engine
        .process_frame(&input(1, t0, 33, vec![person(40.0, 1.5), person(330.0, 2.0)]))
        .unwrap();
    assert_eq!(blocked.path, PathStatus::Blocked);
}
