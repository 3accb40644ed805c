//! Tests the repository invariants and the frame pipeline scenario.

use std::sync::Arc;
use std::thread;

use super::{AccessMode, Data, DataContext, DataFramework, DataType, Grant, LifeSpan, UserId};
use crate::test_util;

struct Owner;
struct Reader;
struct Stranger;

struct Payload(i32);

impl Data for Payload {}

fn owned_payload() -> (DataFramework, Arc<DataContext>) {
    test_util::init();

    let mut framework = DataFramework::new();
    framework.install(
        super::Schema::new()
            .grant::<Owner, Payload>(LifeSpan::Frame, Grant::Create)
            .grant::<Reader, Payload>(LifeSpan::Frame, Grant::Read),
    );
    let context = framework.context();
    (framework, context)
}

#[test]
fn unregistered_triples_are_inert() {
    let (_framework, context) = owned_payload();

    assert!(!context.create_frame(&Stranger, Payload(1)).has_value());
    assert!(!context.write_frame::<Payload, _>(&Stranger).has_value());
    assert!(!context.read_frame::<Payload, _>(&Stranger).has_value());
    assert!(!context.destroy_frame::<Payload, _>(&Stranger));

    // The denied create left no value behind.
    assert!(!context.read_frame::<Payload, _>(&Reader).has_value());

    context.create_frame(&Owner, Payload(7));
    assert!(!context.destroy_frame::<Payload, _>(&Stranger));
    assert_eq!(context.read_frame::<Payload, _>(&Reader).require(|p| p.0), 7);
}

#[test]
fn read_grants_are_read_only() {
    let (_framework, context) = owned_payload();

    assert!(!context.create_frame(&Reader, Payload(1)).has_value());
    assert!(!context.write_frame::<Payload, _>(&Reader).has_value());
    assert!(!context.read_frame::<Payload, _>(&Reader).has_value());

    context.create_frame(&Owner, Payload(42));
    assert_eq!(context.read_frame::<Payload, _>(&Reader).require(|p| p.0), 42);
    assert!(!context.write_frame::<Payload, _>(&Reader).has_value());
}

#[test]
fn create_replaces_and_destroy_unconstructs() {
    let (_framework, context) = owned_payload();

    context.create_frame(&Owner, Payload(1));
    context.create_frame(&Owner, Payload(2));
    assert_eq!(context.read_frame::<Payload, _>(&Reader).require(|p| p.0), 2);

    assert!(context.destroy_frame::<Payload, _>(&Owner));
    assert!(!context.read_frame::<Payload, _>(&Reader).has_value());
    assert!(!context.destroy_frame::<Payload, _>(&Owner));

    // Only the last create is observable.
    context.create_frame(&Owner, Payload(3));
    assert_eq!(context.read_frame::<Payload, _>(&Reader).require(|p| p.0), 3);
}

#[test]
fn producers_use_write_for_their_own_data() {
    let (_framework, context) = owned_payload();

    context.create_frame(&Owner, Payload(5));
    context.write_frame::<Payload, _>(&Owner).require(|p| p.0 += 1);
    assert_eq!(context.read_frame::<Payload, _>(&Reader).require(|p| p.0), 6);

    // The producer's mode is Create, not Read.
    assert!(!context.read_frame::<Payload, _>(&Owner).has_value());
}

#[test]
fn exactly_one_producer_per_pair() {
    test_util::init();

    let mut framework = DataFramework::new();
    assert!(framework.register::<Owner, Payload>(LifeSpan::Frame, Grant::Create));
    assert!(!framework.register::<Stranger, Payload>(LifeSpan::Frame, Grant::Create));
    assert!(!framework.register::<Stranger, Payload>(LifeSpan::Frame, Grant::CreateSync));

    // A second registration on the same triple is rejected even for a
    // different mode.
    assert!(framework.register::<Stranger, Payload>(LifeSpan::Frame, Grant::Read));
    assert!(!framework.register::<Stranger, Payload>(LifeSpan::Frame, Grant::Write));

    // Other spans are independent pairs.
    assert!(framework.register::<Stranger, Payload>(LifeSpan::Cache, Grant::Create));

    let context = framework.context();
    assert_eq!(
        context.manager().mode_of(
            UserId::of::<Stranger>(),
            DataType::of::<Payload>(),
            LifeSpan::Frame,
        ),
        AccessMode::Read,
    );
}

#[test]
#[should_panic = "conflicting permission record"]
fn conflicting_schema_aborts_bootstrap() {
    let mut framework = DataFramework::new();
    framework.install(
        super::Schema::new()
            .grant::<Owner, Payload>(LifeSpan::Frame, Grant::Create)
            .grant::<Stranger, Payload>(LifeSpan::Frame, Grant::Create),
    );
}

#[test]
#[should_panic = "required"]
fn require_panics_on_absence() {
    let (_framework, context) = owned_payload();
    context.read_frame::<Payload, _>(&Reader).require(|p| p.0);
}

#[test]
#[should_panic = "dereferenced an absent"]
fn deref_panics_on_absence() {
    let (_framework, context) = owned_payload();
    let payload = context.read_frame::<Payload, _>(&Reader);
    let _ = payload.0;
}

#[test]
fn match_with_selects_the_branch() {
    let (_framework, context) = owned_payload();

    assert_eq!(context.read_frame::<Payload, _>(&Reader).match_with(|| -1, |p| p.0), -1);
    context.create_frame(&Owner, Payload(11));
    assert_eq!(context.read_frame::<Payload, _>(&Reader).match_with(|| -1, |p| p.0), 11);
}

struct Seeded {
    hits: i32,
}

impl Data for Seeded {
    fn initial() -> Option<Self> { Some(Seeded { hits: 0 }) }
}

#[test]
fn reset_restores_the_freshly_registered_state() {
    test_util::init();

    let mut framework = DataFramework::new();
    framework.install(
        super::Schema::new()
            .grant::<Owner, Seeded>(LifeSpan::Cache, Grant::Create)
            .grant::<Owner, Payload>(LifeSpan::Cache, Grant::Create)
            .grant::<Reader, Seeded>(LifeSpan::Cache, Grant::Read)
            .grant::<Reader, Payload>(LifeSpan::Cache, Grant::Read),
    );
    let context = framework.context();

    // The Create registration seeded the default-constructable slot.
    assert_eq!(context.read_cache::<Seeded, _>(&Reader).require(|s| s.hits), 0);
    assert!(!context.read_cache::<Payload, _>(&Reader).has_value());

    context.write_cache::<Seeded, _>(&Owner).require(|s| s.hits = 9);
    context.create_cache(&Owner, Payload(4));

    for _ in 0..2 {
        framework.reset_span(LifeSpan::Cache);
        assert_eq!(context.read_cache::<Seeded, _>(&Reader).require(|s| s.hits), 0);
        assert!(!context.read_cache::<Payload, _>(&Reader).has_value());
    }
}

struct Buffer(Vec<i32>);

impl Data for Buffer {
    fn initial() -> Option<Self> { Some(Buffer(Vec::new())) }

    fn clear(&mut self) { self.0.clear() }
}

#[test]
fn clear_span_empties_without_destroying() {
    test_util::init();

    let mut framework = DataFramework::new();
    framework.install(
        super::Schema::new()
            .grant::<Owner, Buffer>(LifeSpan::Frame, Grant::Create)
            .grant::<Reader, Buffer>(LifeSpan::Frame, Grant::Read),
    );
    let context = framework.context();

    context.create_frame(&Owner, Buffer(vec![1, 2, 3]));
    framework.clear_span(LifeSpan::Frame);

    let buffer = context.read_frame::<Buffer, _>(&Reader);
    assert!(buffer.has_value());
    assert!(buffer.require(|b| b.0.is_empty()));
}

struct Tally(i64);

impl Data for Tally {}

#[test]
fn sync_slots_serialise_concurrent_writers() {
    test_util::init();

    let mut framework = DataFramework::new();
    framework.install(
        super::Schema::new()
            .grant::<Owner, Tally>(LifeSpan::Global, Grant::CreateSync)
            .grant::<Reader, Tally>(LifeSpan::Global, Grant::ReadSync),
    );
    let context = framework.context();
    context.create_global(&Owner, Tally(0));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let context = Arc::clone(&context);
            thread::spawn(move || {
                for _ in 0..100 {
                    context.write_global::<Tally, _>(&Owner).require(|t| t.0 += 1);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("writer thread panicked");
    }

    assert_eq!(context.read_global::<Tally, _>(&Reader).require(|t| t.0), 400);
}

// The three-stage frame pipeline: FrameRecv produces the frame, Calc derives
// the process data, Delivery consumes both and marks the frame delivered.

struct FrameRecv;
struct Calc;
struct Delivery;

struct FrameData {
    value:     i32,
    frame_id:  i32,
    delivered: bool,
}

impl Data for FrameData {}

struct ProcessData {
    value: i32,
}

impl Data for ProcessData {}

struct DeliveryData {
    result: i32,
}

impl Data for DeliveryData {}

fn pipeline_framework() -> DataFramework {
    test_util::init();

    let mut framework = DataFramework::new();
    framework.install(
        super::Schema::new()
            .grant::<FrameRecv, FrameData>(LifeSpan::Frame, Grant::Create)
            .grant::<Calc, FrameData>(LifeSpan::Frame, Grant::Read)
            .grant::<Calc, ProcessData>(LifeSpan::Frame, Grant::Create)
            .grant::<Delivery, FrameData>(LifeSpan::Frame, Grant::Write)
            .grant::<Delivery, ProcessData>(LifeSpan::Frame, Grant::Read)
            .grant::<Delivery, DeliveryData>(LifeSpan::Frame, Grant::Create),
    );
    framework
}

fn run_frame(context: &DataContext, frame_id: i32) {
    context
        .create_frame(&FrameRecv, FrameData { value: 100, frame_id, delivered: false })
        .require(|_| ());

    let value = context.read_frame::<FrameData, _>(&Calc).require(|frame| frame.value);
    context.create_frame(&Calc, ProcessData { value: value / 50 });

    let process = context.read_frame::<ProcessData, _>(&Delivery).require(|p| p.value);
    let mut frame = context.write_frame::<FrameData, _>(&Delivery);
    frame.delivered = true;
    let frame_id = frame.frame_id;
    drop(frame);

    context.create_frame(&Delivery, DeliveryData { result: process * 2 + frame_id });
}

#[test]
fn frame_pipeline_across_two_frames() {
    let framework = pipeline_framework();
    let context = framework.context();

    for frame_id in 1..=2 {
        run_frame(&context, frame_id);

        assert_eq!(context.read_frame::<FrameData, _>(&Calc).require(|f| f.value), 100);
        assert!(context.write_frame::<FrameData, _>(&Delivery).require(|f| f.delivered));
        assert_eq!(context.read_frame::<ProcessData, _>(&Delivery).require(|p| p.value), 2);
        assert_eq!(
            context.write_frame::<DeliveryData, _>(&Delivery).require(|d| d.result),
            4 + frame_id,
        );

        framework.reset_span(LifeSpan::Frame);
        assert!(!context.read_frame::<FrameData, _>(&Calc).has_value());
    }
}
