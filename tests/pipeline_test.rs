//! Stage semantics: fetch, map, where, keep/discard, declaration order.

use shotpipe::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Deterministic mock: resolves a short current trace derived from the shot
/// number, failing for a configured set of shots.
struct MockSignal {
    name: &'static str,
    fail_shots: HashSet<ShotId>,
}

impl MockSignal {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            fail_shots: HashSet::new(),
        }
    }

    fn failing_for(mut self, shots: impl IntoIterator<Item = i64>) -> Self {
        self.fail_shots.extend(shots.into_iter().map(ShotId));
        self
    }
}

#[async_trait::async_trait]
impl Signal for MockSignal {
    fn describe(&self) -> String {
        format!("mock:{}", self.name)
    }

    async fn resolve(&self, shot: ShotId) -> Result<SignalResult, FetchError> {
        if self.fail_shots.contains(&shot) {
            return Err(FetchError::Unavailable {
                shot,
                signal: self.describe(),
                detail: "store offline".to_string(),
            });
        }
        let base = shot.0 as f64;
        let result = SignalResult::new(
            vec![base, base * 2.0, base * 3.0],
            Some(vec![0.0, 0.1, 0.2]),
            Units::series("A", "s"),
        )
        .expect("mock shape is valid");
        Ok(result)
    }
}

#[tokio::test]
async fn test_fetch_then_map_produces_derived_field() {
    let pipeline = Pipeline::new([101, 102])
        .add_fetch("ip", MockSignal::new("ip"))
        .add_map(|record| {
            let peak = record
                .get("ip")
                .and_then(FieldValue::as_signal)
                .map(|sig| sig.data.iter().cloned().fold(f64::MIN, f64::max))
                .unwrap_or(f64::NAN);
            record.set("ip_peak", peak);
            Ok(())
        });

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    assert_eq!(results.len(), 2);

    let record = results.get(ShotId(102)).unwrap();
    assert_eq!(
        record.get("ip_peak").and_then(FieldValue::as_float),
        Some(306.0)
    );
}

#[tokio::test]
async fn test_keep_prunes_to_exactly_named_fields() {
    let pipeline = Pipeline::new([1, 2, 3])
        .add_fetch("a", MockSignal::new("a"))
        .add_fetch("b", MockSignal::new("b"))
        .add_keep(["a"]);

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    assert_eq!(results.len(), 3);
    for record in results.records() {
        let names: Vec<&String> = record.field_names().collect();
        assert_eq!(names, vec![&"a".to_string()]);
    }
}

#[tokio::test]
async fn test_discard_removes_exactly_named_fields() {
    let pipeline = Pipeline::new([1])
        .add_fetch("a", MockSignal::new("a"))
        .add_fetch("b", MockSignal::new("b"))
        .add_discard(["b"]);

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    let record = results.get(ShotId(1)).unwrap();
    assert!(record.contains("a"));
    assert!(!record.contains("b"));
}

#[tokio::test]
async fn test_where_before_fetch_drops_every_shot() {
    // Stage order is declaration order: the predicate runs before the field
    // exists, so every shot must be filtered out, not faulted.
    let pipeline = Pipeline::new([1, 2, 3])
        .add_where(|record| Ok(record.get("x").is_some()))
        .add_fetch("x", MockSignal::new("x"));

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    assert!(results.is_empty());
    assert!(results.failures().is_empty());
    assert_eq!(results.dropped().len(), 3);
}

#[tokio::test]
async fn test_where_after_fetch_filters_on_data() {
    let pipeline = Pipeline::new([1, 5, 9])
        .add_fetch("ip", MockSignal::new("ip"))
        .add_where(|record| {
            let first = record
                .get("ip")
                .and_then(FieldValue::as_series)
                .and_then(|s| s.first().copied())
                .unwrap_or(0.0);
            Ok(first > 4.0)
        });

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    assert_eq!(results.completed_shots(), vec![ShotId(5), ShotId(9)]);
    assert_eq!(results.dropped(), &[ShotId(1)]);
}

#[tokio::test]
async fn test_dropped_shot_runs_no_further_stages() {
    let pipeline = Pipeline::new([1, 2])
        .add_where(|record| Ok(record.shot() == ShotId(2)))
        .add_map(|record| {
            // Only the surviving shot should reach this stage.
            assert_eq!(record.shot(), ShotId(2));
            record.set("touched", true);
            Ok(())
        });

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    assert_eq!(results.completed_shots(), vec![ShotId(2)]);
    assert_eq!(results.dropped(), &[ShotId(1)]);
}

#[tokio::test]
async fn test_pipeline_is_reusable_and_idempotent() {
    let pipeline = Pipeline::new([3, 1, 2])
        .add_fetch("ip", MockSignal::new("ip").failing_for([2]))
        .add_map(|record| {
            record.set("tag", "pass-one");
            Ok(())
        });

    let backend = SerialBackend::new();
    let first = pipeline.compute(&backend).await.unwrap();
    let second = pipeline.compute(&backend).await.unwrap();

    assert_eq!(first.completed_shots(), second.completed_shots());
    assert_eq!(first.failed_shots(), second.failed_shots());
    for record in first.records() {
        let again = second.get(record.shot()).unwrap();
        assert_eq!(
            record.get("ip").and_then(FieldValue::as_series),
            again.get("ip").and_then(FieldValue::as_series)
        );
    }
}

#[tokio::test]
async fn test_shared_signal_never_embeds_a_shot() {
    // One descriptor reused across shots resolves per-shot data.
    let signal = Arc::new(MockSignal::new("ip"));
    let pipeline = Pipeline::new([10, 20]).add_fetch("ip", signal);

    let results = pipeline.compute(&SerialBackend::new()).await.unwrap();
    let ten = results.get(ShotId(10)).unwrap();
    let twenty = results.get(ShotId(20)).unwrap();
    assert_eq!(
        ten.get("ip").and_then(FieldValue::as_series).unwrap()[0],
        10.0
    );
    assert_eq!(
        twenty.get("ip").and_then(FieldValue::as_series).unwrap()[0],
        20.0
    );
}
