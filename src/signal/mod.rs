use crate::imports::*;
use serde::{Deserialize, Serialize};

pub mod mds;
pub mod zarr;

/*
    Types:
    * Units - Unit labels for the axes of a SignalResult
    * SignalResult - Validated per-shot signal payload; the boundary format of the crate
    * RawSeries - Unvalidated payload handed back by a store connection
    * Signal - Descriptor of a remote data source, resolvable against any shot
*/

/// Unit labels, keyed by axis. Serialized as `{"data": "..", "times": ".."}`
/// with `times` omitted when the signal has no independent axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub times: Option<String>,
}

impl Units {
    pub fn scalar(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            times: None,
        }
    }

    pub fn series(data: impl Into<String>, times: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            times: Some(times.into()),
        }
    }
}

/// The value produced by resolving a [`Signal`] against one shot.
///
/// Field naming is part of the interchange contract and must stay exactly
/// `data` / `times` / `units`. Construction goes through [`SignalResult::new`]
/// so that a payload with mismatched axis lengths can never reach a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub times: Option<Vec<f64>>,
    pub units: Units,
}

impl SignalResult {
    pub fn new(data: Vec<f64>, times: Option<Vec<f64>>, units: Units) -> Result<Self, ShapeError> {
        if let Some(times) = &times {
            if times.len() != data.len() {
                return Err(ShapeError::LengthMismatch {
                    data_len: data.len(),
                    times_len: times.len(),
                });
            }
        } else if units.times.is_some() {
            return Err(ShapeError::UnitsWithoutAxis);
        }
        Ok(Self { data, times, units })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_timeseries(&self) -> bool {
        self.times.is_some()
    }
}

/// Payload as handed back by a store connection, before shape validation.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    pub data: Vec<f64>,
    pub times: Option<Vec<f64>>,
    pub data_units: String,
    pub time_units: Option<String>,
}

impl RawSeries {
    pub fn validate(self) -> Result<SignalResult, ShapeError> {
        SignalResult::new(
            self.data,
            self.times,
            Units {
                data: self.data_units,
                times: self.time_units,
            },
        )
    }
}

/// A stateless descriptor of a remote measurable quantity. A signal never
/// embeds a shot number; the same instance is shared read-only across shots
/// and workers within a run.
///
/// Resolution is the only blocking operation in the engine. It must fail with
/// a typed [`FetchError`] rather than panicking or silently dropping data;
/// the fetch stage converts that failure into a record-level error so one
/// shot's failure never touches another shot.
#[async_trait::async_trait]
pub trait Signal: Send + Sync {
    /// Human-readable descriptor used in error reporting and logging.
    fn describe(&self) -> String;

    async fn resolve(&self, shot: ShotId) -> Result<SignalResult, FetchError>;
}

#[async_trait::async_trait]
impl<S: Signal + ?Sized> Signal for Arc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn resolve(&self, shot: ShotId) -> Result<SignalResult, FetchError> {
        (**self).resolve(shot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_result_has_no_times() {
        let result = SignalResult::new(vec![2.1], None, Units::scalar("T")).unwrap();
        assert!(!result.is_timeseries());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = SignalResult::new(
            vec![1.0, 2.0, 3.0],
            Some(vec![0.0, 0.1]),
            Units::series("A", "s"),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShapeError::LengthMismatch {
                data_len: 3,
                times_len: 2
            }
        );
    }

    #[test]
    fn test_time_units_without_times_rejected() {
        let err = SignalResult::new(vec![1.0], None, Units::series("A", "s")).unwrap_err();
        assert_eq!(err, ShapeError::UnitsWithoutAxis);
    }

    #[test]
    fn test_boundary_field_naming() {
        let result = SignalResult::new(
            vec![1.0, 2.0],
            Some(vec![0.0, 0.1]),
            Units::series("A", "s"),
        )
        .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [1.0, 2.0],
                "times": [0.0, 0.1],
                "units": {"data": "A", "times": "s"},
            })
        );
    }

    #[test]
    fn test_scalar_serialization_omits_times() {
        let result = SignalResult::new(vec![2.1], None, Units::scalar("T")).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [2.1],
                "units": {"data": "T"},
            })
        );
    }
}
