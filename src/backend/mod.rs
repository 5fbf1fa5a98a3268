use crate::imports::*;

pub mod pool;
pub mod serial;
pub mod sharded;

/// Strategy for executing a pipeline's stages across its shots. Injected into
/// [`Pipeline::compute`]; the pipeline never depends on a concrete backend.
///
/// All implementations drive the same per-shot stage loop, so for a fixed
/// pipeline and shot list the sets of completed, failed, and dropped shots are
/// identical across backends. Only wall-clock behavior and failure recovery
/// differ.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn run(&self, pipeline: &Pipeline) -> Result<ResultSet, BackendError>;
}

/// Apply the stage list to one shot's fresh record.
///
/// Fetch failures are recorded and processing continues, so later stages must
/// check field presence themselves. A failed map or where stage stops this
/// shot only. The shot completes only if it finishes with zero recorded
/// errors.
///
/// Custom backends call this per work unit; routing every shot through the
/// same driver is what keeps classification identical across strategies.
pub async fn process_shot(stages: &[Stage], shot: ShotId) -> ShotOutcome {
    let mut record = Record::new(shot);
    for stage in stages {
        match stage {
            Stage::Fetch { name, signal } => match signal.resolve(shot).await {
                Ok(result) => record.set(name.clone(), result),
                Err(err) => {
                    tracing::debug!(shot = %shot, field = name.as_str(), error = %err, "Fetch failed");
                    record.set_error(name.clone(), err);
                }
            },
            Stage::Map { name, f } => {
                if let Err(err) = f(&mut record) {
                    tracing::debug!(shot = %shot, stage = name.as_str(), "Map stage failed");
                    record.set_error(name.clone(), StageError::new(shot, name.clone(), &err));
                    return ShotOutcome::Failed(ShotFailure::from_record(record));
                }
            }
            Stage::Where { name, predicate } => match predicate(&record) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(shot = %shot, stage = name.as_str(), "Shot filtered out");
                    return ShotOutcome::Dropped(shot);
                }
                Err(err) => {
                    tracing::debug!(shot = %shot, stage = name.as_str(), "Where stage failed");
                    record.set_error(name.clone(), StageError::new(shot, name.clone(), &err));
                    return ShotOutcome::Failed(ShotFailure::from_record(record));
                }
            },
            Stage::Keep { names } => record.keep(names),
            Stage::Discard { names } => record.discard(names),
        }
    }

    if record.has_errors() {
        ShotOutcome::Failed(ShotFailure::from_record(record))
    } else {
        ShotOutcome::Completed(record)
    }
}
