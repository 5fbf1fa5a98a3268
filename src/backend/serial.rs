use crate::backend::process_shot;
use crate::imports::*;

/// Reference backend: processes shots one at a time, in input order.
///
/// Deterministic, so it doubles as the debugging baseline any parallel
/// backend is compared against.
#[derive(Clone, Default)]
pub struct SerialBackend {
    cancel: Option<CancellationToken>,
}

impl SerialBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a cancellation token at shot granularity: the current shot is
    /// finished, remaining shots are abandoned and the run fails with
    /// [`BackendError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

#[async_trait::async_trait]
impl Backend for SerialBackend {
    #[tracing::instrument(skip_all, fields(shots = pipeline.shots().len()))]
    async fn run(&self, pipeline: &Pipeline) -> Result<ResultSet, BackendError> {
        let mut results = ResultSet::default();
        for &shot in pipeline.shots() {
            if let Some(cancel) = &self.cancel {
                if cancel.is_cancelled() {
                    return Err(BackendError::Cancelled);
                }
            }
            results.push(process_shot(pipeline.stages(), shot).await);
        }
        Ok(results)
    }
}
