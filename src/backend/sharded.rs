use crate::backend::process_shot;
use crate::imports::*;
use tokio::task::{Id, JoinSet};

/// Cluster-style backend: shots are partitioned into shards and each shard is
/// submitted as an independent task. A crashed shard is re-queued whole, up to
/// a retry budget, before the run fails; same output contract as the other
/// backends otherwise.
#[derive(Clone)]
pub struct ShardedBackend {
    shard_size: usize,
    max_attempts: u32,
    cancel: Option<CancellationToken>,
}

impl Default for ShardedBackend {
    fn default() -> Self {
        Self {
            shard_size: 16,
            max_attempts: 3,
            cancel: None,
        }
    }
}

impl ShardedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size.max(1);
        self
    }

    /// Total attempts per shard, first submission included.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn shard_size(&self) -> usize {
        self.shard_size
    }

    fn submit(
        &self,
        join_set: &mut JoinSet<ResultSet>,
        stages: Arc<Vec<Stage>>,
        shard: Vec<ShotId>,
    ) -> Id {
        let cancel = self.cancel.clone();
        let handle = join_set.spawn(async move {
            let mut results = ResultSet::default();
            for shot in shard {
                if let Some(cancel) = &cancel {
                    if cancel.is_cancelled() {
                        break;
                    }
                }
                results.push(process_shot(&stages, shot).await);
            }
            results
        });
        handle.id()
    }
}

#[async_trait::async_trait]
impl Backend for ShardedBackend {
    #[tracing::instrument(skip_all, fields(shard_size = self.shard_size, shots = pipeline.shots().len()))]
    async fn run(&self, pipeline: &Pipeline) -> Result<ResultSet, BackendError> {
        let stages: Arc<Vec<Stage>> = Arc::new(pipeline.stages().to_vec());

        let mut join_set = JoinSet::new();
        let mut inflight: HashMap<Id, (Vec<ShotId>, u32)> = HashMap::new();
        for shard in pipeline.shots().chunks(self.shard_size) {
            let shard = shard.to_vec();
            let id = self.submit(&mut join_set, stages.clone(), shard.clone());
            inflight.insert(id, (shard, 1));
        }

        let mut results = ResultSet::default();
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((id, shard_results)) => {
                    inflight.remove(&id);
                    results.absorb(shard_results);
                }
                Err(err) => {
                    let Some((shard, attempts)) = inflight.remove(&err.id()) else {
                        return Err(BackendError::WorkerCrashed(err.to_string()));
                    };
                    if attempts >= self.max_attempts {
                        return Err(BackendError::ShardFailed {
                            shots: shard.len(),
                            attempts,
                            detail: err.to_string(),
                        });
                    }
                    tracing::debug!(
                        shard_len = shard.len(),
                        attempts,
                        "Shard crashed, re-queuing"
                    );
                    let id = self.submit(&mut join_set, stages.clone(), shard.clone());
                    inflight.insert(id, (shard, attempts + 1));
                }
            }
        }

        if let Some(cancel) = &self.cancel {
            if cancel.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
        }
        Ok(results)
    }
}
