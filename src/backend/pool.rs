use crate::backend::process_shot;
use crate::imports::*;
use tokio::task::JoinSet;

/// Fixed-size pool of workers pulling shots from a shared queue.
///
/// Each worker runs the full stage sequence for the shots it dequeues, on its
/// own record, so no locking beyond the queue itself is needed. A worker
/// panic is fatal to the run.
#[derive(Clone)]
pub struct WorkerPoolBackend {
    workers: usize,
    cancel: Option<CancellationToken>,
}

impl WorkerPoolBackend {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

#[async_trait::async_trait]
impl Backend for WorkerPoolBackend {
    #[tracing::instrument(skip_all, fields(workers = self.workers, shots = pipeline.shots().len()))]
    async fn run(&self, pipeline: &Pipeline) -> Result<ResultSet, BackendError> {
        let stages: Arc<Vec<Stage>> = Arc::new(pipeline.stages().to_vec());
        let queue: Arc<Mutex<VecDeque<ShotId>>> =
            Arc::new(Mutex::new(pipeline.shots().iter().copied().collect()));

        let mut join_set = JoinSet::new();
        for worker in 0..self.workers {
            let stages = stages.clone();
            let queue = queue.clone();
            let cancel = self.cancel.clone();
            join_set.spawn(async move {
                let mut results = ResultSet::default();
                loop {
                    if let Some(cancel) = &cancel {
                        if cancel.is_cancelled() {
                            break;
                        }
                    }
                    let shot = queue.lock().await.pop_front();
                    let Some(shot) = shot else { break };
                    tracing::debug!(worker, shot = %shot, "Worker picked up shot");
                    results.push(process_shot(&stages, shot).await);
                }
                results
            });
        }

        let mut results = ResultSet::default();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(worker_results) => results.absorb(worker_results),
                Err(err) => return Err(BackendError::WorkerCrashed(err.to_string())),
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
