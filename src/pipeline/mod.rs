use crate::imports::*;

pub mod results;
pub mod stage;

/// An ordered, reusable declaration of fetch/transform/filter/prune stages
/// over a fixed shot set.
///
/// Construction performs no I/O; nothing is fetched until [`Pipeline::compute`]
/// hands the stage list to a backend. The shot list is fixed at construction
/// and the stage list is append-only, so a built pipeline is immutable during
/// a run and can be reused across any number of compute calls.
#[derive(Default)]
pub struct Pipeline {
    shots: Vec<ShotId>,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new<I, S>(shots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ShotId>,
    {
        Self {
            shots: shots.into_iter().map(Into::into).collect(),
            stages: Vec::new(),
        }
    }

    /// Declare a fetch: resolve `signal` per shot and store the result under
    /// `name`. A fetch failure is recorded on the shot's record, it never
    /// aborts the batch.
    pub fn add_fetch<S>(mut self, name: impl Into<String>, signal: S) -> Self
    where
        S: Signal + 'static,
    {
        let name = name.into();
        let signal: Arc<dyn Signal> = Arc::new(signal);
        tracing::debug!(
            field = name.as_str(),
            signal = signal.describe(),
            "Added fetch stage"
        );
        self.stages.push(Stage::Fetch { name, signal });
        self
    }

    /// Declare a side-effecting transform over the record. An error returned
    /// by `f` marks the shot failed; remaining stages for that shot are
    /// skipped and the batch continues.
    pub fn add_map<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    {
        let name = format!("map[{}]", self.stages.len());
        tracing::debug!(stage = name.as_str(), "Added map stage");
        self.stages.push(Stage::Map {
            name,
            f: Arc::new(f),
        });
        self
    }

    /// Declare a filter. A false result drops the shot from the output (as
    /// "filtered", not "errored"); an error from the predicate marks the shot
    /// failed. A predicate placed before the fetch it reads observes the field
    /// as absent and must treat that as filtered-out, not as a fault.
    pub fn add_where<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> Result<bool> + Send + Sync + 'static,
    {
        let name = format!("where[{}]", self.stages.len());
        tracing::debug!(stage = name.as_str(), "Added where stage");
        self.stages.push(Stage::Where {
            name,
            predicate: Arc::new(predicate),
        });
        self
    }

    /// Prune each record's fields to exactly `names`. Recorded errors are
    /// never pruned.
    pub fn add_keep<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        tracing::debug!(names = ?names, "Added keep stage");
        self.stages.push(Stage::Keep { names });
        self
    }

    /// Remove exactly `names` from each record's fields.
    pub fn add_discard<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        tracing::debug!(names = ?names, "Added discard stage");
        self.stages.push(Stage::Discard { names });
        self
    }

    pub fn shots(&self) -> &[ShotId] {
        &self.shots
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run the pipeline on the chosen backend. Per-shot errors are contained
    /// in the returned [`ResultSet`]; only infrastructure failures surface as
    /// a [`BackendError`].
    #[tracing::instrument(skip(self, backend), fields(shots = self.shots.len(), stages = self.stages.len()))]
    pub async fn compute<B>(&self, backend: &B) -> Result<ResultSet, BackendError>
    where
        B: Backend + ?Sized,
    {
        tracing::debug!("Starting pipeline run");
        let results = backend.run(self).await?;
        tracing::debug!(
            completed = results.len(),
            failed = results.failures().len(),
            dropped = results.dropped().len(),
            "Pipeline run finished"
        );
        Ok(results)
    }
}
