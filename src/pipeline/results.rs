use crate::imports::*;

/*
    Types:
    * ShotOutcome - Terminal state of one shot's stage loop (completed, dropped, failed)
    * ShotFailure - The failure-list entry for one failed shot
    * ResultSet - Materialized output of a compute call
*/

/// Terminal state of one shot. States are mutually exclusive: a shot either
/// completed with no recorded errors, was dropped by a predicate, or failed.
#[derive(Debug)]
pub enum ShotOutcome {
    Completed(Record),
    Dropped(ShotId),
    Failed(ShotFailure),
}

impl ShotOutcome {
    pub fn shot(&self) -> ShotId {
        match self {
            ShotOutcome::Completed(record) => record.shot(),
            ShotOutcome::Dropped(shot) => *shot,
            ShotOutcome::Failed(failure) => failure.shot,
        }
    }
}

/// Why a shot is absent from the successes: the per-field causes accumulated
/// on its record before processing stopped.
#[derive(Debug, Clone)]
pub struct ShotFailure {
    pub shot: ShotId,
    pub errors: HashMap<String, RecordError>,
}

impl ShotFailure {
    pub(crate) fn from_record(mut record: Record) -> Self {
        Self {
            shot: record.shot(),
            errors: record.take_errors(),
        }
    }

    pub fn error(&self, field: &str) -> Option<&RecordError> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&String, &RecordError)> {
        self.errors.iter()
    }
}

/// Everything a compute call produced. Completed records carry no ordering
/// guarantee; callers wanting shot order sort by [`Record::shot`] themselves.
/// Every input shot is accounted for exactly once across the three views, so
/// there is no silent data loss: absent-from-successes always means "failed"
/// (with causes) or "filtered by predicate".
#[derive(Debug, Default)]
pub struct ResultSet {
    records: Vec<Record>,
    failures: Vec<ShotFailure>,
    dropped: Vec<ShotId>,
}

impl ResultSet {
    pub fn push(&mut self, outcome: ShotOutcome) {
        match outcome {
            ShotOutcome::Completed(record) => self.records.push(record),
            ShotOutcome::Dropped(shot) => self.dropped.push(shot),
            ShotOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    pub fn absorb(&mut self, other: ResultSet) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
        self.dropped.extend(other.dropped);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn get(&self, shot: ShotId) -> Option<&Record> {
        self.records.iter().find(|r| r.shot() == shot)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failures(&self) -> &[ShotFailure] {
        &self.failures
    }

    pub fn failure_for(&self, shot: ShotId) -> Option<&ShotFailure> {
        self.failures.iter().find(|f| f.shot == shot)
    }

    pub fn dropped(&self) -> &[ShotId] {
        &self.dropped
    }

    pub fn was_dropped(&self, shot: ShotId) -> bool {
        self.dropped.contains(&shot)
    }

    /// Completed shot IDs, sorted. Handy for set comparisons across backends.
    pub fn completed_shots(&self) -> Vec<ShotId> {
        let mut shots: Vec<ShotId> = self.records.iter().map(Record::shot).collect();
        shots.sort();
        shots
    }

    /// Failed shot IDs, sorted.
    pub fn failed_shots(&self) -> Vec<ShotId> {
        let mut shots: Vec<ShotId> = self.failures.iter().map(|f| f.shot).collect();
        shots.sort();
        shots
    }
}
