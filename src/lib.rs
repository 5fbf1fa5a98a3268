mod backend;
mod error;
mod pipeline;
mod record;
mod signal;

// Library exports
pub mod prelude {
    // Records
    pub use crate::record::{FieldValue, Record, ShotId};

    // Signals
    pub use crate::signal::mds::{MdsSignal, TreeConnection};
    pub use crate::signal::zarr::{ArrayStore, ZarrSignal};
    pub use crate::signal::{RawSeries, Signal, SignalResult, Units};

    // Pipeline
    pub use crate::pipeline::Pipeline;
    pub use crate::pipeline::results::{ResultSet, ShotFailure, ShotOutcome};
    pub use crate::pipeline::stage::{MapFn, PredicateFn, Stage};

    // Backends
    pub use crate::backend::{Backend, process_shot};
    pub use crate::backend::pool::WorkerPoolBackend;
    pub use crate::backend::serial::SerialBackend;
    pub use crate::backend::sharded::ShardedBackend;

    // Errors
    pub use crate::error::{BackendError, FetchError, RecordError, ShapeError, StageError};
}

// Internal imports for use within the crate
#[allow(unused_imports)]
pub(crate) mod imports {
    pub use crate::record::{FieldValue, Record, ShotId};

    pub use crate::signal::{RawSeries, Signal, SignalResult, Units};

    pub use crate::pipeline::Pipeline;
    pub use crate::pipeline::results::{ResultSet, ShotFailure, ShotOutcome};
    pub use crate::pipeline::stage::{MapFn, PredicateFn, Stage};

    pub use crate::backend::Backend;

    pub use crate::error::{BackendError, FetchError, RecordError, ShapeError, StageError};

    // Result and error handling
    pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;
    pub use anyhow::Context as _;

    // Collections
    pub use std::collections::{HashMap, HashSet, VecDeque};

    // Async
    pub use std::sync::Arc;
    pub use std::time::Duration;
    pub use tokio::sync::Mutex;
    pub use tokio_util::sync::CancellationToken;

    // Testing - TODO, consider adding a broader set of test utilities.
    #[cfg(test)]
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }
}
