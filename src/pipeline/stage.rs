use crate::imports::*;

/*
    Types:
    * MapFn / PredicateFn - Arc-wrapped user closures, transferable to worker contexts
    * Stage - One declarative step of a pipeline
*/

pub type MapFn = Arc<dyn Fn(&mut Record) -> Result<()> + Send + Sync>;
pub type PredicateFn = Arc<dyn Fn(&Record) -> Result<bool> + Send + Sync>;

/// One declarative step. Stages are applied strictly in declaration order per
/// shot; there is no reordering or fusion.
#[derive(Clone)]
pub enum Stage {
    /// Resolve `signal` for the shot and store the result under `name`.
    Fetch { name: String, signal: Arc<dyn Signal> },
    /// Side-effecting user transform over the record. `name` is the positional
    /// identity (`map[i]`) its failures are attributed to.
    Map { name: String, f: MapFn },
    /// Filter predicate; a false result drops the shot from the run's output.
    Where { name: String, predicate: PredicateFn },
    /// Prune the record's fields to exactly `names`.
    Keep { names: Vec<String> },
    /// Remove exactly `names` from the record's fields.
    Discard { names: Vec<String> },
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetch { name, signal } => f
                .debug_struct("Fetch")
                .field("name", name)
                .field("signal", &signal.describe())
                .finish(),
            Stage::Map { name, .. } => f.debug_struct("Map").field("name", name).finish(),
            Stage::Where { name, .. } => f.debug_struct("Where").field("name", name).finish(),
            Stage::Keep { names } => f.debug_struct("Keep").field("names", names).finish(),
            Stage::Discard { names } => f.debug_struct("Discard").field("names", names).finish(),
        }
    }
}
