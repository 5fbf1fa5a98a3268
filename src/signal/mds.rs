use crate::imports::*;

/// Boundary to an MDSplus-like tree server. Implementations own the wire
/// protocol; the engine only requires that evaluation be a pure function of
/// (tree, shot, expression).
///
/// `Ok(None)` means the tree has no such node for this shot, which is an
/// expected per-shot condition and distinct from a transport failure.
#[async_trait::async_trait]
pub trait TreeConnection: Send + Sync {
    async fn evaluate(
        &self,
        tree: &str,
        shot: ShotId,
        expression: &str,
    ) -> Result<Option<RawSeries>>;
}

/// Descriptor of a signal stored in an MDSplus-like tree, addressed by a TDI
/// expression and a tree name.
///
/// Note: facility conventions differ on expression spelling and units for the
/// same physical quantity (e.g. plasma current as `\ip` or `\ipmeas`, in A or
/// MA); the descriptor passes the expression through verbatim and reports the
/// units the store declares.
#[derive(Clone)]
pub struct MdsSignal {
    expression: String,
    tree: String,
    connection: Arc<dyn TreeConnection>,
    timeout: Option<Duration>,
}

impl MdsSignal {
    pub fn new(
        expression: impl Into<String>,
        tree: impl Into<String>,
        connection: Arc<dyn TreeConnection>,
    ) -> Self {
        Self {
            expression: expression.into(),
            tree: tree.into(),
            connection,
            timeout: None,
        }
    }

    /// Bound the remote evaluation; a timed-out fetch is handled exactly like
    /// any other fetch failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn tree(&self) -> &str {
        &self.tree
    }
}

#[async_trait::async_trait]
impl Signal for MdsSignal {
    fn describe(&self) -> String {
        format!("mds:{}:{}", self.tree, self.expression)
    }

    async fn resolve(&self, shot: ShotId) -> Result<SignalResult, FetchError> {
        let signal = self.describe();
        tracing::debug!(signal = %signal, shot = %shot, "Resolving MDS signal");

        let evaluation = self.connection.evaluate(&self.tree, shot, &self.expression);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, evaluation).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(FetchError::Timeout {
                        shot,
                        signal,
                        timeout: limit,
                    });
                }
            },
            None => evaluation.await,
        };

        let raw = outcome
            .map_err(|err| FetchError::Unavailable {
                shot,
                signal: signal.clone(),
                detail: format!("{err:#}"),
            })?
            .ok_or_else(|| FetchError::NotFound {
                shot,
                signal: signal.clone(),
            })?;

        raw.validate()
            .map_err(|source| FetchError::MalformedShape {
                shot,
                signal,
                source,
            })
    }
}
