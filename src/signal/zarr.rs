use crate::imports::*;

/// Boundary to a shot-addressed array store (Zarr-like). `Ok(None)` means the
/// store holds no array under this path for the given shot.
#[async_trait::async_trait]
pub trait ArrayStore: Send + Sync {
    async fn read(
        &self,
        path: &str,
        storage_options: &HashMap<String, String>,
        shot: ShotId,
    ) -> Result<Option<RawSeries>>;
}

/// Descriptor of a signal held in a shot-addressed array store.
#[derive(Clone)]
pub struct ZarrSignal {
    path: String,
    storage_options: HashMap<String, String>,
    store: Arc<dyn ArrayStore>,
    timeout: Option<Duration>,
}

impl ZarrSignal {
    pub fn new(path: impl Into<String>, store: Arc<dyn ArrayStore>) -> Self {
        Self {
            path: path.into(),
            storage_options: HashMap::new(),
            store,
            timeout: None,
        }
    }

    /// Options forwarded verbatim to the store (credentials profile, region,
    /// consolidated-metadata toggles and the like).
    pub fn with_storage_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.storage_options.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn storage_options(&self) -> &HashMap<String, String> {
        &self.storage_options
    }
}

#[async_trait::async_trait]
impl Signal for ZarrSignal {
    fn describe(&self) -> String {
        format!("zarr:{}", self.path)
    }

    async fn resolve(&self, shot: ShotId) -> Result<SignalResult, FetchError> {
        let signal = self.describe();
        tracing::debug!(signal = %signal, shot = %shot, "Reading array store");

        let read = self.store.read(&self.path, &self.storage_options, shot);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(FetchError::Timeout {
                        shot,
                        signal,
                        timeout: limit,
                    });
                }
            },
            None => read.await,
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

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory store keyed by (path, shot).
    #[derive(Default)]
    struct MemoryStore {
        arrays: HashMap<(String, ShotId), RawSeries>,
    }

    #[async_trait::async_trait]
    impl ArrayStore for MemoryStore {
        async fn read(
            &self,
            path: &str,
            _storage_options: &HashMap<String, String>,
            shot: ShotId,
        ) -> Result<Option<RawSeries>> {
            Ok(self.arrays.get(&(path.to_string(), shot)).cloned())
        }
    }

    #[tokio::test]
    async fn test_resolve_reads_shot_addressed_array() {
        let mut store = MemoryStore::default();
        store.arrays.insert(
            ("profiles/te".to_string(), ShotId(7)),
            RawSeries {
                data: vec![1.2, 1.1, 0.9],
                times: Some(vec![0.0, 0.5, 1.0]),
                data_units: "keV".to_string(),
                time_units: Some("s".to_string()),
            },
        );

        let signal = ZarrSignal::new("profiles/te", Arc::new(store));
        let result = signal.resolve(ShotId(7)).await.unwrap();
        assert_eq!(result.data, vec![1.2, 1.1, 0.9]);
        assert_eq!(result.units.data, "keV");

        let err = signal.resolve(ShotId(8)).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_storage_options_are_forwarded() {
        struct OptionEcho;

        #[async_trait::async_trait]
        impl ArrayStore for OptionEcho {
            async fn read(
                &self,
                _path: &str,
                storage_options: &HashMap<String, String>,
                _shot: ShotId,
            ) -> Result<Option<RawSeries>> {
                anyhow::ensure!(
                    storage_options.get("anon") == Some(&"true".to_string()),
                    "missing option"
                );
                Ok(Some(RawSeries {
                    data: vec![0.0],
                    data_units: "V".to_string(),
                    ..Default::default()
                }))
            }
        }

        let signal =
            ZarrSignal::new("bolometry/prad", Arc::new(OptionEcho)).with_storage_option("anon", "true");
        assert!(signal.resolve(ShotId(1)).await.is_ok());
    }
}
