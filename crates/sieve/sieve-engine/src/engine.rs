use crate::error::EngineError;
use crate::pipeline::{ClassificationPipeline, PipelineConfig, PipelineHandle};
use prism_core::StopToken;
use prism_icc::{SharedIntegerSource, SharedResultSink};
use sieve_config::{SieveConfig, TesterKind};
use sieve_core::{MillerRabin, PrimalityTest, PrimeCache, TrialDivision};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The classifier process: both mapped regions opened and validated, the
/// pipeline configured but not yet running.
///
/// All setup faults surface from `from_config`, before any task exists.
pub struct SieveEngine {
    pipeline: ClassificationPipeline,
    source: SharedIntegerSource,
    sink: SharedResultSink,
}

impl SieveEngine {
    pub fn from_config(cfg: &SieveConfig) -> Result<Self, EngineError> {
        if cfg.workers == 0 {
            return Err(EngineError::InvalidConfig("workers must be at least 1".into()));
        }
        if cfg.poll_interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        if cfg.queue_capacity == Some(0) {
            return Err(EngineError::InvalidConfig(
                "queue_capacity must be non-zero when set".into(),
            ));
        }

        let source =
            SharedIntegerSource::open(&cfg.numbers_path).map_err(|source| {
                EngineError::OpenSource {
                    path: cfg.numbers_path.clone(),
                    source,
                }
            })?;
        info!(
            path = %cfg.numbers_path,
            capacity = source.capacity(),
            "inbound region mapped"
        );

        let sink = SharedResultSink::create(&cfg.results_path, cfg.results_capacity_bytes)
            .map_err(|source| EngineError::CreateSink {
                path: cfg.results_path.clone(),
                source,
            })?;
        info!(
            path = %cfg.results_path,
            capacity = sink.capacity(),
            "outbound region created"
        );

        let tester: Arc<dyn PrimalityTest> = match cfg.tester {
            TesterKind::TrialDivision => Arc::new(TrialDivision),
            TesterKind::MillerRabin => Arc::new(MillerRabin),
        };
        info!(tester = ?cfg.tester, workers = cfg.workers, "primality tester selected");

        let pipeline = ClassificationPipeline::new(
            tester,
            Arc::new(PrimeCache::new()),
            PipelineConfig {
                workers: cfg.workers,
                poll_interval: Duration::from_millis(cfg.poll_interval_ms),
                queue_capacity: cfg.queue_capacity,
            },
        );

        Ok(Self {
            pipeline,
            source,
            sink,
        })
    }

    pub fn start(self, token: StopToken) -> Result<PipelineHandle, EngineError> {
        self.pipeline.spawn(self.source, self.sink, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_icc::{SharedIntegerWriter, SharedResultReader};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> SieveConfig {
        SieveConfig {
            numbers_path: dir.path().join("numbers.dat").display().to_string(),
            results_path: dir.path().join("primes.dat").display().to_string(),
            poll_interval_ms: 2,
            ..SieveConfig::default()
        }
    }

    #[test]
    fn missing_inbound_file_is_a_setup_fault() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let err = SieveEngine::from_config(&cfg).err().unwrap();
        assert!(matches!(err, EngineError::OpenSource { .. }));
        // the outbound file must not be created when setup fails early
        assert!(!std::path::Path::new(&cfg.results_path).exists());
    }

    #[test]
    fn ragged_outbound_capacity_is_a_setup_fault() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SieveConfig {
            results_capacity_bytes: 1020,
            ..config_in(&dir)
        };
        SharedIntegerWriter::create(&cfg.numbers_path, 64).unwrap();
        let err = SieveEngine::from_config(&cfg).err().unwrap();
        assert!(matches!(err, EngineError::CreateSink { .. }));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SieveConfig {
            workers: 0,
            ..config_in(&dir)
        };
        let err = SieveEngine::from_config(&cfg).err().unwrap();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn runs_from_config_through_both_regions() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SieveConfig {
            tester: TesterKind::MillerRabin,
            ..config_in(&dir)
        };
        let mut numbers = SharedIntegerWriter::create(&cfg.numbers_path, 64).unwrap();
        for v in [7, 0, 8, 97] {
            numbers.put(v);
        }
        numbers.put_sentinel();

        let engine = SieveEngine::from_config(&cfg).unwrap();
        let report = engine.start(StopToken::new()).unwrap().join().unwrap();
        assert_eq!(report.written, 3);

        let results = SharedResultReader::open(&cfg.results_path).unwrap();
        let mut seen: Vec<(i32, Option<bool>)> = (0..results.capacity())
            .map(|slot| results.read_at(slot))
            .filter(|r| !r.is_empty())
            .map(|r| (r.number, r.is_prime()))
            .collect();
        seen.sort();
        assert_eq!(
            seen,
            vec![(7, Some(true)), (8, Some(false)), (97, Some(true))]
        );
    }
}
