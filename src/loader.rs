//! Source fetching and full map loads.
//!
//! A load fetches the feed and the boundary collection concurrently (the
//! only suspension point of the pipeline), then ingests, classifies,
//! joins and builds diagnostics in one synchronous pass. Each load yields
//! a fresh, immutable [`MapState`].

use crate::boundary::BoundaryCollection;
use crate::classifier::Classifier;
use crate::config::MapConfig;
use crate::diagnostics::DiagnosticsReport;
use crate::error::{MapError, Result};
use crate::events::{DiagnosticEvent, EventSink, NoopSink};
use crate::feed::{FeedIngestor, IngestStats};
use crate::filter::RecordFilter;
use crate::join::{JoinEngine, MapView};
use crate::models::JurisdictionRecord;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Supplies the raw feed and boundary documents
///
/// The feed is handed over as raw bytes so that a badly encoded row is
/// dropped during ingestion instead of failing the whole document.
pub trait SourceFetcher: Send + Sync {
    fn fetch_feed(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;
    fn fetch_boundaries(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Reads both sources from local files
#[derive(Debug, Clone)]
pub struct FileFetcher {
    feed_path: PathBuf,
    boundary_path: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new(feed_path: impl Into<PathBuf>, boundary_path: Option<PathBuf>) -> Self {
        Self {
            feed_path: feed_path.into(),
            boundary_path,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.feed_path.clone(), config.boundary_path.clone())
    }
}

impl SourceFetcher for FileFetcher {
    fn fetch_feed(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let path = self.feed_path.clone();
        async move {
            debug!("Reading feed {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|e| into_fetch_error(e, &path, |reason| MapError::FeedFetch { reason }))
        }
    }

    fn fetch_boundaries(&self) -> impl Future<Output = Result<String>> + Send {
        let path = self.boundary_path.clone();
        async move {
            let Some(path) = path else {
                return Err(MapError::BoundaryFetch {
                    reason: "no boundary collection configured".to_string(),
                });
            };
            debug!("Reading boundaries {}", path.display());
            tokio::fs::read_to_string(&path).await.map_err(|e| {
                into_fetch_error(e, &path, |reason| MapError::BoundaryFetch { reason })
            })
        }
    }
}

fn into_fetch_error(
    error: std::io::Error,
    path: &Path,
    wrap: impl FnOnce(String) -> MapError,
) -> MapError {
    if error.kind() == ErrorKind::NotFound {
        MapError::SourceNotFound {
            path: path.to_path_buf(),
        }
    } else {
        wrap(format!("failed to read {}: {}", path.display(), error))
    }
}

/// Records from one successful feed load
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<JurisdictionRecord>,
    pub stats: IngestStats,
    pub loaded_at: DateTime<Utc>,
}

/// Everything displayed after one load
#[derive(Debug, Clone)]
pub struct MapState {
    pub dataset: Arc<Dataset>,
    /// `None` when no boundary collection has ever loaded
    pub boundaries: Option<Arc<BoundaryCollection>>,
    pub view: MapView,
    pub diagnostics: DiagnosticsReport,
    /// User-facing notices about degraded loads
    pub advisories: Vec<String>,
}

impl MapState {
    /// Recompute the join for a different filter without refetching
    pub fn view_for(
        &self,
        filter: &RecordFilter,
        engine: &JoinEngine,
        sink: &dyn EventSink,
    ) -> MapView {
        match &self.boundaries {
            Some(boundaries) => engine.join(filter.apply(&self.dataset.records), boundaries, sink),
            None => MapView::default(),
        }
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.dataset.loaded_at
    }
}

/// Runs loads against a fetcher, keeping the last good boundary collection
pub struct MapLoader<F> {
    fetcher: F,
    ingestor: FeedIngestor,
    engine: JoinEngine,
    filter: RecordFilter,
    sink: Arc<dyn EventSink>,
    last_boundaries: Option<Arc<BoundaryCollection>>,
}

impl<F: SourceFetcher> MapLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            ingestor: FeedIngestor::default(),
            engine: JoinEngine::default(),
            filter: RecordFilter::default(),
            sink: Arc::new(NoopSink),
            last_boundaries: None,
        }
    }

    /// Loader set up from a session configuration
    pub fn from_config(fetcher: F, config: &MapConfig) -> Self {
        Self::new(fetcher)
            .with_classifier(Classifier::new(config.unification_marker.clone()))
            .with_engine(JoinEngine::new(config.join))
            .with_filter(config.filter.clone())
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.ingestor = FeedIngestor::new(classifier);
        self
    }

    pub fn with_engine(mut self, engine: JoinEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn engine(&self) -> &JoinEngine {
        &self.engine
    }

    pub fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    /// Fetch and ingest the feed only
    pub async fn load_dataset(&self) -> Result<Dataset> {
        let feed = self.fetcher.fetch_feed().await;
        self.ingest(feed)
    }

    /// Fetch both sources and build a complete map state.
    ///
    /// A feed failure is returned as an error. A boundary failure is not:
    /// the last good collection is reused if there is one, otherwise the
    /// view is empty, and either way an advisory is attached.
    pub async fn load(&mut self) -> Result<MapState> {
        let (feed, boundaries) =
            futures::join!(self.fetcher.fetch_feed(), self.fetcher.fetch_boundaries());

        let dataset = self.ingest(feed)?;
        let mut advisories = Vec::new();

        let boundaries = match boundaries
            .and_then(|text| BoundaryCollection::from_geojson(&text, self.sink.as_ref()))
        {
            Ok(collection) => {
                let collection = Arc::new(collection);
                self.last_boundaries = Some(Arc::clone(&collection));
                Some(collection)
            }
            Err(e) => {
                self.sink.record(DiagnosticEvent::BoundaryFetchFailed {
                    reason: e.to_string(),
                });
                match &self.last_boundaries {
                    Some(previous) => {
                        advisories.push(format!(
                            "Boundary collection unavailable ({}); showing previously loaded boundaries",
                            e
                        ));
                        Some(Arc::clone(previous))
                    }
                    None => {
                        advisories.push(format!(
                            "Boundary collection unavailable ({}); map will be empty until the next successful refresh",
                            e
                        ));
                        None
                    }
                }
            }
        };

        let diagnostics = DiagnosticsReport::build(&dataset.records);
        let state = MapState {
            dataset: Arc::new(dataset),
            boundaries,
            view: MapView::default(),
            diagnostics,
            advisories,
        };
        let view = state.view_for(&self.filter, &self.engine, self.sink.as_ref());

        info!(
            "Loaded {} records: {}",
            state.dataset.records.len(),
            view.stats.summary()
        );
        Ok(MapState { view, ..state })
    }

    fn ingest(&self, feed: Result<Vec<u8>>) -> Result<Dataset> {
        let result = feed.and_then(|bytes| self.ingestor.ingest(&bytes, self.sink.as_ref()));
        match result {
            Ok(result) => Ok(Dataset {
                records: result.records,
                stats: result.stats,
                loaded_at: Utc::now(),
            }),
            Err(e) => {
                warn!("Feed load failed: {}", e);
                self.sink.record(DiagnosticEvent::FeedFetchFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
