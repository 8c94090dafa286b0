//! Batch runner.
//!
//! Every document is read and prepared up front. Prepared documents are then
//! grouped by `(space, title)`: groups run in parallel on a dedicated rayon
//! pool while documents inside one group run in source order, so two
//! documents targeting the same page never race on its version.
//!
//! Groups run in waves: a group whose documents name another group's page as
//! `parent_title` waits until that group has finished. Parent cycles fall
//! back to running the remaining groups together.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::document::{ParentRef, PreparedDocument};
use crate::engine::{SyncAction, SyncEngine, SyncOutcome};
use crate::error::{RunError, SyncError};
use crate::source::DocumentSource;

/// Result of one document.
#[derive(Debug)]
pub struct DocumentResult {
    /// Source identifier.
    pub id: String,
    pub result: Result<SyncOutcome, SyncError>,
}

/// Results of a batch, in source order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub results: Vec<DocumentResult>,
}

impl SyncReport {
    /// Whether every document reached a terminal success state.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.result.is_ok())
    }

    /// Number of successful documents with the given action.
    #[must_use]
    pub fn count(&self, action: SyncAction) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.result, Ok(o) if o.action == action))
            .count()
    }

    /// Number of failed documents.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_err()).count()
    }
}

/// Runs the sync engine over a document source.
pub struct SyncRunner<'a> {
    engine: SyncEngine<'a>,
    jobs: usize,
}

impl<'a> SyncRunner<'a> {
    /// Create a runner. `jobs` of 0 or 1 processes documents strictly
    /// sequentially in source order, so a parent page must come before its
    /// children. With more jobs, parents created in the same batch are synced
    /// before the documents that reference them by title.
    pub fn new(engine: SyncEngine<'a>, jobs: usize) -> Self {
        Self { engine, jobs }
    }

    /// Sync every document of `source`.
    ///
    /// Per-document failures are recorded in the report and never stop the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] if the worker pool can't be created.
    pub fn run(&self, source: &dyn DocumentSource) -> Result<SyncReport, RunError> {
        let ids = source.list();
        let mut slots: Vec<Option<Result<SyncOutcome, SyncError>>> =
            std::iter::repeat_with(|| None).take(ids.len()).collect();

        let mut groups: Vec<Vec<(usize, PreparedDocument)>> = Vec::new();
        let mut group_index: HashMap<(String, String), usize> = HashMap::new();

        for (index, id) in ids.iter().enumerate() {
            tracing::debug!(document = %id, "Preparing document");
            match self.prepare(source, id) {
                Ok(doc) => {
                    let key = (doc.space.clone(), doc.title.clone());
                    let group = *group_index.entry(key).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[group].push((index, doc));
                }
                Err(e) => slots[index] = Some(Err(e)),
            }
        }

        let synced = if self.jobs <= 1 {
            let mut docs: Vec<(usize, PreparedDocument)> = groups.into_iter().flatten().collect();
            docs.sort_by_key(|(index, _)| *index);
            docs.iter()
                .map(|(index, doc)| (*index, self.engine.sync(doc)))
                .collect::<Vec<_>>()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()?;
            let mut synced = Vec::new();
            for wave in waves(&groups, &group_index) {
                tracing::debug!(groups = wave.len(), "Syncing wave");
                synced.extend(pool.install(|| {
                    wave.par_iter()
                        .flat_map_iter(|&group| {
                            groups[group]
                                .iter()
                                .map(|(index, doc)| (*index, self.engine.sync(doc)))
                                .collect::<Vec<_>>()
                        })
                        .collect::<Vec<_>>()
                }));
            }
            synced
        };

        for (index, result) in synced {
            slots[index] = Some(result);
        }

        let results = ids
            .into_iter()
            .zip(slots)
            .filter_map(|(id, slot)| slot.map(|result| DocumentResult { id, result }))
            .inspect(|r| {
                if let Err(e) = &r.result {
                    tracing::error!(document = %r.id, kind = ?e.kind(), "{e}");
                }
            })
            .collect();

        Ok(SyncReport { results })
    }

    fn prepare(
        &self,
        source: &dyn DocumentSource,
        id: &str,
    ) -> Result<PreparedDocument, SyncError> {
        let bytes = source.read(id).map_err(SyncError::Read)?;
        self.engine.prepare(id, &bytes)
    }
}

/// Order groups into waves so that parent pages created in this batch exist
/// before the groups that look them up by title.
fn waves(
    groups: &[Vec<(usize, PreparedDocument)>],
    group_index: &HashMap<(String, String), usize>,
) -> Vec<Vec<usize>> {
    let parents: Vec<HashSet<usize>> = groups
        .iter()
        .enumerate()
        .map(|(group, docs)| {
            docs.iter()
                .filter_map(|(_, doc)| match &doc.parent {
                    ParentRef::Title(title) => group_index
                        .get(&(doc.space.clone(), title.clone()))
                        .copied(),
                    ParentRef::Id(_) => None,
                })
                .filter(|&parent| parent != group)
                .collect()
        })
        .collect();

    let mut done = vec![false; groups.len()];
    let mut pending: Vec<usize> = (0..groups.len()).collect();
    let mut waves = Vec::new();

    while !pending.is_empty() {
        let (ready, blocked): (Vec<usize>, Vec<usize>) = pending
            .into_iter()
            .partition(|&group| parents[group].iter().all(|&p| done[p]));
        let (ready, blocked) = if ready.is_empty() {
            (blocked, Vec::new())
        } else {
            (ready, blocked)
        };
        for &group in &ready {
            done[group] = true;
        }
        waves.push(ready);
        pending = blocked;
    }

    waves
}
