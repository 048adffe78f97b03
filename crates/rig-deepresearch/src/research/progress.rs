//! Shared progress tracking for a research run
//!
//! Concurrent chains report through one [`ProgressTracker`]; each update is
//! applied and observed under a single lock, so observers always see
//! monotonically increasing completion counts.

use std::sync::Mutex;
use tracing::debug;

use super::state::{AnalysisProgress, ProgressObserver, ResearchProgress};

/// Partial progress change; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    pub current_depth: Option<usize>,
    pub current_breadth: Option<usize>,
    pub current_query: Option<String>,
    /// Added to the completed-query count
    pub completed: usize,
    /// Added to the analysis counters
    pub analysis: Option<AnalysisProgress>,
}

impl ProgressUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.current_depth = Some(depth);
        self
    }

    pub fn breadth(mut self, breadth: usize) -> Self {
        self.current_breadth = Some(breadth);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.current_query = Some(query.into());
        self
    }

    pub fn completed(mut self, count: usize) -> Self {
        self.completed = count;
        self
    }

    pub fn analysis(mut self, delta: AnalysisProgress) -> Self {
        self.analysis = Some(delta);
        self
    }
}

pub struct ProgressTracker {
    progress: Mutex<ResearchProgress>,
    observer: Option<ProgressObserver>,
}

impl ProgressTracker {
    pub fn new(initial: ResearchProgress, observer: Option<ProgressObserver>) -> Self {
        Self {
            progress: Mutex::new(initial),
            observer,
        }
    }

    /// Apply `update`, notify the observer and return the new snapshot.
    ///
    /// The observer runs while the lock is held and must not call back into
    /// this tracker.
    pub fn update(&self, update: ProgressUpdate) -> ResearchProgress {
        let mut progress = self.progress.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(depth) = update.current_depth {
            progress.current_depth = depth;
        }
        if let Some(breadth) = update.current_breadth {
            progress.current_breadth = breadth;
        }
        if let Some(query) = update.current_query {
            progress.current_query = Some(query);
        }
        progress.completed_queries += update.completed;

        if let Some(delta) = update.analysis {
            let counters = progress.analysis.get_or_insert_with(AnalysisProgress::default);
            counters.processed_sources += delta.processed_sources;
            counters.identified_patterns += delta.identified_patterns;
            counters.extracted_claims += delta.extracted_claims;
        }

        debug!(
            completed = progress.completed_queries,
            total = progress.total_queries,
            "Progress updated"
        );

        if let Some(observer) = &self.observer {
            observer(&progress);
        }

        progress.clone()
    }

    pub fn snapshot(&self) -> ResearchProgress {
        self.progress.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn initial() -> ResearchProgress {
        ResearchProgress {
            current_depth: 2,
            total_depth: 2,
            current_breadth: 3,
            total_breadth: 3,
            total_queries: 9,
            ..Default::default()
        }
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let tracker = ProgressTracker::new(initial(), None);
        let snapshot = tracker.update(ProgressUpdate::new().query("q1").completed(1));

        assert_eq!(snapshot.current_query.as_deref(), Some("q1"));
        assert_eq!(snapshot.completed_queries, 1);
        assert_eq!(snapshot.current_depth, 2);
        assert_eq!(snapshot.total_queries, 9);
        assert!(snapshot.analysis.is_none());
    }

    #[test]
    fn test_analysis_counters_accumulate() {
        let tracker = ProgressTracker::new(initial(), None);
        let delta = AnalysisProgress {
            processed_sources: 2,
            identified_patterns: 1,
            extracted_claims: 3,
        };
        tracker.update(ProgressUpdate::new().analysis(delta));
        let snapshot = tracker.update(ProgressUpdate::new().analysis(delta));

        assert_eq!(
            snapshot.analysis,
            Some(AnalysisProgress {
                processed_sources: 4,
                identified_patterns: 2,
                extracted_claims: 6,
            })
        );
    }

    #[test]
    fn test_observer_sees_every_update() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer: ProgressObserver = Arc::new(move |p: &ResearchProgress| {
            sink.lock().unwrap().push(p.completed_queries);
        });

        let tracker = ProgressTracker::new(initial(), Some(observer));
        tracker.update(ProgressUpdate::new().completed(1));
        tracker.update(ProgressUpdate::new().depth(1));
        tracker.update(ProgressUpdate::new().completed(1));

        assert_eq!(*seen.lock().unwrap(), vec![1, 1, 2]);
        assert_eq!(tracker.snapshot().current_depth, 1);
    }

    #[test]
    fn test_concurrent_updates_are_counted() {
        let tracker = Arc::new(ProgressTracker::new(initial(), None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        tracker.update(ProgressUpdate::new().completed(1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.snapshot().completed_queries, 80);
    }
}
