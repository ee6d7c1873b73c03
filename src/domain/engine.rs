use super::{Decision, DecisionRecord, SessionState};
use crate::catalog::{CatalogReader, Locator, MediaFilter};
use crate::error::Result;
use crate::persist::{PersistenceBridge, SessionSnapshot};
use std::collections::BTreeSet;

/// Operations layer over [`SessionState`].
///
/// All mutations go through this type, one caller at a time; catalog reads
/// happen inline so a stale load can never land after a newer one. Every
/// mutation schedules a background save when a persistence bridge is
/// attached; the teardown path calls [`flush_save`](Self::flush_save).
pub struct TriageEngine<C: CatalogReader> {
    catalog: C,
    state: SessionState,
    bridge: Option<PersistenceBridge>,
}

impl<C: CatalogReader> TriageEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            state: SessionState::new(),
            bridge: None,
        }
    }

    pub fn with_persistence(mut self, bridge: PersistenceBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Queries the catalog for `filter` and replaces the session's items.
    ///
    /// Resets the cursor to the start and clears the undo history. The
    /// pending-trash and staged sets are untouched: marks reference
    /// absolute locators and survive filter changes. On a query failure
    /// the session is left unchanged.
    pub fn load(&mut self, filter: MediaFilter) -> Result<()> {
        let items = self.catalog.query(filter)?;
        self.state.filter = filter;
        self.state.replace_items(items, 0);
        self.state.history.clear();
        self.schedule_save();
        Ok(())
    }

    /// Marks the current item for deletion and advances around the ring.
    ///
    /// Set semantics: marking an already-marked item adds nothing. The item
    /// is not removed from the list; that only happens after the deletion
    /// authority confirms.
    pub fn mark_for_trash(&mut self) {
        let locator = match self.state.current_item() {
            Some(item) => item.locator.clone(),
            None => return,
        };

        self.state.pending_trash.insert(locator.clone());
        self.state.history.push(DecisionRecord {
            decision: Decision::Trash,
            locator,
        });
        self.state.advance();
        self.schedule_save();
    }

    /// Records a keep decision and advances around the ring
    pub fn keep(&mut self) {
        let locator = match self.state.current_item() {
            Some(item) => item.locator.clone(),
            None => return,
        };

        self.state.history.push(DecisionRecord {
            decision: Decision::Keep,
            locator,
        });
        self.state.advance();
        self.schedule_save();
    }

    /// Moves to the next item without recording a decision
    pub fn advance(&mut self) {
        self.state.advance();
        self.schedule_save();
    }

    /// Moves to the previous item without recording a decision
    pub fn retreat(&mut self) {
        self.state.retreat();
        self.schedule_save();
    }

    /// Reverts the most recent decision. No-op when the history is empty.
    ///
    /// The cursor retreats first, then the record is popped; the two are a
    /// single atomic step from the caller's view. A Trash record takes its
    /// locator back out of the pending set; a Keep record reverts
    /// navigation only.
    pub fn undo(&mut self) {
        if self.state.history.is_empty() {
            return;
        }

        self.state.retreat();
        let record = self.state.history.pop().expect("checked non-empty");

        if record.decision == Decision::Trash {
            self.state.pending_trash.remove(&record.locator);
        }
        self.schedule_save();
    }

    /// Folds a confirmed deletion back into the session.
    ///
    /// Removes the confirmed locators from the pending and staged sets,
    /// clears the history (its positions are stale once the catalog
    /// shrinks), re-queries the current filter, and re-seats the cursor by
    /// modulo to preserve relative position. A failed re-query keeps the
    /// previous item list and clamps.
    pub fn reconcile_after_deletion(&mut self, confirmed: &BTreeSet<Locator>) {
        if confirmed.is_empty() {
            return;
        }

        for locator in confirmed {
            self.state.pending_trash.remove(locator);
            self.state.staged_for_review.remove(locator);
        }
        self.state.history.clear();

        let cursor = self.state.cursor();
        match self.catalog.query(self.state.filter) {
            Ok(items) => {
                let reseated = if items.is_empty() { 0 } else { cursor % items.len() };
                self.state.replace_items(items, reseated);
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog re-query failed during reconcile");
                self.state.set_cursor(cursor);
            }
        }
        self.schedule_save();
    }

    /// Marks locators as surfaced in a manual review pass. Idempotent union.
    pub fn stage<I>(&mut self, locators: I)
    where
        I: IntoIterator<Item = Locator>,
    {
        self.state.staged_for_review.extend(locators);
    }

    /// Pending locators not yet shown in a review pass
    pub fn unstaged_pending(&self) -> Vec<Locator> {
        self.state
            .pending_trash
            .difference(&self.state.staged_for_review)
            .cloned()
            .collect()
    }

    /// Applies a restored snapshot: re-derives items from the persisted
    /// filter, then seats the cursor by locator identity first, stored
    /// index second, start-of-list last.
    pub fn restore_session(&mut self, snapshot: SessionSnapshot) -> Result<()> {
        let filter = MediaFilter::from_str(&snapshot.filter);
        let items = self.catalog.query(filter)?;
        let cursor = snapshot.resolve_cursor(&items);

        self.state.filter = filter;
        self.state.replace_items(items, cursor);
        self.state.history.clear();
        self.state.staged_for_review.clear();
        self.state.pending_trash = snapshot
            .pending_locators
            .into_iter()
            .map(Locator::new)
            .collect();
        Ok(())
    }

    fn schedule_save(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.schedule_save(SessionSnapshot::capture(&self.state));
        }
    }

    /// One blocking save for the teardown path; both this and the
    /// background saves converge on the same clamped snapshot values.
    pub fn flush_save(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.flush_blocking(SessionSnapshot::capture(&self.state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MediaItem;
    use crate::domain::test_support::{image_items, media_item};
    use crate::error::SweepError;
    use std::sync::{Arc, Mutex};

    /// In-memory catalog whose contents can be swapped between queries
    #[derive(Clone, Default)]
    struct StaticCatalog {
        items: Arc<Mutex<Vec<MediaItem>>>,
        failing: Arc<Mutex<bool>>,
    }

    impl StaticCatalog {
        fn with_items(items: Vec<MediaItem>) -> Self {
            Self {
                items: Arc::new(Mutex::new(items)),
                failing: Arc::default(),
            }
        }

        fn set_items(&self, items: Vec<MediaItem>) {
            *self.items.lock().unwrap() = items;
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    impl CatalogReader for StaticCatalog {
        fn query(&self, filter: MediaFilter) -> Result<Vec<MediaItem>> {
            if *self.failing.lock().unwrap() {
                return Err(SweepError::Catalog(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "catalog unavailable",
                )));
            }
            Ok(self
                .items
                .lock()
                .unwrap()
                .iter()
                .filter(|item| filter.matches(item))
                .cloned()
                .collect())
        }
    }

    struct FailingCatalog;

    impl CatalogReader for FailingCatalog {
        fn query(&self, _filter: MediaFilter) -> Result<Vec<MediaItem>> {
            Err(SweepError::Catalog(std::io::Error::new(
                std::io::ErrorKind::Other,
                "catalog unavailable",
            )))
        }
    }

    fn engine_with(ids: &[&str]) -> TriageEngine<StaticCatalog> {
        let mut engine = TriageEngine::new(StaticCatalog::with_items(image_items(ids)));
        engine.load(MediaFilter::All).unwrap();
        engine
    }

    fn locator(id: &str) -> Locator {
        Locator::new(format!("/library/{}", id))
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_load_resets_cursor_and_history() {
            let mut engine = engine_with(&["a.jpg", "b.jpg", "c.jpg"]);
            engine.keep();
            engine.keep();
            assert_eq!(engine.state().cursor(), 2);
            assert_eq!(engine.state().history.len(), 2);

            engine.load(MediaFilter::All).unwrap();
            assert_eq!(engine.state().cursor(), 0);
            assert!(engine.state().history.is_empty());
        }

        #[test]
        fn test_load_preserves_pending_across_filter_change() {
            let catalog = StaticCatalog::with_items(vec![
                media_item("a.jpg", false, 0),
                media_item("clip.mp4", true, 1),
            ]);
            let mut engine = TriageEngine::new(catalog);
            engine.load(MediaFilter::All).unwrap();

            engine.mark_for_trash();
            assert_eq!(engine.state().pending_trash.len(), 1);

            engine.load(MediaFilter::Videos).unwrap();
            assert_eq!(engine.state().len(), 1);
            assert_eq!(engine.state().pending_trash.len(), 1);
            assert!(engine.state().pending_trash.contains(&locator("a.jpg")));
        }

        #[test]
        fn test_load_failure_leaves_state_unchanged() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.keep();

            let mut failing = TriageEngine::new(FailingCatalog);
            assert!(failing.load(MediaFilter::All).is_err());
            assert!(failing.state().is_empty());

            // state in the healthy engine untouched by the exercise above
            assert_eq!(engine.state().len(), 2);
            assert_eq!(engine.state().cursor(), 1);
        }
    }

    mod decision_tests {
        use super::*;

        #[test]
        fn test_keep_advances_and_records() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.keep();

            assert_eq!(engine.state().cursor(), 1);
            assert_eq!(
                engine.state().history.last().unwrap(),
                &DecisionRecord {
                    decision: Decision::Keep,
                    locator: locator("a.jpg"),
                }
            );
            assert!(engine.state().pending_trash.is_empty());
        }

        #[test]
        fn test_wraparound_full_circle_of_keeps() {
            let mut engine = engine_with(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
            for _ in 0..4 {
                engine.keep();
            }
            assert_eq!(engine.state().cursor(), 0);
        }

        #[test]
        fn test_mark_for_trash_adds_pending_and_advances() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.mark_for_trash();

            assert_eq!(engine.state().cursor(), 1);
            assert!(engine.state().pending_trash.contains(&locator("a.jpg")));
            // the item stays in the list until confirmation
            assert_eq!(engine.state().len(), 2);
        }

        #[test]
        fn test_mark_for_trash_is_set_not_multiset() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);

            engine.mark_for_trash();
            assert_eq!(engine.state().pending_trash.len(), 1);

            engine.undo();
            assert_eq!(engine.state().cursor(), 0);
            assert!(engine.state().pending_trash.is_empty());

            engine.mark_for_trash();
            assert_eq!(engine.state().pending_trash.len(), 1);
        }

        #[test]
        fn test_decisions_on_empty_session_are_noops() {
            let mut engine = TriageEngine::new(StaticCatalog::default());
            engine.load(MediaFilter::All).unwrap();

            engine.keep();
            engine.mark_for_trash();
            assert!(engine.state().history.is_empty());
            assert!(engine.state().pending_trash.is_empty());
            assert_eq!(engine.state().cursor(), 0);
        }

        #[test]
        fn test_cursor_bounds_hold_over_mixed_sequences() {
            let mut engine = engine_with(&["a.jpg", "b.jpg", "c.jpg"]);
            let check = |engine: &TriageEngine<StaticCatalog>| {
                let state = engine.state();
                assert!(state.cursor() < state.len().max(1));
            };

            engine.keep();
            check(&engine);
            engine.mark_for_trash();
            check(&engine);
            engine.mark_for_trash();
            check(&engine);
            engine.undo();
            check(&engine);
            engine.keep();
            check(&engine);
            engine.undo();
            check(&engine);
            engine.undo();
            check(&engine);
            engine.undo();
            check(&engine);
            engine.load(MediaFilter::All).unwrap();
            check(&engine);
        }
    }

    mod undo_tests {
        use super::*;

        #[test]
        fn test_undo_on_empty_history_is_noop() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.undo();
            assert_eq!(engine.state().cursor(), 0);
            assert!(engine.state().history.is_empty());
        }

        #[test]
        fn test_undo_reverses_exactly_one_step() {
            let mut engine = engine_with(&["a.jpg", "b.jpg", "c.jpg"]);

            engine.mark_for_trash(); // Trash(a), cursor -> 1
            engine.keep(); // Keep(b), cursor -> 2
            assert_eq!(engine.state().history.len(), 2);

            // first undo removes Keep(b); pending unchanged
            engine.undo();
            assert_eq!(engine.state().cursor(), 1);
            assert_eq!(engine.state().history.len(), 1);
            assert!(engine.state().pending_trash.contains(&locator("a.jpg")));

            // second undo removes Trash(a) and its pending entry
            engine.undo();
            assert_eq!(engine.state().cursor(), 0);
            assert!(engine.state().history.is_empty());
            assert!(engine.state().pending_trash.is_empty());
        }

        #[test]
        fn test_undo_keep_is_navigation_only() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.mark_for_trash();
            engine.keep();

            engine.undo();
            assert_eq!(engine.state().pending_trash.len(), 1);
        }

        #[test]
        fn test_undo_wraps_backwards_over_the_ring() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.keep();
            engine.keep(); // wrapped back to cursor 0

            engine.undo();
            assert_eq!(engine.state().cursor(), 1);
            engine.undo();
            assert_eq!(engine.state().cursor(), 0);
        }
    }

    mod reconcile_tests {
        use super::*;

        #[test]
        fn test_reconcile_empty_set_is_noop() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.keep();

            engine.reconcile_after_deletion(&BTreeSet::new());
            assert_eq!(engine.state().history.len(), 1);
            assert_eq!(engine.state().cursor(), 1);
        }

        #[test]
        fn test_reconcile_preserves_relative_position_by_modulo() {
            let ids: Vec<String> = (0..10).map(|i| format!("p{}.jpg", i)).collect();
            let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
            let catalog = StaticCatalog::with_items(image_items(&id_refs));
            let mut engine = TriageEngine::new(catalog.clone());
            engine.load(MediaFilter::All).unwrap();
            engine.state_mut_for_test().set_cursor(7);

            // the catalog shrinks to 7 items before the re-query
            catalog.set_items(image_items(&id_refs[..7]));
            let confirmed: BTreeSet<Locator> =
                id_refs[7..].iter().map(|id| locator(id)).collect();
            engine.reconcile_after_deletion(&confirmed);

            assert_eq!(engine.state().len(), 7);
            assert_eq!(engine.state().cursor(), 0); // 7 % 7
        }

        #[test]
        fn test_reconcile_removes_confirmed_from_pending_and_staged() {
            let catalog = StaticCatalog::with_items(image_items(&["a.jpg", "b.jpg", "c.jpg"]));
            let mut engine = TriageEngine::new(catalog.clone());
            engine.load(MediaFilter::All).unwrap();

            engine.mark_for_trash(); // a
            engine.mark_for_trash(); // b
            engine.stage([locator("a.jpg"), locator("b.jpg")]);

            catalog.set_items(image_items(&["b.jpg", "c.jpg"]));
            let confirmed: BTreeSet<Locator> = [locator("a.jpg")].into_iter().collect();
            engine.reconcile_after_deletion(&confirmed);

            assert!(!engine.state().pending_trash.contains(&locator("a.jpg")));
            assert!(engine.state().pending_trash.contains(&locator("b.jpg")));
            assert!(!engine.state().staged_for_review.contains(&locator("a.jpg")));
            assert!(engine.state().staged_for_review.contains(&locator("b.jpg")));
            assert!(engine.state().history.is_empty());
        }

        #[test]
        fn test_reconcile_to_empty_catalog_seats_cursor_at_zero() {
            let catalog = StaticCatalog::with_items(image_items(&["a.jpg"]));
            let mut engine = TriageEngine::new(catalog.clone());
            engine.load(MediaFilter::All).unwrap();
            engine.mark_for_trash();

            catalog.set_items(Vec::new());
            let confirmed: BTreeSet<Locator> = [locator("a.jpg")].into_iter().collect();
            engine.reconcile_after_deletion(&confirmed);

            assert!(engine.state().is_empty());
            assert_eq!(engine.state().cursor(), 0);
            assert!(engine.state().current_item().is_none());
        }

        #[test]
        fn test_reconcile_requery_failure_keeps_items_and_clamps() {
            let catalog = StaticCatalog::with_items(image_items(&["a.jpg", "b.jpg", "c.jpg"]));
            let mut engine = TriageEngine::new(catalog.clone());
            engine.load(MediaFilter::All).unwrap();
            engine.mark_for_trash(); // a, cursor -> 1
            catalog.set_failing(true);

            let confirmed: BTreeSet<Locator> = [locator("a.jpg")].into_iter().collect();
            engine.reconcile_after_deletion(&confirmed);

            // previous item list survives; confirmed entry is still cleared
            assert_eq!(engine.state().len(), 3);
            assert!(engine.state().pending_trash.is_empty());
            assert!(engine.state().cursor() < engine.state().len());
        }
    }

    mod restore_tests {
        use super::*;
        use crate::persist::SNAPSHOT_VERSION;

        #[test]
        fn test_restore_session_reapplies_filter_and_pending() {
            let catalog = StaticCatalog::with_items(vec![
                media_item("a.jpg", false, 0),
                media_item("clip.mp4", true, 1),
                media_item("b.jpg", false, 2),
            ]);
            let mut engine = TriageEngine::new(catalog);

            let snapshot = SessionSnapshot {
                version: SNAPSHOT_VERSION,
                index: 0,
                current_locator: Some("/library/b.jpg".to_string()),
                pending_locators: ["/library/a.jpg".to_string()].into_iter().collect(),
                filter: "images".to_string(),
            };
            engine.restore_session(snapshot).unwrap();

            assert_eq!(engine.state().filter, MediaFilter::Images);
            assert_eq!(engine.state().len(), 2);
            assert_eq!(engine.state().current_item().unwrap().id, "b.jpg");
            assert!(engine.state().pending_trash.contains(&locator("a.jpg")));
            assert!(engine.state().history.is_empty());
        }

        #[test]
        fn test_restore_session_unknown_filter_falls_back_to_all() {
            let catalog = StaticCatalog::with_items(image_items(&["a.jpg"]));
            let mut engine = TriageEngine::new(catalog);

            let snapshot = SessionSnapshot {
                version: SNAPSHOT_VERSION,
                index: 9,
                current_locator: None,
                pending_locators: std::collections::BTreeSet::new(),
                filter: "holograms".to_string(),
            };
            engine.restore_session(snapshot).unwrap();

            assert_eq!(engine.state().filter, MediaFilter::All);
            assert_eq!(engine.state().cursor(), 0);
        }
    }

    mod staging_tests {
        use super::*;

        #[test]
        fn test_stage_is_idempotent_union() {
            let mut engine = engine_with(&["a.jpg", "b.jpg"]);
            engine.stage([locator("a.jpg")]);
            engine.stage([locator("a.jpg"), locator("b.jpg")]);
            assert_eq!(engine.state().staged_for_review.len(), 2);
        }

        #[test]
        fn test_unstaged_pending_is_the_difference() {
            let mut engine = engine_with(&["a.jpg", "b.jpg", "c.jpg"]);
            engine.mark_for_trash(); // a
            engine.mark_for_trash(); // b
            engine.stage([locator("a.jpg")]);

            let unstaged = engine.unstaged_pending();
            assert_eq!(unstaged, vec![locator("b.jpg")]);
        }
    }

    impl TriageEngine<StaticCatalog> {
        /// Test-only escape hatch to position the cursor mid-list
        fn state_mut_for_test(&mut self) -> &mut SessionState {
            &mut self.state
        }
    }
}
