//! Bridges the pending-trash set to the platform deletion authority

use crate::catalog::{CatalogReader, Locator};
use crate::domain::TriageEngine;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// Resolution of one deletion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Everything in the request was removed
    Confirmed(BTreeSet<Locator>),
    /// Nothing was removed; the user declined or the request failed whole
    Rejected,
    /// Only the carried subset was removed
    Partial(BTreeSet<Locator>),
}

impl DeleteOutcome {
    pub fn confirmed(&self) -> &BTreeSet<Locator> {
        static EMPTY: BTreeSet<Locator> = BTreeSet::new();
        match self {
            DeleteOutcome::Confirmed(set) | DeleteOutcome::Partial(set) => set,
            DeleteOutcome::Rejected => &EMPTY,
        }
    }
}

/// The external system that performs irreversible removal.
///
/// `requires_consent` is a capability resolved once at startup: a
/// consent-requiring authority must not be invoked until the confirmation
/// surface reports acceptance.
pub trait DeletionAuthority {
    fn requires_consent(&self) -> bool;
    fn request_delete(&self, locators: &BTreeSet<Locator>) -> Result<DeleteOutcome>;
}

/// Where a deletion attempt currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionPhase {
    Idle,
    /// Control handed to the confirmation surface; holds the snapshot of
    /// the pending set taken when the request began
    AwaitingConsent(BTreeSet<Locator>),
}

/// What [`DeletionCoordinator::begin`] produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStart {
    /// Pending set was empty; the authority was never invoked
    NothingPending,
    /// Consent surface must now be shown for this many items
    AwaitingConsent(usize),
    Done(DeleteOutcome),
}

/// Turns the pending-trash set into authority requests and folds results
/// back into the session. Only this type removes confirmed entries from
/// the pending set (via reconcile); only the engine adds them.
pub struct DeletionCoordinator<A: DeletionAuthority> {
    authority: A,
    phase: DeletionPhase,
}

impl<A: DeletionAuthority> DeletionCoordinator<A> {
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            phase: DeletionPhase::Idle,
        }
    }

    pub fn phase(&self) -> &DeletionPhase {
        &self.phase
    }

    /// Starts a deletion attempt over the current pending set.
    ///
    /// An empty set is a no-op and never reaches the authority. With a
    /// consent-requiring authority this parks in `AwaitingConsent` until
    /// [`deliver_consent`](Self::deliver_consent) is called.
    pub fn begin<C: CatalogReader>(&mut self, engine: &mut TriageEngine<C>) -> CommitStart {
        let snapshot = engine.state().pending_trash.clone();
        if snapshot.is_empty() {
            return CommitStart::NothingPending;
        }

        if self.authority.requires_consent() {
            let count = snapshot.len();
            self.phase = DeletionPhase::AwaitingConsent(snapshot);
            return CommitStart::AwaitingConsent(count);
        }

        CommitStart::Done(self.execute(snapshot, engine))
    }

    /// Delivers the confirmation surface's verdict for a parked request.
    /// Returns None when no request was awaiting consent.
    pub fn deliver_consent<C: CatalogReader>(
        &mut self,
        accepted: bool,
        engine: &mut TriageEngine<C>,
    ) -> Option<DeleteOutcome> {
        let snapshot = match std::mem::replace(&mut self.phase, DeletionPhase::Idle) {
            DeletionPhase::AwaitingConsent(snapshot) => snapshot,
            DeletionPhase::Idle => return None,
        };

        if !accepted {
            // declining is a legitimate terminal outcome, not an error
            return Some(DeleteOutcome::Rejected);
        }

        Some(self.execute(snapshot, engine))
    }

    fn execute<C: CatalogReader>(
        &mut self,
        snapshot: BTreeSet<Locator>,
        engine: &mut TriageEngine<C>,
    ) -> DeleteOutcome {
        self.phase = DeletionPhase::Idle;

        let outcome = match self.authority.request_delete(&snapshot) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "deletion request failed");
                DeleteOutcome::Rejected
            }
        };

        let confirmed = outcome.confirmed();
        if !confirmed.is_empty() {
            engine.reconcile_after_deletion(confirmed);
        }
        outcome
    }
}

/// System-trash authority: no interactive consent, deletes item by item.
/// Each item's failure is contained and logged; the confirmed subset is
/// exactly the items that individually succeeded.
pub struct TrashAuthority;

impl DeletionAuthority for TrashAuthority {
    fn requires_consent(&self) -> bool {
        false
    }

    fn request_delete(&self, locators: &BTreeSet<Locator>) -> Result<DeleteOutcome> {
        let mut confirmed = BTreeSet::new();

        for locator in locators {
            match trash::delete(Path::new(locator.as_str())) {
                Ok(()) => {
                    confirmed.insert(locator.clone());
                }
                Err(e) => {
                    tracing::warn!(locator = %locator, error = %e, "failed to trash item");
                }
            }
        }

        if confirmed.len() == locators.len() {
            Ok(DeleteOutcome::Confirmed(confirmed))
        } else {
            Ok(DeleteOutcome::Partial(confirmed))
        }
    }
}

/// Layers an interactive consent requirement over any authority. The
/// coordinator parks in [`DeletionPhase::AwaitingConsent`] and the
/// confirmation surface answers through
/// [`DeletionCoordinator::deliver_consent`].
pub struct ConsentGate<A: DeletionAuthority>(pub A);

impl<A: DeletionAuthority> DeletionAuthority for ConsentGate<A> {
    fn requires_consent(&self) -> bool {
        true
    }

    fn request_delete(&self, locators: &BTreeSet<Locator>) -> Result<DeleteOutcome> {
        self.0.request_delete(locators)
    }
}

impl DeletionAuthority for Box<dyn DeletionAuthority> {
    fn requires_consent(&self) -> bool {
        (**self).requires_consent()
    }

    fn request_delete(&self, locators: &BTreeSet<Locator>) -> Result<DeleteOutcome> {
        (**self).request_delete(locators)
    }
}

/// Dry-run authority: reports the whole request as confirmed without
/// touching anything, so a session can be rehearsed end to end
pub struct DryRunAuthority;

impl DeletionAuthority for DryRunAuthority {
    fn requires_consent(&self) -> bool {
        false
    }

    fn request_delete(&self, locators: &BTreeSet<Locator>) -> Result<DeleteOutcome> {
        tracing::info!(count = locators.len(), "dry run: skipping deletion");
        Ok(DeleteOutcome::Confirmed(locators.clone()))
    }
}
