//! The single owner of the live system state.
//!
//! Every mutation path in the process - reconciliation ticks, trigger
//! evaluation, inbound value/task/review calls - goes through this store, so
//! a single tree-wide `RwLock` closes the race between concurrent
//! reconciliation and value mutation. Hold times are short: single-pass tree
//! walks with no awaits under the lock. Side effects (bus publishes,
//! notifications) are returned as [`EngineEffect`] values and executed by the
//! caller after the lock is released. The raw tree is never handed out for
//! external mutation; reads get clones.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::history;
use crate::pile;
use crate::types::{LeaderboardEntry, Pile, PileConfig, SystemState, TaskEvent};
use crate::workflow::{EngineEffect, TriggerEngine};

struct Inner {
    state: SystemState,
    engine: TriggerEngine,
}

/// Lock-guarded owner of [`SystemState`] plus the engine runtime.
pub struct StateStore {
    inner: RwLock<Inner>,
}

impl StateStore {
    pub fn new(state: SystemState, engine: TriggerEngine) -> Self {
        Self {
            inner: RwLock::new(Inner { state, engine }),
        }
    }

    /// Apply a signed delta to the first pile with this id, clamped to
    /// `[0, max_value]`. Returns the new value.
    pub async fn add_pile_value(&self, pile_id: &str, delta: i64) -> Result<i64> {
        let mut inner = self.inner.write().await;
        pile::add_pile_value(&mut inner.state.piles, pile_id, delta)
    }

    /// Mark an assigned task complete and advance its workflow.
    pub async fn mark_task_complete(
        &self,
        task_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(TaskEvent, Vec<EngineEffect>)> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner
            .engine
            .complete_task(&mut inner.state, task_id, user_id, now)
    }

    /// Mark a completed task reviewed and release its workflow.
    pub async fn mark_review_complete(
        &self,
        task_id: &str,
        reviewer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(TaskEvent, Vec<EngineEffect>)> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner
            .engine
            .complete_review(&mut inner.state, task_id, reviewer_id, now)
    }

    /// Fold the declarative configuration into the live forest. Total; the
    /// engine observes the result on its next evaluation.
    pub async fn reconcile(&self, config: &[PileConfig]) {
        let mut inner = self.inner.write().await;
        crate::reconcile::reconcile(config, &mut inner.state);
    }

    /// One trigger-engine evaluation pass at `now`.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<EngineEffect> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.engine.tick(&mut inner.state, now)
    }

    /// Derived leaderboard over the current history.
    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let inner = self.inner.read().await;
        history::leaderboard(&inner.state.task_history)
    }

    /// Clone of the current pile forest.
    pub async fn piles(&self) -> Vec<Pile> {
        let inner = self.inner.read().await;
        inner.state.piles.clone()
    }

    /// Clone of the whole state, for snapshotting.
    pub async fn snapshot(&self) -> SystemState {
        let inner = self.inner.read().await;
        inner.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn store_with_pile(id: &str, value: i64, max: i64) -> StateStore {
        let state = SystemState {
            piles: vec![Pile {
                id: id.to_string(),
                display_name: id.to_string(),
                value,
                max_value: max,
                subpiles: Vec::new(),
            }],
            task_history: Vec::new(),
        };
        StateStore::new(state, TriggerEngine::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_add_pile_value_clamps() {
        let store = store_with_pile("laundry", 8, 10);
        assert_eq!(store.add_pile_value("laundry", 5).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_add_pile_value_not_found() {
        let store = store_with_pile("laundry", 8, 10);
        let err = store.add_pile_value("garage", 1).await.unwrap_err();
        assert!(matches!(err, Error::PileNotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_task_complete_not_found() {
        let store = store_with_pile("laundry", 0, 10);
        let err = store
            .mark_task_complete("t1", "alice", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_reconcile_through_store() {
        let store = StateStore::new(SystemState::default(), TriggerEngine::new(Vec::new()));
        let config = vec![PileConfig {
            id: "dishes".to_string(),
            name: "Dishes".to_string(),
            initial_value: 1,
            max_value: 4,
            subpiles: Vec::new(),
        }];
        store.reconcile(&config).await;
        let piles = store.piles().await;
        assert_eq!(piles.len(), 1);
        assert_eq!(piles[0].value, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_clone() {
        let store = store_with_pile("laundry", 2, 10);
        let snapshot = store.snapshot().await;
        store.add_pile_value("laundry", 3).await.unwrap();
        assert_eq!(snapshot.piles[0].value, 2);
        assert_eq!(store.snapshot().await.piles[0].value, 5);
    }
}
