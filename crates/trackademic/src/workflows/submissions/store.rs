use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use super::domain::{PrincipalId, SubmissionContent, SubmissionId, SubmissionRecord, SubmissionStatus};
use super::repository::{
    RepositoryError, StatusPatch, SubmissionRepository, SubmissionScope, Subscription,
};

/// Process-local submission collection with live push to subscribers.
///
/// Scoped to one application id; every record lives under its collection path.
#[derive(Clone)]
pub struct InMemorySubmissionStore {
    app_id: Arc<str>,
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    records: BTreeMap<SubmissionId, SubmissionRecord>,
    subscribers: HashMap<u64, Subscriber>,
    next_subscriber: u64,
}

struct Subscriber {
    scope: SubmissionScope,
    sender: watch::Sender<Vec<SubmissionRecord>>,
}

impl InMemorySubmissionStore {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: Arc::from(app_id.into()),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Path of the backing collection, as the document store would name it.
    pub fn collection_path(&self) -> String {
        format!("artifacts/{}/public/data/submissions", self.app_id)
    }

    /// Load records verbatim, keeping their ids, status, and timestamps.
    pub fn seed(&self, records: impl IntoIterator<Item = SubmissionRecord>) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        for record in records {
            state.records.insert(record.id.clone(), record);
        }
        state.broadcast_all();
        Ok(())
    }

    /// Standing queries currently held open.
    pub fn active_subscriptions(&self) -> usize {
        self.lock()
            .map(|state| state.subscribers.len())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.records.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("submission store lock poisoned".to_string()))
    }
}

impl Default for InMemorySubmissionStore {
    fn default() -> Self {
        Self::new("trackademic-dev")
    }
}

impl StoreState {
    fn matching(&self, scope: &SubmissionScope) -> Vec<SubmissionRecord> {
        self.records
            .values()
            .filter(|record| scope.matches(record))
            .cloned()
            .collect()
    }

    /// Re-push the full matching set to every subscriber whose scope covers `record`.
    fn broadcast(&mut self, record: &SubmissionRecord) {
        self.prune_closed();
        let targets: Vec<SubmissionScope> = self
            .subscribers
            .values()
            .filter(|subscriber| subscriber.scope.matches(record))
            .map(|subscriber| subscriber.scope.clone())
            .collect();

        for scope in targets {
            let snapshot = self.matching(&scope);
            for subscriber in self.subscribers.values().filter(|s| s.scope == scope) {
                subscriber.sender.send_replace(snapshot.clone());
            }
        }
    }

    fn broadcast_all(&mut self) {
        self.prune_closed();
        for subscriber in self.subscribers.values() {
            subscriber
                .sender
                .send_replace(self.matching(&subscriber.scope));
        }
    }

    fn prune_closed(&mut self) {
        self.subscribers
            .retain(|_, subscriber| !subscriber.sender.is_closed());
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionStore {
    async fn create(&self, content: SubmissionContent) -> Result<SubmissionRecord, RepositoryError> {
        let record = SubmissionRecord {
            id: SubmissionId(Uuid::new_v4().to_string()),
            content,
            status: SubmissionStatus::Pending,
            last_modified: Utc::now(),
        };

        let mut state = self.lock()?;
        state.records.insert(record.id.clone(), record.clone());
        state.broadcast(&record);
        debug!(id = %record.id, collection = %self.collection_path(), "submission created");
        Ok(record)
    }

    async fn replace(
        &self,
        id: &SubmissionId,
        content: SubmissionContent,
    ) -> Result<SubmissionRecord, RepositoryError> {
        let mut state = self.lock()?;
        let record = state.records.get_mut(id).ok_or(RepositoryError::NotFound)?;

        record.content = content.anchored_to(&record.content);
        record.status = SubmissionStatus::Pending;
        record.last_modified = Utc::now();

        let updated = record.clone();
        state.broadcast(&updated);
        debug!(id = %updated.id, "submission overwritten");
        Ok(updated)
    }

    async fn update_status(&self, patch: StatusPatch) -> Result<SubmissionRecord, RepositoryError> {
        let mut state = self.lock()?;
        let record = state
            .records
            .get_mut(&patch.id)
            .ok_or(RepositoryError::NotFound)?;

        if !record.belongs_to(&patch.reviewer_department) {
            return Err(RepositoryError::Unauthorized);
        }

        // Status only; a decision does not reorder newest-first views.
        record.status = patch.status;

        let updated = record.clone();
        state.broadcast(&updated);
        Ok(updated)
    }

    async fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.records.get(id).cloned())
    }

    async fn owned_by(&self, owner: &PrincipalId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.matching(&SubmissionScope::Owner(owner.clone())))
    }

    async fn subscribe(&self, scope: SubmissionScope) -> Result<Subscription, RepositoryError> {
        let mut state = self.lock()?;
        let (sender, receiver) = watch::channel(state.matching(&scope));

        let key = state.next_subscriber;
        state.next_subscriber += 1;
        state.subscribers.insert(
            key,
            Subscriber {
                scope: scope.clone(),
                sender,
            },
        );

        let registry: Weak<Mutex<StoreState>> = Arc::downgrade(&self.state);
        debug!(%scope, key, "subscription opened");
        Ok(Subscription::new(scope, receiver, move || {
            if let Some(state) = registry.upgrade() {
                if let Ok(mut state) = state.lock() {
                    state.subscribers.remove(&key);
                }
            }
        }))
    }
}
