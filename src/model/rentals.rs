//! Rented movies, shared by every view and mirrored to the key-value store
//!
//! The in-memory list is authoritative. Mutations apply synchronously and
//! notify subscribers before anything is written; a single background writer
//! then stores a full snapshot of the latest state. Mutations that arrive while
//! a write is in flight coalesce into the next write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tokio::sync::{mpsc, watch};

use super::movie::{MovieId, MovieRecord, RentalRecord};
use crate::error::{HydrateError, PersistenceError, StorageCorruptionError};
use crate::storage::KeyValueStore;

/// Storage key holding the JSON array of rentals
pub const RENTALS_KEY: &str = "rentedMovies";

type Listener = Arc<dyn Fn(&RentalSnapshot) + Send + Sync>;

struct RentalState {
    records: Vec<RentalRecord>,
    /// Bumped on every effective mutation
    version: u64,
}

impl RentalState {
    fn snapshot(&self) -> RentalSnapshot {
        RentalSnapshot {
            version: self.version,
            records: self.records.clone(),
        }
    }
}

struct Shared {
    state: RwLock<RentalState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl Shared {
    fn read_state(&self) -> RwLockReadGuard<'_, RentalState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RentalState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_listener(&self, id: u64) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

/// The rentals list as of one state version
///
/// Listeners may receive snapshots out of order when mutations race or a
/// listener mutates re-entrantly; compare `version` to keep the newest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RentalSnapshot {
    pub version: u64,
    pub records: Vec<RentalRecord>,
}

/// Outcome of the most recent snapshot write
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteStatus {
    /// State version the write covered (0 before any write)
    pub version: u64,
    pub error: Option<PersistenceError>,
}

/// Handle to the rented-movies state
///
/// Cheap to clone; every clone sees the same list. The background writer
/// stops once the last handle is dropped.
#[derive(Clone)]
pub struct RentedCatalog {
    shared: Arc<Shared>,
    dirty_tx: mpsc::UnboundedSender<()>,
    status_rx: watch::Receiver<WriteStatus>,
}

/// Keeps a listener registered; dropping it unsubscribes
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Subscription {
    #[cfg(test)]
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.remove_listener(self.id);
        }
    }
}

/// Subscriber-fed copy of the rentals that never moves back to an older version
#[derive(Clone, Default)]
pub struct RentalsMirror {
    latest: Arc<Mutex<RentalSnapshot>>,
}

impl RentalsMirror {
    /// Start mirroring `rentals`; the mirror stops updating once the
    /// returned subscription is dropped
    pub fn attach(rentals: &RentedCatalog) -> (Self, Subscription) {
        let mirror = Self::default();
        let subscription = {
            let mirror = mirror.clone();
            rentals.subscribe(move |snapshot| {
                mirror.apply(snapshot);
            })
        };
        // Subscribed first, so nothing between the two steps is missed
        mirror.apply(&rentals.snapshot());
        (mirror, subscription)
    }

    /// Keep `snapshot` if it is newer than the held one
    pub fn apply(&self, snapshot: &RentalSnapshot) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if snapshot.version < latest.version {
            tracing::trace!(
                version = snapshot.version,
                held = latest.version,
                "Ignoring out-of-order rentals snapshot"
            );
            return false;
        }
        *latest = snapshot.clone();
        true
    }

    pub fn records(&self) -> Vec<RentalRecord> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }
}

/// Read and decode the stored snapshot without any recovery
pub async fn load_snapshot(store: &dyn KeyValueStore) -> Result<Vec<RentalRecord>, HydrateError> {
    let Some(raw) = store.get(RENTALS_KEY).await? else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let decoded: Option<Vec<RentalRecord>> =
        serde_json::from_str(&raw).map_err(|e| StorageCorruptionError {
            key: RENTALS_KEY.to_string(),
            message: e.to_string(),
        })?;

    let mut records: Vec<RentalRecord> = Vec::new();
    for record in decoded.unwrap_or_default() {
        if records.iter().any(|r| r.id() == record.id()) {
            tracing::warn!(movie_id = %record.id(), "Dropping duplicate rental from snapshot");
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

impl RentedCatalog {
    /// Load the stored rentals and start the writer
    ///
    /// A missing, corrupted or unreadable snapshot yields an empty list; the
    /// condition is logged and the next write replaces the stored value.
    pub async fn hydrate(store: Arc<dyn KeyValueStore>) -> Self {
        let records = match load_snapshot(&*store).await {
            Ok(records) => {
                tracing::info!(count = records.len(), "Rentals hydrated from storage");
                records
            }
            Err(HydrateError::Corrupted(e)) => {
                tracing::warn!(error = %e, "Rentals snapshot is corrupted, starting empty");
                Vec::new()
            }
            Err(HydrateError::Store(e)) => {
                tracing::error!(error = %e, "Could not read rentals snapshot, starting empty");
                Vec::new()
            }
        };
        Self::spawn(records, store)
    }

    fn spawn(records: Vec<RentalRecord>, store: Arc<dyn KeyValueStore>) -> Self {
        let shared = Arc::new(Shared {
            state: RwLock::new(RentalState { records, version: 0 }),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        });
        let (dirty_tx, dirty_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(WriteStatus::default());

        tokio::spawn(run_writer(shared.clone(), store, dirty_rx, status_tx));

        Self {
            shared,
            dirty_tx,
            status_rx,
        }
    }

    /// Mark a movie as rented; returns false if it already was
    pub fn rent(&self, movie: MovieRecord) -> bool {
        let snapshot = {
            let mut state = self.shared.write_state();
            if state.records.iter().any(|r| r.movie.id == movie.id) {
                tracing::debug!(movie_id = %movie.id, "Movie already rented, ignoring");
                return false;
            }
            tracing::info!(movie_id = %movie.id, title = %movie.title, "Movie rented");
            state.records.push(RentalRecord::new(movie));
            state.version += 1;
            state.snapshot()
        };
        self.notify(&snapshot);
        self.schedule_write();
        true
    }

    /// Return a rented movie; returns false if it was not rented
    pub fn unrent(&self, id: &MovieId) -> bool {
        let snapshot = {
            let mut state = self.shared.write_state();
            let Some(index) = state.records.iter().position(|r| r.id() == id) else {
                tracing::debug!(movie_id = %id, "Movie not rented, nothing to return");
                return false;
            };
            let removed = state.records.remove(index);
            tracing::info!(movie_id = %id, title = %removed.movie.title, "Movie returned");
            state.version += 1;
            state.snapshot()
        };
        self.notify(&snapshot);
        self.schedule_write();
        true
    }

    pub fn is_rented(&self, id: &MovieId) -> bool {
        self.shared.read_state().records.iter().any(|r| r.id() == id)
    }

    /// Rentals in rental order
    pub fn records(&self) -> Vec<RentalRecord> {
        self.shared.read_state().records.clone()
    }

    pub fn len(&self) -> usize {
        self.shared.read_state().records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.shared.read_state().records.is_empty()
    }

    /// Current list together with its version
    pub fn snapshot(&self) -> RentalSnapshot {
        self.shared.read_state().snapshot()
    }

    /// Register a listener called after every change with the full list
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&RentalSnapshot) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }

    /// Watch the outcome of snapshot writes
    pub fn write_status(&self) -> watch::Receiver<WriteStatus> {
        self.status_rx.clone()
    }

    /// Wait until the current state has been written
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let target = self.shared.read_state().version;
        let mut status_rx = self.status_rx.clone();
        let error = status_rx
            .wait_for(|status| status.version >= target)
            .await
            .map_err(|_| PersistenceError::WriterStopped)?
            .error
            .clone();
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn notify(&self, snapshot: &RentalSnapshot) {
        // Listeners run outside the lock so they may subscribe or unsubscribe
        let listeners: Vec<Listener> = self
            .shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn schedule_write(&self) {
        if self.dirty_tx.send(()).is_err() {
            tracing::error!("Rentals writer has stopped, change will not be persisted");
        }
    }
}

async fn run_writer(
    shared: Arc<Shared>,
    store: Arc<dyn KeyValueStore>,
    mut dirty_rx: mpsc::UnboundedReceiver<()>,
    status_tx: watch::Sender<WriteStatus>,
) {
    while dirty_rx.recv().await.is_some() {
        // Everything queued so far is covered by the snapshot taken below
        while dirty_rx.try_recv().is_ok() {}

        let (version, encoded) = {
            let state = shared.read_state();
            (state.version, serde_json::to_string(&state.records))
        };

        let error = match encoded {
            Ok(json) => match store.set(RENTALS_KEY, &json).await {
                Ok(()) => {
                    tracing::debug!(version, bytes = json.len(), "Rentals snapshot written");
                    None
                }
                Err(e) => Some(PersistenceError::Write(e.to_string())),
            },
            Err(e) => Some(PersistenceError::Encode(e.to_string())),
        };

        if let Some(ref e) = error {
            tracing::error!(version, error = %e, "Rentals snapshot write failed");
        }
        status_tx.send_replace(WriteStatus { version, error });
    }
    tracing::debug!("Rentals writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::storage::MemoryStore;

    fn movie(id: i64, title: &str) -> MovieRecord {
        MovieRecord::new(id, title)
    }

    fn ids(catalog: &RentedCatalog) -> Vec<MovieId> {
        catalog.records().into_iter().map(|r| r.movie.id).collect()
    }

    #[tokio::test]
    async fn test_rent_is_idempotent_by_id() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;

        assert!(rentals.rent(movie(1, "A")));
        assert!(!rentals.rent(movie(1, "A again")));
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals.records()[0].movie.title, "A");
    }

    #[tokio::test]
    async fn test_rent_is_visible_before_the_write() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;

        rentals.rent(movie(1, "A"));
        assert!(rentals.is_rented(&MovieId::Number(1)));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.value(RENTALS_KEY), None);

        rentals.flush().await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_rent_unrent_sequence_keeps_net_rentals_once() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;

        rentals.rent(movie(1, "A"));
        rentals.rent(movie(2, "B"));
        rentals.rent(movie(1, "A"));
        rentals.rent(movie(3, "C"));
        assert!(rentals.unrent(&MovieId::Number(2)));
        assert!(!rentals.unrent(&MovieId::Number(2)));
        assert!(!rentals.unrent(&MovieId::Number(42)));
        rentals.rent(movie(2, "B"));
        rentals.unrent(&MovieId::Number(1));

        assert_eq!(ids(&rentals), vec![MovieId::Number(3), MovieId::Number(2)]);
    }

    #[tokio::test]
    async fn test_random_sequences_match_reference_model() {
        let mut rng = StdRng::seed_from_u64(0x5EED_CAFE);

        for _ in 0..200 {
            let rentals = RentedCatalog::hydrate(Arc::new(MemoryStore::new())).await;
            let mut expected: Vec<MovieId> = Vec::new();

            for _ in 0..rng.random_range(0..40) {
                let id = rng.random_range(1..=6i64);
                let movie_id = MovieId::Number(id);
                if rng.random_bool(0.6) {
                    let changed = rentals.rent(movie(id, "M"));
                    assert_eq!(changed, !expected.contains(&movie_id));
                    if changed {
                        expected.push(movie_id);
                    }
                } else {
                    let changed = rentals.unrent(&movie_id);
                    assert_eq!(changed, expected.contains(&movie_id));
                    expected.retain(|e| *e != movie_id);
                }
            }

            let actual = ids(&rentals);
            assert_eq!(actual, expected);
            let unique: HashSet<&MovieId> = actual.iter().collect();
            assert_eq!(unique.len(), actual.len());
            for id in 1..=6i64 {
                let movie_id = MovieId::Number(id);
                assert_eq!(rentals.is_rented(&movie_id), expected.contains(&movie_id));
            }
        }
    }

    #[tokio::test]
    async fn test_mirror_keeps_newest_when_listener_rents_reentrantly() {
        let rentals = RentedCatalog::hydrate(Arc::new(MemoryStore::new())).await;

        // Registered before the mirror, so its nested change is delivered
        // to the mirror ahead of the outer one
        let _chain = {
            let handle = rentals.clone();
            rentals.subscribe(move |snapshot| {
                if snapshot.records.len() == 1 {
                    handle.rent(movie(2, "B"));
                }
            })
        };
        let (mirror, _subscription) = RentalsMirror::attach(&rentals);

        rentals.rent(movie(1, "A"));

        assert_eq!(ids(&rentals), vec![MovieId::Number(1), MovieId::Number(2)]);
        assert_eq!(mirror.records(), rentals.records());
    }

    #[tokio::test]
    async fn test_mirror_ignores_older_snapshots() {
        let rentals = RentedCatalog::hydrate(Arc::new(MemoryStore::new())).await;
        let (mirror, _subscription) = RentalsMirror::attach(&rentals);

        rentals.rent(movie(1, "A"));
        let older = rentals.snapshot();
        rentals.rent(movie(2, "B"));

        assert!(!mirror.apply(&older));
        assert_eq!(mirror.records().len(), 2);
    }

    #[tokio::test]
    async fn test_mirror_starts_from_hydrated_state() {
        let raw = r#"[{"id": 7, "title": "G"}]"#;
        let store = Arc::new(MemoryStore::with_value(RENTALS_KEY, raw));
        let rentals = RentedCatalog::hydrate(store).await;
        let (mirror, subscription) = RentalsMirror::attach(&rentals);
        assert_eq!(mirror.records(), rentals.records());

        subscription.unsubscribe();
        rentals.rent(movie(8, "H"));
        assert_eq!(mirror.records().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;
        let mut dune = movie(438631, "Dune");
        dune.poster_path = Some("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg".to_string());
        rentals.rent(dune);
        rentals.rent(MovieRecord::new("legacy-7", "Seven"));
        rentals.rent(movie(603, "The Matrix"));
        rentals.flush().await.unwrap();

        let reloaded = RentedCatalog::hydrate(store.clone()).await;
        assert_eq!(reloaded.records(), rentals.records());
    }

    #[tokio::test]
    async fn test_hydrate_missing_key_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store).await;
        assert!(rentals.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_corrupted_snapshot_is_empty() {
        for raw in ["not json", "{\"id\": 1}", "[{\"title\": \"no id\"}]"] {
            let store = Arc::new(MemoryStore::with_value(RENTALS_KEY, raw));
            assert!(matches!(
                load_snapshot(&*store).await,
                Err(HydrateError::Corrupted(_))
            ));

            let rentals = RentedCatalog::hydrate(store).await;
            assert!(rentals.is_empty(), "snapshot {:?} should hydrate empty", raw);
        }
    }

    #[tokio::test]
    async fn test_hydrate_null_and_blank_are_empty() {
        for raw in ["null", "", "  "] {
            let store = Arc::new(MemoryStore::with_value(RENTALS_KEY, raw));
            assert!(load_snapshot(&*store).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_hydrate_drops_duplicate_ids() {
        let raw = r#"[{"id": 1, "title": "A"}, {"id": 2, "title": "B"}, {"id": 1, "title": "A"}]"#;
        let store = Arc::new(MemoryStore::with_value(RENTALS_KEY, raw));
        let rentals = RentedCatalog::hydrate(store).await;
        assert_eq!(ids(&rentals), vec![MovieId::Number(1), MovieId::Number(2)]);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_change_synchronously() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));

        let subscription = {
            let calls = calls.clone();
            let last_len = last_len.clone();
            rentals.subscribe(move |snapshot| {
                calls.fetch_add(1, Ordering::SeqCst);
                last_len.store(snapshot.records.len(), Ordering::SeqCst);
            })
        };

        rentals.rent(movie(1, "A"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        // no-ops do not notify
        rentals.rent(movie(1, "A"));
        rentals.unrent(&MovieId::Number(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        rentals.unrent(&MovieId::Number(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(last_len.load(Ordering::SeqCst), 0);

        subscription.unsubscribe();
        rentals.rent(movie(2, "B"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store).await;
        let view_handle = rentals.clone();

        rentals.rent(movie(5, "E"));
        assert!(view_handle.is_rented(&MovieId::Number(5)));
    }

    #[tokio::test]
    async fn test_writes_coalesce_while_one_is_in_flight() {
        let store = Arc::new(MemoryStore::new());
        store.set_write_delay(Some(Duration::from_millis(50)));
        let rentals = RentedCatalog::hydrate(store.clone()).await;

        rentals.rent(movie(1, "A"));
        while store.write_count() == 0 {
            tokio::task::yield_now().await;
        }
        rentals.rent(movie(2, "B"));
        rentals.rent(movie(3, "C"));
        rentals.rent(movie(4, "D"));
        rentals.flush().await.unwrap();

        assert_eq!(store.write_count(), 2);
        let stored = load_snapshot(&*store).await.unwrap();
        assert_eq!(stored, rentals.records());
        assert_eq!(rentals.write_status().borrow().version, 4);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_state() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;

        store.set_fail_writes(true);
        rentals.rent(movie(1, "A"));
        let err = rentals.flush().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Write(_)));
        assert!(rentals.is_rented(&MovieId::Number(1)));
        assert!(rentals.write_status().borrow().error.is_some());
        assert_eq!(store.value(RENTALS_KEY), None);

        // The next successful write carries the full state
        store.set_fail_writes(false);
        rentals.rent(movie(2, "B"));
        rentals.flush().await.unwrap();
        let stored = load_snapshot(&*store).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(rentals.write_status().borrow().error.is_none());
    }

    #[tokio::test]
    async fn test_flush_without_changes_returns_immediately() {
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;
        rentals.flush().await.unwrap();
        assert_eq!(store.write_count(), 0);
    }
}
