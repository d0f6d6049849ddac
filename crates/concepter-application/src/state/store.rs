//! Reactive application state store.
//!
//! One `StateStore` exists per process. It owns the current
//! [`ApplicationState`] snapshot, replaces it wholesale on every mutation and
//! broadcasts the new snapshot to all registered listeners. Async consumers
//! can also follow the state through [`StateStore::watch`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use concepter_core::chat::ChatMessage;
use concepter_core::concept::{Concept, ConceptFetcher};
use concepter_core::user::User;
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::model::{ApplicationState, CONCEPTS_LOADING_KEY};
use super::subscription::{Listener, ListenerRegistry, SharedRegistry, Subscription, lock_registry};

struct StoreInner {
    state: watch::Sender<Arc<ApplicationState>>,
    listeners: SharedRegistry,
    fetcher: Mutex<Option<Weak<dyn ConceptFetcher>>>,
    /// Bumped by `reset` and `refresh_concepts`; a lazy load only applies its
    /// result while the generation it started under is still current.
    load_generation: AtomicU64,
}

/// Cheaply cloneable handle to the shared application state.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<StoreInner>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(ApplicationState::default()));
        Self {
            inner: Arc::new(StoreInner {
                state,
                listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
                fetcher: Mutex::new(None),
                load_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Wires the collaborator used for the lazy concepts load.
    ///
    /// Only a weak reference is kept: the fetcher usually depends on the store
    /// itself.
    pub fn attach_concept_fetcher(&self, fetcher: &Arc<dyn ConceptFetcher>) {
        *self
            .inner
            .fetcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::downgrade(fetcher));
    }

    fn concept_fetcher(&self) -> Option<Arc<dyn ConceptFetcher>> {
        self.inner
            .fetcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    // ============================================================================
    // Reads and subscriptions
    // ============================================================================

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<ApplicationState> {
        self.inner.state.borrow().clone()
    }

    /// Returns a receiver that observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<Arc<ApplicationState>> {
        self.inner.state.subscribe()
    }

    /// Waits until the state satisfies `predicate` and returns that snapshot.
    pub async fn wait_until<F>(&self, mut predicate: F) -> Arc<ApplicationState>
    where
        F: FnMut(&ApplicationState) -> bool,
    {
        let mut receiver = self.watch();
        match receiver.wait_for(|state| predicate(state)).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`
            Err(_) => self.snapshot(),
        }
    }

    /// Registers a listener that receives every new full snapshot.
    ///
    /// The listener is called synchronously after each mutation, in
    /// registration order.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<ApplicationState>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let id = lock_registry(&self.inner.listeners).insert(listener);
        Subscription::new(id, &self.inner.listeners)
    }

    /// Subscribes to a projection of the state.
    ///
    /// `listener` receives the current value immediately and afterwards only
    /// when the projected value changes.
    pub fn select<T, P, F>(&self, projection: P, listener: F) -> Subscription
    where
        T: PartialEq + Clone + Send + 'static,
        P: Fn(&ApplicationState) -> T + Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let last: Mutex<Option<T>> = Mutex::new(None);
        let emit = Arc::new(move |state: &Arc<ApplicationState>| {
            let next = projection(state);
            {
                let mut last = last.lock().unwrap_or_else(PoisonError::into_inner);
                if last.as_ref() == Some(&next) {
                    return;
                }
                *last = Some(next.clone());
            }
            listener(&next);
        });

        let subscription = {
            let emit = emit.clone();
            self.subscribe(move |state| emit(state))
        };
        emit(&self.snapshot());
        subscription
    }

    pub fn select_user<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Option<User>) + Send + Sync + 'static,
    {
        self.select(|state| state.user.clone(), listener)
    }

    /// Subscribes to the concepts collection, starting the lazy load when
    /// it has not happened yet.
    pub fn select_concepts<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Vec<Concept>) + Send + Sync + 'static,
    {
        let subscription = self.select(|state| state.concepts.clone(), listener);
        self.ensure_concepts_loaded();
        subscription
    }

    pub fn select_current_concept<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Option<Concept>) + Send + Sync + 'static,
    {
        self.select(|state| state.current_concept.clone(), listener)
    }

    pub fn select_chat_messages<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Vec<ChatMessage>) + Send + Sync + 'static,
    {
        self.select(|state| state.chat_messages.clone(), listener)
    }

    pub fn select_loading<F>(&self, key: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        let key = key.into();
        self.select(move |state| state.is_loading(&key), listener)
    }

    pub fn select_error<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Option<String>) + Send + Sync + 'static,
    {
        self.select(|state| state.error.clone(), listener)
    }

    /// Reads the concepts collection, starting the lazy load when needed.
    pub fn concepts(&self) -> Vec<Concept> {
        let concepts = self.snapshot().concepts.clone();
        self.ensure_concepts_loaded();
        concepts
    }

    // ============================================================================
    // Mutators
    // ============================================================================

    pub fn set_user(&self, user: Option<User>) {
        self.mutate(|state| state.user = user);
    }

    /// Replaces the collection and marks it loaded.
    pub fn set_concepts(&self, concepts: Vec<Concept>) {
        self.mutate(|state| {
            state.concepts = concepts;
            state.concepts_loaded = true;
        });
    }

    pub fn add_concept(&self, concept: Concept) {
        self.mutate(|state| state.concepts.push(concept));
    }

    /// Replaces the entry with the same id, keeping `current_concept` in
    /// step when it points at that entry.
    pub fn update_concept(&self, concept: Concept) {
        self.mutate(|state| {
            for existing in state.concepts.iter_mut().filter(|c| c.id == concept.id) {
                *existing = concept.clone();
            }
            if state
                .current_concept
                .as_ref()
                .is_some_and(|current| current.id == concept.id)
            {
                state.current_concept = Some(concept);
            }
        });
    }

    pub fn remove_concept(&self, id: &str) {
        self.mutate(|state| {
            state.concepts.retain(|c| c.id != id);
            if state.current_concept.as_ref().is_some_and(|c| c.id == id) {
                state.current_concept = None;
            }
        });
    }

    pub fn set_current_concept(&self, concept: Option<Concept>) {
        self.mutate(|state| state.current_concept = concept);
    }

    pub fn add_chat_message(&self, message: ChatMessage) {
        self.mutate(|state| state.chat_messages.push(message));
    }

    pub fn set_chat_messages(&self, messages: Vec<ChatMessage>) {
        self.mutate(|state| state.chat_messages = messages);
    }

    pub fn set_loading(&self, key: &str, loading: bool) {
        self.mutate(|state| {
            state.loading.insert(key.to_string(), loading);
        });
    }

    pub fn set_error(&self, error: Option<String>) {
        self.mutate(|state| state.error = error);
    }

    /// Restores the all-empty initial state.
    pub fn reset(&self) {
        tracing::debug!("[State] Reset to initial state");
        let generation = &self.inner.load_generation;
        self.mutate(|state| {
            generation.fetch_add(1, Ordering::SeqCst);
            *state = ApplicationState::default();
        });
    }

    /// Marks the collection stale so the next read fetches it again.
    ///
    /// A load still in flight is abandoned.
    pub fn refresh_concepts(&self) {
        let generation = &self.inner.load_generation;
        self.mutate(|state| {
            generation.fetch_add(1, Ordering::SeqCst);
            state.concepts_loaded = false;
            state.loading.insert(CONCEPTS_LOADING_KEY.to_string(), false);
        });
    }

    // ============================================================================
    // Lazy concepts load
    // ============================================================================

    /// Starts a background fetch of the concepts collection unless it is
    /// already loaded or being loaded.
    pub fn ensure_concepts_loaded(&self) {
        let mut started = None;
        let mut generation = 0;
        self.inner.state.send_if_modified(|current| {
            if current.concepts_loaded || current.is_loading(CONCEPTS_LOADING_KEY) {
                return false;
            }
            generation = self.inner.load_generation.load(Ordering::SeqCst);
            let mut next = ApplicationState::clone(current);
            next.loading.insert(CONCEPTS_LOADING_KEY.to_string(), true);
            let next = Arc::new(next);
            *current = next.clone();
            started = Some(next);
            true
        });

        let Some(snapshot) = started else {
            return;
        };
        self.notify(&snapshot);

        let Some(fetcher) = self.concept_fetcher() else {
            tracing::warn!("[State] No concept fetcher attached, skipping lazy load");
            self.set_loading(CONCEPTS_LOADING_KEY, false);
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("[State] No async runtime available, skipping lazy load");
            self.set_loading(CONCEPTS_LOADING_KEY, false);
            return;
        };

        tracing::debug!("[State] Loading concepts");
        let store = self.clone();
        handle.spawn(async move {
            store.load_concepts(fetcher, generation).await;
        });
    }

    async fn load_concepts(&self, fetcher: Arc<dyn ConceptFetcher>, generation: u64) {
        match fetcher.fetch_concepts().await {
            Ok(concepts) => {
                tracing::debug!("[State] Loaded {} concepts", concepts.len());
                self.mutate_load(generation, |state| {
                    state.concepts = concepts;
                    state.concepts_loaded = true;
                    state.loading.insert(CONCEPTS_LOADING_KEY.to_string(), false);
                });
            }
            Err(e) => {
                tracing::warn!("[State] Failed to load concepts: {}", e);
                self.mutate_load(generation, |state| {
                    state.error = Some(format!("Failed to load concepts: {}", e));
                    state.loading.insert(CONCEPTS_LOADING_KEY.to_string(), false);
                });
            }
        }
    }

    // ============================================================================
    // Internals
    // ============================================================================

    /// Applies `f` to a copy of the current state, installs the copy and
    /// broadcasts it.
    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut ApplicationState),
    {
        let mut published = None;
        self.inner.state.send_modify(|current| {
            let mut next = ApplicationState::clone(current);
            f(&mut next);
            let next = Arc::new(next);
            *current = next.clone();
            published = Some(next);
        });
        if let Some(snapshot) = published {
            self.notify(&snapshot);
        }
    }

    /// Like `mutate`, but only while `generation` is still current.
    fn mutate_load<F>(&self, generation: u64, f: F)
    where
        F: FnOnce(&mut ApplicationState),
    {
        let mut published = None;
        self.inner.state.send_if_modified(|current| {
            if self.inner.load_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let mut next = ApplicationState::clone(current);
            f(&mut next);
            let next = Arc::new(next);
            *current = next.clone();
            published = Some(next);
            true
        });
        match published {
            Some(snapshot) => self.notify(&snapshot),
            None => tracing::debug!("[State] Discarding concepts load from a previous session"),
        }
    }

    fn notify(&self, snapshot: &Arc<ApplicationState>) {
        let listeners = lock_registry(&self.inner.listeners).snapshot();
        for listener in listeners {
            listener(snapshot);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        lock_registry(&self.inner.listeners).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concepter_core::error::{ConcepterError, Result};
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use tokio::sync::Notify;

    fn user(email: &str) -> User {
        serde_json::from_value(serde_json::json!({ "id": "u-1", "email": email })).unwrap()
    }

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
    }

    struct CountingFetcher {
        calls: AtomicUsize,
        fail: AtomicBool,
        concepts: Vec<Concept>,
    }

    impl CountingFetcher {
        fn new(concepts: Vec<Concept>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                concepts,
            }
        }
    }

    #[async_trait]
    impl ConceptFetcher for CountingFetcher {
        async fn fetch_concepts(&self) -> Result<Vec<Concept>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                Err(ConcepterError::internal("backend down"))
            } else {
                Ok(self.concepts.clone())
            }
        }
    }

    /// Holds the first fetch until `gate` is notified; later fetches return
    /// at once. Call `n` yields a single concept `c-n`.
    #[derive(Default)]
    struct GatedFetcher {
        calls: AtomicUsize,
        completed: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl ConceptFetcher for GatedFetcher {
        async fn fetch_concepts(&self) -> Result<Vec<Concept>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == 1 {
                self.gate.notified().await;
            }
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Concept::new(format!("c-{}", call), "Concept")])
        }
    }

    async fn wait_for(counter: &AtomicUsize, target: usize) {
        while counter.load(Ordering::SeqCst) < target {
            tokio::task::yield_now().await;
        }
        // Let the spawned load apply its result
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_initial_state_is_empty() {
        let store = StateStore::new();
        assert_eq!(*store.snapshot(), ApplicationState::default());
    }

    #[test]
    fn test_mutations_never_touch_published_snapshots() {
        let store = StateStore::new();
        let input = vec![Concept::new("c-1", "One")];
        store.set_concepts(input.clone());
        let before = store.snapshot();

        store.add_concept(Concept::new("c-2", "Two"));
        store.update_concept(Concept::new("c-1", "One (edited)"));

        assert_eq!(input, vec![Concept::new("c-1", "One")]);
        assert_eq!(before.concepts, input);
        assert!(before.concepts_loaded);
        assert!(!Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.snapshot().concepts.len(), 2);
        assert_eq!(store.snapshot().concepts[0].title, "One (edited)");
    }

    #[test]
    fn test_update_concept_keeps_current_in_step() {
        let store = StateStore::new();
        store.set_concepts(vec![Concept::new("c-1", "One"), Concept::new("c-2", "Two")]);
        store.set_current_concept(Some(Concept::new("c-1", "One")));

        store.update_concept(Concept::new("c-1", "Renamed"));
        let state = store.snapshot();
        assert_eq!(state.current_concept.as_ref().unwrap().title, "Renamed");
        assert_eq!(state.concepts[0].title, "Renamed");

        store.update_concept(Concept::new("c-2", "Other"));
        let state = store.snapshot();
        assert_eq!(state.current_concept.as_ref().unwrap().title, "Renamed");
        assert_eq!(state.concepts[1].title, "Other");
    }

    #[test]
    fn test_remove_concept_clears_matching_current() {
        let store = StateStore::new();
        store.set_concepts(vec![Concept::new("c-1", "One"), Concept::new("c-2", "Two")]);
        store.set_current_concept(Some(Concept::new("c-2", "Two")));

        store.remove_concept("c-1");
        assert!(store.snapshot().current_concept.is_some());

        store.remove_concept("c-2");
        let state = store.snapshot();
        assert!(state.current_concept.is_none());
        assert!(state.concepts.is_empty());
    }

    #[test]
    fn test_chat_messages_append_and_replace() {
        let store = StateStore::new();
        let message = |id: &str| ChatMessage {
            id: id.to_string(),
            role: concepter_core::chat::ChatRole::User,
            content: "hi".to_string(),
            timestamp: chrono::Utc::now(),
            conversation_id: None,
        };

        store.add_chat_message(message("m-1"));
        store.add_chat_message(message("m-2"));
        assert_eq!(store.snapshot().chat_messages.len(), 2);

        store.set_chat_messages(vec![message("m-3")]);
        assert_eq!(store.snapshot().chat_messages[0].id, "m-3");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let store = StateStore::new();
        store.set_user(Some(user("demo@concepter.com")));
        store.set_loading("login", true);
        store.set_error(Some("boom".to_string()));

        store.reset();

        assert_eq!(*store.snapshot(), ApplicationState::default());
    }

    #[test]
    fn test_subscribe_receives_every_snapshot() {
        let store = StateStore::new();
        let (seen, sink) = recorder::<Arc<ApplicationState>>();
        let subscription = store.subscribe(sink);

        store.set_error(Some("a".to_string()));
        store.set_error(None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].error.as_deref(), Some("a"));
        assert_eq!(seen[1].error, None);
        drop(subscription);
    }

    #[test]
    fn test_selector_emits_immediately_then_on_change_only() {
        let store = StateStore::new();
        let (seen, sink) = recorder::<Option<String>>();
        let _subscription = store.select_error(sink);

        store.set_loading("login", true);
        store.set_error(Some("Access denied.".to_string()));
        store.set_error(Some("Access denied.".to_string()));
        store.set_error(None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("Access denied.".to_string()), None]
        );
    }

    #[test]
    fn test_select_loading_reads_named_flag() {
        let store = StateStore::new();
        let (seen, sink) = recorder::<bool>();
        let _subscription = store.select_loading("login", sink);

        store.set_loading("auth", true);
        store.set_loading("login", true);
        store.set_loading("login", false);

        assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
    }

    #[test]
    fn test_dropped_subscription_stops_listening() {
        let store = StateStore::new();
        let (seen, sink) = recorder::<Option<User>>();
        let subscription = store.select_user(sink);
        assert_eq!(store.listener_count(), 1);

        subscription.unsubscribe();
        store.set_user(Some(user("demo@concepter.com")));

        assert_eq!(store.listener_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![None]);
        assert!(store.snapshot().user.is_some());
    }

    #[test]
    fn test_listener_may_mutate_the_store() {
        let store = StateStore::new();
        let handle = store.clone();
        let _subscription = store.select_user(move |user| {
            if user.is_some() {
                handle.set_error(None);
            }
        });

        store.set_error(Some("stale".to_string()));
        store.set_user(Some(user("demo@concepter.com")));

        assert_eq!(store.snapshot().error, None);
    }

    #[test]
    fn test_lazy_load_without_runtime_resets_flag() {
        let store = StateStore::new();
        let fetcher: Arc<dyn ConceptFetcher> = Arc::new(CountingFetcher::new(Vec::new()));
        store.attach_concept_fetcher(&fetcher);

        assert!(store.concepts().is_empty());

        let state = store.snapshot();
        assert!(!state.is_loading(CONCEPTS_LOADING_KEY));
        assert!(!state.concepts_loaded);
    }

    #[tokio::test]
    async fn test_repeated_reads_fetch_once() {
        let store = StateStore::new();
        let counting = Arc::new(CountingFetcher::new(vec![Concept::new("c-1", "One")]));
        let fetcher: Arc<dyn ConceptFetcher> = counting.clone();
        store.attach_concept_fetcher(&fetcher);

        let (seen, sink) = recorder::<Vec<Concept>>();
        let _subscription = store.select_concepts(sink);
        for _ in 0..5 {
            store.concepts();
        }
        assert!(store.snapshot().is_loading(CONCEPTS_LOADING_KEY));

        let state = store.wait_until(|s| s.concepts_loaded).await;

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.concepts.len(), 1);
        assert!(!state.is_loading(CONCEPTS_LOADING_KEY));
        assert_eq!(seen.lock().unwrap().last().unwrap().len(), 1);

        // Loaded: further reads are served from the cache
        store.concepts();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_sets_error_and_retries_later() {
        let store = StateStore::new();
        let counting = Arc::new(CountingFetcher::new(vec![Concept::new("c-1", "One")]));
        counting.fail.store(true, Ordering::SeqCst);
        let fetcher: Arc<dyn ConceptFetcher> = counting.clone();
        store.attach_concept_fetcher(&fetcher);

        store.concepts();
        let state = store.wait_until(|s| !s.is_loading(CONCEPTS_LOADING_KEY)).await;
        assert!(!state.concepts_loaded);
        assert!(state.error.as_deref().unwrap().starts_with("Failed to load concepts"));

        counting.fail.store(false, Ordering::SeqCst);
        store.concepts();
        let state = store.wait_until(|s| s.concepts_loaded).await;
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.concepts.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_concepts_allows_refetch() {
        let store = StateStore::new();
        let counting = Arc::new(CountingFetcher::new(Vec::new()));
        let fetcher: Arc<dyn ConceptFetcher> = counting.clone();
        store.attach_concept_fetcher(&fetcher);

        store.concepts();
        store.wait_until(|s| s.concepts_loaded).await;

        store.refresh_concepts();
        assert!(!store.snapshot().concepts_loaded);
        store.concepts();
        store.wait_until(|s| s.concepts_loaded).await;

        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_finishing_after_reset_is_discarded() {
        let store = StateStore::new();
        let gated = Arc::new(GatedFetcher::default());
        let fetcher: Arc<dyn ConceptFetcher> = gated.clone();
        store.attach_concept_fetcher(&fetcher);

        store.concepts();
        wait_for(&gated.calls, 1).await;
        store.reset();

        gated.gate.notify_one();
        wait_for(&gated.completed, 1).await;

        assert_eq!(*store.snapshot(), ApplicationState::default());
    }

    #[tokio::test]
    async fn test_read_after_reset_loads_fresh_collection() {
        let store = StateStore::new();
        let gated = Arc::new(GatedFetcher::default());
        let fetcher: Arc<dyn ConceptFetcher> = gated.clone();
        store.attach_concept_fetcher(&fetcher);

        store.concepts();
        wait_for(&gated.calls, 1).await;
        store.reset();
        assert!(!store.snapshot().is_loading(CONCEPTS_LOADING_KEY));

        store.concepts();
        let state = store.wait_until(|s| s.concepts_loaded).await;
        assert_eq!(state.concepts[0].id, "c-2");

        gated.gate.notify_one();
        wait_for(&gated.completed, 2).await;

        let state = store.snapshot();
        assert_eq!(gated.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.concepts.len(), 1);
        assert_eq!(state.concepts[0].id, "c-2");
        assert!(!state.is_loading(CONCEPTS_LOADING_KEY));
    }

    #[tokio::test]
    async fn test_refresh_abandons_load_in_flight() {
        let store = StateStore::new();
        let gated = Arc::new(GatedFetcher::default());
        let fetcher: Arc<dyn ConceptFetcher> = gated.clone();
        store.attach_concept_fetcher(&fetcher);

        store.concepts();
        wait_for(&gated.calls, 1).await;
        store.refresh_concepts();

        store.concepts();
        let state = store.wait_until(|s| s.concepts_loaded).await;
        gated.gate.notify_one();
        wait_for(&gated.completed, 2).await;

        assert_eq!(state.concepts[0].id, "c-2");
        assert_eq!(store.snapshot().concepts[0].id, "c-2");
    }
}
