//! Undo/redo history of scene snapshots with best-effort persistence.

use crate::config::BoardConfig;
use crate::scene::{Scene, SceneChange, SceneError};
use crate::snapshot::{Snapshot, validate_snapshot};
use crate::storage::{KeyValueStore, StorageResult};
use serde_json::Value;
use std::sync::Arc;

/// Persisted JSON array of past snapshots (oldest first).
pub const UNDO_STACK_KEY: &str = "undoStack";
/// Persisted JSON array of future snapshots (next redo last).
pub const REDO_STACK_KEY: &str = "redoStack";
/// Single-snapshot key kept in sync for readers of the older layout.
pub const LEGACY_STATE_KEY: &str = "drawingBoardState";

/// Default maximum number of snapshots in the undo stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded past/future stacks of snapshots.
///
/// `past` is never empty: its bottom is the oldest retained state and its
/// top is the current one.
pub struct History<S: KeyValueStore> {
    store: Arc<S>,
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    baseline: Snapshot,
    limit: usize,
    capture_suppressed: bool,
}

impl<S: KeyValueStore> History<S> {
    /// Start a fresh history at the empty baseline, ignoring stored state.
    pub fn new(store: Arc<S>, config: &BoardConfig) -> Self {
        let baseline = Snapshot::baseline(config.background);
        Self {
            store,
            past: vec![baseline.clone()],
            future: Vec::new(),
            baseline,
            limit: config.history_limit.max(1),
            capture_suppressed: false,
        }
    }

    /// Recover history from the store.
    ///
    /// Entries that are not strings or fail validation are dropped. With no
    /// `undoStack` at all, the single legacy snapshot is used instead. An
    /// empty result falls back to the baseline.
    pub fn load(store: Arc<S>, config: &BoardConfig) -> Self {
        let mut history = Self::new(store, config);

        let past = match history.read_stack(UNDO_STACK_KEY) {
            Some(past) => past,
            None => history.read_legacy(),
        };
        let future = history.read_stack(REDO_STACK_KEY).unwrap_or_default();

        if !past.is_empty() {
            history.past = past;
        }
        history.future = future;
        history.enforce_limit();
        if history.future.len() > history.limit {
            let excess = history.future.len() - history.limit;
            history.future.drain(..excess);
        }

        log::info!(
            "History loaded: {} past, {} future",
            history.past.len(),
            history.future.len()
        );
        history
    }

    /// Read a persisted stack, keeping only valid entries in canonical form.
    fn read_stack(&self, key: &str) -> Option<Vec<Snapshot>> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read {key}: {e}");
                return None;
            }
        };
        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                log::warn!("Ignoring {key}: not a list");
                return None;
            }
            Err(e) => {
                log::warn!("Ignoring {key}: {e}");
                return None;
            }
        };

        let stack = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let Value::String(raw) = entry else {
                    log::warn!("Dropping {key}[{index}]: not a string");
                    return None;
                };
                canonical(&raw)
                    .map_err(|e| log::warn!("Dropping {key}[{index}]: {e}"))
                    .ok()
            })
            .collect();
        Some(stack)
    }

    fn read_legacy(&self) -> Vec<Snapshot> {
        let raw = match self.store.get(LEGACY_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read {LEGACY_STATE_KEY}: {e}");
                return Vec::new();
            }
        };
        match canonical(&raw) {
            Ok(snapshot) if snapshot == self.baseline => vec![self.baseline.clone()],
            Ok(snapshot) => {
                log::info!("Recovered scene from {LEGACY_STATE_KEY}");
                vec![self.baseline.clone(), snapshot]
            }
            Err(e) => {
                log::warn!("Dropping {LEGACY_STATE_KEY}: {e}");
                Vec::new()
            }
        }
    }

    /// Record the scene as a new history state.
    ///
    /// Returns `Ok(false)` when capture is suppressed or the scene equals
    /// the current state.
    pub fn capture(&mut self, scene: &Scene) -> Result<bool, SceneError> {
        if self.capture_suppressed {
            return Ok(false);
        }
        let snapshot = scene.serialize()?;
        if self.past.last() == Some(&snapshot) {
            return Ok(false);
        }

        self.past.push(snapshot);
        self.future.clear();
        self.enforce_limit();
        log::debug!("Captured history state {}", self.past.len());
        self.persist();
        Ok(true)
    }

    /// Step back one state. Returns `Ok(false)` at the oldest state.
    ///
    /// If the previous state cannot be restored the stacks are left as they
    /// were and the scene is untouched.
    pub fn undo<F>(&mut self, scene: &mut Scene, notify: F) -> Result<bool, SceneError>
    where
        F: FnMut(SceneChange<'_>),
    {
        if self.past.len() <= 1 {
            return Ok(false);
        }
        let Some(current) = self.past.pop() else {
            return Ok(false);
        };
        let Some(previous) = self.past.last().cloned() else {
            self.past.push(current);
            return Ok(false);
        };

        match self.suppress_capture(|_| scene.restore_with(&previous, notify)) {
            Ok(()) => {
                self.future.push(current);
                log::debug!("Undo: {} past, {} future", self.past.len(), self.future.len());
                self.persist();
                Ok(true)
            }
            Err(e) => {
                self.past.push(current);
                log::warn!("Undo failed, history unchanged: {e}");
                Err(e)
            }
        }
    }

    /// Step forward one state. Returns `Ok(false)` with nothing to redo.
    pub fn redo<F>(&mut self, scene: &mut Scene, notify: F) -> Result<bool, SceneError>
    where
        F: FnMut(SceneChange<'_>),
    {
        let Some(next) = self.future.pop() else {
            return Ok(false);
        };

        match self.suppress_capture(|_| scene.restore_with(&next, notify)) {
            Ok(()) => {
                self.past.push(next);
                self.enforce_limit();
                log::debug!("Redo: {} past, {} future", self.past.len(), self.future.len());
                self.persist();
                Ok(true)
            }
            Err(e) => {
                self.future.push(next);
                log::warn!("Redo failed, history unchanged: {e}");
                Err(e)
            }
        }
    }

    /// Forget everything and empty the scene.
    pub fn reset<F>(&mut self, scene: &mut Scene, notify: F) -> Result<(), SceneError>
    where
        F: FnMut(SceneChange<'_>),
    {
        self.past = vec![self.baseline.clone()];
        self.future.clear();
        self.persist();
        let baseline = self.baseline.clone();
        self.suppress_capture(|_| scene.restore_with(&baseline, notify))?;
        log::info!("History reset");
        Ok(())
    }

    /// Restore the scene from the current state.
    ///
    /// A state that fails to restore is dropped and the next older one is
    /// tried, down to the baseline.
    pub fn restore_current<F>(&mut self, scene: &mut Scene, mut notify: F) -> Result<(), SceneError>
    where
        F: FnMut(SceneChange<'_>),
    {
        loop {
            let Some(current) = self.past.last().cloned() else {
                self.past.push(self.baseline.clone());
                continue;
            };
            match self.suppress_capture(|_| scene.restore_with(&current, &mut notify)) {
                Ok(()) => return Ok(()),
                Err(e) if current != self.baseline => {
                    log::warn!("Dropping unrestorable history state: {e}");
                    self.past.pop();
                    if self.past.is_empty() {
                        self.past.push(self.baseline.clone());
                    }
                    self.persist();
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run `f` with capture disabled. Nesting keeps the outer setting.
    pub fn suppress_capture<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.capture_suppressed;
        self.capture_suppressed = true;
        let result = f(self);
        self.capture_suppressed = previous;
        result
    }

    pub fn is_capture_suppressed(&self) -> bool {
        self.capture_suppressed
    }

    fn enforce_limit(&mut self) {
        if self.past.len() > self.limit {
            let excess = self.past.len() - self.limit;
            self.past.drain(..excess);
        }
    }

    /// Mirror the stacks to the store; failures are logged only.
    pub fn persist(&self) {
        if let Err(e) = self.persist_into(self.store.as_ref()) {
            log::warn!("Failed to persist history: {e}");
        }
    }

    /// Write both stacks and the legacy current-state key to `store`.
    pub fn persist_into<T: KeyValueStore + ?Sized>(&self, store: &T) -> StorageResult<()> {
        let encode = |stack: &[Snapshot]| {
            serde_json::to_string(stack)
                .map_err(|e| crate::storage::StorageError::Serialization(e.to_string()))
        };
        store.set(UNDO_STACK_KEY, &encode(&self.past)?)?;
        store.set(REDO_STACK_KEY, &encode(&self.future)?)?;
        store.set(LEGACY_STATE_KEY, self.current().as_str())
    }

    /// The current (top) state.
    pub fn current(&self) -> &Snapshot {
        self.past.last().unwrap_or(&self.baseline)
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    pub fn past(&self) -> &[Snapshot] {
        &self.past
    }

    pub fn future(&self) -> &[Snapshot] {
        &self.future
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

/// Validate a stored snapshot and re-encode it in canonical form, so that
/// dedup compares like with like.
fn canonical(raw: &str) -> Result<Snapshot, SceneError> {
    Ok(validate_snapshot(raw)?.to_snapshot()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};
    use crate::storage::MemoryStore;
    use kurbo::Point;

    fn setup() -> (History<MemoryStore>, Scene, BoardConfig) {
        let config = BoardConfig::default();
        let history = History::new(Arc::new(MemoryStore::new()), &config);
        (history, Scene::new(&config), config)
    }

    fn add_rect(scene: &mut Scene, x: f64) {
        scene
            .add_drawable(Shape::Rectangle(Rectangle::new(Point::new(x, x), 10.0, 10.0)))
            .unwrap();
    }

    #[test]
    fn test_starts_at_baseline() {
        let (history, _, _) = setup();
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.current(), history.baseline());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capture_dedups() {
        let (mut history, mut scene, _) = setup();
        assert!(!history.capture(&scene).unwrap());
        add_rect(&mut scene, 1.0);
        assert!(history.capture(&scene).unwrap());
        assert!(!history.capture(&scene).unwrap());
        assert_eq!(history.past_len(), 2);
    }

    #[test]
    fn test_capture_clears_future() {
        let (mut history, mut scene, _) = setup();
        add_rect(&mut scene, 1.0);
        history.capture(&scene).unwrap();
        history.undo(&mut scene, |_| {}).unwrap();
        assert_eq!(history.future_len(), 1);

        add_rect(&mut scene, 2.0);
        history.capture(&scene).unwrap();
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_undo_at_baseline_is_noop() {
        let (mut history, mut scene, _) = setup();
        assert!(!history.undo(&mut scene, |_| {}).unwrap());
        assert!(!history.redo(&mut scene, |_| {}).unwrap());
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let config = BoardConfig {
            history_limit: 3,
            ..BoardConfig::default()
        };
        let mut history = History::new(Arc::new(MemoryStore::new()), &config);
        let mut scene = Scene::new(&config);
        let mut captured = Vec::new();
        for i in 0..5 {
            add_rect(&mut scene, i as f64);
            history.capture(&scene).unwrap();
            captured.push(scene.serialize().unwrap());
        }
        assert_eq!(history.past(), &captured[2..]);
    }

    #[test]
    fn test_suppress_capture_nests() {
        let (mut history, mut scene, _) = setup();
        add_rect(&mut scene, 1.0);
        history.suppress_capture(|h| {
            h.suppress_capture(|h| assert!(h.is_capture_suppressed()));
            assert!(h.is_capture_suppressed());
            assert!(!h.capture(&scene).unwrap());
        });
        assert!(!history.is_capture_suppressed());
        assert!(history.capture(&scene).unwrap());
    }

    #[test]
    fn test_undo_rolls_back_on_corrupt_state() {
        let store = Arc::new(MemoryStore::new());
        let config = BoardConfig::default();
        let mut history = History::new(store, &config);
        history.past.push(Snapshot::from_raw(r##"{"version":"1.0","objects":5,"background":"#fff"}"##));
        let mut scene = Scene::new(&config);
        add_rect(&mut scene, 1.0);
        history.capture(&scene).unwrap();
        let before = scene.serialize().unwrap();

        let result = history.undo(&mut scene, |_| {});
        assert!(matches!(result, Err(SceneError::CorruptSnapshot(_))));
        assert_eq!(history.past_len(), 3);
        assert_eq!(history.future_len(), 0);
        assert_eq!(scene.serialize().unwrap(), before);
    }

    #[test]
    fn test_persists_after_capture() {
        let (mut history, mut scene, _) = setup();
        add_rect(&mut scene, 1.0);
        history.capture(&scene).unwrap();

        let store = history.store();
        let undo: Vec<String> =
            serde_json::from_str(&store.get(UNDO_STACK_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(undo.len(), 2);
        assert_eq!(store.get(REDO_STACK_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(
            store.get(LEGACY_STATE_KEY).unwrap().unwrap(),
            scene.serialize().unwrap().into_string()
        );
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let config = BoardConfig::default();
        let mut history = History::new(Arc::new(MemoryStore::read_only()), &config);
        let mut scene = Scene::new(&config);
        add_rect(&mut scene, 1.0);
        assert!(history.capture(&scene).unwrap());
        assert_eq!(history.past_len(), 2);
    }

    #[test]
    fn test_load_round_trip() {
        let (mut history, mut scene, config) = setup();
        add_rect(&mut scene, 1.0);
        history.capture(&scene).unwrap();
        add_rect(&mut scene, 2.0);
        history.capture(&scene).unwrap();
        history.undo(&mut scene, |_| {}).unwrap();

        let reloaded = History::load(history.store().clone(), &config);
        assert_eq!(reloaded.past(), history.past());
        assert_eq!(reloaded.future(), history.future());
    }

    #[test]
    fn test_load_from_legacy_key() {
        let config = BoardConfig::default();
        let mut scene = Scene::new(&config);
        add_rect(&mut scene, 1.0);
        let legacy = scene.serialize().unwrap();
        let store = Arc::new(MemoryStore::with_entries([(LEGACY_STATE_KEY, legacy.as_str())]));

        let history = History::load(store, &config);
        assert_eq!(history.past_len(), 2);
        assert_eq!(history.current(), &legacy);
        assert_eq!(&history.past()[0], history.baseline());
    }

    #[test]
    fn test_load_garbage_falls_back_to_baseline() {
        let config = BoardConfig::default();
        let store = Arc::new(MemoryStore::with_entries([
            (UNDO_STACK_KEY, "{not json"),
            (LEGACY_STATE_KEY, "undefined"),
        ]));
        let history = History::load(store, &config);
        assert_eq!(history.past(), &[history.baseline().clone()]);
    }

    #[test]
    fn test_restore_current_falls_back() {
        let (mut history, mut scene, _) = setup();
        add_rect(&mut scene, 1.0);
        history.capture(&scene).unwrap();
        let good = history.current().clone();
        history.past.push(Snapshot::from_raw("garbage"));

        let mut other = Scene::new(&BoardConfig::default());
        history.restore_current(&mut other, |_| {}).unwrap();
        assert_eq!(history.current(), &good);
        assert_eq!(other.serialize().unwrap(), good);
    }
}
