//! The sketch board: scene, history and tools wired to a surface.

use crate::config::BoardConfig;
use crate::export::{self, ExportError};
use crate::history::History;
use crate::scene::{Scene, SceneChange};
use crate::selection::apply_selection_style;
use crate::shapes::{Image, SerializableColor, Shape, ShapeId};
use crate::storage::{AutoSaveManager, KeyValueStore};
use crate::surface::Surface;
use crate::tools::{GestureOutcome, Mode, ModeController};
use kurbo::{Point, Rect, Size, Vec2};
use std::sync::Arc;
use std::time::Duration;

/// Mirror a scene rebuild onto the surface.
fn apply_change<R: Surface>(surface: &mut R, change: SceneChange<'_>) {
    match change {
        SceneChange::Cleared => surface.clear(),
        SceneChange::Background(color) => surface.set_background(color),
        SceneChange::Added(shape) => surface.add(shape),
    }
}

/// A drawing board session.
///
/// Every user-visible mutation goes through here so the scene, the
/// history stacks and the surface never disagree. Failures are logged and
/// leave the board in its previous state.
pub struct Board<S: KeyValueStore, R: Surface> {
    config: BoardConfig,
    scene: Scene,
    history: History<S>,
    modes: ModeController,
    autosave: AutoSaveManager<S>,
    surface: R,
}

impl<S: KeyValueStore, R: Surface> Board<S, R> {
    /// Start an empty board, ignoring anything persisted in `store`.
    pub fn new(store: Arc<S>, surface: R, config: BoardConfig) -> Self {
        let history = History::new(store.clone(), &config);
        Self::assemble(store, surface, config, history)
    }

    /// Start a board from the history persisted in `store`.
    pub fn load(store: Arc<S>, surface: R, config: BoardConfig) -> Self {
        let history = History::load(store.clone(), &config);
        Self::assemble(store, surface, config, history)
    }

    fn assemble(store: Arc<S>, mut surface: R, config: BoardConfig, mut history: History<S>) -> Self {
        let mut scene = Scene::new(&config);
        if let Err(e) = history.restore_current(&mut scene, |change| apply_change(&mut surface, change)) {
            log::error!("Failed to restore board: {e}");
        }

        let modes = ModeController::new(&config);
        surface.apply_config(&modes.surface_config());

        let mut autosave = AutoSaveManager::new(store);
        autosave.set_interval(Duration::from_secs(config.autosave_interval_secs));

        log::info!(
            "Board ready: {} objects, {} history states",
            scene.len(),
            history.past_len()
        );
        Self {
            config,
            scene,
            history,
            modes,
            autosave,
            surface,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History<S> {
        &self.history
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.modes.selected()
    }

    /// Switch tools. Drops the preview, text entry and selection.
    pub fn set_mode(&mut self, mode: Mode) {
        self.finish_gesture();
        let config = self.modes.set_mode(mode);
        self.scene.set_interaction_all(config.objects);
        self.surface.set_preview(None);
        self.surface.set_selected(None);
        self.surface.apply_config(&config);
    }

    /// Change the drawing color; a selected drawable is recolored too.
    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        let config = self.modes.set_stroke_color(color);
        self.surface.apply_config(&config);

        let Some(id) = self.modes.selected() else {
            return;
        };
        if let Some(shape) = self.scene.get_mut(id) {
            shape.recolor(color);
            self.surface.update(shape);
            self.record();
        }
    }

    /// Resize the drawing surface (layout change).
    pub fn resize(&mut self, size: Size) {
        self.scene.set_surface_size(size);
        self.modes.set_surface_size(size);
    }

    pub fn pointer_down(&mut self, point: Point) -> GestureOutcome {
        let outcome = self.modes.pointer_down(point, &self.scene);
        self.apply(&outcome);
        outcome
    }

    pub fn pointer_move(&mut self, point: Point) -> GestureOutcome {
        let outcome = self.modes.pointer_move(point);
        self.apply(&outcome);
        outcome
    }

    pub fn pointer_up(&mut self, point: Point) -> GestureOutcome {
        let outcome = self.modes.pointer_up(point);
        self.apply(&outcome);
        outcome
    }

    fn apply(&mut self, outcome: &GestureOutcome) {
        match outcome {
            GestureOutcome::None | GestureOutcome::TextEntry(_) => {}
            GestureOutcome::Preview(shape) => self.surface.set_preview(Some(shape)),
            GestureOutcome::Commit(shape) => {
                self.surface.set_preview(None);
                let mut shape = shape.clone();
                self.modes.prepare_commit(&mut shape);
                self.commit(shape);
            }
            GestureOutcome::Select(id) => {
                let selected = id.and_then(|id| self.scene.get_mut(id));
                if let Some(shape) = selected {
                    apply_selection_style(shape, &self.config.selection);
                    self.surface.set_selected(Some(&*shape));
                } else {
                    self.surface.set_selected(None);
                }
            }
            GestureOutcome::Translate { id, delta } => self.translate(*id, *delta),
            GestureOutcome::Modified { id, delta } => {
                self.translate(*id, *delta);
                self.record();
            }
        }
    }

    fn translate(&mut self, id: ShapeId, delta: Vec2) {
        if delta == Vec2::ZERO || !self.scene.translate_drawable(id, delta) {
            return;
        }
        if let Some(shape) = self.scene.get(id) {
            self.surface.update(shape);
        }
    }

    fn commit(&mut self, mut shape: Shape) -> Option<ShapeId> {
        apply_selection_style(&mut shape, &self.config.selection);
        match self.scene.add_drawable(shape) {
            Ok(id) => {
                if let Some(shape) = self.scene.get(id) {
                    self.surface.add(shape);
                }
                self.record();
                Some(id)
            }
            Err(e) => {
                log::warn!("Rejected drawable: {e}");
                None
            }
        }
    }

    /// Record the scene in history.
    fn record(&mut self) {
        match self.history.capture(&self.scene) {
            Ok(true) => self.autosave.mark_dirty(),
            Ok(false) => {}
            Err(e) => log::error!("Failed to capture history: {e}"),
        }
    }

    /// Confirm the open text entry with `content` at (`x`, `y`).
    pub fn commit_text(&mut self, content: &str, x: f64, y: f64) -> Option<ShapeId> {
        let mut shape = self.modes.commit_text(content, Point::new(x, y))?;
        self.modes.prepare_commit(&mut shape);
        self.commit(shape)
    }

    pub fn cancel_text(&mut self) {
        self.modes.cancel_text();
    }

    /// Place an uploaded image, scaled to fit and centered.
    pub fn add_image(&mut self, source: String, natural: Size) -> Option<ShapeId> {
        let mut shape = Shape::Image(Image::placed_on(source, natural, self.scene.surface_size()));
        self.modes.prepare_commit(&mut shape);
        self.commit(shape)
    }

    pub fn undo(&mut self) -> bool {
        self.interrupt();
        let Self {
            history,
            scene,
            surface,
            autosave,
            ..
        } = self;
        match history.undo(scene, |change| apply_change(surface, change)) {
            Ok(changed) => {
                if changed {
                    autosave.mark_dirty();
                }
                changed
            }
            Err(e) => {
                log::error!("Undo failed: {e}");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        self.interrupt();
        let Self {
            history,
            scene,
            surface,
            autosave,
            ..
        } = self;
        match history.redo(scene, |change| apply_change(surface, change)) {
            Ok(changed) => {
                if changed {
                    autosave.mark_dirty();
                }
                changed
            }
            Err(e) => {
                log::error!("Redo failed: {e}");
                false
            }
        }
    }

    /// Empty the board and forget all history.
    pub fn clear(&mut self) {
        self.interrupt();
        let Self {
            history,
            scene,
            surface,
            ..
        } = self;
        if let Err(e) = history.reset(scene, |change| apply_change(surface, change)) {
            log::error!("Clear failed: {e}");
        }
        self.autosave.mark_dirty();
    }

    /// End the gesture in progress, recording a move already applied.
    fn finish_gesture(&mut self) {
        let pending = self.modes.cancel();
        self.apply(&pending);
    }

    /// Abort gestures and drop the selection before the scene is replaced.
    fn interrupt(&mut self) {
        self.finish_gesture();
        self.modes.clear_selection();
        self.surface.set_preview(None);
        self.surface.set_selected(None);
    }

    /// Padded box around the content, clamped to the surface.
    pub fn content_bounds(&self) -> Rect {
        self.scene.content_bounds()
    }

    /// PNG of the content bounds, as sent for analysis.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        export::crop_and_encode(&self.surface, self.content_bounds())
    }

    /// PNG of the whole surface at double resolution.
    pub fn save_image(&self) -> Result<Vec<u8>, ExportError> {
        let surface = Rect::from_origin_size(Point::ZERO, self.scene.surface_size());
        export::save_image(&self.surface, surface)
    }

    /// Width-capped PNG of the whole surface for text recognition.
    pub fn recognition_image(&self) -> Result<Vec<u8>, ExportError> {
        let surface = Rect::from_origin_size(Point::ZERO, self.scene.surface_size());
        export::recognition_image(&self.surface, surface)
    }

    /// Re-write the persisted history if it is due. Returns true if written.
    pub fn tick_autosave(&mut self) -> bool {
        match self.autosave.maybe_save(&self.history) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("Auto-save failed: {e}");
                false
            }
        }
    }
}
