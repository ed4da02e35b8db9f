//! WebAssembly entry point and platform-specific code.

use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use kurbo::{Point, Rect, Size};
use sketchboard_core::storage::{LocalStorageStore, create_default_store};
use sketchboard_core::surface::{RasterImage, SurfaceResult, raster_size};
use sketchboard_core::{
    Board, BoardConfig, GestureOutcome, Mode, SerializableColor, Shape, ShapeId, Surface,
    SurfaceConfig, SurfaceError,
};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Canvas adapter implemented on the page. Drawables and settings
    /// cross the boundary as JSON strings.
    pub type JsSurface;

    #[wasm_bindgen(method, js_name = addObject)]
    fn add_object(this: &JsSurface, object: &str);

    #[wasm_bindgen(method, js_name = updateObject)]
    fn update_object(this: &JsSurface, object: &str);

    #[wasm_bindgen(method, js_name = removeObject)]
    fn remove_object(this: &JsSurface, id: &str);

    #[wasm_bindgen(method, js_name = clear)]
    fn clear_objects(this: &JsSurface);

    #[wasm_bindgen(method, js_name = setBackground)]
    fn set_background_color(this: &JsSurface, color: &str);

    #[wasm_bindgen(method, js_name = setPreview)]
    fn set_preview_object(this: &JsSurface, object: Option<String>);

    #[wasm_bindgen(method, js_name = applyConfig)]
    fn apply_mode_config(this: &JsSurface, config: &str);

    /// `style` is the drawable's selection decoration as JSON.
    #[wasm_bindgen(method, js_name = setSelected)]
    fn set_selected_object(this: &JsSurface, id: Option<String>, style: Option<String>);

    /// RGBA pixels of a region, `width * scale` by `height * scale`.
    #[wasm_bindgen(method, catch)]
    fn rasterize(
        this: &JsSurface,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        scale: f64,
    ) -> Result<js_sys::Uint8Array, JsValue>;
}

/// [`Surface`] implementation forwarding to the page.
struct SurfaceBridge {
    js: JsSurface,
}

impl SurfaceBridge {
    fn encode(shape: &Shape) -> Option<String> {
        match serde_json::to_string(shape) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Failed to encode {}: {e}", shape.id());
                None
            }
        }
    }
}

impl Surface for SurfaceBridge {
    fn add(&mut self, shape: &Shape) {
        if let Some(json) = Self::encode(shape) {
            self.js.add_object(&json);
        }
    }

    fn remove(&mut self, id: ShapeId) {
        self.js.remove_object(&id.to_string());
    }

    fn update(&mut self, shape: &Shape) {
        if let Some(json) = Self::encode(shape) {
            self.js.update_object(&json);
        }
    }

    fn clear(&mut self) {
        self.js.clear_objects();
    }

    fn set_background(&mut self, color: SerializableColor) {
        self.js.set_background_color(&color.to_hex());
    }

    fn set_preview(&mut self, preview: Option<&Shape>) {
        self.js.set_preview_object(preview.and_then(Self::encode));
    }

    fn apply_config(&mut self, config: &SurfaceConfig) {
        match serde_json::to_string(config) {
            Ok(json) => self.js.apply_mode_config(&json),
            Err(e) => log::warn!("Failed to encode surface config: {e}"),
        }
    }

    fn set_selected(&mut self, selected: Option<&Shape>) {
        let Some(shape) = selected else {
            self.js.set_selected_object(None, None);
            return;
        };
        let style = match serde_json::to_string(shape.selection_style()) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Failed to encode selection style: {e}");
                None
            }
        };
        self.js.set_selected_object(Some(shape.id().to_string()), style);
    }

    fn rasterize(&self, region: Rect, scale: f64) -> SurfaceResult<RasterImage> {
        let (width, height) = raster_size(region, scale)?;
        let pixels = self
            .js
            .rasterize(region.x0, region.y0, region.width(), region.height(), scale)
            .map_err(|e| SurfaceError::RasterFailed(format!("{e:?}")))?;
        let rgba = pixels.to_vec();
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(SurfaceError::RasterFailed(format!(
                "expected {width}x{height} RGBA, got {} bytes",
                rgba.len()
            )));
        }
        Ok(RasterImage { width, height, rgba })
    }
}

fn to_js(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The drawing board as exposed to the page.
#[wasm_bindgen]
pub struct WebBoard {
    board: Board<LocalStorageStore, SurfaceBridge>,
}

#[wasm_bindgen]
impl WebBoard {
    /// Restore the board from local storage onto `surface`.
    /// `config` is an optional JSON object of overrides.
    #[wasm_bindgen(constructor)]
    pub fn new(surface: JsSurface, config: Option<String>) -> Result<WebBoard, JsValue> {
        let config = match config {
            Some(json) => BoardConfig::from_json(&json).map_err(to_js)?,
            None => BoardConfig::default(),
        };
        let store = create_default_store().map_err(to_js)?;
        let board = Board::load(store, SurfaceBridge { js: surface }, config);
        Ok(Self { board })
    }

    /// Switch tools by toolbar name; `shape` is `rect`, `circle` or `arrow`.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, name: &str, shape: Option<String>) -> bool {
        match Mode::parse(name, shape.as_deref()) {
            Some(mode) => {
                self.board.set_mode(mode);
                true
            }
            None => {
                log::warn!("Unknown mode {name}");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = setStrokeColor)]
    pub fn set_stroke_color(&mut self, color: &str) -> bool {
        match SerializableColor::from_hex(color) {
            Some(color) => {
                self.board.set_stroke_color(color);
                true
            }
            None => false,
        }
    }

    /// Returns `[x, y]` of the text-entry affordance when one opens,
    /// otherwise an empty array.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Vec<f64> {
        match self.board.pointer_down(Point::new(x, y)) {
            GestureOutcome::TextEntry(entry) => vec![entry.origin.x, entry.origin.y],
            _ => Vec::new(),
        }
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.board.pointer_move(Point::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.board.pointer_up(Point::new(x, y));
    }

    #[wasm_bindgen(js_name = commitText)]
    pub fn commit_text(&mut self, content: &str, x: f64, y: f64) -> bool {
        self.board.commit_text(content, x, y).is_some()
    }

    #[wasm_bindgen(js_name = cancelText)]
    pub fn cancel_text(&mut self) {
        self.board.cancel_text();
    }

    pub fn undo(&mut self) -> bool {
        self.board.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.board.redo()
    }

    pub fn clear(&mut self) {
        self.board.clear();
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.board.history().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.board.history().can_redo()
    }

    /// Place an uploaded image given as a data URL.
    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, source: String, width: f64, height: f64) -> bool {
        self.board.add_image(source, Size::new(width, height)).is_some()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.board.resize(Size::new(width, height));
    }

    /// `[x, y, width, height]` of the padded content box.
    #[wasm_bindgen(js_name = contentBounds)]
    pub fn content_bounds(&self) -> Vec<f64> {
        let bounds = self.board.content_bounds();
        vec![bounds.x0, bounds.y0, bounds.width(), bounds.height()]
    }

    /// PNG of the content bounds, for the analysis upload.
    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.board.export_png().map_err(to_js)
    }

    /// Full-surface PNG at double resolution, for download.
    #[wasm_bindgen(js_name = saveImage)]
    pub fn save_image(&self) -> Result<Vec<u8>, JsValue> {
        self.board.save_image().map_err(to_js)
    }

    #[wasm_bindgen(js_name = recognitionImage)]
    pub fn recognition_image(&self) -> Result<Vec<u8>, JsValue> {
        self.board.recognition_image().map_err(to_js)
    }

    /// Call periodically; re-writes local storage when due.
    #[wasm_bindgen(js_name = tickAutosave)]
    pub fn tick_autosave(&mut self) -> bool {
        self.board.tick_autosave()
    }

    /// Run the shortcut bound to a key press. Returns true if handled.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool) -> bool {
        let Some(action) = ShortcutRegistry::lookup(key, ctrl, shift) else {
            return false;
        };
        log::debug!("Shortcut {key}: {action:?}");
        match action {
            ShortcutAction::Undo => {
                self.board.undo();
            }
            ShortcutAction::Redo => {
                self.board.redo();
            }
            ShortcutAction::SetMode(mode) => self.board.set_mode(mode),
            ShortcutAction::Cancel => {
                // Re-entering the mode drops any gesture and text entry.
                let mode = self.board.mode();
                self.board.set_mode(mode);
            }
        }
        true
    }
}

/// Mermaid source from an analysis service response.
#[wasm_bindgen(js_name = extractDiagram)]
pub fn extract_diagram(response: &str) -> Result<String, JsValue> {
    sketchboard_core::extract_diagram(response).map_err(to_js)
}

/// Markdown from a text-recognition service response.
#[wasm_bindgen(js_name = extractMarkdown)]
pub fn extract_markdown(response: &str) -> Result<String, JsValue> {
    sketchboard_core::extract_markdown(response).map_err(to_js)
}

/// Initialize logging for the page.
#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed.
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Starting Sketchboard (WASM)");
    }
}
