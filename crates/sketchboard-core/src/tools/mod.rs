//! Tool modes and pointer gesture handling.

use crate::config::BoardConfig;
use crate::geometry::{self, ShapeKind};
use crate::scene::Scene;
use crate::selection::MoveState;
use crate::shapes::{Composite, Interaction, SerializableColor, Shape, ShapeId, ShapeStyle, Stroke, Text};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Hit tolerance for picking drawables in select mode.
const PICK_TOLERANCE: f64 = 4.0;

/// The active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Pen,
    Eraser,
    Shape(ShapeKind),
    Text,
    Select,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Pen => "pen",
            Mode::Eraser => "eraser",
            Mode::Shape(_) => "shape",
            Mode::Text => "text",
            Mode::Select => "select",
        }
    }

    /// Parse a tool name as sent by the toolbar; `shape` needs a kind.
    pub fn parse(name: &str, shape: Option<&str>) -> Option<Self> {
        match name {
            "pen" => Some(Mode::Pen),
            "eraser" => Some(Mode::Eraser),
            "text" => Some(Mode::Text),
            "select" => Some(Mode::Select),
            "shape" => {
                let kind = match shape? {
                    "rect" | "rectangle" => ShapeKind::Rectangle,
                    "circle" | "ellipse" => ShapeKind::Ellipse,
                    "arrow" => ShapeKind::Arrow,
                    _ => return None,
                };
                Some(Mode::Shape(kind))
            }
            _ => None,
        }
    }
}

/// Pointer glyph shown over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Pen,
    Eraser,
    Crosshair,
    Text,
    Default,
}

/// Free-drawing brush settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: SerializableColor,
    pub width: f64,
    pub composite: Composite,
}

/// What the rendering surface should do in the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceConfig {
    /// Free-drawing brush; `None` disables free drawing.
    pub brush: Option<Brush>,
    /// Whether objects can be selected and moved.
    pub selection: bool,
    /// Interaction flags applied to every committed drawable.
    pub objects: Interaction,
    pub cursor: Cursor,
}

/// An open text-entry affordance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextEntry {
    /// Where the text drawable will be placed.
    pub anchor: Point,
    /// Top-left of the entry affordance, kept inside the surface.
    pub origin: Point,
}

/// Result of feeding a pointer event to the controller.
#[derive(Debug, Clone)]
pub enum GestureOutcome {
    /// Nothing to do.
    None,
    /// Replace the transient preview.
    Preview(Shape),
    /// Add the drawable to the scene and record history.
    Commit(Shape),
    /// Show the text-entry affordance.
    TextEntry(TextEntry),
    /// Change the selection.
    Select(Option<ShapeId>),
    /// Move a drawable while dragging; not recorded.
    Translate { id: ShapeId, delta: Vec2 },
    /// A drag finished; apply the remaining `delta` and record history.
    Modified { id: ShapeId, delta: Vec2 },
}

/// State of the current gesture.
#[derive(Debug, Clone, Default)]
enum ToolState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// Pen or eraser stroke in progress.
    Stroke { points: Vec<Point> },
    /// Shape drag in progress.
    Drag {
        start: Point,
        current: Point,
        preview: Option<Shape>,
    },
    /// Dragging a selected drawable.
    Move(MoveState),
    /// Text entry open.
    TextEntry(TextEntry),
}

/// Interprets pointer input according to the active mode.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: Mode,
    state: ToolState,
    selected: Option<ShapeId>,
    /// Color for new strokes, shapes and text.
    stroke_color: SerializableColor,
    background: SerializableColor,
    pen_width: f64,
    eraser_width: f64,
    shape_stroke_width: f64,
    text_font_size: f64,
    text_box_width: f64,
    text_entry_size: Size,
    surface: Size,
}

impl ModeController {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            mode: Mode::default(),
            state: ToolState::Idle,
            selected: None,
            stroke_color: config.stroke_color,
            background: config.background,
            pen_width: config.pen_width,
            eraser_width: config.eraser_width,
            shape_stroke_width: config.shape_stroke_width,
            text_font_size: config.text_font_size,
            text_box_width: config.text_box_width,
            text_entry_size: config.text_entry_size(),
            surface: config.surface_size(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch tools, abandoning any gesture in progress.
    ///
    /// A drag in select mode has already moved its drawable; call
    /// [`ModeController::cancel`] first and apply its outcome to keep it.
    pub fn set_mode(&mut self, mode: Mode) -> SurfaceConfig {
        self.cancel();
        self.selected = None;
        log::debug!("Mode {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
        self.surface_config()
    }

    /// Surface settings for the current mode.
    pub fn surface_config(&self) -> SurfaceConfig {
        let brush = |width, composite| Brush {
            color: match composite {
                Composite::Normal => self.stroke_color,
                Composite::Erase => self.background,
            },
            width,
            composite,
        };
        match self.mode {
            Mode::Pen => SurfaceConfig {
                brush: Some(brush(self.pen_width, Composite::Normal)),
                selection: false,
                objects: Interaction::disabled(),
                cursor: Cursor::Pen,
            },
            Mode::Eraser => SurfaceConfig {
                brush: Some(brush(self.eraser_width, Composite::Erase)),
                selection: false,
                objects: Interaction::disabled(),
                cursor: Cursor::Eraser,
            },
            Mode::Select => SurfaceConfig {
                brush: None,
                selection: true,
                objects: Interaction::enabled(),
                cursor: Cursor::Default,
            },
            Mode::Shape(_) => SurfaceConfig {
                brush: None,
                selection: false,
                objects: Interaction::disabled(),
                cursor: Cursor::Crosshair,
            },
            Mode::Text => SurfaceConfig {
                brush: None,
                selection: false,
                objects: Interaction::disabled(),
                cursor: Cursor::Text,
            },
        }
    }

    pub fn stroke_color(&self) -> SerializableColor {
        self.stroke_color
    }

    /// Change the color used for new drawables.
    pub fn set_stroke_color(&mut self, color: SerializableColor) -> SurfaceConfig {
        self.stroke_color = color;
        self.surface_config()
    }

    pub fn set_surface_size(&mut self, size: Size) {
        self.surface = size;
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Whether a pointer gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self.state,
            ToolState::Stroke { .. } | ToolState::Drag { .. } | ToolState::Move(_)
        )
    }

    /// The transient shape preview, if a drag is in progress.
    pub fn preview(&self) -> Option<&Shape> {
        match &self.state {
            ToolState::Drag { preview, .. } => preview.as_ref(),
            _ => None,
        }
    }

    /// The open text entry, if any.
    pub fn text_entry(&self) -> Option<TextEntry> {
        match self.state {
            ToolState::TextEntry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Abort the gesture in progress, dropping any preview or text entry.
    ///
    /// An interrupted move is finished rather than dropped: the drawable
    /// already sits at its new position, so the move comes back as
    /// [`GestureOutcome::Modified`] to be recorded.
    pub fn cancel(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            ToolState::Idle => GestureOutcome::None,
            ToolState::Move(state) if state.has_moved() => {
                log::debug!("Move of {} finished by interruption", state.shape_id);
                GestureOutcome::Modified {
                    id: state.shape_id,
                    delta: Vec2::ZERO,
                }
            }
            _ => {
                log::debug!("Gesture cancelled in {} mode", self.mode.name());
                GestureOutcome::None
            }
        }
    }

    pub fn pointer_down(&mut self, point: Point, scene: &Scene) -> GestureOutcome {
        match self.mode {
            Mode::Pen | Mode::Eraser => {
                self.state = ToolState::Stroke {
                    points: vec![point],
                };
                GestureOutcome::None
            }
            Mode::Shape(_) => {
                self.state = ToolState::Drag {
                    start: point,
                    current: point,
                    preview: None,
                };
                GestureOutcome::None
            }
            Mode::Text => {
                let entry = self.open_text_entry(point);
                self.state = ToolState::TextEntry(entry);
                GestureOutcome::TextEntry(entry)
            }
            Mode::Select => {
                let hit = scene.shapes_at_point(point, PICK_TOLERANCE).first().copied();
                self.selected = hit;
                self.state = match hit {
                    Some(id) => ToolState::Move(MoveState::new(id, point)),
                    None => ToolState::Idle,
                };
                GestureOutcome::Select(hit)
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point) -> GestureOutcome {
        let style = self.shape_style();
        match (&mut self.state, self.mode) {
            (ToolState::Stroke { points }, _) => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
                GestureOutcome::None
            }
            (ToolState::Drag { start, current, preview }, Mode::Shape(kind)) => {
                *current = point;
                let shape = geometry::shape_from_drag(kind, *start, point, style);
                *preview = Some(shape.clone());
                GestureOutcome::Preview(shape)
            }
            (ToolState::Move(state), _) => {
                let delta = state.advance(point);
                if delta == Vec2::ZERO {
                    return GestureOutcome::None;
                }
                GestureOutcome::Translate {
                    id: state.shape_id,
                    delta,
                }
            }
            _ => GestureOutcome::None,
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            ToolState::Stroke { mut points } => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
                if points.len() < 2 {
                    log::debug!("Dropping single-point stroke");
                    return GestureOutcome::None;
                }
                GestureOutcome::Commit(Shape::Stroke(self.stroke_from(points)))
            }
            ToolState::Drag { start, preview, .. } => match self.mode {
                Mode::Shape(kind) if preview.is_some() && start != point => {
                    GestureOutcome::Commit(geometry::shape_from_drag(kind, start, point, self.shape_style()))
                }
                Mode::Shape(_) => {
                    log::debug!("Dropping zero-size shape at {point:?}");
                    GestureOutcome::None
                }
                _ => GestureOutcome::None,
            },
            ToolState::Move(mut state) => {
                let delta = state.advance(point);
                if state.has_moved() {
                    GestureOutcome::Modified {
                        id: state.shape_id,
                        delta,
                    }
                } else {
                    GestureOutcome::None
                }
            }
            state @ ToolState::TextEntry(_) => {
                // Entry stays open until committed or cancelled.
                self.state = state;
                GestureOutcome::None
            }
            ToolState::Idle => GestureOutcome::None,
        }
    }

    /// Confirm the open text entry. Blank content produces nothing.
    pub fn commit_text(&mut self, content: &str, anchor: Point) -> Option<Shape> {
        if matches!(self.state, ToolState::TextEntry(_)) {
            self.state = ToolState::Idle;
        }
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let mut text = Text::new(anchor, content.to_string())
            .with_font_size(self.text_font_size)
            .with_box_width(self.text_box_width);
        text.style.fill_color = Some(self.stroke_color);
        Some(Shape::Text(text))
    }

    /// Close the text entry without creating anything.
    pub fn cancel_text(&mut self) {
        if matches!(self.state, ToolState::TextEntry(_)) {
            self.state = ToolState::Idle;
        }
    }

    /// Forget the selection (e.g. after the selected drawable went away).
    pub fn clear_selection(&mut self) {
        self.selected = None;
        if matches!(self.state, ToolState::Move(_)) {
            self.state = ToolState::Idle;
        }
    }

    fn open_text_entry(&self, anchor: Point) -> TextEntry {
        let mut origin = anchor;
        if origin.x + self.text_entry_size.width > self.surface.width {
            origin.x = self.surface.width - self.text_entry_size.width;
        }
        if origin.y + self.text_entry_size.height > self.surface.height {
            origin.y = self.surface.height - self.text_entry_size.height;
        }
        origin.x = origin.x.max(0.0);
        origin.y = origin.y.max(0.0);
        TextEntry { anchor, origin }
    }

    fn shape_style(&self) -> ShapeStyle {
        ShapeStyle::outline(self.stroke_color, self.shape_stroke_width)
    }

    fn stroke_from(&self, points: Vec<Point>) -> Stroke {
        let mut stroke = match self.mode {
            Mode::Eraser => Stroke::eraser(points),
            _ => Stroke::from_points(points),
        };
        let brush = self.surface_config().brush;
        if let Some(brush) = brush {
            stroke.style = ShapeStyle::outline(brush.color, brush.width);
        }
        stroke
    }

    /// Place a gesture's committed drawable under the current mode's
    /// interaction settings.
    pub fn prepare_commit(&self, shape: &mut Shape) {
        shape.set_interaction(self.surface_config().objects);
    }
}
