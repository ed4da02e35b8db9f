//! Sketchboard Core Library
//!
//! Platform-agnostic engine for the Sketchboard drawing surface: the scene
//! of committed drawables, snapshot history with persistence, tool modes
//! and shape geometry.

pub mod analysis;
pub mod board;
pub mod config;
pub mod export;
pub mod geometry;
pub mod history;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snapshot;
pub mod storage;
pub mod surface;
pub mod tools;

pub use analysis::{AnalysisError, extract_diagram, extract_markdown};
pub use board::Board;
pub use config::{BoardConfig, ConfigError};
pub use export::ExportError;
pub use geometry::{ArrowPath, ShapeKind};
pub use history::History;
pub use scene::{Scene, SceneChange, SceneError};
pub use selection::{SelectionStyle, apply_selection_style};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeStyle};
pub use snapshot::{SceneDocument, Snapshot, SnapshotError, validate_snapshot};
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use surface::{RasterImage, SoftwareSurface, Surface, SurfaceError};
pub use tools::{Cursor, GestureOutcome, Mode, ModeController, SurfaceConfig, TextEntry};
