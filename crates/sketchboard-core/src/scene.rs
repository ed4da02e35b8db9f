//! The authoritative list of committed drawables.

use crate::config::BoardConfig;
use crate::shapes::{Interaction, SerializableColor, Shape, ShapeId};
use crate::snapshot::{FORMAT_VERSION, SceneDocument, Snapshot, SnapshotError, validate_snapshot};
use kurbo::{Point, Rect, Size, Vec2};
use serde::Serialize;
use thiserror::Error;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid drawable: {0}")]
    InvalidDrawable(String),
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(#[from] SnapshotError),
    #[error("Failed to serialize scene: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Change notification emitted while a scene is rebuilt from a snapshot.
#[derive(Debug, Clone, Copy)]
pub enum SceneChange<'a> {
    /// Every object was dropped.
    Cleared,
    Background(SerializableColor),
    /// An object was (re-)added on top of the paint order.
    Added(&'a Shape),
}

/// Borrowed view used to serialize without cloning the object list.
/// Field order must match [`SceneDocument`].
#[derive(Serialize)]
struct DocumentRef<'a> {
    version: &'a str,
    objects: &'a [Shape],
    background: SerializableColor,
}

/// Ordered drawables (paint order) plus background and format tag.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<Shape>,
    background: SerializableColor,
    version: String,
    surface: Size,
    bounds_padding: f64,
}

impl Scene {
    /// Create an empty scene for the configured surface.
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            objects: Vec::new(),
            background: config.background,
            version: FORMAT_VERSION.to_string(),
            surface: config.surface_size(),
            bounds_padding: config.bounds_padding,
        }
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    pub fn set_surface_size(&mut self, size: Size) {
        self.surface = size;
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn set_background(&mut self, color: SerializableColor) {
        self.background = color;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Append a drawable on top of the paint order.
    pub fn add_drawable(&mut self, shape: Shape) -> Result<ShapeId, SceneError> {
        shape.validate().map_err(SceneError::InvalidDrawable)?;
        let id = shape.id();
        if self.get(id).is_some() {
            return Err(SceneError::InvalidDrawable(format!("duplicate id {id}")));
        }
        log::debug!("Added {} {}", shape.kind().name(), id);
        self.objects.push(shape);
        Ok(id)
    }

    /// Remove a drawable by id. Absent ids are ignored.
    pub fn remove_drawable(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.objects.iter().position(|s| s.id() == id)?;
        Some(self.objects.remove(index))
    }

    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects.iter_mut().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every drawable, keeping the background.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Move a drawable. Returns false if it does not exist.
    pub fn translate_drawable(&mut self, id: ShapeId, delta: Vec2) -> bool {
        match self.get_mut(id) {
            Some(shape) => {
                shape.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Set the pointer interaction flags of every drawable.
    pub fn set_interaction_all(&mut self, interaction: Interaction) {
        for shape in &mut self.objects {
            shape.set_interaction(interaction);
        }
    }

    /// Ids of drawables under `point`, topmost first.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.objects
            .iter()
            .rev()
            .filter(|s| s.hit_test(point, tolerance))
            .map(|s| s.id())
            .collect()
    }

    /// Deterministic serialization of the whole scene.
    pub fn serialize(&self) -> Result<Snapshot, SceneError> {
        let doc = DocumentRef {
            version: &self.version,
            objects: &self.objects,
            background: self.background,
        };
        Ok(Snapshot::from_raw(serde_json::to_string(&doc)?))
    }

    /// Replace the whole scene from a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SceneError> {
        self.restore_with(snapshot, |_| {})
    }

    /// Replace the whole scene from a snapshot, reporting each step.
    ///
    /// The snapshot is validated before anything is touched; on error the
    /// scene is unchanged and `notify` is never called.
    pub fn restore_with<F>(&mut self, snapshot: &Snapshot, notify: F) -> Result<(), SceneError>
    where
        F: FnMut(SceneChange<'_>),
    {
        let doc = validate_snapshot(snapshot.as_str())?;
        self.apply_document(doc, notify);
        Ok(())
    }

    fn apply_document<F>(&mut self, doc: SceneDocument, mut notify: F)
    where
        F: FnMut(SceneChange<'_>),
    {
        self.objects.clear();
        notify(SceneChange::Cleared);
        self.background = doc.background;
        self.version = doc.version;
        notify(SceneChange::Background(self.background));
        for shape in doc.objects {
            self.objects.push(shape);
            if let Some(added) = self.objects.last() {
                notify(SceneChange::Added(added));
            }
        }
    }

    /// Padded box around all drawables, clamped to the surface.
    ///
    /// An empty scene yields the whole surface.
    pub fn content_bounds(&self) -> Rect {
        let surface = Rect::from_origin_size(Point::ZERO, self.surface);
        let Some(content) = self
            .objects
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
        else {
            return surface;
        };

        let padded = content.inflate(self.bounds_padding, self.bounds_padding);
        let x0 = padded.x0.max(surface.x0);
        let y0 = padded.y0.max(surface.y0);
        let x1 = padded.x1.min(surface.x1).max(x0);
        let y1 = padded.y1.min(surface.y1).max(y0);
        Rect::new(x0, y0, x1, y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Stroke, Text};

    fn scene() -> Scene {
        Scene::new(&BoardConfig::default())
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(x, y), w, h))
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = scene();
        let id = scene.add_drawable(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(scene.len(), 1);
        assert!(scene.remove_drawable(id).is_some());
        assert!(scene.remove_drawable(id).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_add_rejects_malformed_geometry() {
        let mut scene = scene();
        let result = scene.add_drawable(rect(f64::NAN, 0.0, 10.0, 10.0));
        assert!(matches!(result, Err(SceneError::InvalidDrawable(_))));
        let result = scene.add_drawable(Shape::Stroke(Stroke::from_points(vec![])));
        assert!(matches!(result, Err(SceneError::InvalidDrawable(_))));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut scene = scene();
        let shape = rect(0.0, 0.0, 1.0, 1.0);
        scene.add_drawable(shape.clone()).unwrap();
        assert!(scene.add_drawable(shape).is_err());
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let mut scene = scene();
        scene.add_drawable(rect(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(scene.serialize().unwrap(), scene.serialize().unwrap());
    }

    #[test]
    fn test_restore_roundtrip_preserves_order_and_ids() {
        let mut scene = scene();
        let a = scene.add_drawable(rect(1.0, 2.0, 3.0, 4.0)).unwrap();
        let b = scene
            .add_drawable(Shape::Text(Text::new(Point::new(5.0, 5.0), "hi\nthere".to_string())))
            .unwrap();
        let snapshot = scene.serialize().unwrap();

        let mut other = Scene::new(&BoardConfig::default());
        other.restore(&snapshot).unwrap();
        let ids: Vec<_> = other.objects().iter().map(Shape::id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(other.serialize().unwrap(), snapshot);
    }

    #[test]
    fn test_corrupt_restore_leaves_scene_untouched() {
        let mut scene = scene();
        scene.add_drawable(rect(1.0, 2.0, 3.0, 4.0)).unwrap();
        let before = scene.serialize().unwrap();

        let mut calls = 0;
        let bad = Snapshot::from_raw(r##"{"version":"1.0","objects":"nope","background":"#fff"}"##);
        let result = scene.restore_with(&bad, |_| calls += 1);
        assert!(matches!(result, Err(SceneError::CorruptSnapshot(SnapshotError::ObjectsNotList))));
        assert_eq!(calls, 0);
        assert_eq!(scene.serialize().unwrap(), before);
    }

    #[test]
    fn test_restore_notifies_per_object() {
        let mut source = scene();
        source.add_drawable(rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        source.add_drawable(rect(2.0, 2.0, 1.0, 1.0)).unwrap();
        let snapshot = source.serialize().unwrap();

        let mut target = scene();
        let mut events = Vec::new();
        target
            .restore_with(&snapshot, |change| {
                events.push(match change {
                    SceneChange::Cleared => "cleared",
                    SceneChange::Background(_) => "background",
                    SceneChange::Added(_) => "added",
                })
            })
            .unwrap();
        assert_eq!(events, vec!["cleared", "background", "added", "added"]);
    }

    #[test]
    fn test_content_bounds_empty_is_surface() {
        assert_eq!(scene().content_bounds(), Rect::new(0.0, 0.0, 768.0, 520.0));
    }

    #[test]
    fn test_content_bounds_padded_and_clamped() {
        let mut scene = scene();
        scene.add_drawable(rect(100.0, 100.0, 50.0, 50.0)).unwrap();
        assert_eq!(scene.content_bounds(), Rect::new(80.0, 80.0, 170.0, 170.0));

        scene.add_drawable(rect(5.0, 500.0, 10.0, 10.0)).unwrap();
        assert_eq!(scene.content_bounds(), Rect::new(0.0, 80.0, 170.0, 520.0));
    }

    #[test]
    fn test_shapes_at_point_topmost_first() {
        let mut scene = scene();
        let mut bottom = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        bottom.style.fill_color = Some(SerializableColor::white());
        let mut top = Rectangle::new(Point::new(50.0, 50.0), 100.0, 100.0);
        top.style.fill_color = Some(SerializableColor::white());
        let bottom = scene.add_drawable(Shape::Rectangle(bottom)).unwrap();
        let top = scene.add_drawable(Shape::Rectangle(top)).unwrap();
        assert_eq!(scene.shapes_at_point(Point::new(75.0, 75.0), 0.0), vec![top, bottom]);
    }
}
