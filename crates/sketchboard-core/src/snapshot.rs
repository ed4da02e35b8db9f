//! Serialized scene snapshots and their validation.

use crate::shapes::{SerializableColor, Shape};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Format tag written into every snapshot.
pub const FORMAT_VERSION: &str = "1.0";

/// Named reasons a snapshot document is rejected.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snapshot is not a JSON object")]
    NotAnObject,
    #[error("Snapshot has no string `version`")]
    MissingVersion,
    #[error("Snapshot has no `objects`")]
    MissingObjects,
    #[error("Snapshot `objects` is not a list")]
    ObjectsNotList,
    #[error("Snapshot has no string `background`")]
    MissingBackground,
    #[error("Snapshot background is not a color: {0}")]
    InvalidBackground(String),
    #[error("Snapshot object {index} is invalid: {reason}")]
    InvalidObject { index: usize, reason: String },
}

/// An immutable serialized scene.
///
/// Equality is byte equality of the serialized text; serialization is
/// deterministic, so equal scenes give equal snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    /// Wrap raw text without validating it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The empty scene with the given background.
    ///
    /// Byte-identical to serializing [`SceneDocument::empty`].
    pub fn baseline(background: SerializableColor) -> Self {
        Self(format!(
            r#"{{"version":"{FORMAT_VERSION}","objects":[],"background":"{}"}}"#,
            background.to_hex()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse and validate into a typed document.
    pub fn document(&self) -> Result<SceneDocument, SnapshotError> {
        validate_snapshot(&self.0)
    }

    pub fn is_valid(&self) -> bool {
        self.document().is_ok()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed content of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: String,
    pub objects: Vec<Shape>,
    pub background: SerializableColor,
}

impl SceneDocument {
    pub fn empty(background: SerializableColor) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            objects: Vec::new(),
            background,
        }
    }

    pub fn to_snapshot(&self) -> Result<Snapshot, serde_json::Error> {
        serde_json::to_string(self).map(Snapshot)
    }
}

/// Check that `raw` is a well-formed snapshot and decode it.
///
/// The document must be an object with a string `version`, a list
/// `objects` of valid drawables with distinct ids, and a string color
/// `background`.
pub fn validate_snapshot(raw: &str) -> Result<SceneDocument, SnapshotError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(mut doc) = value else {
        return Err(SnapshotError::NotAnObject);
    };

    let version = match doc.remove("version") {
        Some(Value::String(version)) => version,
        _ => return Err(SnapshotError::MissingVersion),
    };
    let objects = match doc.remove("objects") {
        Some(Value::Array(objects)) => objects,
        Some(_) => return Err(SnapshotError::ObjectsNotList),
        None => return Err(SnapshotError::MissingObjects),
    };
    let background = match doc.remove("background") {
        Some(Value::String(background)) => SerializableColor::from_hex(&background)
            .ok_or(SnapshotError::InvalidBackground(background))?,
        _ => return Err(SnapshotError::MissingBackground),
    };

    let mut seen = HashSet::with_capacity(objects.len());
    let objects = objects
        .into_iter()
        .enumerate()
        .map(|(index, object)| {
            let shape: Shape = serde_json::from_value(object).map_err(|e| {
                SnapshotError::InvalidObject {
                    index,
                    reason: e.to_string(),
                }
            })?;
            shape
                .validate()
                .map_err(|reason| SnapshotError::InvalidObject { index, reason })?;
            if !seen.insert(shape.id()) {
                return Err(SnapshotError::InvalidObject {
                    index,
                    reason: format!("duplicate id {}", shape.id()),
                });
            }
            Ok(shape)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SceneDocument {
        version,
        objects,
        background,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use kurbo::Point;

    #[test]
    fn test_baseline_is_valid() {
        let baseline = Snapshot::baseline(SerializableColor::white());
        assert_eq!(
            baseline.as_str(),
            r##"{"version":"1.0","objects":[],"background":"#FFFFFF"}"##
        );
        let doc = baseline.document().unwrap();
        assert!(doc.objects.is_empty());
        assert_eq!(doc.version, FORMAT_VERSION);

        let black = SerializableColor::black();
        assert_eq!(
            Snapshot::baseline(black),
            SceneDocument::empty(black).to_snapshot().unwrap()
        );
    }

    #[test]
    fn test_named_failures() {
        assert!(matches!(validate_snapshot("not json"), Err(SnapshotError::Json(_))));
        assert!(matches!(validate_snapshot("[]"), Err(SnapshotError::NotAnObject)));
        assert!(matches!(
            validate_snapshot(r##"{"objects":[],"background":"#fff"}"##),
            Err(SnapshotError::MissingVersion)
        ));
        assert!(matches!(
            validate_snapshot(r##"{"version":"1.0","background":"#fff"}"##),
            Err(SnapshotError::MissingObjects)
        ));
        assert!(matches!(
            validate_snapshot(r##"{"version":"1.0","objects":{},"background":"#fff"}"##),
            Err(SnapshotError::ObjectsNotList)
        ));
        assert!(matches!(
            validate_snapshot(r#"{"version":"1.0","objects":[]}"#),
            Err(SnapshotError::MissingBackground)
        ));
        assert!(matches!(
            validate_snapshot(r#"{"version":"1.0","objects":[],"background":"blue-ish"}"#),
            Err(SnapshotError::InvalidBackground(_))
        ));
    }

    #[test]
    fn test_invalid_object_reports_index() {
        let raw = r##"{"version":"1.0","objects":[{"type":"blob"}],"background":"#fff"}"##;
        assert!(matches!(
            validate_snapshot(raw),
            Err(SnapshotError::InvalidObject { index: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(1.0, 1.0), 5.0, 5.0));
        let doc = SceneDocument {
            version: FORMAT_VERSION.to_string(),
            objects: vec![rect.clone(), rect],
            background: SerializableColor::white(),
        };
        let snapshot = doc.to_snapshot().unwrap();
        assert!(matches!(
            snapshot.document(),
            Err(SnapshotError::InvalidObject { index: 1, .. })
        ));
    }

    #[test]
    fn test_document_roundtrip_is_stable() {
        let doc = SceneDocument {
            version: FORMAT_VERSION.to_string(),
            objects: vec![Shape::Rectangle(Rectangle::new(Point::new(1.0, 2.0), 3.0, 4.0))],
            background: SerializableColor::white(),
        };
        let first = doc.to_snapshot().unwrap();
        let second = first.document().unwrap().to_snapshot().unwrap();
        assert_eq!(first, second);
    }
}
