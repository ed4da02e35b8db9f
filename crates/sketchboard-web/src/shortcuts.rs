//! Keyboard shortcut registry and documentation.

use sketchboard_core::{Mode, ShapeKind};

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    SetMode(Mode),
    /// Abort the current gesture or text entry.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new("Z", true, false, Undo, "Undo"),
            Shortcut::new("Z", true, true, Redo, "Redo"),
            Shortcut::new("Y", true, false, Redo, "Redo"),
            Shortcut::new("P", false, false, SetMode(Mode::Pen), "Pen"),
            Shortcut::new("E", false, false, SetMode(Mode::Eraser), "Eraser"),
            Shortcut::new("V", false, false, SetMode(Mode::Select), "Select"),
            Shortcut::new("T", false, false, SetMode(Mode::Text), "Text"),
            Shortcut::new("R", false, false, SetMode(Mode::Shape(ShapeKind::Rectangle)), "Rectangle"),
            Shortcut::new("O", false, false, SetMode(Mode::Shape(ShapeKind::Ellipse)), "Ellipse"),
            Shortcut::new("A", false, false, SetMode(Mode::Shape(ShapeKind::Arrow)), "Arrow"),
            Shortcut::new("Escape", false, false, Cancel, "Cancel"),
        ]
    }

    /// Find the action bound to a key press.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, ctrl, shift))
            .map(|s| s.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let redo = Shortcut::new("Z", true, true, ShortcutAction::Redo, "Redo");
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
    }

    #[test]
    fn test_lookup() {
        assert_eq!(ShortcutRegistry::lookup("z", true, false), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutRegistry::lookup("Z", true, true), Some(ShortcutAction::Redo));
        assert_eq!(
            ShortcutRegistry::lookup("r", false, false),
            Some(ShortcutAction::SetMode(Mode::Shape(ShapeKind::Rectangle)))
        );
        assert_eq!(ShortcutRegistry::lookup("q", false, false), None);
        assert_eq!(ShortcutRegistry::lookup("p", true, false), None);
    }
}
