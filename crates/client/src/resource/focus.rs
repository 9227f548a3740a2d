//! Foreground signals that trigger silent revalidation.

/// Page visibility as reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// A focus or visibility change reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    /// The window regained focus.
    Focus,
    /// The document visibility changed.
    Visibility(Visibility),
}

impl FocusEvent {
    /// Only events that bring the application to the foreground revalidate.
    pub fn is_foreground(self) -> bool {
        matches!(self, FocusEvent::Focus | FocusEvent::Visibility(Visibility::Visible))
    }
}
