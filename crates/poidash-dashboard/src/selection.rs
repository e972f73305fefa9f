/// The single "currently focused POI" shared by the map and the table.
///
/// Holds at most one id. Views derive their highlighting from
/// [`SelectionState::is_selected`] and never keep a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<String>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id`, or clears the selection when `id` is already selected.
    ///
    /// Returns the selection after the toggle.
    pub fn toggle(&mut self, id: &str) -> Option<&str> {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_string());
        }
        self.selected.as_deref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }
}
