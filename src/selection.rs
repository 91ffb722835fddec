//! Which sample the views are currently focused on
//!
//! The scatterplot, the tree colouring and the density chart all follow the
//! same [`Selection`]. It is owned by the caller and only changes through
//! [`Selection::apply`]; views are recomputed from it.

use std::fmt::Display;

use log::trace;

/// Stable identifier of a sample (participant)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(pub String);

impl From<&str> for SampleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer interactions with a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// The pointer entered a sample
    Hover(SampleId),
    /// The pointer left a sample
    Unhover(SampleId),
    /// A sample was clicked
    Click(SampleId),
}

/// The hovered and selected samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    hovered: Option<SampleId>,
    selected: Option<SampleId>,
}

impl Selection {
    /// Nothing hovered, nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the selection and returns whether it changed.
    ///
    /// Clicking toggles the selection of a sample, but while a sample is
    /// selected clicks on other samples are ignored.
    /// ```
    /// use neutscape::selection::{Selection, SelectionEvent};
    ///
    /// let mut selection = Selection::new();
    /// selection.apply(SelectionEvent::Click("P1".into()));
    /// assert!(!selection.apply(SelectionEvent::Click("P2".into())));
    /// assert_eq!(selection.selected().map(|id| id.0.as_str()), Some("P1"));
    ///
    /// selection.apply(SelectionEvent::Click("P1".into()));
    /// assert_eq!(selection.selected(), None);
    /// ```
    pub fn apply(&mut self, event: SelectionEvent) -> bool {
        trace!("Selection event {event:?}");
        let before = self.clone();

        match event {
            SelectionEvent::Hover(id) => self.hovered = Some(id),
            SelectionEvent::Unhover(id) => {
                if self.hovered.as_ref() == Some(&id) {
                    self.hovered = None
                }
            }
            SelectionEvent::Click(id) => {
                if self.selected.is_none() {
                    self.selected = Some(id)
                } else if self.selected.as_ref() == Some(&id) {
                    self.selected = None
                }
            }
        }

        *self != before
    }

    /// The sample under the pointer
    pub fn hovered(&self) -> Option<&SampleId> {
        self.hovered.as_ref()
    }

    /// The clicked sample
    pub fn selected(&self) -> Option<&SampleId> {
        self.selected.as_ref()
    }

    /// The sample the linked views show: the selected sample
    /// if there is one, otherwise the hovered one.
    pub fn active(&self) -> Option<&SampleId> {
        self.selected.as_ref().or(self.hovered.as_ref())
    }

    /// Check if `id` is the selected sample
    pub fn is_selected(&self, id: &SampleId) -> bool {
        self.selected.as_ref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SelectionEvent::*;

    #[test]
    fn hover_drives_active_sample() {
        let mut selection = Selection::new();
        assert_eq!(selection.active(), None);

        assert!(selection.apply(Hover("P1".into())));
        assert_eq!(selection.active(), Some(&SampleId::from("P1")));
        assert!(!selection.apply(Hover("P1".into())));

        // Leaving another sample does not clear the hover
        assert!(!selection.apply(Unhover("P2".into())));
        assert!(selection.apply(Unhover("P1".into())));
        assert_eq!(selection.active(), None);
    }

    #[test]
    fn selection_overrides_hover() {
        let mut selection = Selection::new();
        selection.apply(Click("P1".into()));
        selection.apply(Hover("P2".into()));

        assert_eq!(selection.hovered(), Some(&SampleId::from("P2")));
        assert_eq!(selection.active(), Some(&SampleId::from("P1")));
        assert!(selection.is_selected(&"P1".into()));
        assert!(!selection.is_selected(&"P2".into()));
    }

    #[test]
    fn click_toggles() {
        let mut selection = Selection::new();
        assert!(selection.apply(Click("P1".into())));
        assert!(!selection.apply(Click("P2".into())));
        assert!(selection.apply(Click("P1".into())));
        assert_eq!(selection.selected(), None);
        assert!(selection.apply(Click("P2".into())));
        assert_eq!(selection.selected(), Some(&SampleId::from("P2")));
    }

    #[test]
    fn compares_by_identifier() {
        let mut selection = Selection::new();
        selection.apply(Click(SampleId("P1".to_string())));
        let same = SampleId::from("P1");
        assert!(selection.is_selected(&same));
        assert_eq!(format!("{same}"), "P1");
    }
}
