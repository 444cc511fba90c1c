//! Completion menu state

use super::completion::Completion;

/// Ranked candidates plus a selection cursor
///
/// The menu is Active while it holds at least one candidate. The selection
/// always points at a valid candidate when Active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionMenu {
    completions: Vec<Completion>,
    selected_index: usize,
}

impl CompletionMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidates, selecting the first one
    pub fn set_completions(&mut self, completions: Vec<Completion>) {
        self.completions = completions;
        self.selected_index = 0;
    }

    /// Drop all candidates; the menu becomes Inactive
    pub fn clear(&mut self) {
        self.completions.clear();
        self.selected_index = 0;
    }

    pub fn is_active(&self) -> bool {
        !self.completions.is_empty()
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&Completion> {
        self.completions.get(self.selected_index)
    }

    /// Move the selection down, wrapping to the top
    pub fn select_next(&mut self) {
        if !self.completions.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.completions.len();
        }
    }

    /// Move the selection up, wrapping to the bottom
    pub fn select_previous(&mut self) {
        if !self.completions.is_empty() {
            if self.selected_index == 0 {
                self.selected_index = self.completions.len() - 1;
            } else {
                self.selected_index -= 1;
            }
        }
    }

    /// Take the selected candidate and deactivate the menu
    pub fn accept(&mut self) -> Option<Completion> {
        let accepted = self.selected().cloned();
        self.clear();
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::completion::CompletionGroup;

    fn menu(n: usize) -> CompletionMenu {
        let mut menu = CompletionMenu::new();
        menu.set_completions(
            (0..n)
                .map(|i| Completion::new(format!("c{i}"), CompletionGroup::Other, 1.0, "test"))
                .collect(),
        );
        menu
    }

    #[test]
    fn test_empty_is_inactive() {
        let mut menu = CompletionMenu::new();
        assert!(!menu.is_active());
        menu.set_completions(Vec::new());
        assert!(!menu.is_active());
        assert!(menu.selected().is_none());

        // Navigation on an empty menu is a no-op
        menu.select_next();
        menu.select_previous();
        assert_eq!(menu.selected_index(), 0);
    }

    #[test]
    fn test_set_completions_selects_first() {
        let mut menu = menu(3);
        menu.select_next();
        menu.set_completions(vec![Completion::new("x", CompletionGroup::Other, 1.0, "t")]);
        assert_eq!(menu.selected_index(), 0);
        assert_eq!(menu.selected().map(|c| c.value.as_str()), Some("x"));
    }

    #[test]
    fn test_wrap_around() {
        let mut menu = menu(3);
        menu.select_previous();
        assert_eq!(menu.selected_index(), 2);
        menu.select_next();
        assert_eq!(menu.selected_index(), 0);

        for _ in 0..3 {
            menu.select_next();
        }
        assert_eq!(menu.selected_index(), 0);
    }

    #[test]
    fn test_accept_deactivates() {
        let mut menu = menu(3);
        menu.select_next();
        let accepted = menu.accept();
        assert_eq!(accepted.map(|c| c.value), Some("c1".to_string()));
        assert!(!menu.is_active());
    }
}
