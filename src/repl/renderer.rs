//! Terminal rendering of the completion menu
//!
//! The menu is drawn below the input line without moving the editor's cursor:
//! every frame is wrapped in save/restore cursor. Output is built by queuing
//! crossterm commands into a buffer so callers decide where it is written.

use std::io::Write;
use std::ops::Range;

use crossterm::cursor::{Hide, MoveDown, MoveToColumn, MoveUp, RestorePosition, SavePosition, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::highlighter::{StyleKind, Styler};
use super::menu::CompletionMenu;
use crate::config::MenuConfig;
use crate::error::Result;

/// Default number of rows shown at once
pub const DEFAULT_MAX_VISIBLE: usize = 10;

/// Default column width of candidate values
pub const DEFAULT_VALUE_WIDTH: usize = 30;

const SELECTED_MARKER: &str = "❯ ";
const UNSELECTED_MARKER: &str = "  ";

/// Slice of candidates to show, keeping the selection roughly centered
///
/// The window never runs past either end of the list.
pub fn visible_window(total: usize, selected: usize, max_visible: usize) -> Range<usize> {
    if total <= max_visible {
        return 0..total;
    }
    let max_start = total - max_visible;
    let start = selected.saturating_sub(max_visible / 2).min(max_start);
    start..start + max_visible
}

/// Fit `text` into exactly `width` columns, truncating with an ellipsis
fn fit_width(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }
    if width == 0 {
        return String::new();
    }

    let mut used = 0;
    let mut fitted: String = text
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used < width
        })
        .collect();
    fitted.push('…');
    let fitted_width = fitted.width();
    fitted.push_str(&" ".repeat(width.saturating_sub(fitted_width)));
    fitted
}

/// Draws a [`CompletionMenu`] and remembers how much it drew
#[derive(Debug, Clone)]
pub struct MenuRenderer {
    pub max_visible: usize,
    pub value_width: usize,
    pub hide_cursor: bool,
    pub show_scroll_indicator: bool,
    last_rendered_lines: usize,
}

impl Default for MenuRenderer {
    fn default() -> Self {
        Self {
            max_visible: DEFAULT_MAX_VISIBLE,
            value_width: DEFAULT_VALUE_WIDTH,
            hide_cursor: false,
            show_scroll_indicator: true,
            last_rendered_lines: 0,
        }
    }
}

impl From<&MenuConfig> for MenuRenderer {
    fn from(config: &MenuConfig) -> Self {
        Self {
            max_visible: config.max_visible,
            value_width: config.value_width,
            hide_cursor: config.hide_cursor,
            show_scroll_indicator: config.show_scroll_indicator,
            last_rendered_lines: 0,
        }
    }
}

impl MenuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines drawn by the last [`render`](Self::render)
    pub fn last_rendered_lines(&self) -> usize {
        self.last_rendered_lines
    }

    /// One menu row without the leading newline
    fn format_row(&self, menu: &CompletionMenu, index: usize, styler: &dyn Styler) -> String {
        let completion = &menu.completions()[index];
        let is_selected = index == menu.selected_index();

        let marker = if is_selected {
            SELECTED_MARKER
        } else {
            UNSELECTED_MARKER
        };
        let icon = completion
            .icon
            .as_deref()
            .map(|icon| format!("{icon} "))
            .unwrap_or_default();
        let value = fit_width(completion.label(), self.value_width);

        let head = format!("{marker}{icon}{value}");
        let mut row = if is_selected {
            styler.apply(StyleKind::Selected, &head)
        } else {
            head
        };

        if let Some(description) = completion.description.as_deref() {
            row.push(' ');
            row.push_str(&styler.apply(StyleKind::Description, description));
        }
        row
    }

    /// Erase sequence for whatever the previous frame drew
    fn queue_clear(&self, out: &mut Vec<u8>) -> Result<()> {
        let lines = self.last_rendered_lines;
        if lines == 0 {
            return Ok(());
        }

        queue!(out, SavePosition, MoveDown(lines as u16))?;
        for _ in 0..lines {
            queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), MoveUp(1))?;
        }
        queue!(out, RestorePosition)?;
        Ok(())
    }

    /// Draw `menu` below the cursor, replacing the previous frame
    ///
    /// An inactive menu just erases the previous frame.
    pub fn render(&mut self, menu: &CompletionMenu, styler: &dyn Styler) -> Result<String> {
        let mut out = Vec::new();
        self.queue_clear(&mut out)?;
        self.last_rendered_lines = 0;

        if !menu.is_active() {
            return Ok(String::from_utf8_lossy(&out).into_owned());
        }

        let window = visible_window(menu.len(), menu.selected_index(), self.max_visible);
        let mut lines = 0;

        queue!(out, SavePosition)?;
        if self.hide_cursor {
            queue!(out, Hide)?;
        }

        for index in window.clone() {
            write!(out, "\r\n")?;
            queue!(out, Clear(ClearType::CurrentLine))?;
            write!(out, "{}", self.format_row(menu, index, styler))?;
            lines += 1;
        }

        if self.show_scroll_indicator && window.len() < menu.len() {
            let indicator = format!(
                "  ({}/{}, ↑↓ to scroll)",
                menu.selected_index() + 1,
                menu.len()
            );
            write!(out, "\r\n")?;
            queue!(out, Clear(ClearType::CurrentLine))?;
            write!(out, "{}", styler.apply(StyleKind::Indicator, &indicator))?;
            lines += 1;
        }

        queue!(out, RestorePosition)?;
        if self.hide_cursor {
            queue!(out, Show)?;
        }

        self.last_rendered_lines = lines;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Erase the previous frame
    pub fn clear(&mut self) -> Result<String> {
        let mut out = Vec::new();
        self.queue_clear(&mut out)?;
        self.last_rendered_lines = 0;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::completion::{Completion, CompletionGroup};
    use crate::repl::highlighter::PlainStyler;

    const CLEAR_LINE: &str = "\u{1b}[2K";
    const MOVE_UP_ONE: &str = "\u{1b}[1A";

    fn menu(n: usize) -> CompletionMenu {
        let mut menu = CompletionMenu::new();
        menu.set_completions(
            (0..n)
                .map(|i| {
                    Completion::new(format!("item{i}"), CompletionGroup::Other, 1.0, "test")
                        .with_description(format!("desc{i}"))
                })
                .collect(),
        );
        menu
    }

    #[test]
    fn test_visible_window_centered() {
        assert_eq!(visible_window(100, 50, 10), 45..55);
    }

    #[test]
    fn test_visible_window_clamped() {
        assert_eq!(visible_window(100, 0, 10), 0..10);
        assert_eq!(visible_window(100, 2, 10), 0..10);
        assert_eq!(visible_window(100, 99, 10), 90..100);
        assert_eq!(visible_window(100, 97, 10), 90..100);
        assert_eq!(visible_window(3, 2, 10), 0..3);
        assert_eq!(visible_window(0, 0, 10), 0..0);
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("git", 5), "git  ");
        assert_eq!(fit_width("abcdefgh", 5), "abcd…");
        assert_eq!(fit_width("abcdefgh", 5).width(), 5);
    }

    #[test]
    fn test_render_rows() {
        let mut renderer = MenuRenderer::new();
        let output = renderer.render(&menu(3), &PlainStyler).unwrap();

        assert!(output.contains("❯ item0"));
        assert!(output.contains("  item1"));
        assert!(output.contains("desc2"));
        assert_eq!(output.matches(CLEAR_LINE).count(), 3);
        assert_eq!(renderer.last_rendered_lines(), 3);
        assert!(output.starts_with("\u{1b}7"));
        assert!(output.ends_with("\u{1b}8"));
    }

    #[test]
    fn test_render_scroll_indicator() {
        let mut renderer = MenuRenderer::new();
        let mut long = menu(25);
        for _ in 0..12 {
            long.select_next();
        }
        let output = renderer.render(&long, &PlainStyler).unwrap();

        assert_eq!(renderer.last_rendered_lines(), DEFAULT_MAX_VISIBLE + 1);
        assert!(output.contains("(13/25"));
        assert!(output.contains("❯ item12"));
        assert!(!output.contains("item6 "));
        assert!(output.contains("item7"));
    }

    #[test]
    fn test_hide_cursor() {
        let mut renderer = MenuRenderer {
            hide_cursor: true,
            ..MenuRenderer::default()
        };
        let output = renderer.render(&menu(1), &PlainStyler).unwrap();
        assert!(output.contains("\u{1b}[?25l"));
        assert!(output.contains("\u{1b}[?25h"));
    }

    #[test]
    fn test_clear_erases_previous_frame() {
        let mut renderer = MenuRenderer::new();
        renderer.render(&menu(4), &PlainStyler).unwrap();

        let output = renderer.clear().unwrap();
        assert!(output.contains("\u{1b}[4B"));
        assert_eq!(output.matches(CLEAR_LINE).count(), 4);
        assert_eq!(output.matches(MOVE_UP_ONE).count(), 4);
        assert_eq!(renderer.last_rendered_lines(), 0);

        // Nothing left to clear
        assert_eq!(renderer.clear().unwrap(), "");
    }

    #[test]
    fn test_inactive_menu_only_clears() {
        let mut renderer = MenuRenderer::new();
        renderer.render(&menu(2), &PlainStyler).unwrap();
        let output = renderer.render(&CompletionMenu::new(), &PlainStyler).unwrap();
        assert_eq!(output.matches(CLEAR_LINE).count(), 2);
        assert!(!output.contains("item"));
    }
}
