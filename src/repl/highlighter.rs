//! Token styling for the input line and the completion menu
//!
//! Styling is a capability behind the [`Styler`] trait: the renderer and the
//! highlighter only say *what* a piece of text is, and the styler decides how
//! it looks. [`PlainStyler`] is used when color output is disabled.

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::parser::{ShellLexer, TokenKind};

/// What a piece of text represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Token(TokenKind),
    /// The selected menu row
    Selected,
    /// Candidate description in the menu
    Description,
    /// Scroll position row under the menu
    Indicator,
}

/// Apply a style to text
pub trait Styler: Send + Sync {
    fn apply(&self, kind: StyleKind, text: &str) -> String;
}

/// Style of a token kind in the input line
pub fn token_style(kind: TokenKind) -> Style {
    match kind {
        TokenKind::Command => Style::new().bold(),
        TokenKind::Option => Color::Cyan.normal(),
        TokenKind::Path => Style::new().underline(),
        TokenKind::Entity => Color::Magenta.normal(),
        TokenKind::Operator => Color::Yellow.normal(),
        TokenKind::String => Color::Green.normal(),
        TokenKind::Argument | TokenKind::Whitespace => Style::default(),
    }
}

/// ANSI escape styling
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiStyler;

impl AnsiStyler {
    pub fn style(&self, kind: StyleKind) -> Style {
        match kind {
            StyleKind::Token(kind) => token_style(kind),
            StyleKind::Selected => Style::new().reverse(),
            StyleKind::Description => Style::new().dimmed(),
            StyleKind::Indicator => Color::DarkGray.normal(),
        }
    }
}

impl Styler for AnsiStyler {
    fn apply(&self, kind: StyleKind, text: &str) -> String {
        let style = self.style(kind);
        if style == Style::default() {
            return text.to_string();
        }
        style.paint(text).to_string()
    }
}

/// No styling at all
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn apply(&self, _kind: StyleKind, text: &str) -> String {
        text.to_string()
    }
}

/// Styler matching the color setting
pub fn styler_for(color: bool) -> Box<dyn Styler> {
    if color {
        Box::new(AnsiStyler)
    } else {
        Box::new(PlainStyler)
    }
}

/// Highlights an input line token by token
pub struct TokenHighlighter {
    enabled: bool,
}

impl TokenHighlighter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Render `line` through `styler`
    pub fn highlight_with(&self, line: &str, styler: &dyn Styler) -> String {
        if !self.enabled {
            return line.to_string();
        }
        ShellLexer::tokenize(line)
            .iter()
            .map(|token| styler.apply(StyleKind::Token(token.kind), &token.value))
            .collect()
    }
}

impl Default for TokenHighlighter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Highlighter for TokenHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        if !self.enabled {
            styled.push((Style::default(), line.to_string()));
            return styled;
        }
        for token in ShellLexer::tokenize(line) {
            styled.push((token_style(token.kind), token.value));
        }
        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_styler_is_identity() {
        let styler = PlainStyler;
        assert_eq!(styler.apply(StyleKind::Selected, "git"), "git");
        assert_eq!(
            TokenHighlighter::new(true).highlight_with("ls -la | wc", &styler),
            "ls -la | wc"
        );
    }

    #[test]
    fn test_ansi_styler_wraps_styled_kinds() {
        let styler = AnsiStyler;
        let bold = styler.apply(StyleKind::Token(TokenKind::Command), "ls");
        assert!(bold.starts_with("\u{1b}["));
        assert!(bold.contains("ls"));

        // Plain kinds are left untouched
        assert_eq!(styler.apply(StyleKind::Token(TokenKind::Argument), "x"), "x");
    }

    #[test]
    fn test_disabled_highlighter() {
        let line = "git status";
        assert_eq!(
            TokenHighlighter::new(false).highlight_with(line, &AnsiStyler),
            line
        );
    }

    #[test]
    fn test_reedline_highlight_covers_line() {
        let line = "cat \"a b\" | grep -n @x";
        let styled = TokenHighlighter::default().highlight(line, 0);
        let text: String = styled.buffer.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(text, line);
        assert_eq!(styled.buffer[0].0, Style::new().bold());
    }
}
