//! Quote and escape state scanning
//!
//! Both the lexer and the trigger detector need to know whether a position
//! sits inside a quoted run. They share this one state machine so that the
//! two never disagree on edge cases such as escaped or unterminated quotes.
//!
//! Rules:
//! - `'` and `"` open a quoted run that is closed by the same character
//! - a backslash escapes the following character in every context
//! - an unterminated quote stays open until the end of input

/// Quoting context at a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    #[default]
    None,
    Single,
    Double,
}

impl QuoteState {
    pub fn is_open(&self) -> bool {
        !matches!(self, QuoteState::None)
    }

    fn closing_char(&self) -> Option<char> {
        match self {
            QuoteState::None => None,
            QuoteState::Single => Some('\''),
            QuoteState::Double => Some('"'),
        }
    }
}

/// Returns true for the characters that open a quoted run
pub fn is_quote(ch: char) -> bool {
    ch == '\'' || ch == '"'
}

/// Stepping quote/escape state machine
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteTracker {
    quote: QuoteState,
    escaped: bool,
}

impl QuoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quoting context
    pub fn state(&self) -> QuoteState {
        self.quote
    }

    /// Whether the next character will be taken literally
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Advance the state machine over one character
    pub fn feed(&mut self, ch: char) {
        if self.escaped {
            self.escaped = false;
            return;
        }

        if ch == '\\' {
            self.escaped = true;
            return;
        }

        match self.quote {
            QuoteState::None => {
                self.quote = match ch {
                    '\'' => QuoteState::Single,
                    '"' => QuoteState::Double,
                    _ => QuoteState::None,
                };
            }
            open => {
                if open.closing_char() == Some(ch) {
                    self.quote = QuoteState::None;
                }
            }
        }
    }
}

/// Quoting context just before `pos`, scanning from the start of the line
///
/// Positions past the end of input report the state at end of input, so an
/// unterminated quote is reported as open.
pub fn quote_state_at(chars: &[char], pos: usize) -> QuoteState {
    let mut tracker = QuoteTracker::new();
    for &ch in chars.iter().take(pos) {
        tracker.feed(ch);
    }
    tracker.state()
}

/// Index one past the quote that closes the run opened at `open`
///
/// Returns `chars.len()` when the run is unterminated. `chars[open]` must be
/// a quote character; anything else yields `open + 1`.
pub fn find_string_end(chars: &[char], open: usize) -> usize {
    let Some(&first) = chars.get(open) else {
        return chars.len();
    };
    if !is_quote(first) {
        return open + 1;
    }

    let mut tracker = QuoteTracker::new();
    tracker.feed(first);

    for (offset, &ch) in chars[open + 1..].iter().enumerate() {
        tracker.feed(ch);
        if !tracker.state().is_open() {
            return open + 1 + offset + 1;
        }
    }

    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_quote_state_outside() {
        let input = chars("echo hello");
        assert_eq!(quote_state_at(&input, 5), QuoteState::None);
    }

    #[test]
    fn test_quote_state_inside_double() {
        let input = chars("echo \"hi @there\"");
        assert_eq!(quote_state_at(&input, 9), QuoteState::Double);
        assert_eq!(quote_state_at(&input, input.len()), QuoteState::None);
    }

    #[test]
    fn test_quote_state_single_ignores_double() {
        let input = chars("echo 'a \" b' c");
        assert_eq!(quote_state_at(&input, 9), QuoteState::Single);
        assert_eq!(quote_state_at(&input, 13), QuoteState::None);
    }

    #[test]
    fn test_escaped_quote_does_not_open() {
        let input = chars("echo \\\"x @y");
        assert_eq!(quote_state_at(&input, 9), QuoteState::None);
    }

    #[test]
    fn test_unterminated_stays_open() {
        let input = chars("say \"never closed");
        assert!(quote_state_at(&input, input.len()).is_open());
        assert!(quote_state_at(&input, 100).is_open());
    }

    #[test]
    fn test_find_string_end() {
        let input = chars("\"abc\" rest");
        assert_eq!(find_string_end(&input, 0), 5);

        let escaped = chars("'it\\'s' x");
        assert_eq!(find_string_end(&escaped, 0), 7);

        let open = chars("\"abc");
        assert_eq!(find_string_end(&open, 0), 4);
    }
}
