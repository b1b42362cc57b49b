//! Secret-code keystroke matcher
//!
//! A finite-state matcher over a fixed uppercase word. Typing the expected
//! next letter advances the state; any other letter resets it without being
//! reconsidered as a fresh start. Non-letter keys are ignored so modifier
//! noise cannot break a streak.

/// Result of feeding one key to the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The key matched; `0..target_len` letters are now lit
    Advanced(usize),
    /// A letter broke the streak
    Reset,
    /// The whole word matched; the matcher has already reset itself
    Matched,
    /// Not a letter; state unchanged
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SecretCode {
    target: String,
    index: usize,
}

impl SecretCode {
    /// `target` must be non-empty ASCII letters; it is uppercased internally
    pub fn new(target: &str) -> Self {
        debug_assert!(!target.is_empty() && target.chars().all(|c| c.is_ascii_alphabetic()));
        Self {
            target: target.to_ascii_uppercase(),
            index: 0,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Letters currently matched
    pub fn progress(&self) -> usize {
        self.index
    }

    /// Feed one key press
    pub fn feed(&mut self, key: char) -> Progress {
        if !key.is_ascii_alphabetic() {
            return Progress::Ignored;
        }
        let key = key.to_ascii_uppercase();
        let expected = self.target.as_bytes()[self.index] as char;
        if key == expected {
            self.index += 1;
            if self.index == self.target.len() {
                self.index = 0;
                Progress::Matched
            } else {
                Progress::Advanced(self.index)
            }
        } else {
            self.index = 0;
            Progress::Reset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match() {
        let mut code = SecretCode::new("ELEVATE");
        for (i, c) in "ELEVAT".chars().enumerate() {
            assert_eq!(code.feed(c), Progress::Advanced(i + 1));
        }
        assert_eq!(code.feed('E'), Progress::Matched);
        assert_eq!(code.progress(), 0, "matcher resets after a match");
    }

    #[test]
    fn test_lowercase_accepted() {
        let mut code = SecretCode::new("ELEVATE");
        for c in "elevate".chars() {
            code.feed(c);
        }
        assert_eq!(code.progress(), 0);
    }

    #[test]
    fn test_wrong_letter_resets_without_restart() {
        let mut code = SecretCode::new("ELEVATE");
        code.feed('E');
        code.feed('L');
        // 'E' is wrong here and is NOT treated as a new first letter
        assert_eq!(code.feed('X'), Progress::Reset);
        assert_eq!(code.progress(), 0);
        // A wrong letter that happens to equal the first letter also resets
        code.feed('E');
        assert_eq!(code.feed('E'), Progress::Reset);
        assert_eq!(code.progress(), 0);
    }

    #[test]
    fn test_non_letters_ignored() {
        let mut code = SecretCode::new("ELEVATE");
        code.feed('E');
        assert_eq!(code.feed(' '), Progress::Ignored);
        assert_eq!(code.feed('3'), Progress::Ignored);
        assert_eq!(code.progress(), 1);
    }
}
