//! Line-oriented view over layout text.

/// Lines of one statement. Line numbers are 1-based and count the
/// `--- Page 1 ---` header as line 1.
#[derive(Debug, Clone)]
pub struct StatementLines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> StatementLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line by 1-based number.
    pub fn line(&self, number: usize) -> Option<&'a str> {
        number.checked_sub(1).and_then(|i| self.lines.get(i).copied())
    }

    /// Line by 0-based index.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    /// First line containing `needle`.
    pub fn first_containing(&self, needle: &str) -> Option<&'a str> {
        self.lines.iter().copied().find(|line| line.contains(needle))
    }

    /// 0-based index of the first line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_numbers_are_one_based() {
        let lines = StatementLines::new("--- Page 1 ---\nsecond\nthird");
        assert_eq!(lines.line(1), Some("--- Page 1 ---"));
        assert_eq!(lines.line(3), Some("third"));
        assert_eq!(lines.line(0), None);
        assert_eq!(lines.line(4), None);
        assert_eq!(lines.get(1), Some("second"));
    }

    #[test]
    fn test_search() {
        let lines = StatementLines::new("a\nFees 1 x\nFees 1 y");
        assert_eq!(lines.first_containing("Fees 1"), Some("Fees 1 x"));
        assert_eq!(lines.position("Fees 1"), Some(1));
        assert_eq!(lines.position("missing"), None);
    }
}
