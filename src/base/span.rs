//! Positions of identifiers within a source unit.

use std::fmt;

/// Where an identifier token starts, counted from zero.
///
/// Cross-reference maps are keyed on these, so two tokens of one unit never
/// share a position. Ordering follows the source text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

// Editors count from one.
impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_print_for_editors() {
        assert_eq!(LineCol::default().to_string(), "1:1");
        assert_eq!(LineCol::new(11, 3).to_string(), "12:4");
        assert_eq!(format!("{:?}", LineCol::new(11, 3)), "12:4");
    }

    #[test]
    fn test_positions_sort_in_source_order() {
        let mut positions = vec![LineCol::new(4, 0), LineCol::new(2, 9), LineCol::new(2, 1)];
        positions.sort();
        assert_eq!(positions, [LineCol::new(2, 1), LineCol::new(2, 9), LineCol::new(4, 0)]);
    }
}
