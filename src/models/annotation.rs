//! Annotations: titled half-open intervals on a lane ("row")

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::position::Position;

/// row index -> annotations on that row
pub type AnnotationRows = BTreeMap<usize, Vec<Annotation>>;

/// A titled interval `[start, end)` on one annotation row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub start: Position,
    pub end: Position,
    #[serde(default)]
    pub title: String,
}

impl Annotation {
    pub fn new(start: Position, end: Position, title: impl Into<String>) -> Self {
        Self {
            start,
            end,
            title: title.into(),
        }
    }

    /// Whether `[start, end)` is non-empty
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Half-open overlap: touching intervals (`[0,4)` and `[4,5)`) do not overlap
    pub fn overlaps(&self, other: &Annotation) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if a position is covered by this annotation
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u16, end: u16) -> Annotation {
        Annotation::new(Position::from_quarters(start), Position::from_quarters(end), "")
    }

    #[test]
    fn test_overlap_is_half_open() {
        assert!(span(0, 4).overlaps(&span(2, 6)));
        assert!(span(2, 6).overlaps(&span(0, 4)));
        assert!(span(0, 8).overlaps(&span(2, 3)));
        assert!(!span(0, 4).overlaps(&span(4, 5)));
        assert!(!span(4, 5).overlaps(&span(0, 4)));
    }

    #[test]
    fn test_contains() {
        let a = span(1, 3);
        assert!(a.contains(Position::from_quarters(1)));
        assert!(!a.contains(Position::from_quarters(3)));
    }
}
