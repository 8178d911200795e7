//! Annotation store
//!
//! Rows are dense lanes of titled intervals (sections, lyrics, markers).
//! Within a row no two intervals may overlap, using the half-open rule
//! `a.start < b.end && b.start < a.end`: intervals that merely touch are fine.
//!
//! Annotations are deliberately left alone by time shifts, so they do not
//! follow notes when time is inserted or removed.

use crate::models::{Annotation, AnnotationRows, Position};

/// Borrowed view over the annotation rows of a document
pub struct AnnotationStore<'a> {
    rows: &'a mut AnnotationRows,
}

impl<'a> AnnotationStore<'a> {
    pub fn new(rows: &'a mut AnnotationRows) -> Self {
        Self { rows }
    }

    /// Add `annotation` to `row`
    ///
    /// Returns `None`, leaving the row untouched, when the interval is empty
    /// or overlaps an existing annotation on the row.
    pub fn create_annotation(&mut self, row: usize, annotation: Annotation) -> Option<&Annotation> {
        if !annotation.is_valid() {
            log::debug!(
                "create_annotation: empty interval [{}, {}) refused",
                annotation.start,
                annotation.end
            );
            return None;
        }

        let of_row = self.rows.entry(row).or_default();
        if let Some(existing) = of_row.iter().find(|a| a.overlaps(&annotation)) {
            log::debug!(
                "create_annotation: [{}, {}) overlaps [{}, {}) on row {}",
                annotation.start,
                annotation.end,
                existing.start,
                existing.end,
                row
            );
            return None;
        }
        of_row.push(annotation);
        of_row.last()
    }

    /// Remove the first annotation on `row` spanning exactly `[start, end)`
    ///
    /// Missing annotations are not an error.
    pub fn delete_annotation(&mut self, row: usize, start: Position, end: Position) -> Option<Annotation> {
        let of_row = self.rows.get_mut(&row)?;
        let index = of_row.iter().position(|a| a.start == start && a.end == end)?;
        Some(of_row.remove(index))
    }

    /// Retitle the annotation on `row` spanning exactly `[start, end)`
    pub fn set_title(&mut self, row: usize, start: Position, end: Position, title: impl Into<String>) -> bool {
        let found = self
            .rows
            .get_mut(&row)
            .and_then(|of_row| of_row.iter_mut().find(|a| a.start == start && a.end == end));
        match found {
            Some(annotation) => {
                annotation.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Annotations on `row`; empty for unknown rows
    pub fn get_annotations(&self, row: usize) -> &[Annotation] {
        self.rows.get(&row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The annotation on `row` covering `position`, if any
    pub fn annotation_at(&self, row: usize, position: Position) -> Option<&Annotation> {
        self.get_annotations(row).iter().find(|a| a.contains(position))
    }

    pub fn get_rows(&self) -> Vec<usize> {
        self.rows.keys().copied().collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Open a new empty row after the last one and return its index
    pub fn create_next_row(&mut self) -> usize {
        let next = self.rows.keys().next_back().map_or(0, |last| last + 1);
        self.rows.insert(next, Vec::new());
        next
    }
}
