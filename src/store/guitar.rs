//! Guitar store
//!
//! The guitar-level facade over [`GuitarData`]. Note edits go through the
//! stack store; deleting a note also removes any articulation attached to it,
//! and time shifts move notes and articulations together.

use std::collections::BTreeMap;

use super::stacks::StackStore;
use super::ties::TieStore;
use crate::error::{Result, TabError};
use crate::models::position::offset_ticks;
use crate::models::{GuitarData, GuitarNote, Midi, Position, Rational, Stack};

/// Borrowed view over the guitar data of a document
pub struct GuitarStore<'a> {
    data: &'a mut GuitarData,
}

impl<'a> GuitarStore<'a> {
    pub fn new(data: &'a mut GuitarData) -> Self {
        Self { data }
    }

    /// The note stack store over this guitar's stacks
    pub fn notes(&mut self) -> StackStore<'_> {
        let data = &mut *self.data;
        StackStore::new(&mut data.stacks, data.strings)
    }

    /// The tie/bend store, reading pitches from this guitar's stacks
    pub fn ties(&mut self) -> TieStore<'_> {
        let data = &mut *self.data;
        TieStore::new(&mut data.ties, &data.stacks, data.strings)
    }

    pub fn strings(&self) -> usize {
        self.data.strings
    }

    pub fn tuning(&self) -> &[Midi] {
        &self.data.tuning
    }

    pub fn frets(&self) -> u32 {
        self.data.frets
    }

    /// Pitch of `fret` on `string`, if the string exists and the fret is on the neck
    pub fn fretted_pitch(&self, string: usize, fret: u32) -> Option<Midi> {
        if fret > self.data.frets {
            return None;
        }
        let open = self.data.tuning.get(string)?;
        open.transposed(i32::try_from(fret).ok()?)
    }

    pub fn get_note(&self, position: Position, string: usize) -> Option<&GuitarNote> {
        self.data.stacks.get(&position).and_then(|stack| stack.get(&string))
    }

    /// Place `note` on `string` at `position`; ignored for strings the guitar
    /// does not have. Returns whether the note was stored.
    pub fn set_note(&mut self, position: Position, string: usize, note: GuitarNote) -> bool {
        if string >= self.data.strings {
            log::debug!("set_note: ignoring string {} (strings: {})", string, self.data.strings);
            return false;
        }
        let mut stack = self.data.stacks.get(&position).cloned().unwrap_or_default();
        stack.insert(string, note);
        self.notes().set_stack(position, stack);
        true
    }

    /// Remove the note on `string` at `position` along with any tie or bend
    /// leaving or arriving at it
    pub fn delete_note(&mut self, position: Position, string: usize) -> Option<GuitarNote> {
        let mut stack = self.data.stacks.get(&position)?.clone();
        let removed = stack.remove(&string)?;
        self.notes().set_stack(position, stack);
        self.ties().delete_at(string, position);
        Some(removed)
    }

    /// Delete every note in `[start, end)`, cascading into articulations
    pub fn delete_stacks(&mut self, start: Position, end: Position) {
        if end <= start {
            return;
        }
        let doomed: Vec<(Position, Vec<usize>)> = self
            .data
            .stacks
            .range(start..end)
            .map(|(position, stack)| (*position, stack.keys().copied().collect()))
            .collect();
        for (position, strings) in doomed {
            for string in strings {
                self.delete_note(position, string);
            }
        }
    }

    pub fn last_position(&self) -> Option<Position> {
        self.data.stacks.keys().next_back().copied()
    }

    /// Render grid: one entry per multiple of `subunit` in `[start, end)`
    ///
    /// Positions without notes get an empty stack; stored stacks that do not
    /// fall on a multiple of `subunit` are left out. `subunit` must be a
    /// positive multiple of the position grid.
    pub fn get_stacks(
        &self,
        start: Position,
        end: Position,
        subunit: Rational,
    ) -> Result<BTreeMap<Position, Stack>> {
        let step = offset_ticks(subunit)
            .ok()
            .filter(|ticks| *ticks > 0)
            .ok_or_else(|| TabError::InvalidSpacing(subunit.to_string()))?;
        if end <= start {
            return Ok(BTreeMap::new());
        }

        let mut grid: BTreeMap<Position, Stack> = self
            .data
            .stacks
            .range(start..end)
            .filter(|(position, _)| position.is_multiple_of(subunit))
            .map(|(position, stack)| (*position, stack.clone()))
            .collect();

        // first multiple of the subunit at or after start
        let mut tick = (start.ticks() + step - 1) / step * step;
        while tick < end.ticks() {
            grid.entry(Position::from_ticks(tick)?).or_default();
            tick += step;
        }
        Ok(grid)
    }

    /// Move every note and articulation at or after `position` by `amount`
    ///
    /// Both stores are checked before either is changed, so a rejected shift
    /// leaves the guitar untouched.
    pub fn shift_from(&mut self, position: Position, amount: Rational) -> Result<()> {
        self.notes().check_shift(position, amount)?;
        self.ties().check_shift(position, amount)?;
        self.notes().shift_from(position, amount)?;
        self.ties().shift_from(position, amount)
    }

    /// Open `amount` of empty time at `position`
    pub fn insert_time(&mut self, position: Position, amount: Rational) -> Result<()> {
        if amount <= Rational::from_integer(0) {
            return Err(TabError::InvalidPosition(format!(
                "cannot insert {} of time",
                amount
            )));
        }
        self.shift_from(position, amount)
    }

    /// Cut `[start, end)` out of the guitar view: delete what is inside, then
    /// pull everything after it back to `start`
    pub fn remove_time(&mut self, start: Position, end: Position) -> Result<()> {
        if end <= start {
            return Ok(());
        }
        self.delete_stacks(start, end);
        self.ties().delete_range(start, end);
        self.shift_from(end, start.offset_from(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Articulation, GuitarConfig, TieKind};

    fn pos(value: f64) -> Position {
        Position::try_from(value).unwrap()
    }

    fn note(midi: u8) -> GuitarNote {
        GuitarNote::new(Midi::new(midi).unwrap())
    }

    #[test]
    fn test_set_note_merges_into_stack() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        guitar.set_note(pos(1.0), 0, note(64));
        guitar.set_note(pos(1.0), 5, note(40));
        guitar.set_note(pos(1.0), 6, note(30));

        assert_eq!(guitar.notes().get_stack(pos(1.0)).map(|s| s.len()), Some(2));
        assert_eq!(guitar.get_note(pos(1.0), 5), Some(&note(40)));
    }

    #[test]
    fn test_delete_last_note_removes_stack() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        guitar.set_note(pos(2.0), 1, note(59));
        assert_eq!(guitar.delete_note(pos(2.0), 1), Some(note(59)));
        assert_eq!(guitar.last_position(), None);
        assert_eq!(guitar.delete_note(pos(2.0), 1), None);
    }

    #[test]
    fn test_delete_note_cascades_to_ties() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        guitar.set_note(pos(0.0), 2, note(55));
        guitar.set_note(pos(1.0), 2, note(57));
        guitar.set_note(pos(2.0), 2, note(55));
        guitar.ties().set_tie(2, pos(0.0), Articulation::tie(TieKind::Hammer, pos(1.0)));
        guitar.ties().set_tie(2, pos(1.0), Articulation::tie(TieKind::Hammer, pos(2.0)));

        // destination of the first tie, source of the second
        guitar.delete_note(pos(1.0), 2);
        assert!(guitar.ties().get_ties().is_empty());
    }

    #[test]
    fn test_grid_fills_gaps() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        guitar.set_note(pos(0.5), 0, note(64));
        guitar.set_note(pos(0.75), 0, note(64));

        let grid = guitar.get_stacks(pos(0.0), pos(2.0), Rational::new(1, 2)).unwrap();
        let keys: Vec<Position> = grid.keys().copied().collect();
        assert_eq!(keys, vec![pos(0.0), pos(0.5), pos(1.0), pos(1.5)]);
        assert_eq!(grid[&pos(0.5)].len(), 1);
        assert!(grid[&pos(1.0)].is_empty());
    }

    #[test]
    fn test_grid_starts_at_first_aligned_position() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        guitar.set_note(pos(1.0), 0, note(64));

        let grid = guitar.get_stacks(pos(0.25), pos(2.0), Rational::new(1, 2)).unwrap();
        let keys: Vec<Position> = grid.keys().copied().collect();
        assert_eq!(keys, vec![pos(0.5), pos(1.0), pos(1.5)]);
        assert_eq!(grid[&pos(1.0)].len(), 1);
    }

    #[test]
    fn test_notes_view_drops_strings_the_guitar_lacks() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        let stack: Stack = [(0, note(60)), (9, note(62))].into_iter().collect();
        guitar.notes().set_stack(pos(1.0), stack);
        assert!(!guitar.set_note(pos(2.0), 6, note(64)));

        assert_eq!(guitar.get_note(pos(1.0), 0), Some(&note(60)));
        assert_eq!(guitar.get_note(pos(1.0), 9), None);
        assert_eq!(guitar.last_position(), Some(pos(1.0)));
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_shift_past_last_position_leaves_guitar_untouched() {
        let far = Position::from_ticks(i64::from(i32::MAX)).unwrap();
        let mut data = GuitarData::new(GuitarConfig::default());
        let mut guitar = GuitarStore::new(&mut data);
        guitar.set_note(far, 0, note(64));
        guitar.set_note(pos(1.0), 0, note(64));
        guitar.ties().set_tie(0, pos(1.0), Articulation::tie(TieKind::Hammer, far));

        let result = guitar.shift_from(Position::zero(), far.value());
        assert!(matches!(result, Err(TabError::InvalidPosition(_))));
        assert_eq!(guitar.last_position(), Some(far));
        assert_eq!(guitar.ties().get_ties().len(), 1);
    }

    #[test]
    fn test_grid_rejects_bad_subunit() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let guitar = GuitarStore::new(&mut data);
        assert!(guitar.get_stacks(pos(0.0), pos(1.0), Rational::from_integer(0)).is_err());
        assert!(guitar.get_stacks(pos(0.0), pos(1.0), Rational::new(1, 3)).is_err());
    }

    #[test]
    fn test_fretted_pitch() {
        let mut data = GuitarData::new(GuitarConfig::default());
        let guitar = GuitarStore::new(&mut data);
        assert_eq!(guitar.fretted_pitch(0, 0), Some(Midi::new(64).unwrap()));
        assert_eq!(guitar.fretted_pitch(5, 3), Some(Midi::new(43).unwrap()));
        assert_eq!(guitar.fretted_pitch(5, 25), None);
        assert_eq!(guitar.fretted_pitch(6, 0), None);
    }
}
