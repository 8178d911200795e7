//! Note stack store
//!
//! Sparse mapping from position to the notes sounding there. The map is
//! ordered, so the furthest occupied position is simply its last key and
//! never has to be recomputed by scanning.

use std::ops::Bound;

use crate::error::Result;
use crate::models::position::check_offset;
use crate::models::{Position, Rational, Stack, StackMap};

/// Borrowed view over a [`StackMap`] for an instrument with `strings` strings
pub struct StackStore<'a> {
    stacks: &'a mut StackMap,
    strings: usize,
}

impl<'a> StackStore<'a> {
    pub fn new(stacks: &'a mut StackMap, strings: usize) -> Self {
        Self { stacks, strings }
    }

    /// Store `stack` at `position`; an empty stack removes the position
    ///
    /// Notes on strings the instrument does not have are dropped. A stack
    /// made up only of such notes leaves the position untouched.
    pub fn set_stack(&mut self, position: Position, mut stack: Stack) {
        if stack.is_empty() {
            self.stacks.remove(&position);
            return;
        }
        let requested = stack.len();
        stack.retain(|string, _| *string < self.strings);
        if stack.len() != requested {
            log::debug!(
                "set_stack: dropped {} note(s) past string {} at {}",
                requested - stack.len(),
                self.strings,
                position
            );
            if stack.is_empty() {
                return;
            }
        }
        self.stacks.insert(position, stack);
    }

    pub fn get_stack(&self, position: Position) -> Option<&Stack> {
        self.stacks.get(&position)
    }

    /// Stacks with `start <= position < end`, ascending; `None` means no upper bound
    pub fn get_stacks(&self, start: Position, end: Option<Position>) -> Vec<(Position, &Stack)> {
        let upper = match end {
            Some(end) if end <= start => return Vec::new(),
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        self.stacks
            .range((Bound::Included(start), upper))
            .map(|(position, stack)| (*position, stack))
            .collect()
    }

    /// Furthest occupied position, `None` for an empty store
    pub fn last_position(&self) -> Option<Position> {
        self.stacks.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Fail if shifting every stack at or after `position` by `amount` would
    /// move one before the start of the document or past its last position
    pub(crate) fn check_shift(&self, position: Position, amount: Rational) -> Result<()> {
        check_offset(amount)?;
        let mut moved = self.stacks.range(position..);
        if let Some((first, _)) = moved.next() {
            first.shifted(amount)?;
        }
        if let Some((last, _)) = moved.next_back() {
            last.shifted(amount)?;
        }
        Ok(())
    }

    /// Move every stack at or after `position` by `amount`
    ///
    /// When inserting time the highest positions move first, when removing
    /// time the lowest move first, so no stack is overwritten before it has
    /// been moved. Nothing is changed if any stack would become negative.
    pub fn shift_from(&mut self, position: Position, amount: Rational) -> Result<()> {
        self.check_shift(position, amount)?;
        if amount == Rational::from_integer(0) {
            return Ok(());
        }

        let mut moves = self
            .stacks
            .range(position..)
            .map(|(from, _)| from.shifted(amount).map(|to| (*from, to)))
            .collect::<Result<Vec<_>>>()?;
        if amount > Rational::from_integer(0) {
            moves.reverse();
        }

        for (from, to) in moves {
            if let Some(stack) = self.stacks.remove(&from) {
                if self.stacks.insert(to, stack).is_some() {
                    log::warn!("shift_from: stack moved from {} overwrote stack at {}", from, to);
                }
            }
        }
        Ok(())
    }

    /// Remove every stack in `[start, end)`, returning what was removed
    pub fn delete_stacks(&mut self, start: Position, end: Position) -> Vec<(Position, Stack)> {
        if end <= start {
            return Vec::new();
        }
        let positions: Vec<Position> = self.stacks.range(start..end).map(|(p, _)| *p).collect();
        positions
            .into_iter()
            .filter_map(|position| self.stacks.remove(&position).map(|stack| (position, stack)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuitarNote, Midi};

    fn pos(value: f64) -> Position {
        Position::try_from(value).unwrap()
    }

    fn stack(pitches: &[(usize, u8)]) -> Stack {
        pitches
            .iter()
            .map(|(string, midi)| (*string, GuitarNote::new(Midi::new(*midi).unwrap())))
            .collect()
    }

    #[test]
    fn test_set_and_get_stack() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);

        store.set_stack(pos(2.5), stack(&[(0, 64), (2, 55)]));
        let found = store.get_stacks(pos(2.5), Some(pos(2.5 + 1.0 / 128.0)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, pos(2.5));
        assert_eq!(found[0].1, &stack(&[(0, 64), (2, 55)]));
    }

    #[test]
    fn test_empty_stack_removes_position() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);

        store.set_stack(pos(1.0), stack(&[(0, 60)]));
        store.set_stack(pos(1.0), Stack::new());
        assert!(store.is_empty());
        assert_eq!(store.last_position(), None);

        store.set_stack(pos(3.0), Stack::new());
        assert!(map.is_empty());
    }

    #[test]
    fn test_get_stacks_range_is_half_open_and_sorted() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        for p in [4.0, 0.0, 2.0, 1.5] {
            store.set_stack(pos(p), stack(&[(1, 50)]));
        }

        let positions: Vec<Position> = store
            .get_stacks(pos(1.5), Some(pos(4.0)))
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(positions, vec![pos(1.5), pos(2.0)]);

        assert_eq!(store.get_stacks(Position::zero(), None).len(), 4);
        assert!(store.get_stacks(pos(4.0), Some(pos(1.0))).is_empty());
    }

    #[test]
    fn test_last_position_tracks_max() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        store.set_stack(pos(1.0), stack(&[(0, 60)]));
        store.set_stack(pos(8.0), stack(&[(0, 60)]));
        store.set_stack(pos(3.0), stack(&[(0, 60)]));
        assert_eq!(store.last_position(), Some(pos(8.0)));

        store.set_stack(pos(8.0), Stack::new());
        assert_eq!(store.last_position(), Some(pos(3.0)));
    }

    #[test]
    fn test_shift_forward_does_not_clobber() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        store.set_stack(pos(1.0), stack(&[(0, 60)]));
        store.set_stack(pos(2.0), stack(&[(0, 62)]));
        store.set_stack(pos(3.0), stack(&[(0, 64)]));

        store.shift_from(pos(2.0), Rational::from_integer(1)).unwrap();

        assert_eq!(store.get_stack(pos(1.0)), Some(&stack(&[(0, 60)])));
        assert_eq!(store.get_stack(pos(2.0)), None);
        assert_eq!(store.get_stack(pos(3.0)), Some(&stack(&[(0, 62)])));
        assert_eq!(store.get_stack(pos(4.0)), Some(&stack(&[(0, 64)])));
        assert_eq!(store.last_position(), Some(pos(4.0)));
    }

    #[test]
    fn test_shift_backward_does_not_clobber() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        store.set_stack(pos(2.0), stack(&[(0, 62)]));
        store.set_stack(pos(2.5), stack(&[(0, 63)]));
        store.set_stack(pos(3.0), stack(&[(0, 64)]));

        store.shift_from(pos(2.0), Rational::new(-1, 2)).unwrap();

        assert_eq!(store.get_stack(pos(1.5)), Some(&stack(&[(0, 62)])));
        assert_eq!(store.get_stack(pos(2.0)), Some(&stack(&[(0, 63)])));
        assert_eq!(store.get_stack(pos(2.5)), Some(&stack(&[(0, 64)])));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_shift_before_start_is_rejected_without_changes() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        store.set_stack(pos(1.0), stack(&[(0, 60)]));
        store.set_stack(pos(2.0), stack(&[(0, 62)]));

        assert!(store.shift_from(pos(0.0), Rational::from_integer(-2)).is_err());
        assert_eq!(store.get_stack(pos(1.0)), Some(&stack(&[(0, 60)])));
        assert_eq!(store.get_stack(pos(2.0)), Some(&stack(&[(0, 62)])));
    }

    #[test]
    fn test_shift_rejects_off_grid_amount() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        store.set_stack(pos(1.0), stack(&[(0, 60)]));
        assert!(store.shift_from(pos(0.0), Rational::new(1, 3)).is_err());
        assert_eq!(store.last_position(), Some(pos(1.0)));
    }

    #[test]
    fn test_strings_past_the_instrument_are_dropped() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);

        store.set_stack(pos(1.0), stack(&[(0, 60), (9, 62)]));
        assert_eq!(store.get_stack(pos(1.0)), Some(&stack(&[(0, 60)])));

        // nothing playable is left, so the existing stack stays
        store.set_stack(pos(1.0), stack(&[(6, 64)]));
        assert_eq!(store.get_stack(pos(1.0)), Some(&stack(&[(0, 60)])));
        store.set_stack(pos(2.0), stack(&[(6, 64)]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_shift_past_last_position_is_rejected_without_changes() {
        let far = Position::from_ticks(i64::from(i32::MAX)).unwrap();
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        store.set_stack(pos(1.0), stack(&[(0, 60)]));
        store.set_stack(far, stack(&[(0, 62)]));

        assert!(store.shift_from(Position::zero(), far.value()).is_err());
        assert!(store.shift_from(Position::zero(), Rational::new(1, 128)).is_err());
        assert_eq!(store.get_stack(pos(1.0)), Some(&stack(&[(0, 60)])));
        assert_eq!(store.last_position(), Some(far));
    }

    #[test]
    fn test_delete_stacks() {
        let mut map = StackMap::new();
        let mut store = StackStore::new(&mut map, 6);
        for p in [0.0, 1.0, 2.0, 3.0] {
            store.set_stack(pos(p), stack(&[(0, 60)]));
        }
        let removed = store.delete_stacks(pos(1.0), pos(3.0));
        assert_eq!(removed.len(), 2);
        let left: Vec<Position> = map.keys().copied().collect();
        assert_eq!(left, vec![pos(0.0), pos(3.0)]);
    }
}
