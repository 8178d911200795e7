//! Tie and bend store
//!
//! Articulations are kept per string, keyed by their source position. The
//! store only reads the stack map, to resolve the pitches at both ends of a
//! tie when it is listed.

use crate::error::Result;
use crate::models::position::check_offset;
use crate::models::{
    Articulation, BendView, Midi, Position, Rational, StackMap, StringTies, TieMap, TieView,
};

/// Borrowed view over a [`TieMap`], with read access to the notes it links
pub struct TieStore<'a> {
    ties: &'a mut TieMap,
    stacks: &'a StackMap,
    strings: usize,
}

impl<'a> TieStore<'a> {
    /// `strings` bounds the string indices accepted by [`TieStore::set_tie`]
    pub fn new(ties: &'a mut TieMap, stacks: &'a StackMap, strings: usize) -> Self {
        Self {
            ties,
            stacks,
            strings,
        }
    }

    /// Store `articulation` as the outgoing edge of `(string, from)`,
    /// replacing whatever was there. Returns whether it was stored.
    pub fn set_tie(&mut self, string: usize, from: Position, articulation: Articulation) -> bool {
        if string >= self.strings {
            log::debug!("set_tie: ignoring string {} (strings: {})", string, self.strings);
            return false;
        }
        self.ties.entry(string).or_default().insert(from, articulation);
        true
    }

    /// Write an edited bend back in place
    pub fn update_bend(&mut self, bend: BendView) -> bool {
        self.set_tie(bend.string, bend.from, Articulation::Bend(bend.data))
    }

    pub fn get_tie(&self, string: usize, from: Position) -> Option<&Articulation> {
        self.ties.get(&string).and_then(|lane| lane.get(&from))
    }

    pub fn delete_tie(&mut self, string: usize, from: Position) -> Option<Articulation> {
        let lane = self.ties.get_mut(&string)?;
        let removed = lane.remove(&from);
        if lane.is_empty() {
            self.ties.remove(&string);
        }
        removed
    }

    /// Drop every edge touching `(string, position)`: the one leaving it and
    /// any arriving at it. Called when the note there is deleted.
    pub fn delete_at(&mut self, string: usize, position: Position) {
        let Some(lane) = self.ties.get_mut(&string) else {
            return;
        };
        lane.remove(&position);
        lane.retain(|_, articulation| articulation.to() != position);
        if lane.is_empty() {
            self.ties.remove(&string);
        }
    }

    /// Drop every edge that starts or ends in `[start, end)`, on any string
    pub fn delete_range(&mut self, start: Position, end: Position) {
        let inside = |p: Position| p >= start && p < end;
        for lane in self.ties.values_mut() {
            lane.retain(|from, articulation| !inside(*from) && !inside(articulation.to()));
        }
        self.ties.retain(|_, lane| !lane.is_empty());
    }

    fn midi_at(&self, string: usize, position: Position) -> Option<Midi> {
        self.stacks
            .get(&position)
            .and_then(|stack| stack.get(&string))
            .and_then(|note| note.note.midi())
    }

    /// Every tie, with the pitches at both ends looked up now
    pub fn get_ties(&self) -> Vec<TieView> {
        let mut ties = Vec::new();
        for (string, lane) in self.ties.iter() {
            for (from, articulation) in lane {
                if let Articulation::Tie(tie) = articulation {
                    ties.push(TieView {
                        string: *string,
                        from: *from,
                        to: tie.to,
                        kind: tie.kind,
                        midi_from: self.midi_at(*string, *from),
                        midi_to: self.midi_at(*string, tie.to),
                    });
                }
            }
        }
        ties
    }

    /// Every bend, carried verbatim
    pub fn get_bends(&self) -> Vec<BendView> {
        let mut bends = Vec::new();
        for (string, lane) in self.ties.iter() {
            for (from, articulation) in lane {
                if let Articulation::Bend(bend) = articulation {
                    bends.push(BendView {
                        string: *string,
                        from: *from,
                        data: bend.clone(),
                    });
                }
            }
        }
        bends
    }

    pub(crate) fn check_shift(&self, position: Position, amount: Rational) -> Result<()> {
        check_offset(amount)?;
        for lane in self.ties.values() {
            for (from, articulation) in lane.range(position..) {
                from.shifted(amount)?;
                articulation.to().shifted(amount)?;
            }
        }
        Ok(())
    }

    /// Move every edge starting at or after `position` by `amount`
    ///
    /// Edges ending before `position` stay where they are. An edge that
    /// starts before `position` but ends at or after it spans the boundary and
    /// is dropped.
    pub fn shift_from(&mut self, position: Position, amount: Rational) -> Result<()> {
        self.check_shift(position, amount)?;
        if amount == Rational::from_integer(0) {
            return Ok(());
        }

        for (string, lane) in self.ties.iter_mut() {
            let old = std::mem::take(lane);
            let mut shifted = StringTies::new();
            for (from, mut articulation) in old {
                if from >= position {
                    let to = articulation.to().shifted(amount)?;
                    articulation.set_to(to);
                    shifted.insert(from.shifted(amount)?, articulation);
                } else if articulation.to() >= position {
                    log::debug!(
                        "shift_from: dropping articulation on string {} from {} to {}",
                        string,
                        from,
                        articulation.to()
                    );
                } else {
                    lane.insert(from, articulation);
                }
            }
            lane.extend(shifted);
        }
        self.ties.retain(|_, lane| !lane.is_empty());
        Ok(())
    }
}
