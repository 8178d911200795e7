//! Chord diagram store
//!
//! A fixed-order list of named stacks with one shared tuning. Chords have no
//! position, so nothing here takes part in time shifting.

use crate::error::{Result, TabError};
use crate::models::{Chord, ChordsData, GuitarNote, Midi};

/// Borrowed view over the chord list of a document
pub struct ChordStore<'a> {
    data: &'a mut ChordsData,
}

impl<'a> ChordStore<'a> {
    pub fn new(data: &'a mut ChordsData) -> Self {
        Self { data }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.data.chords
    }

    pub fn tuning(&self) -> &[Midi] {
        &self.data.tuning
    }

    pub fn get_chord(&self, index: usize) -> Option<&Chord> {
        self.data.chords.get(index)
    }

    /// Append a blank chord and return its index
    pub fn add_chord(&mut self) -> usize {
        self.data.chords.push(Chord::blank());
        self.data.chords.len() - 1
    }

    /// Replace the chord at `index`; notes on strings past the tuning are dropped
    pub fn set_chord(&mut self, index: usize, mut chord: Chord) -> Result<()> {
        let strings = self.data.tuning.len();
        let slot = self.slot(index)?;
        let requested = chord.notes.len();
        chord.notes.retain(|string, _| *string < strings);
        if chord.notes.len() != requested {
            log::debug!(
                "set_chord: dropped {} note(s) past string {} in '{}'",
                requested - chord.notes.len(),
                strings,
                chord.title
            );
        }
        *slot = chord;
        Ok(())
    }

    /// Place (or with `None`, clear) the note on one string of a chord
    pub fn set_chord_note(&mut self, index: usize, string: usize, note: Option<GuitarNote>) -> Result<()> {
        let strings = self.data.tuning.len();
        let chord = self.slot(index)?;
        match note {
            Some(_) if string >= strings => {
                log::debug!("set_chord_note: ignoring string {} (strings: {})", string, strings);
            }
            Some(note) => {
                chord.notes.insert(string, note);
            }
            None => {
                chord.notes.remove(&string);
            }
        }
        Ok(())
    }

    pub fn delete_chord(&mut self, index: usize) -> Result<Chord> {
        self.slot(index)?;
        Ok(self.data.chords.remove(index))
    }

    fn slot(&mut self, index: usize) -> Result<&mut Chord> {
        let len = self.data.chords.len();
        self.data
            .chords
            .get_mut(index)
            .ok_or(TabError::ChordIndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_set_delete() {
        let mut data = ChordsData::default();
        let mut store = ChordStore::new(&mut data);
        assert_eq!(store.chords().len(), 1);

        let index = store.add_chord();
        assert_eq!(index, 1);

        let mut g = Chord::blank();
        g.title = "G".to_string();
        g.notes.insert(0, GuitarNote::new(Midi::new(67).unwrap()));
        store.set_chord(index, g.clone()).unwrap();
        assert_eq!(store.get_chord(1), Some(&g));

        assert_eq!(store.delete_chord(0).unwrap(), Chord::blank());
        assert_eq!(store.chords(), &[g]);
    }

    #[test]
    fn test_out_of_range_indices_are_guarded() {
        let mut data = ChordsData::default();
        let mut store = ChordStore::new(&mut data);
        assert_eq!(
            store.set_chord(4, Chord::blank()),
            Err(TabError::ChordIndexOutOfRange { index: 4, len: 1 })
        );
        assert!(store.delete_chord(1).is_err());
        assert_eq!(store.chords().len(), 1);
    }

    #[test]
    fn test_set_chord_drops_strings_past_tuning() {
        let mut data = ChordsData::default();
        let mut store = ChordStore::new(&mut data);
        let mut chord = Chord::blank();
        chord.notes.insert(2, GuitarNote::new(Midi::new(55).unwrap()));
        chord.notes.insert(9, GuitarNote::new(Midi::new(60).unwrap()));

        store.set_chord(0, chord).unwrap();
        let stored = store.get_chord(0).unwrap();
        assert_eq!(stored.notes.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_set_chord_note() {
        let mut data = ChordsData::default();
        let mut store = ChordStore::new(&mut data);
        let e = GuitarNote::new(Midi::new(64).unwrap());

        store.set_chord_note(0, 0, Some(e.clone())).unwrap();
        store.set_chord_note(0, 9, Some(e.clone())).unwrap();
        assert_eq!(store.get_chord(0).unwrap().notes.len(), 1);

        store.set_chord_note(0, 0, None).unwrap();
        assert!(store.get_chord(0).unwrap().notes.is_empty());
    }
}
