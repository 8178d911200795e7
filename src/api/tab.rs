//! WASM API for the tab document
//!
//! One tab session lives in WASM memory; JavaScript edits it through the
//! functions below and reads back views. Positions cross the boundary as
//! plain numbers in quarter notes.

use std::num::NonZeroU32;
use std::sync::Mutex;

use lazy_static::lazy_static;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use super::helpers::{
    deserialize, deserialize_or_default, install_session, offset, read_position, serialize,
    tab_error, validation_error, with_session, write_position,
};
use crate::document::{TabDocument, TabOptions};
use crate::error::{Result as TabResult, TabError};
use crate::models::{
    note_to_midi, Annotation, Articulation, BendView, Chord, ChordsData, GuitarConfig, GuitarNote,
    Midi, Spacing,
};
use crate::session::{Change, TabSession};
use crate::store::GuitarStore;
use crate::{wasm_info, wasm_log, wasm_warn};

// WASM-owned tab storage (canonical source of truth)
lazy_static! {
    pub(crate) static ref SESSION: Mutex<Option<TabSession>> = Mutex::new(None);
    pub(crate) static ref PENDING_CHANGES: Mutex<Vec<Change>> = Mutex::new(Vec::new());
}

/// Header options as sent from JavaScript
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TabOptionsJs {
    title: Option<String>,
    beats_per_bar: Option<NonZeroU32>,
    beat_size: Option<Spacing>,
    chords_data: Option<ChordsData>,
}

/// An open-string pitch: a midi number or a note name such as "E4"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TuningPitch {
    Midi(Midi),
    Name(String),
}

/// Guitar setup as sent from JavaScript; missing fields use the defaults
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GuitarConfigJs {
    tuning: Option<Vec<TuningPitch>>,
    strings: Option<usize>,
    frets: Option<u32>,
}

impl GuitarConfigJs {
    fn resolve(self) -> TabResult<GuitarConfig> {
        let defaults = GuitarConfig::default();
        let tuning = match self.tuning {
            Some(pitches) => pitches
                .into_iter()
                .map(|pitch| match pitch {
                    TuningPitch::Midi(midi) => Ok(midi),
                    TuningPitch::Name(name) => note_to_midi(&name),
                })
                .collect::<TabResult<Vec<Midi>>>()?,
            None => defaults.tuning,
        };
        Ok(GuitarConfig {
            strings: self.strings.unwrap_or(tuning.len()),
            frets: self.frets.unwrap_or(defaults.frets),
            tuning,
        })
    }
}

fn no_guitar() -> TabError {
    TabError::InvalidConfig("no guitar tab has been created".to_string())
}

/// Apply an edit to the guitar view, notifying listeners on success
fn edit_guitar<R>(
    change: Change,
    edit: impl FnOnce(&mut GuitarStore<'_>) -> TabResult<R>,
) -> Result<R, JsValue> {
    with_session(|session| {
        session
            .try_edit(change, |doc| match doc.guitar() {
                Some(mut guitar) => edit(&mut guitar),
                None => Err(no_guitar()),
            })
            .map_err(tab_error)
    })
}

/// Apply an edit that may turn out to be a no-op; listeners are notified
/// only when `edit` reports a change
fn edit_guitar_if(change: Change, edit: impl FnOnce(&mut GuitarStore<'_>) -> bool) -> Result<bool, JsValue> {
    with_session(|session| {
        if session.document().guitar_data().is_none() {
            return Err(tab_error(no_guitar()));
        }
        let changed = session.edit_if(change, |doc| {
            let mut guitar = doc.guitar()?;
            edit(&mut guitar).then_some(())
        });
        Ok(changed.is_some())
    })
}

/// Read from the guitar view without notifying anyone
fn query_guitar<R>(read: impl FnOnce(&mut GuitarStore<'_>) -> TabResult<R>) -> Result<R, JsValue> {
    with_session(|session| {
        session
            .query(|doc| match doc.guitar() {
                Some(mut guitar) => read(&mut guitar),
                None => Err(no_guitar()),
            })
            .map_err(tab_error)
    })
}

// ============================================================================
// Document lifecycle
// ============================================================================

/// Start a new, empty tab
///
/// # Parameters
/// - `options_js`: optional `{ title, beatsPerBar, beatSize, chordsData }`
#[wasm_bindgen(js_name = createTab)]
pub fn create_tab(options_js: JsValue) -> Result<(), JsValue> {
    wasm_info!("createTab called");
    let options: TabOptionsJs = deserialize_or_default(options_js, "Tab options deserialization error")?;
    let document = TabDocument::with_options(TabOptions {
        title: options.title,
        beats_per_bar: options.beats_per_bar,
        beat_size: options.beat_size,
        chords_data: options.chords_data,
    });
    wasm_info!("  Created tab '{}'", document.title);
    install_session(TabSession::new(document))
}

/// Load a tab from its serialized form
#[wasm_bindgen(js_name = loadTab)]
pub fn load_tab(blob: &str) -> Result<(), JsValue> {
    wasm_info!("loadTab called ({} bytes)", blob.len());
    let document = TabDocument::deserialize(blob).map_err(tab_error)?;
    install_session(TabSession::new(document))?;
    wasm_info!("loadTab completed successfully");
    Ok(())
}

#[wasm_bindgen(js_name = serializeTab)]
pub fn serialize_tab() -> Result<String, JsValue> {
    with_session(|session| session.document().serialize().map_err(tab_error))
}

/// Revision counter, bumped by every edit
#[wasm_bindgen(js_name = tabRevision)]
pub fn tab_revision() -> Result<f64, JsValue> {
    with_session(|session| Ok(session.revision() as f64))
}

/// Drain the list of document parts changed since the last call
#[wasm_bindgen(js_name = takeChanges)]
pub fn take_changes() -> Result<JsValue, JsValue> {
    let changes = match PENDING_CHANGES.lock() {
        Ok(mut pending) => std::mem::take(&mut *pending),
        Err(e) => return Err(validation_error(format!("Failed to lock changes: {}", e))),
    };
    serialize(&changes, "Change serialization error")
}

// ============================================================================
// Header
// ============================================================================

#[wasm_bindgen(js_name = setTitle)]
pub fn set_title(title: &str) -> Result<(), JsValue> {
    with_session(|session| {
        session.edit(Change::Header, |doc| doc.title = title.to_string());
        Ok(())
    })
}

#[wasm_bindgen(js_name = setBeatsPerBar)]
pub fn set_beats_per_bar(beats: u32) -> Result<(), JsValue> {
    let beats = NonZeroU32::new(beats).ok_or_else(|| validation_error("Beats per bar must be positive"))?;
    with_session(|session| {
        session.edit(Change::Header, |doc| doc.beats_per_bar = beats);
        Ok(())
    })
}

/// # Parameters
/// - `beat_size`: note value in quarter notes (4, 2, 1, 0.5, ...)
#[wasm_bindgen(js_name = setBeatSize)]
pub fn set_beat_size(beat_size: f64) -> Result<(), JsValue> {
    let spacing = Spacing::try_from(beat_size).map_err(tab_error)?;
    with_session(|session| {
        session.edit(Change::Header, |doc| doc.beat_size = spacing);
        Ok(())
    })
}

/// Returns whether a line break is now set at `position`
#[wasm_bindgen(js_name = toggleLineBreak)]
pub fn toggle_line_break(position: f64) -> Result<bool, JsValue> {
    let Some(position) = write_position(position, "toggleLineBreak") else {
        return Ok(false);
    };
    with_session(|session| Ok(session.edit(Change::Header, |doc| doc.toggle_line_break(position))))
}

// ============================================================================
// Guitar notes
// ============================================================================

/// Create (or replace) the guitar view
///
/// # Parameters
/// - `config_js`: optional `{ tuning, strings, frets }`; tuning entries may be
///   midi numbers or note names ("E4")
#[wasm_bindgen(js_name = createGuitarTab)]
pub fn create_guitar_tab(config_js: JsValue) -> Result<(), JsValue> {
    let config: GuitarConfigJs = deserialize_or_default(config_js, "Guitar config deserialization error")?;
    let config = config.resolve().map_err(tab_error)?;
    wasm_info!("createGuitarTab: {} strings, {} frets", config.strings, config.frets);
    with_session(|session| {
        session
            .try_edit(Change::Guitar, |doc| doc.create_guitar_tab(config).map(|_| ()))
            .map_err(tab_error)
    })
}

/// # Parameters
/// - `note_js`: `{ note: <midi> | "muted", slide?, bend? }`
#[wasm_bindgen(js_name = setNote)]
pub fn set_note(position: f64, string: usize, note_js: JsValue) -> Result<(), JsValue> {
    let note: GuitarNote = deserialize(note_js, "Note deserialization error")?;
    let Some(position) = write_position(position, "setNote") else {
        return Ok(());
    };
    wasm_log!("setNote: {} string {} -> {:?}", position, string, note.note);
    edit_guitar_if(Change::Notes, |guitar| guitar.set_note(position, string, note)).map(|_| ())
}

/// Returns whether a note was removed
#[wasm_bindgen(js_name = deleteNote)]
pub fn delete_note(position: f64, string: usize) -> Result<bool, JsValue> {
    let Some(position) = write_position(position, "deleteNote") else {
        return Ok(false);
    };
    edit_guitar_if(Change::Notes, |guitar| guitar.delete_note(position, string).is_some())
}

/// Delete every note in `[start, end)`
#[wasm_bindgen(js_name = deleteStacks)]
pub fn delete_stacks(start: f64, end: f64) -> Result<(), JsValue> {
    let (Some(start), Some(end)) = (write_position(start, "deleteStacks"), write_position(end, "deleteStacks")) else {
        return Ok(());
    };
    edit_guitar(Change::Notes, |guitar| {
        guitar.delete_stacks(start, end);
        Ok(())
    })
}

/// Move every note and articulation at or after `position` by `amount`
#[wasm_bindgen(js_name = shiftFrom)]
pub fn shift_from(position: f64, amount: f64) -> Result<(), JsValue> {
    let Some(position) = write_position(position, "shiftFrom") else {
        return Ok(());
    };
    let amount = offset(amount)?;
    wasm_info!("shiftFrom: {} by {}", position, amount);
    edit_guitar(Change::Notes, |guitar| guitar.shift_from(position, amount))
}

/// Open `amount` of empty time at `position`
#[wasm_bindgen(js_name = insertTime)]
pub fn insert_time(position: f64, amount: f64) -> Result<(), JsValue> {
    let Some(position) = write_position(position, "insertTime") else {
        return Ok(());
    };
    let amount = offset(amount)?;
    edit_guitar(Change::Notes, |guitar| guitar.insert_time(position, amount))
}

/// Cut `[start, end)` out of the tab, pulling later notes back
#[wasm_bindgen(js_name = removeTime)]
pub fn remove_time(start: f64, end: f64) -> Result<(), JsValue> {
    let (Some(start), Some(end)) = (write_position(start, "removeTime"), write_position(end, "removeTime")) else {
        return Ok(());
    };
    wasm_info!("removeTime: [{}, {})", start, end);
    edit_guitar(Change::Notes, |guitar| guitar.remove_time(start, end))
}

/// Render grid over `[start, end)`: one column per multiple of `subunit`
///
/// # Returns
/// Array of `{ position, notes }`, where `notes` maps string index to note
#[wasm_bindgen(js_name = getStacks)]
pub fn get_stacks(start: f64, end: f64, subunit: f64) -> Result<JsValue, JsValue> {
    #[derive(serde::Serialize)]
    struct Column<'a> {
        position: f64,
        notes: &'a crate::models::Stack,
    }

    let start = read_position(start)?;
    let end = read_position(end)?;
    let subunit = offset(subunit)?;
    let grid = query_guitar(|guitar| guitar.get_stacks(start, end, subunit))?;
    let columns: Vec<Column<'_>> = grid
        .iter()
        .map(|(position, notes)| Column {
            position: f64::from(*position),
            notes,
        })
        .collect();
    serialize(&columns, "Stack serialization error")
}

/// Furthest occupied position, or `undefined` for an empty tab
#[wasm_bindgen(js_name = lastPosition)]
pub fn last_position() -> Result<Option<f64>, JsValue> {
    query_guitar(|guitar| Ok(guitar.last_position().map(f64::from)))
}

// ============================================================================
// Ties and bends
// ============================================================================

/// # Parameters
/// - `articulation_js`: `{ type: "tie", kind: "hammer" | "slide", to }` or
///   `{ type: "bend", to, bend, through?, releaseType? }`
#[wasm_bindgen(js_name = setTie)]
pub fn set_tie(string: usize, from: f64, articulation_js: JsValue) -> Result<(), JsValue> {
    let articulation: Articulation = deserialize(articulation_js, "Articulation deserialization error")?;
    let Some(from) = write_position(from, "setTie") else {
        return Ok(());
    };
    edit_guitar_if(Change::Ties, |guitar| guitar.ties().set_tie(string, from, articulation)).map(|_| ())
}

/// Write back a bend previously read with `getBends`
#[wasm_bindgen(js_name = updateBend)]
pub fn update_bend(bend_js: JsValue) -> Result<(), JsValue> {
    let bend: BendView = deserialize(bend_js, "Bend deserialization error")?;
    edit_guitar_if(Change::Ties, |guitar| guitar.ties().update_bend(bend)).map(|_| ())
}

#[wasm_bindgen(js_name = deleteTie)]
pub fn delete_tie(string: usize, from: f64) -> Result<bool, JsValue> {
    let Some(from) = write_position(from, "deleteTie") else {
        return Ok(false);
    };
    edit_guitar_if(Change::Ties, |guitar| guitar.ties().delete_tie(string, from).is_some())
}

#[wasm_bindgen(js_name = getTies)]
pub fn get_ties() -> Result<JsValue, JsValue> {
    let ties = query_guitar(|guitar| Ok(guitar.ties().get_ties()))?;
    serialize(&ties, "Tie serialization error")
}

#[wasm_bindgen(js_name = getBends)]
pub fn get_bends() -> Result<JsValue, JsValue> {
    let bends = query_guitar(|guitar| Ok(guitar.ties().get_bends()))?;
    serialize(&bends, "Bend serialization error")
}

// ============================================================================
// Annotations
// ============================================================================

/// Returns false when the interval is empty or overlaps another on the row
#[wasm_bindgen(js_name = createAnnotation)]
pub fn create_annotation(row: usize, start: f64, end: f64, title: &str) -> Result<bool, JsValue> {
    let (Some(start), Some(end)) = (
        write_position(start, "createAnnotation"),
        write_position(end, "createAnnotation"),
    ) else {
        return Ok(false);
    };
    let annotation = Annotation::new(start, end, title);
    with_session(|session| {
        let created = session.edit_if(Change::Annotations, |doc| {
            doc.annotations().create_annotation(row, annotation).map(|_| ())
        });
        if created.is_none() {
            wasm_warn!("createAnnotation: [{}, {}) refused on row {}", start, end, row);
        }
        Ok(created.is_some())
    })
}

#[wasm_bindgen(js_name = deleteAnnotation)]
pub fn delete_annotation(row: usize, start: f64, end: f64) -> Result<bool, JsValue> {
    let (Some(start), Some(end)) = (
        write_position(start, "deleteAnnotation"),
        write_position(end, "deleteAnnotation"),
    ) else {
        return Ok(false);
    };
    with_session(|session| {
        let removed = session.edit_if(Change::Annotations, |doc| {
            doc.annotations().delete_annotation(row, start, end)
        });
        Ok(removed.is_some())
    })
}

#[wasm_bindgen(js_name = getAnnotations)]
pub fn get_annotations(row: usize) -> Result<JsValue, JsValue> {
    with_session(|session| {
        let annotations = session.query(|doc| doc.annotations().get_annotations(row).to_vec());
        serialize(&annotations, "Annotation serialization error")
    })
}

#[wasm_bindgen(js_name = getRows)]
pub fn get_rows() -> Result<js_sys::Array, JsValue> {
    with_session(|session| {
        let rows = session.query(|doc| doc.annotations().get_rows());
        Ok(rows.into_iter().map(|row| JsValue::from_f64(row as f64)).collect())
    })
}

/// Returns the index of the new row
#[wasm_bindgen(js_name = createNextRow)]
pub fn create_next_row() -> Result<usize, JsValue> {
    with_session(|session| Ok(session.edit(Change::Annotations, |doc| doc.annotations().create_next_row())))
}

// ============================================================================
// Chords
// ============================================================================

/// Append a blank chord; returns its index
#[wasm_bindgen(js_name = addChord)]
pub fn add_chord() -> Result<usize, JsValue> {
    with_session(|session| Ok(session.edit(Change::Chords, |doc| doc.chords().add_chord())))
}

#[wasm_bindgen(js_name = setChord)]
pub fn set_chord(index: usize, chord_js: JsValue) -> Result<(), JsValue> {
    let chord: Chord = deserialize(chord_js, "Chord deserialization error")?;
    with_session(|session| {
        session
            .try_edit(Change::Chords, |doc| doc.chords().set_chord(index, chord))
            .map_err(tab_error)
    })
}

#[wasm_bindgen(js_name = deleteChord)]
pub fn delete_chord(index: usize) -> Result<(), JsValue> {
    with_session(|session| {
        session
            .try_edit(Change::Chords, |doc| doc.chords().delete_chord(index).map(|_| ()))
            .map_err(tab_error)
    })
}

/// # Returns
/// `{ tuning, chords }`
#[wasm_bindgen(js_name = getChords)]
pub fn get_chords() -> Result<JsValue, JsValue> {
    with_session(|session| serialize(session.document().chords_data(), "Chord serialization error"))
}
