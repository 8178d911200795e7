//! Ties and bends between positions on one string
//!
//! Ties and bends share a single keyspace per `(string, from)`: a note can
//! start at most one articulation of either kind. The `type` field in the
//! serialized form tells them apart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::note::Midi;
use super::position::Position;

/// How two notes joined by a tie are played
///
/// Hammer-on vs pull-off is not stored: it follows from whether the
/// destination pitch is higher or lower than the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieKind {
    Hammer,
    Slide,
}

/// Direction of a hammer/pull tie, derived from its resolved pitches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TieDirection {
    HammerOn,
    PullOff,
    Level,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TieData {
    pub kind: TieKind,
    pub to: Position,
}

/// Whether a bend stays bent or resolves into the destination note
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Hold,
    #[default]
    Connect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BendData {
    pub to: Position,

    /// Depth in whole tones (1.0 = full, 0.5 = half)
    pub bend: f64,

    /// Offsets from `from` where the bend peaks before releasing toward `to`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub through: Vec<Position>,

    #[serde(default)]
    pub release_type: ReleaseType,
}

impl BendData {
    /// A full-tone bend that connects to `to`
    pub fn new(to: Position) -> Self {
        Self {
            to,
            bend: 1.0,
            through: Vec::new(),
            release_type: ReleaseType::Connect,
        }
    }
}

/// One outgoing edge from a `(string, from)` note
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Articulation {
    Tie(TieData),
    Bend(BendData),
}

impl Articulation {
    pub fn tie(kind: TieKind, to: Position) -> Self {
        Articulation::Tie(TieData { kind, to })
    }

    pub fn bend(data: BendData) -> Self {
        Articulation::Bend(data)
    }

    /// Destination position
    pub fn to(&self) -> Position {
        match self {
            Articulation::Tie(tie) => tie.to,
            Articulation::Bend(bend) => bend.to,
        }
    }

    pub(crate) fn set_to(&mut self, to: Position) {
        match self {
            Articulation::Tie(tie) => tie.to = to,
            Articulation::Bend(bend) => bend.to = to,
        }
    }

    pub fn is_bend(&self) -> bool {
        matches!(self, Articulation::Bend(_))
    }
}

/// Articulations on one string, keyed by source position
pub type StringTies = BTreeMap<Position, Articulation>;

/// string index -> articulations on that string
pub type TieMap = BTreeMap<usize, StringTies>;

/// A tie as seen by consumers: flattened, with both pitches resolved
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieView {
    pub string: usize,
    pub from: Position,
    pub to: Position,
    pub kind: TieKind,
    pub midi_from: Option<Midi>,
    pub midi_to: Option<Midi>,
}

impl TieView {
    /// Hammer-on when rising, pull-off when falling; `None` for slides or
    /// when either end is muted/absent
    pub fn direction(&self) -> Option<TieDirection> {
        if self.kind != TieKind::Hammer {
            return None;
        }
        let (from, to) = (self.midi_from?, self.midi_to?);
        Some(match to.cmp(&from) {
            std::cmp::Ordering::Greater => TieDirection::HammerOn,
            std::cmp::Ordering::Less => TieDirection::PullOff,
            std::cmp::Ordering::Equal => TieDirection::Level,
        })
    }
}

/// A bend as seen by consumers: flattened, data carried verbatim
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BendView {
    pub string: usize,
    pub from: Position,
    #[serde(flatten)]
    pub data: BendData,
}
