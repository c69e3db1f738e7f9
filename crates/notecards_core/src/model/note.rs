//! Note record and color palette.
//!
//! # Responsibility
//! - Define the persisted note shape and its defaults.
//! - Map palette colors to and from their stored string keys.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - A freshly created note has empty title and content.
//! - `ColorKey` only ever holds one of the six palette entries.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Named card color. Persisted as `"Note 1"` .. `"Note 6"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorKey {
    #[serde(rename = "Note 1")]
    Note1,
    #[serde(rename = "Note 2")]
    Note2,
    #[serde(rename = "Note 3")]
    Note3,
    #[serde(rename = "Note 4")]
    Note4,
    #[serde(rename = "Note 5")]
    Note5,
    #[serde(rename = "Note 6")]
    Note6,
}

/// Every color a new note may be assigned.
pub const PALETTE: [ColorKey; 6] = [
    ColorKey::Note1,
    ColorKey::Note2,
    ColorKey::Note3,
    ColorKey::Note4,
    ColorKey::Note5,
    ColorKey::Note6,
];

/// Colors offered by the editor's color picker.
///
/// `Note 6` is only reachable through random assignment.
pub const PICKER_COLORS: [ColorKey; 5] = [
    ColorKey::Note1,
    ColorKey::Note2,
    ColorKey::Note3,
    ColorKey::Note4,
    ColorKey::Note5,
];

impl ColorKey {
    /// Returns the stored string key, e.g. `"Note 3"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note1 => "Note 1",
            Self::Note2 => "Note 2",
            Self::Note3 => "Note 3",
            Self::Note4 => "Note 4",
            Self::Note5 => "Note 5",
            Self::Note6 => "Note 6",
        }
    }

    /// Parses a stored string key. Returns `None` for unknown keys.
    pub fn parse(value: &str) -> Option<Self> {
        PALETTE.into_iter().find(|color| color.as_str() == value)
    }
}

impl Display for ColorKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks one color uniformly at random from `palette`.
///
/// Returns `None` when `palette` is empty.
pub fn pick_color<R: Rng + ?Sized>(palette: &[ColorKey], rng: &mut R) -> Option<ColorKey> {
    palette.choose(rng).copied()
}

/// A single note card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(rename = "colorKey")]
    pub color: ColorKey,
    /// Unix epoch milliseconds. Immutable after construction.
    #[serde(rename = "dateCreated")]
    pub date_created: i64,
}

impl Note {
    /// Creates an empty note with a generated id, stamped with the current time.
    pub fn new_empty(color: ColorKey) -> Self {
        Self::with_id(Uuid::new_v4(), color, now_epoch_ms())
    }

    /// Creates an empty note with caller-provided identity and timestamp.
    ///
    /// Used by import paths and tests that need deterministic ordering.
    pub fn with_id(id: NoteId, color: ColorKey, date_created: i64) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            color,
            date_created,
        }
    }

    /// Whether both title and content are empty.
    ///
    /// Blank notes are discarded when their editing session closes.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{pick_color, ColorKey, Note, PALETTE, PICKER_COLORS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn color_keys_parse_their_own_string_form() {
        for color in PALETTE {
            assert_eq!(ColorKey::parse(color.as_str()), Some(color));
        }
        assert_eq!(ColorKey::parse("Note 7"), None);
        assert_eq!(ColorKey::parse("note 1"), None);
    }

    #[test]
    fn picker_colors_are_a_subset_of_palette() {
        assert!(PICKER_COLORS.iter().all(|color| PALETTE.contains(color)));
        assert!(!PICKER_COLORS.contains(&ColorKey::Note6));
    }

    #[test]
    fn pick_color_stays_inside_palette_and_covers_it() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let color = pick_color(&PALETTE, &mut rng).expect("palette is not empty");
            assert!(PALETTE.contains(&color));
            seen.insert(color);
        }
        assert_eq!(seen.len(), PALETTE.len());
    }

    #[test]
    fn pick_color_returns_none_for_empty_palette() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_color(&[], &mut rng), None);
    }

    #[test]
    fn pick_color_is_deterministic_for_seeded_rng() {
        let first = pick_color(&PALETTE, &mut StdRng::seed_from_u64(42));
        let second = pick_color(&PALETTE, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn new_empty_note_is_blank() {
        let note = Note::new_empty(ColorKey::Note2);
        assert!(note.title.is_empty());
        assert!(note.content.is_empty());
        assert!(note.is_blank());
        assert_eq!(note.color, ColorKey::Note2);
        assert!(note.date_created > 0);
    }

    #[test]
    fn note_with_only_content_is_not_blank() {
        let mut note = Note::new_empty(ColorKey::Note1);
        note.content = "milk".to_string();
        assert!(!note.is_blank());
    }
}
