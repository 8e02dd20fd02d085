//! The fixed event color palette exposed by the calendar API.
//!
//! Event records carry a numeric `colorId`; page settings refer to colors by
//! name ("blueberry", "tomato", ...). This registry maps between the two and
//! carries the background hex the calendar UI uses for each color.

/// Color id assigned to events that have no explicit color.
pub const UNSET_COLOR_ID: &str = "0";

/// One entry in the calendar color palette.
#[derive(Debug, Clone, PartialEq)]
pub struct EventColor {
    pub name: &'static str,
    pub id: &'static str,
    /// Background hex in the calendar UI. The unset color has none.
    pub background: Option<&'static str>,
}

const PALETTE: &[EventColor] = &[
    EventColor { name: "unset", id: "0", background: None },
    EventColor { name: "lavender", id: "1", background: Some("#a4bdfc") },
    EventColor { name: "basil", id: "2", background: Some("#33b679") },
    EventColor { name: "grape", id: "3", background: Some("#8e24aa") },
    EventColor { name: "flamingo", id: "4", background: Some("#e67c73") },
    EventColor { name: "banana", id: "5", background: Some("#f6c026") },
    EventColor { name: "tangerine", id: "6", background: Some("#f5511d") },
    EventColor { name: "peacock", id: "7", background: Some("#039be5") },
    EventColor { name: "graphite", id: "8", background: Some("#616161") },
    EventColor { name: "blueberry", id: "9", background: Some("#3f51b5") },
    EventColor { name: "sage", id: "10", background: Some("#0b8043") },
    EventColor { name: "tomato", id: "11", background: Some("#d60000") },
];

/// Lookup table over the fixed palette. Immutable once constructed.
#[derive(Debug, Clone, Default)]
pub struct ColorRegistry;

impl ColorRegistry {
    /// Resolve a color name (case-insensitive) to its color id.
    pub fn id_for(&self, name: &str) -> Option<&'static str> {
        self.by_name(name).map(|color| color.id)
    }

    pub fn by_name(&self, name: &str) -> Option<&'static EventColor> {
        PALETTE
            .iter()
            .find(|color| color.name.eq_ignore_ascii_case(name))
    }

    pub fn by_id(&self, id: &str) -> Option<&'static EventColor> {
        PALETTE.iter().find(|color| color.id == id)
    }
}

/// Convert a `#rrggbb` hex color to a `rgb(...)`/`rgba(...)` css value.
///
/// Strings that don't look like hex colors are passed through unchanged, so
/// templates can feed any configured color value here.
pub fn hex_to_rgb(hex: &str, alpha: Option<f32>) -> String {
    let Some(digits) = hex.strip_prefix('#') else {
        return hex.to_string();
    };
    // Byte length alone is not enough: slicing below needs every byte to be
    // an ASCII digit, or a multi-byte char would split mid-character.
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex.to_string();
    }

    let component = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16);
    let (Ok(r), Ok(g), Ok(b)) = (component(0..2), component(2..4), component(4..6)) else {
        return hex.to_string();
    };

    match alpha {
        Some(a) => format!("rgba({r}, {g}, {b}, {a})"),
        None => format!("rgb({r}, {g}, {b})"),
    }
}
