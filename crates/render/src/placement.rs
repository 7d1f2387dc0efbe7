//! Field placement on a 12-column grid
//!
//! A placement spec is a `;`-separated list of clauses
//! `<size>:<offset>,<width>[,right][,hide]` with `<size>` one of `small`,
//! `medium` or `large`. Sizes not mentioned inherit from the next smaller
//! size.
//!
//! ```text
//! "small:0,12;medium:0,4"
//!   field: small-12 medium-4 columns
//!   label: small-12 medium-6 columns
//!   value: small-12 medium-6 columns
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::choices::{ChoiceMap, FieldChoice};

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(small|medium|large):(\d+),(\d+),?(right)?,?(hide)?$")
        .expect("placement pattern is valid")
});

/// Label widths per size, in twelfths of a full-width field
const LABEL_WIDTHS: [u32; 3] = [12, 2, 2];

const SIZE_NAMES: [&str; 3] = ["small", "medium", "large"];

/// Standard placements and their grid-occupancy signatures
pub const PLACEMENT_OCCUPANCY: &[(&str, &str)] = &[
    ("small:0,12", "############ (0/12)"),
    ("small:0,12;medium:0,6", "######...... (0/6)"),
    ("small:0,12;medium:3,6", "...######... (3/6)"),
    ("small:0,12;medium:6,6", "......###### (6/6)"),
    ("small:0,12;medium:0,4", "####........ (0/4)"),
    ("small:0,12;medium:4,4", "....####.... (4/4)"),
    ("small:0,12;medium:8,4", "........#### (8/4)"),
    ("small:0,12;medium:0,3", "###......... (0/3)"),
    ("small:0,12;medium:3,3", "...###...... (3/3)"),
    ("small:0,12;medium:6,3", "......###... (6/3)"),
    ("small:0,12;medium:9,3", ".........### (9/3)"),
    ("small:0,12;medium:6,6right", "......###### (6/6R)"),
    ("small:0,12;medium:8,4right", "........#### (8/4R)"),
    ("small:0,12;medium:9,3right", ".........### (9/3R)"),
    ("small:0,9", "#########... (0/9col)"),
    ("small:3,9", "...######### (3/9col)"),
    ("small:0,8", "########.... (0/8col)"),
    ("small:4,8", "....######## (4/8col)"),
    ("small:0,6", "######...... (0/6col)"),
    ("small:3,6", "...######... (3/6col)"),
    ("small:6,6", "......###### (6/6col)"),
    ("small:0,4", "####........ (0/4col)"),
    ("small:4,4", "....####.... (4/4col)"),
    ("small:8,4", "........#### (8/4col)"),
    ("small:0,3", "###......... (0/3col)"),
    ("small:3,3", "...###...... (3/3col)"),
    ("small:6,3", "......###... (6/3col)"),
    ("small:9,3", ".........### (9/3col)"),
];

/// A value per screen size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions<T> {
    pub s: T,
    pub m: T,
    pub l: T,
}

impl<T: Copy> LayoutOptions<T> {
    fn from_array(a: [T; 3]) -> Self {
        Self {
            s: a[0],
            m: a[1],
            l: a[2],
        }
    }
}

/// Parsed placement of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub width: LayoutOptions<u32>,
    pub offset: LayoutOptions<u32>,
    pub display: LayoutOptions<bool>,
    /// Classes for the whole field
    pub field: String,
    /// Classes for the label portion
    pub label: String,
    /// Classes for the value portion
    pub value: String,
}

impl Default for Placement {
    fn default() -> Self {
        parse_placement("")
    }
}

#[derive(Default)]
struct Widths {
    field: [u32; 3],
    label: [u32; 3],
    value: [u32; 3],
}

impl Widths {
    fn set(&mut self, size: usize, width: u32) {
        self.field[size] = width;
        if width == 0 {
            self.label[size] = 0;
            self.value[size] = 0;
            return;
        }
        let label = LABEL_WIDTHS[size] * (12 / width);
        if label >= 12 {
            self.label[size] = 12;
            self.value[size] = 12;
        } else {
            self.label[size] = label;
            self.value[size] = 12 - label;
        }
    }
}

/// Format size classes, dropping a size equal to the next smaller one
fn format_class(widths: &[u32; 3], right: bool, show: &str) -> String {
    let mut parts = vec![format!("small-{}", widths[0])];
    let mut prev = widths[0];
    for (size, width) in widths.iter().enumerate().skip(1) {
        if *width != prev {
            parts.push(format!("{}-{}", SIZE_NAMES[size], width));
            prev = *width;
        }
    }
    let mut class = format!("{} columns", parts.join(" "));
    if right {
        class.push_str(" right");
    }
    if !show.is_empty() {
        class.push(' ');
        class.push_str(show);
    }
    class
}

/// Parse a placement spec; parsing stops at the first unrecognised clause
pub fn parse_placement(spec: &str) -> Placement {
    let mut widths = Widths::default();
    for size in 0..3 {
        widths.set(size, 12);
    }
    let mut offset = [0u32; 3];
    let mut display = [true; 3];
    let mut right = false;
    let mut show = "";

    for clause in spec.split(';').map(str::trim) {
        let Some(caps) = CLAUSE.captures(clause) else {
            break;
        };
        let size = match &caps[1] {
            "small" => 0,
            "medium" => 1,
            _ => 2,
        };
        let clause_offset: u32 = caps[2].parse().unwrap_or(0);
        let width: u32 = caps[3].parse().unwrap_or(12);
        right = caps.get(4).is_some();
        if caps.get(5).is_some() {
            display[size] = false;
            show = match size {
                0 => "show-for-medium-up",
                1 => "show-for-large-up",
                _ => "",
            };
        }
        // Larger sizes inherit until they are given explicitly
        for s in size..3 {
            widths.set(s, width);
            offset[s] = clause_offset;
        }
    }

    Placement {
        width: LayoutOptions::from_array(widths.field),
        offset: LayoutOptions::from_array(offset),
        display: LayoutOptions::from_array(display),
        field: format_class(&widths.field, right, show),
        label: format_class(&widths.label, false, ""),
        value: format_class(&widths.value, false, ""),
    }
}

/// Occupancy signature of a standard placement
pub fn occupancy(spec: &str) -> Option<&'static str> {
    PLACEMENT_OCCUPANCY
        .iter()
        .find(|(p, _)| *p == spec)
        .map(|(_, occ)| *occ)
}

/// Display text for a placement value
pub fn placement_text<'a>(spec: &'a str, placeholder: &'a str) -> &'a str {
    match occupancy(spec) {
        Some(occ) => occ,
        None if spec.is_empty() => placeholder,
        None => spec,
    }
}

/// Choice list of the standard placements
pub fn placement_choices() -> ChoiceMap {
    PLACEMENT_OCCUPANCY
        .iter()
        .map(|(spec, occ)| (spec.to_string(), FieldChoice::new(*spec, *occ)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_width() {
        let p = parse_placement("small:0,12");
        assert_eq!(p.field, "small-12 columns");
        assert_eq!(p.label, "small-12 medium-2 columns");
        assert_eq!(p.value, "small-12 medium-10 columns");
        assert_eq!(parse_placement("medium:0,12"), p);
        assert_eq!(parse_placement(""), p);
    }

    #[test]
    fn test_medium_inherits_small() {
        let p = parse_placement("small:0,12; medium:0,4");
        assert_eq!(p.width, LayoutOptions { s: 12, m: 4, l: 4 });
        assert_eq!(p.field, "small-12 medium-4 columns");
        assert_eq!(p.label, "small-12 medium-6 columns");
        assert_eq!(p.value, "small-12 medium-6 columns");

        let p = parse_placement("small:0,6");
        assert_eq!(p.width, LayoutOptions { s: 6, m: 6, l: 6 });
        assert_eq!(p.field, "small-6 columns");
        assert_eq!(p.label, "small-12 medium-4 columns");
        assert_eq!(p.value, "small-12 medium-8 columns");
    }

    #[test]
    fn test_three_sizes() {
        let p = parse_placement("small:0,12;medium:0,6;large:0,4");
        assert_eq!(p.field, "small-12 medium-6 large-4 columns");
        assert_eq!(p.label, "small-12 medium-4 large-6 columns");
        assert_eq!(p.value, "small-12 medium-8 large-6 columns");
    }

    #[test]
    fn test_right_and_hide_modifiers() {
        let p = parse_placement("small:0,6;medium:0,4,right");
        assert_eq!(p.field, "small-6 medium-4 columns right");

        let p = parse_placement("small:0,12,hide;medium:0,4");
        assert_eq!(p.display, LayoutOptions { s: false, m: true, l: true });
        assert_eq!(p.field, "small-12 medium-4 columns show-for-medium-up");
        assert_eq!(p.label, "small-12 medium-6 columns");

        let p = parse_placement("small:0,12;medium:6,6right");
        assert_eq!(p.offset, LayoutOptions { s: 0, m: 6, l: 6 });
        assert_eq!(p.field, "small-12 medium-6 columns right");
    }

    #[test]
    fn test_parsing_stops_at_bad_clause() {
        let p = parse_placement("small:0,6;bogus;medium:0,4");
        assert_eq!(p.width, LayoutOptions { s: 6, m: 6, l: 6 });
    }

    #[test]
    fn test_occupancy_and_choices() {
        assert_eq!(occupancy("small:0,12;medium:0,6"), Some("######...... (0/6)"));
        assert_eq!(placement_text("", "(select...)"), "(select...)");
        assert_eq!(placement_text("small:1,2", "x"), "small:1,2");
        let choices = placement_choices();
        assert_eq!(choices.len(), PLACEMENT_OCCUPANCY.len());
        assert_eq!(choices["small:0,12"].label, "############ (0/12)");
    }
}
