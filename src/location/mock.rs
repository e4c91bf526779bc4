//! Fixed list of mock locations
//!
//! Cycled through by "next mock location"; wraps from the last entry back to
//! the first.

use crate::coord::{Coordinates, LabeledLocation};

const MOCK_LOCATIONS: &[(&str, f64, f64)] = &[
    ("Boulder, CO", 40.01924246438453, -105.259858527573),
    ("San Francisco", 37.79394100222431, -122.39235812762442),
    ("Karnataka Trade Promotion Organisation", 12.9794404, 77.7179181),
    ("Gurugram India", 28.42659051528613, 77.04881164397028),
    ("Akshar Dham Temple", 21.233980841304085, 72.9069776200368),
    ("Google India", 28.461689066807388, 77.0484750110405),
];

/// Cursor over the mock location list
#[derive(Debug, Clone, Default)]
pub struct MockLocations {
    index: usize,
}

impl MockLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a given entry (taken modulo the list length)
    pub fn starting_at(index: usize) -> Self {
        Self {
            index: index % MOCK_LOCATIONS.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> LabeledLocation {
        entry(self.index)
    }

    /// Move to the next entry, wrapping around, and return it
    pub fn advance(&mut self) -> LabeledLocation {
        self.index = (self.index + 1) % MOCK_LOCATIONS.len();
        self.current()
    }

    pub fn len(&self) -> usize {
        MOCK_LOCATIONS.len()
    }

    pub fn is_empty(&self) -> bool {
        MOCK_LOCATIONS.is_empty()
    }

    /// Every mock location in cycle order
    pub fn entries() -> Vec<LabeledLocation> {
        (0..MOCK_LOCATIONS.len()).map(entry).collect()
    }
}

fn entry(index: usize) -> LabeledLocation {
    let (label, lat, lng) = MOCK_LOCATIONS[index];
    LabeledLocation::new(Coordinates::new(lat, lng), label)
}
