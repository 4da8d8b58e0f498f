use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier of a coordinate; manifests use either numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for CoordinateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One marker on a diagram.
///
/// `x` and `y` are pixel offsets of the marker centre in the image's native
/// coordinate space. `number` is the display label and the join key against
/// the parts table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub id: CoordinateId,
    pub number: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub part_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Coordinate {
    pub fn new(id: i64, number: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: CoordinateId::Int(id),
            number: number.into(),
            x,
            y,
            part_number: String::new(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.part_number = part_number.into();
        self
    }
}

/// A validated coordinate manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramManifest {
    pub image_name: String,
    pub coordinates: Vec<Coordinate>,
}

impl DiagramManifest {
    pub fn new(image_name: impl Into<String>, coordinates: Vec<Coordinate>) -> Self {
        Self {
            image_name: image_name.into(),
            coordinates,
        }
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.coordinates.len()
    }

    /// Marker numbers that appear more than once, in first-seen order
    #[must_use]
    pub fn duplicate_numbers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for coordinate in &self.coordinates {
            let number = coordinate.number.as_str();
            if !seen.insert(number) && reported.insert(number) {
                duplicates.push(number.to_string());
            }
        }
        duplicates
    }

    /// Find the coordinate carrying a marker number
    #[must_use]
    pub fn find(&self, number: &str) -> Option<&Coordinate> {
        self.coordinates.iter().find(|c| c.number == number)
    }
}
