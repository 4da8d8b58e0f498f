use serde::{Deserialize, Serialize};

/// A row of a diagram's parts table.
///
/// `id` is the 1-based position of the row among the non-blank records of
/// the table. All fields are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: usize,
    pub number: String,
    pub part_number: String,
    pub description: String,
    pub name: String,
}

impl TableRow {
    pub fn new(id: usize, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            part_number: String::new(),
            description: String::new(),
            name: String::new(),
        }
    }

    #[must_use]
    pub fn with_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.part_number = part_number.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
