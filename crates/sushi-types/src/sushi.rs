//! Sushi record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry.
///
/// `id` is supplied by the caller and is the only lookup key. The timestamps
/// are owned by the storage backends that track them and never appear in the
/// public JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sushi {
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sushi {
    pub fn new(
        id: impl Into<String>,
        image_number: impl Into<String>,
        name: impl Into<String>,
        ingredients: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            image_number: image_number.into(),
            name: name.into(),
            ingredients,
            created_at: None,
            updated_at: None,
        }
    }

    /// Compare the public fields only; timestamps are ignored.
    pub fn same_content(&self, other: &Sushi) -> bool {
        self.id == other.id
            && self.image_number == other.image_number
            && self.name == other.name
            && self.ingredients == other.ingredients
    }
}
