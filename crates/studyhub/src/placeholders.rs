//! Deterministic placeholder documents written after a reset.
//!
//! A document database only lists a collection while it holds at least one
//! document. Writing one well-known record into each known collection keeps the
//! schema discoverable by the app and the admin panel after a wipe.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::PLACEHOLDER_ID;

/// A placeholder record for one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderSeed {
    /// Target collection
    pub collection: String,
    /// Fixed document id
    pub id:         String,
    /// Literal payload
    pub data:       Value,
}

impl PlaceholderSeed {
    /// A seed using the shared placeholder id.
    pub fn new(collection: impl Into<String>, data: Value) -> Self {
        Self {
            collection: collection.into(),
            id: PLACEHOLDER_ID.to_owned(),
            data,
        }
    }
}

/// The collections of the StudyHub app and their placeholder payloads.
pub fn default_placeholders() -> Vec<PlaceholderSeed> {
    vec![
        PlaceholderSeed::new(
            "users",
            json!({
                "name": "Placeholder User",
                "email": "placeholder@studyhub.app",
                "role": "student",
                "isAdmin": false,
                "placeholder": true,
            }),
        ),
        PlaceholderSeed::new(
            "tests",
            json!({
                "title": "Placeholder Test",
                "subject": "General",
                "questions": [],
                "durationMinutes": 0,
                "placeholder": true,
            }),
        ),
        PlaceholderSeed::new(
            "textbooks",
            json!({
                "title": "Placeholder Textbook",
                "author": "StudyHub",
                "subject": "General",
                "chapters": [],
                "placeholder": true,
            }),
        ),
        PlaceholderSeed::new(
            "activities",
            json!({
                "type": "placeholder",
                "description": "Placeholder activity",
                "userId": PLACEHOLDER_ID,
                "placeholder": true,
            }),
        ),
        PlaceholderSeed::new(
            "moodEntries",
            json!({
                "userId": PLACEHOLDER_ID,
                "mood": 3,
                "note": "",
                "placeholder": true,
            }),
        ),
        PlaceholderSeed::new(
            "thoughtRecords",
            json!({
                "userId": PLACEHOLDER_ID,
                "situation": "",
                "automaticThought": "",
                "balancedThought": "",
                "placeholder": true,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::validation::{validate_collection_name, validate_document_id};

    #[test]
    fn test_default_placeholders_are_unique_and_valid() {
        let seeds = default_placeholders();
        let names: HashSet<_> = seeds.iter().map(|s| s.collection.as_str()).collect();
        assert_eq!(names.len(), seeds.len(), "one seed per collection");

        for seed in &seeds {
            assert!(validate_collection_name(&seed.collection).is_ok());
            assert!(validate_document_id(&seed.id).is_ok());
            assert_eq!(seed.id, PLACEHOLDER_ID);
            assert_eq!(seed.data["placeholder"], true);
        }
    }

    #[test]
    fn test_placeholders_are_deterministic() {
        assert_eq!(default_placeholders(), default_placeholders());
    }
}
