//! Concept domain models.
//!
//! Only the fields the client reasons about are typed. Event details, agenda,
//! speakers, pricing and anything the server adds later ride along in
//! `details` untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConceptStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Archived,
}

impl ConceptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Archived => "ARCHIVED",
        }
    }
}

/// An event concept owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ConceptStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Every other field of the server payload.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Concept {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: ConceptStatus::default(),
            tags: Vec::new(),
            version: 0,
            created_at: None,
            updated_at: None,
            user_id: None,
            details: Map::new(),
        }
    }
}

/// One page of `GET /api/concepts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptPage {
    #[serde(default)]
    pub content: Vec<Concept>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// Query filters for listing concepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptFilters {
    pub status: Option<ConceptStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ConceptFilters {
    /// Query parameters in the server's naming (`limit` is sent as `size`).
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("size", limit.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}

/// Body of `POST /api/concepts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConceptRequest {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_requirements: Option<Value>,
}

/// Body of `PUT /api/concepts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConceptRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConceptStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let payload = json!({
            "id": "c-1",
            "title": "Tech Summit",
            "description": "Annual summit",
            "status": "IN_PROGRESS",
            "tags": ["tech"],
            "version": 3,
            "userId": "user-1",
            "eventDetails": {"format": "HYBRID", "capacity": 300},
            "agenda": [{"id": "a-1", "title": "Keynote"}]
        });

        let concept: Concept = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(concept.status, ConceptStatus::InProgress);
        assert_eq!(concept.details["eventDetails"]["capacity"], 300);

        assert_eq!(serde_json::to_value(&concept).unwrap(), payload);
    }

    #[test]
    fn test_filters_to_query() {
        let filters = ConceptFilters {
            status: Some(ConceptStatus::Archived),
            page: Some(2),
            limit: Some(20),
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("page", "2".to_string()),
                ("size", "20".to_string()),
                ("status", "ARCHIVED".to_string()),
            ]
        );
        assert!(ConceptFilters::default().to_query().is_empty());
    }
}
