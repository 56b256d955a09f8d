//! Core data models for notegraph entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// Rows are provisioned by the upstream identity service; `password_hash` is
/// an opaque string here and is never serialized in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at_utc: DateTime<Utc>,
}

/// A project grouping notes for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
}

/// A note: titled content with tags and an optional canvas position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    /// Normalized tag set (lowercased, deduplicated, sorted).
    pub tags: Vec<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// A directed edge between two notes.
///
/// The pair (from, to) is unique; the inverse pair is a distinct edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteLink {
    pub id: Uuid,
    pub from_note_id: Uuid,
    pub to_note_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
}

/// Node payload in a graph view: just enough to render and place it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Uuid,
    pub title: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Edge payload in a graph view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLink {
    pub from_note_id: Uuid,
    pub to_note_id: Uuid,
}

/// Graph view over a user's notes: nodes plus directed links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Edge inclusion rule when the graph is filtered to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeScope {
    /// Include an edge when either endpoint is in the filtered node set.
    /// Cross-project edges stay visible.
    #[default]
    Either,
    /// Include an edge only when both endpoints are in the filtered node set.
    Both,
}

impl EdgeScope {
    /// Parse from a query-string value. Unknown values are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "either" => Some(EdgeScope::Either),
            "both" => Some(EdgeScope::Both),
            _ => None,
        }
    }
}

/// Document formats the interchange codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// MIME type for download responses.
    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}
