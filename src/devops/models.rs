//! Wire types for the Azure DevOps REST endpoints used by the server.
//!
//! Only the fields the server reads are modelled; everything else in the
//! upstream payloads is ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST {org}/{project}/_apis/search/codesearchresults`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSearchRequest {
    pub search_text: String,
    #[serde(rename = "$skip")]
    pub skip: u32,
    #[serde(rename = "$top")]
    pub top: u32,
    /// Filter category (`Project`, `Repository`, ...) to accepted values.
    pub filters: BTreeMap<String, Vec<String>>,
    pub include_facets: bool,
    pub include_snippet: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSearchResponse {
    /// `None` when upstream sends `null` or omits the field.
    #[serde(default)]
    pub results: Option<Vec<CodeSearchHit>>,
}

/// A single code-search hit. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSearchHit {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub repository: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl NamedRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Envelope used by list endpoints: `{"count": n, "value": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: Uuid,
    pub name: String,
}

impl GitRepository {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// `content` is absent for folders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitItem {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body returned by Azure DevOps on non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
