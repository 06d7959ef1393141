use serde::{Deserialize, Serialize};

/// A vault as returned by `op vault list --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An item as returned by `op item list --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub title: String,
    /// The item category (e.g. `LOGIN`, `API_CREDENTIAL`).
    #[serde(default)]
    pub category: String,
}
