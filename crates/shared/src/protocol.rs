use serde::{Deserialize, Deserializer, Serialize};

/// Catalog columns are nullable; absent text decodes as an empty string.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub venue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub doi: String,
    #[serde(default)]
    pub open_access: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub use_case: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dataset: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_impact: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industry: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub function: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technique: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_evidence: String,
}

impl Paper {
    pub fn is_open_access(&self) -> bool {
        self.open_access.is_some_and(|flag| flag != 0)
    }

    /// Non-empty categorical tags in display order.
    pub fn tags(&self) -> Vec<&str> {
        [
            self.function.as_str(),
            self.technique.as_str(),
            self.industry.as_str(),
            self.stage.as_str(),
            self.modality.as_str(),
        ]
        .into_iter()
        .filter(|tag| !tag.trim().is_empty())
        .collect()
    }
}

/// One page of search results. Replaces any previously held page wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PapersResponse {
    pub papers: Vec<Paper>,
    pub count: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl PapersResponse {
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(default)]
    pub status: String,
}
