use serde::{ de, Deserialize, Deserializer, Serialize };

/// Sentinel the listing endpoint uses for an omitted `page` or `size`.
pub const UNSET: i64 = -1;

/// Body of `POST /reports`, echoed back verbatim as the acknowledgement.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCreation {
    pub amount: u64,
    #[serde(default)]
    pub group: String,
}

impl ReportCreation {
    pub fn new(amount: u64, group: impl Into<String>) -> Self {
        Self {
            amount,
            group: group.into(),
        }
    }
}

/// Query string of `GET /reports`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReportListParams {
    pub group: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<i64>,
}

// `?page=` means "not given", not a parse error
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where D: Deserializer<'de>
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl ReportListParams {
    pub fn page_or_unset(&self) -> i64 {
        self.page.unwrap_or(UNSET)
    }

    pub fn size_or_unset(&self) -> i64 {
        self.size.unwrap_or(UNSET)
    }
}
