use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value };

use crate::schema::reports;

/// A generated report document.
///
/// Serializes as one flat JSON object: the well-known keys (`id`, `group`, `enabled`,
/// `name`) next to whatever the generator put in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl Report {
    /// An unsaved, enabled report tagged with `group`. Empty groups are kept as `Some("")`.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            id: None,
            group: Some(group.into()),
            enabled: true,
            name: None,
            fields: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReportRow {
    pub seq: i64,
    pub id: String,
    pub group_name: Option<String>,
    pub name: Option<String>,
    pub enabled: bool,
    pub fields: Value,
    pub created_at: NaiveDateTime,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        let fields = match row.fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Report {
            id: Some(row.id),
            group: row.group_name,
            enabled: row.enabled,
            name: row.name,
            fields,
        }
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub id: String,
    pub group_name: Option<String>,
    pub name: Option<String>,
    pub enabled: bool,
    pub fields: Value,
}

impl NewReport {
    pub fn from_report(report: &Report, id: String) -> Self {
        NewReport {
            id,
            group_name: report.group.clone(),
            name: report.name.clone(),
            enabled: report.enabled,
            fields: Value::Object(report.fields.clone()),
        }
    }
}
