//! Prompt types for askdocs.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A system prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Optional locale override for rendered dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Template string with Handlebars syntax
    pub template: String,
}

/// Calendar anchors substituted into the system template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    /// The current day
    pub today: NaiveDate,
    /// Monday of the current ISO week
    pub week_start: NaiveDate,
    /// Sunday 23:59:59 of the current ISO week
    pub week_end: NaiveDateTime,
}

impl WeekWindow {
    pub fn for_date(today: NaiveDate) -> Self {
        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let week_end = (week_start + Duration::days(7)).and_time(NaiveTime::default())
            - Duration::seconds(1);

        Self {
            today,
            week_start,
            week_end,
        }
    }
}

/// Template variables for one render.
#[derive(Debug, Clone, Serialize)]
pub struct SystemPromptVars {
    pub today: String,
    pub week_start: String,
    pub week_end: String,
}
