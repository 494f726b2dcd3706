//! Current time tool.

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use ferroact_core::error::ToolError;
use ferroact_core::tool::{Tool, ToolContext, parse_arguments};

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time, optionally shifted to a UTC offset in hours."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "utc_offset_hours": {
                    "type": "integer",
                    "description": "Offset from UTC in hours, between -12 and 14"
                }
            }
        })
    }

    async fn execute(&self, _ctx: &ToolContext, arguments: &str) -> Result<String, ToolError> {
        let args = parse_arguments(arguments)?;
        let hours = match &args["utc_offset_hours"] {
            serde_json::Value::Null => 0,
            v => v.as_i64().ok_or_else(|| {
                ToolError::InvalidArguments("'utc_offset_hours' must be an integer".into())
            })?,
        };

        let offset = i32::try_from(hours)
            .ok()
            .filter(|h| (-12..=14).contains(h))
            .and_then(|h| FixedOffset::east_opt(h * 3600))
            .ok_or_else(|| {
                ToolError::InvalidArguments(format!("utc offset {hours}h is out of range"))
            })?;

        let now = Utc::now();
        Ok(serde_json::json!({
            "iso8601": now.with_timezone(&offset).to_rfc3339(),
            "unix": now.timestamp(),
            "utc_offset_hours": hours,
        })
        .to_string())
    }
}
