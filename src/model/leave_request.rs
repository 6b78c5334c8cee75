use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

pub const DATE_FMT: &str = "%Y-%m-%d";

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum LeaveType {
    #[serde(rename = "Annual Leave")]
    #[strum(serialize = "Annual Leave")]
    Annual,
    #[serde(rename = "Sick Leave")]
    #[strum(serialize = "Sick Leave")]
    Sick,
    #[serde(rename = "Casual Leave")]
    #[strum(serialize = "Casual Leave")]
    Casual,
    #[serde(rename = "Maternity/Paternity Leave")]
    #[strum(serialize = "Maternity/Paternity Leave")]
    Maternity,
    #[serde(rename = "Unpaid Leave")]
    #[strum(serialize = "Unpaid Leave")]
    Unpaid,
}

/// One leave request as persisted in `leaves.json`.
///
/// Dates are kept as `YYYY-MM-DD` strings, the shape the documents have on
/// disk. A record with a malformed date must still load and stay addressable
/// by id; readers parse through [`LeaveRequest::start`]/[`LeaveRequest::end`]
/// and skip the record when parsing fails.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_email": "jhunriel.gaspar@btgi.com.au",
        "user_name": "Jhunriel Gaspar",
        "leave_type": "Annual Leave",
        "start_date": "2025-09-15",
        "end_date": "2025-09-19",
        "days": 5,
        "reason": "Family vacation",
        "status": "Approved",
        "applied_date": "2025-08-20",
        "reviewed_by": "Mark Torres",
        "reviewed_date": "2025-08-21"
    })
)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jhunriel.gaspar@btgi.com.au", format = "email")]
    pub user_email: String,

    /// Snapshot of the user's display name at submission time.
    #[schema(example = "Jhunriel Gaspar")]
    pub user_name: String,

    pub leave_type: LeaveType,

    #[schema(example = "2025-09-15", format = "date")]
    pub start_date: String,

    #[schema(example = "2025-09-19", format = "date")]
    pub end_date: String,

    /// Inclusive day count, fixed at submission: end - start + 1.
    #[schema(example = 5)]
    pub days: u32,

    #[schema(example = "Family vacation")]
    pub reason: String,

    pub status: LeaveStatus,

    #[schema(example = "2025-08-20", format = "date")]
    pub applied_date: String,

    #[schema(example = "Mark Torres", nullable = true)]
    pub reviewed_by: Option<String>,

    #[schema(example = "2025-08-21", format = "date", nullable = true)]
    pub reviewed_date: Option<String>,
}

impl LeaveRequest {
    pub fn start(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, DATE_FMT).ok()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.end_date, DATE_FMT).ok()
    }

    pub fn start_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.start().map(|d| d.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn leave_type_wire_names() {
        assert_eq!(LeaveType::Annual.to_string(), "Annual Leave");
        assert_eq!(
            LeaveType::Maternity.to_string(),
            "Maternity/Paternity Leave"
        );
        assert_eq!(LeaveType::from_str("Sick Leave").unwrap(), LeaveType::Sick);
        assert!(LeaveType::from_str("Lunch Leave").is_err());
    }

    #[test]
    fn malformed_date_still_deserializes() {
        let raw = serde_json::json!({
            "id": 99,
            "user_email": "x@btgi.com.au",
            "user_name": "X",
            "leave_type": "Annual Leave",
            "start_date": "not-a-date",
            "end_date": "2025-01-02",
            "days": 2,
            "reason": "r",
            "status": "Pending",
            "applied_date": "2025-01-01",
            "reviewed_by": null,
            "reviewed_date": null
        });
        let req: LeaveRequest = serde_json::from_value(raw).unwrap();
        assert!(req.start().is_none());
        assert!(req.end().is_some());
        assert!(req.start_year().is_none());
    }
}
