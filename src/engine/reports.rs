use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::state::AppState;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

/// Year of a request's start date, or `None` with a data-quality log line.
/// Reports skip such records instead of failing (dashboards must always
/// render over partially-bad data).
fn start_year_or_skip(leave: &LeaveRequest) -> Option<i32> {
    match leave.start_year() {
        Some(year) => Some(year),
        None => {
            tracing::warn!(
                id = leave.id,
                start_date = %leave.start_date,
                "skipping leave request with malformed start date"
            );
            None
        }
    }
}

/// Distinct years seen in the log, plus the configured default year and the
/// current calendar year, newest first.
pub fn leave_years(leaves: &[LeaveRequest], default_year: i32) -> Vec<i32> {
    let mut years = BTreeSet::new();
    years.insert(default_year);
    years.insert(Utc::now().date_naive().year());
    for leave in leaves {
        if let Some(year) = start_year_or_skip(leave) {
            years.insert(year);
        }
    }
    years.into_iter().rev().collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct YearOverview {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 11)]
    pub total: u32,
    #[schema(example = 2)]
    pub pending: u32,
    #[schema(example = 9)]
    pub approved: u32,
    #[schema(example = 0)]
    pub rejected: u32,
    /// Request counts keyed by leave-type wire name.
    pub by_type: BTreeMap<String, u32>,
    /// Request counts keyed by the owner's department; owners missing from
    /// the registry land under "Unknown".
    pub by_department: BTreeMap<String, u32>,
    #[schema(example = 4)]
    pub active_employees: u32,
}

pub fn year_overview(state: &AppState, year: i32) -> YearOverview {
    let mut overview = YearOverview {
        year,
        total: 0,
        pending: 0,
        approved: 0,
        rejected: 0,
        by_type: BTreeMap::new(),
        by_department: BTreeMap::new(),
        active_employees: state.users.len() as u32,
    };

    for leave in &state.leaves {
        if start_year_or_skip(leave) != Some(year) {
            continue;
        }
        overview.total += 1;
        match leave.status {
            LeaveStatus::Pending => overview.pending += 1,
            LeaveStatus::Approved => overview.approved += 1,
            LeaveStatus::Rejected => overview.rejected += 1,
        }
        *overview
            .by_type
            .entry(leave.leave_type.to_string())
            .or_default() += 1;

        let department = state
            .users
            .get(&leave.user_email)
            .map(|u| u.department.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        *overview.by_department.entry(department).or_default() += 1;
    }

    overview
}

/// Request counts per calendar month of the year, always 12 entries,
/// zero-filled for quiet months.
pub fn monthly_series(leaves: &[LeaveRequest], year: i32) -> [u32; 12] {
    let mut months = [0u32; 12];
    for leave in leaves {
        let Some(start) = leave.start() else {
            start_year_or_skip(leave);
            continue;
        };
        if start.year() == year {
            months[start.month0() as usize] += 1;
        }
    }
    months
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OnLeaveRow {
    #[schema(example = "Jhunriel Gaspar")]
    pub name: String,
    #[schema(example = "Data Engineer")]
    pub position: String,
    #[schema(example = "2025-09-15", format = "date")]
    pub start_date: String,
    #[schema(example = "2025-09-19", format = "date")]
    pub end_date: String,
    #[schema(example = "2025-08-20", format = "date")]
    pub applied_date: String,
    pub status: LeaveStatus,
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Approved and still-pending requests whose interval overlaps the given
/// month, joined with the owner's position, sorted by start date.
pub fn on_leave_in_month(state: &AppState, year: i32, month: u32) -> Vec<OnLeaveRow> {
    let Some((month_start, month_end)) = month_bounds(year, month) else {
        return Vec::new();
    };

    let mut rows: Vec<OnLeaveRow> = state
        .leaves
        .iter()
        .filter(|l| matches!(l.status, LeaveStatus::Approved | LeaveStatus::Pending))
        .filter_map(|l| {
            let (start, end) = match (l.start(), l.end()) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    start_year_or_skip(l);
                    return None;
                }
            };
            if start > month_end || end < month_start {
                return None;
            }
            let position = state
                .users
                .get(&l.user_email)
                .map(|u| u.position.clone())
                .unwrap_or_else(|| "N/A".to_string());
            Some(OnLeaveRow {
                name: l.user_name.clone(),
                position,
                start_date: l.start_date.clone(),
                end_date: l.end_date.clone(),
                applied_date: l.applied_date.clone(),
                status: l.status,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    rows
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentUsage {
    #[schema(example = "Data Team")]
    pub department: String,
    #[schema(example = 2)]
    pub employees: u32,
    /// Approved annual days in the year, averaged per employee, one decimal.
    #[schema(example = 4.5)]
    pub avg_annual_used: f64,
    #[schema(example = 3.0)]
    pub avg_sick_used: f64,
    #[schema(example = 15)]
    pub total_leave_days: u32,
}

/// Per-department averages of approved leave days in the year. Every
/// department present in the registry appears, zero-employee departments
/// cannot occur by construction and zero-usage ones report zero averages.
pub fn department_usage(state: &AppState, year: i32) -> Vec<DepartmentUsage> {
    struct Acc {
        employees: u32,
        annual: u32,
        sick: u32,
    }
    let mut departments: BTreeMap<String, Acc> = BTreeMap::new();

    for user in state.users.values() {
        departments
            .entry(user.department.clone())
            .or_insert(Acc {
                employees: 0,
                annual: 0,
                sick: 0,
            })
            .employees += 1;
    }

    for leave in &state.leaves {
        if leave.status != LeaveStatus::Approved || start_year_or_skip(leave) != Some(year) {
            continue;
        }
        // Orphaned requests have no department to attribute to.
        let Some(user) = state.users.get(&leave.user_email) else {
            tracing::warn!(id = leave.id, email = %leave.user_email, "skipping leave request with unknown owner");
            continue;
        };
        if let Some(acc) = departments.get_mut(&user.department) {
            match leave.leave_type {
                LeaveType::Annual => acc.annual += leave.days,
                LeaveType::Sick => acc.sick += leave.days,
                _ => {}
            }
        }
    }

    fn avg(total: u32, employees: u32) -> f64 {
        if employees == 0 {
            return 0.0;
        }
        (total as f64 / employees as f64 * 10.0).round() / 10.0
    }

    departments
        .into_iter()
        .map(|(department, acc)| DepartmentUsage {
            department,
            employees: acc.employees,
            avg_annual_used: avg(acc.annual, acc.employees),
            avg_sick_used: avg(acc.sick, acc.employees),
            total_leave_days: acc.annual + acc.sick,
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeYearRow {
    #[schema(example = "Jhunriel Gaspar")]
    pub name: String,
    #[schema(example = "jhunriel.gaspar@btgi.com.au", format = "email")]
    pub email: String,
    #[schema(example = "Data Team")]
    pub department: String,
    #[schema(example = "Data Engineer")]
    pub position: String,
    #[schema(example = 8)]
    pub annual_used: u32,
    #[schema(example = 2)]
    pub annual_remaining: i64,
    #[schema(example = 10)]
    pub annual_allocated: u32,
    #[schema(example = 3)]
    pub sick_used: u32,
    #[schema(example = 2)]
    pub sick_remaining: i64,
    #[schema(example = 5)]
    pub sick_allocated: u32,
    #[schema(example = 4)]
    pub total_requests: u32,
    #[schema(example = 1)]
    pub pending: u32,
}

/// One row per registered user with year-scoped usage recomputed from the
/// log (the admin "Employees" view), sorted by name.
pub fn employee_year_rows(state: &AppState, year: i32) -> Vec<EmployeeYearRow> {
    let mut rows: Vec<EmployeeYearRow> = state
        .users
        .values()
        .map(|user| {
            let yb = super::balance::year_balance(user, &state.leaves, year);
            let in_year: Vec<&LeaveRequest> = state
                .leaves
                .iter()
                .filter(|l| l.user_email == user.email && l.start_year() == Some(year))
                .collect();
            EmployeeYearRow {
                name: user.name.clone(),
                email: user.email.clone(),
                department: user.department.clone(),
                position: user.position.clone(),
                annual_used: yb.annual_used,
                annual_remaining: yb.annual_remaining,
                annual_allocated: user.annual_leave,
                sick_used: yb.sick_used,
                sick_remaining: yb.sick_remaining,
                sick_allocated: user.sick_leave,
                total_requests: in_year.len() as u32,
                pending: in_year
                    .iter()
                    .filter(|l| l.status == LeaveStatus::Pending)
                    .count() as u32,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::fixture_state;

    fn break_start_date(state: &mut AppState, id: u64) {
        let leave = state.leaves.iter_mut().find(|l| l.id == id).unwrap();
        leave.start_date = "not-a-date".to_string();
    }

    #[test]
    fn leave_years_contains_data_default_and_current() {
        let state = fixture_state();
        let years = leave_years(&state.leaves, 2025);
        assert!(years.contains(&2025));
        assert!(years.contains(&Utc::now().date_naive().year()));
        // Newest first.
        assert!(years.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn year_overview_counts_fixture() {
        let state = fixture_state();
        let overview = year_overview(&state, 2025);
        assert_eq!(overview.total, 11);
        assert_eq!(overview.pending, 2);
        assert_eq!(overview.approved, 9);
        assert_eq!(overview.rejected, 0);
        assert_eq!(overview.by_type["Annual Leave"], 7);
        assert_eq!(overview.by_type["Sick Leave"], 4);
        assert_eq!(overview.by_department["Data Team"], 6);
        assert_eq!(overview.active_employees, 4);
    }

    #[test]
    fn empty_year_is_all_zeros_not_an_error() {
        let state = fixture_state();
        let overview = year_overview(&state, 1999);
        assert_eq!(overview.total, 0);
        assert!(overview.by_type.is_empty());
        assert_eq!(monthly_series(&state.leaves, 1999), [0u32; 12]);
    }

    #[test]
    fn monthly_series_zero_fills_quiet_months() {
        let state = fixture_state();
        let series = monthly_series(&state.leaves, 2025);
        assert_eq!(series.len(), 12);
        assert_eq!(series[5], 1); // June: request 8
        assert_eq!(series[8], 3); // September: requests 1, 5, 9
        assert_eq!(series[0], 0); // January: nothing
        assert_eq!(series.iter().sum::<u32>(), 11);
    }

    #[test]
    fn malformed_dates_are_skipped_not_fatal() {
        let mut state = fixture_state();
        break_start_date(&mut state, 1);

        let overview = year_overview(&state, 2025);
        assert_eq!(overview.total, 10);
        assert_eq!(monthly_series(&state.leaves, 2025).iter().sum::<u32>(), 10);

        // Direct id lookup still works over the broken record.
        assert_eq!(state.request(1).unwrap().days, 5);
    }

    #[test]
    fn on_leave_overlap_includes_spanning_requests() {
        let state = fixture_state();
        // September 2025: ids 1 (15-19), 5 (08-08), 9 (20-22) start inside;
        // nothing spans in from August. Pending-in-month counts too.
        let rows = on_leave_in_month(&state, 2025, 9);
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].start_date <= w[1].start_date));

        // December 2025: only the pending year-end request (id 11).
        let december = on_leave_in_month(&state, 2025, 12);
        assert_eq!(december.len(), 1);
        assert_eq!(december[0].status, LeaveStatus::Pending);
    }

    #[test]
    fn on_leave_joins_position_defensively() {
        let mut state = fixture_state();
        state.users.remove("elsy.asmar@btgi.com.au");
        let december = on_leave_in_month(&state, 2025, 12);
        assert_eq!(december[0].position, "N/A");
    }

    #[test]
    fn department_usage_averages_per_employee() {
        let state = fixture_state();
        let usage = department_usage(&state, 2025);

        let data_team = usage.iter().find(|d| d.department == "Data Team").unwrap();
        // Mark (1 annual, 3 sick) + Jhunriel (8 annual, 3 sick) over 2 heads.
        assert_eq!(data_team.employees, 2);
        assert_eq!(data_team.avg_annual_used, 4.5);
        assert_eq!(data_team.avg_sick_used, 3.0);
        assert_eq!(data_team.total_leave_days, 15);

        let managers = usage.iter().find(|d| d.department == "Managers").unwrap();
        assert_eq!(managers.avg_annual_used, 4.0);
        assert_eq!(managers.avg_sick_used, 1.0);
    }

    #[test]
    fn department_usage_ignores_untracked_types() {
        let mut state = fixture_state();
        let mut leave = state.leaves[0].clone();
        leave.id = state.next_request_id();
        leave.leave_type = LeaveType::Casual;
        leave.days = 30;
        state.leaves.push(leave);

        let usage = department_usage(&state, 2025);
        let data_team = usage.iter().find(|d| d.department == "Data Team").unwrap();
        assert_eq!(data_team.total_leave_days, 15);
    }

    #[test]
    fn employee_rows_cover_every_user() {
        let state = fixture_state();
        let rows = employee_year_rows(&state, 2025);
        assert_eq!(rows.len(), 4);

        let jhunriel = rows
            .iter()
            .find(|r| r.email == "jhunriel.gaspar@btgi.com.au")
            .unwrap();
        assert_eq!(jhunriel.annual_used, 8);
        assert_eq!(jhunriel.annual_remaining, 2);
        assert_eq!(jhunriel.total_requests, 4);
        assert_eq!(jhunriel.pending, 1);
    }
}
