use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::user::User;
use serde::Serialize;
use utoipa::ToSchema;

/// Overall balance, read straight off the registry's running counters.
/// Remaining values are signed: over-allocation is allowed and surfaces as a
/// negative remainder rather than being clamped away.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 10)]
    pub annual_total: u32,
    #[schema(example = 3)]
    pub annual_used: u32,
    #[schema(example = 7)]
    pub annual_remaining: i64,
    #[schema(example = 5)]
    pub sick_total: u32,
    #[schema(example = 1)]
    pub sick_used: u32,
    #[schema(example = 4)]
    pub sick_remaining: i64,
}

pub fn balance(user: &User) -> LeaveBalance {
    LeaveBalance {
        annual_total: user.annual_leave,
        annual_used: user.used_annual,
        annual_remaining: user.annual_leave as i64 - user.used_annual as i64,
        sick_total: user.sick_leave,
        sick_used: user.used_sick,
        sick_remaining: user.sick_leave as i64 - user.used_sick as i64,
    }
}

/// Year-scoped balance, recomputed from the log: approved requests starting
/// in the given year, measured against the user's total allocation
/// (allocations are not partitioned per year in this model).
#[derive(Debug, Serialize, ToSchema)]
pub struct YearBalance {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 8)]
    pub annual_used: u32,
    #[schema(example = 2)]
    pub annual_remaining: i64,
    #[schema(example = 2)]
    pub sick_used: u32,
    #[schema(example = 3)]
    pub sick_remaining: i64,
}

pub fn year_balance(user: &User, leaves: &[LeaveRequest], year: i32) -> YearBalance {
    let mut annual_used = 0u32;
    let mut sick_used = 0u32;

    for leave in leaves {
        if leave.user_email != user.email || leave.status != LeaveStatus::Approved {
            continue;
        }
        if leave.start_year() != Some(year) {
            continue;
        }
        match leave.leave_type {
            LeaveType::Annual => annual_used += leave.days,
            LeaveType::Sick => sick_used += leave.days,
            _ => {}
        }
    }

    YearBalance {
        year,
        annual_used,
        annual_remaining: user.annual_leave as i64 - annual_used as i64,
        sick_used,
        sick_remaining: user.sick_leave as i64 - sick_used as i64,
    }
}
