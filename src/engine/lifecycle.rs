use crate::error::ApiError;
use crate::model::leave_request::{DATE_FMT, LeaveRequest, LeaveStatus, LeaveType};
use crate::state::AppState;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, ToSchema)]
pub enum Decision {
    Approve,
    Reject,
}

/// Inclusive day count of a date range; `end >= start` must already hold.
fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    ((end - start).num_days() + 1) as u32
}

/// Submits a new leave request on behalf of `email`.
///
/// Validates the date range and reason, allocates the next id, appends the
/// record as Pending and persists the log before returning. Remaining balance
/// is deliberately not checked: over-allocation is allowed and shows up as a
/// negative remainder on the balance side.
pub fn submit(
    state: &mut AppState,
    email: &str,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: &str,
) -> Result<LeaveRequest, ApiError> {
    if end_date < start_date {
        return Err(ApiError::validation("start_date cannot be after end_date"));
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ApiError::validation("Please provide a reason for your leave"));
    }
    let user = state.user(email)?;

    let leave = LeaveRequest {
        id: state.next_request_id(),
        user_email: user.email.clone(),
        user_name: user.name.clone(),
        leave_type,
        start_date: start_date.format(DATE_FMT).to_string(),
        end_date: end_date.format(DATE_FMT).to_string(),
        days: inclusive_days(start_date, end_date),
        reason: reason.to_string(),
        status: LeaveStatus::Pending,
        applied_date: Utc::now().date_naive().format(DATE_FMT).to_string(),
        reviewed_by: None,
        reviewed_date: None,
    };

    state.leaves.push(leave.clone());
    if let Err(e) = state.persist_leaves() {
        // Single-phase commit: a failed save must not leave the request in memory.
        state.leaves.pop();
        return Err(e);
    }

    info!(id = leave.id, user = %leave.user_email, leave_type = %leave.leave_type, days = leave.days, "leave request submitted");
    Ok(leave)
}

/// Applies an admin decision to a pending request.
///
/// The only legal transitions are Pending -> Approved and Pending -> Rejected;
/// deciding an already-decided request fails with `InvalidTransition`. On
/// approval the owner's used-day counter grows by `days` for the two tracked
/// leave types. Both documents persist before success is reported; a persist
/// failure rolls the in-memory mutation back.
pub fn decide(
    state: &mut AppState,
    id: u64,
    decision: Decision,
    reviewer_name: &str,
) -> Result<LeaveRequest, ApiError> {
    let idx = state
        .leaves
        .iter()
        .position(|l| l.id == id)
        .ok_or(ApiError::NotFound("Leave request"))?;
    if state.leaves[idx].status != LeaveStatus::Pending {
        return Err(ApiError::InvalidTransition);
    }

    let prev_leave = state.leaves[idx].clone();
    let owner_email = prev_leave.user_email.clone();
    let prev_user = state.users.get(&owner_email).cloned();

    {
        let leave = &mut state.leaves[idx];
        leave.status = match decision {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject => LeaveStatus::Rejected,
        };
        leave.reviewed_by = Some(reviewer_name.to_string());
        leave.reviewed_date = Some(Utc::now().date_naive().format(DATE_FMT).to_string());
    }

    if decision == Decision::Approve {
        if let Some(user) = state.users.get_mut(&owner_email) {
            match state.leaves[idx].leave_type {
                LeaveType::Annual => user.used_annual += state.leaves[idx].days,
                LeaveType::Sick => user.used_sick += state.leaves[idx].days,
                _ => {} // other types consume no tracked balance
            }
        }
    }

    let persisted = state.persist_leaves().and_then(|_| state.persist_users());
    if let Err(e) = persisted {
        state.leaves[idx] = prev_leave;
        if let Some(user) = prev_user {
            state.users.insert(owner_email, user);
        }
        // The log may already carry the decision on disk (persist_users
        // failed after persist_leaves succeeded); put the old log back so a
        // restart cannot see an approval whose counter never committed.
        if let Err(undo) = state.persist_leaves() {
            tracing::warn!(id, error = %undo, "could not restore leave log after failed persist");
        }
        return Err(e);
    }

    let leave = state.leaves[idx].clone();
    info!(id, decision = ?decision, reviewer = reviewer_name, "leave request decided");
    Ok(leave)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::fixture_state;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    #[test]
    fn submit_computes_inclusive_days() {
        let mut state = fixture_state();
        let leave = submit(
            &mut state,
            "aj.morong@btgi.com.au",
            LeaveType::Annual,
            date("2025-09-15"),
            date("2025-09-19"),
            "trip",
        )
        .unwrap();
        assert_eq!(leave.days, 5);
        assert_eq!(leave.id, 12);
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert!(leave.reviewed_by.is_none());
    }

    #[test]
    fn submit_single_day_counts_one() {
        let mut state = fixture_state();
        let leave = submit(
            &mut state,
            "aj.morong@btgi.com.au",
            LeaveType::Sick,
            date("2025-03-03"),
            date("2025-03-03"),
            "dentist",
        )
        .unwrap();
        assert_eq!(leave.days, 1);
    }

    #[test]
    fn submit_rejects_bad_input() {
        let mut state = fixture_state();
        let before = state.leaves.len();

        let end_before_start = submit(
            &mut state,
            "aj.morong@btgi.com.au",
            LeaveType::Annual,
            date("2025-09-19"),
            date("2025-09-15"),
            "trip",
        );
        assert!(matches!(end_before_start, Err(ApiError::Validation(_))));

        let blank_reason = submit(
            &mut state,
            "aj.morong@btgi.com.au",
            LeaveType::Annual,
            date("2025-09-15"),
            date("2025-09-19"),
            "   ",
        );
        assert!(matches!(blank_reason, Err(ApiError::Validation(_))));

        let unknown_user = submit(
            &mut state,
            "ghost@btgi.com.au",
            LeaveType::Annual,
            date("2025-09-15"),
            date("2025-09-19"),
            "trip",
        );
        assert!(matches!(unknown_user, Err(ApiError::NotFound(_))));

        assert_eq!(state.leaves.len(), before);
    }

    #[test]
    fn approve_bumps_only_the_matching_counter() {
        let mut state = fixture_state();
        // Request 10: Jhunriel, Annual Leave, 4 days, Pending.
        let before = state.user("jhunriel.gaspar@btgi.com.au").unwrap().clone();

        let leave = decide(&mut state, 10, Decision::Approve, "Mark Torres").unwrap();
        assert_eq!(leave.status, LeaveStatus::Approved);
        assert_eq!(leave.reviewed_by.as_deref(), Some("Mark Torres"));
        assert!(leave.reviewed_date.is_some());

        let after = state.user("jhunriel.gaspar@btgi.com.au").unwrap();
        assert_eq!(after.used_annual, before.used_annual + 4);
        assert_eq!(after.used_sick, before.used_sick);
    }

    #[test]
    fn reject_leaves_counters_untouched() {
        let mut state = fixture_state();
        let before = state.user("elsy.asmar@btgi.com.au").unwrap().clone();

        let leave = decide(&mut state, 11, Decision::Reject, "Mark Torres").unwrap();
        assert_eq!(leave.status, LeaveStatus::Rejected);

        let after = state.user("elsy.asmar@btgi.com.au").unwrap();
        assert_eq!(after.used_annual, before.used_annual);
        assert_eq!(after.used_sick, before.used_sick);
    }

    #[test]
    fn second_decision_fails_and_counters_move_once() {
        let mut state = fixture_state();
        decide(&mut state, 10, Decision::Approve, "Mark Torres").unwrap();
        let used = state.user("jhunriel.gaspar@btgi.com.au").unwrap().used_annual;

        let again = decide(&mut state, 10, Decision::Approve, "Mark Torres");
        assert!(matches!(again, Err(ApiError::InvalidTransition)));
        let again = decide(&mut state, 10, Decision::Reject, "Mark Torres");
        assert!(matches!(again, Err(ApiError::InvalidTransition)));

        assert_eq!(
            state.user("jhunriel.gaspar@btgi.com.au").unwrap().used_annual,
            used
        );
    }

    #[test]
    fn deciding_untracked_type_keeps_counters() {
        let mut state = fixture_state();
        let leave = submit(
            &mut state,
            "aj.morong@btgi.com.au",
            LeaveType::Unpaid,
            date("2025-04-01"),
            date("2025-04-05"),
            "sabbatical",
        )
        .unwrap();
        let before = state.user("aj.morong@btgi.com.au").unwrap().clone();

        decide(&mut state, leave.id, Decision::Approve, "Mark Torres").unwrap();

        let after = state.user("aj.morong@btgi.com.au").unwrap();
        assert_eq!(after.used_annual, before.used_annual);
        assert_eq!(after.used_sick, before.used_sick);
    }

    #[test]
    fn failed_persist_rolls_submission_back() {
        let mut state = crate::state::test_support::unwritable_state();
        let before = state.leaves.len();

        let res = submit(
            &mut state,
            "aj.morong@btgi.com.au",
            LeaveType::Annual,
            date("2025-09-15"),
            date("2025-09-19"),
            "trip",
        );
        assert!(matches!(res, Err(ApiError::Storage(_))));
        assert_eq!(state.leaves.len(), before);
    }

    #[test]
    fn failed_persist_rolls_decision_back() {
        let mut state = crate::state::test_support::unwritable_state();
        let before = state.user("jhunriel.gaspar@btgi.com.au").unwrap().clone();

        let res = decide(&mut state, 10, Decision::Approve, "Mark Torres");
        assert!(matches!(res, Err(ApiError::Storage(_))));

        assert_eq!(state.request(10).unwrap().status, LeaveStatus::Pending);
        assert!(state.request(10).unwrap().reviewed_by.is_none());
        assert_eq!(
            state.user("jhunriel.gaspar@btgi.com.au").unwrap().used_annual,
            before.used_annual
        );
    }

    #[test]
    fn failed_registry_persist_restores_the_log_on_disk() {
        // The registry document is unwritable but the log is not, so the
        // decided status reaches disk before the commit fails.
        let mut state = crate::state::test_support::unwritable_users_state();

        let res = decide(&mut state, 10, Decision::Approve, "Mark Torres");
        assert!(matches!(res, Err(ApiError::Storage(_))));
        assert_eq!(state.request(10).unwrap().status, LeaveStatus::Pending);

        // A restart must not see the approval either.
        let on_disk = state.store.load_requests().unwrap();
        let reloaded = on_disk.iter().find(|l| l.id == 10).unwrap();
        assert_eq!(reloaded.status, LeaveStatus::Pending);
        assert!(reloaded.reviewed_by.is_none());
    }

    #[test]
    fn decide_unknown_id_is_not_found() {
        let mut state = fixture_state();
        let missing = decide(&mut state, 999, Decision::Approve, "Mark Torres");
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }
}
