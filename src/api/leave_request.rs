use crate::auth::auth::AuthUser;
use crate::engine::lifecycle::{self, Decision};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::state::SharedState;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "Annual Leave")]
    pub leave_type: LeaveType,
    #[schema(example = "2025-09-15", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-09-19", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by leave status
    #[schema(example = "Pending")]
    pub status: Option<LeaveStatus>,
    /// Filter by the requester's display name
    #[schema(example = "Jhunriel Gaspar")]
    pub user: Option<String>,
    /// Filter by leave type
    #[schema(example = "Annual Leave")]
    pub leave_type: Option<LeaveType>,
    /// Filter by the year of the start date
    #[schema(example = 2025)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 11)]
    pub total: u32,
}

#[derive(Serialize, ToSchema)]
pub struct MyLeavesResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 4)]
    pub total: u32,
    #[schema(example = 1)]
    pub pending: u32,
}

fn sort_newest_applied_first(leaves: &mut [LeaveRequest]) {
    leaves.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
}

/// Submit a leave request for the authenticated user.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates or empty reason"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    state: web::Data<SharedState>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let mut state = state.write().expect("state lock poisoned");
    let leave = lifecycle::submit(
        &mut state,
        &auth.email,
        payload.leave_type,
        payload.start_date,
        payload.end_date,
        &payload.reason,
    )?;
    Ok(HttpResponse::Ok().json(leave))
}

/// The authenticated user's own requests, newest application first.
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    params(
        ("year" = Option<i32>, Query, description = "Restrict to a start-date year")
    ),
    responses(
        (status = 200, description = "Own leave requests", body = MyLeavesResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    state: web::Data<SharedState>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let state = state.read().expect("state lock poisoned");
    let mut data: Vec<LeaveRequest> = state
        .leaves
        .iter()
        .filter(|l| l.user_email == auth.email)
        .filter(|l| match query.year {
            Some(year) => l.start_year() == Some(year),
            None => true,
        })
        .cloned()
        .collect();
    sort_newest_applied_first(&mut data);

    let pending = data
        .iter()
        .filter(|l| l.status == LeaveStatus::Pending)
        .count() as u32;
    let total = data.len() as u32;
    Ok(HttpResponse::Ok().json(MyLeavesResponse {
        data,
        total,
        pending,
    }))
}

/// All requests with optional status/user/type/year filters (admin).
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Filtered leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    state: web::Data<SharedState>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let state = state.read().expect("state lock poisoned");
    let mut data: Vec<LeaveRequest> = state
        .leaves
        .iter()
        .filter(|l| match query.status {
            Some(status) => l.status == status,
            None => true,
        })
        .filter(|l| match query.user.as_deref() {
            Some(name) => l.user_name == name,
            None => true,
        })
        .filter(|l| match query.leave_type {
            Some(leave_type) => l.leave_type == leave_type,
            None => true,
        })
        .filter(|l| match query.year {
            Some(year) => l.start_year() == Some(year),
            None => true,
        })
        .cloned()
        .collect();
    sort_newest_applied_first(&mut data);

    let total = data.len() as u32;
    Ok(HttpResponse::Ok().json(LeaveListResponse { data, total }))
}

/// One request by id; admins see all, users only their own.
#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    state: web::Data<SharedState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let state = state.read().expect("state lock poisoned");
    let leave = state.request(id)?;
    if auth.role != Role::Admin && leave.user_email != auth.email {
        return Err(actix_web::error::ErrorForbidden("Admin only"));
    }
    Ok(HttpResponse::Ok().json(leave))
}

/// Approve a pending request; bumps the owner's used-day counter for
/// annual/sick leave (admin).
#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    state: web::Data<SharedState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let mut state = state.write().expect("state lock poisoned");
    let leave = lifecycle::decide(&mut state, path.into_inner(), Decision::Approve, &auth.name)?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Reject a pending request; counters stay untouched (admin).
#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    state: web::Data<SharedState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let mut state = state.write().expect("state lock poisoned");
    let leave = lifecycle::decide(&mut state, path.into_inner(), Decision::Reject, &auth.name)?;
    Ok(HttpResponse::Ok().json(leave))
}
