use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::reports::{
    self, DepartmentUsage, EmployeeYearRow, OnLeaveRow, YearOverview,
};
use crate::state::SharedState;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// Report year; the configured default year when absent.
    #[schema(example = 2025)]
    pub year: Option<i32>,
    /// Month for the on-leave view, 1-12; the current month when absent.
    #[schema(example = 9)]
    pub month: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlySeries {
    #[schema(example = 2025)]
    pub year: i32,
    /// Request counts for January through December.
    pub months: Vec<u32>,
}

fn pick_year(query: &DashboardQuery, config: &Config) -> i32 {
    query.year.unwrap_or(config.default_year)
}

/// Years selectable in the dashboards (admin).
#[utoipa::path(
    get,
    path = "/api/dashboard/years",
    responses(
        (status = 200, description = "Available years, newest first", body = Vec<i32>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn years(
    auth: AuthUser,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    Ok(HttpResponse::Ok().json(reports::leave_years(&state.leaves, config.default_year)))
}

/// Status/type/department counts for a year (admin).
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Yearly overview", body = YearOverview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn overview(
    auth: AuthUser,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    Ok(HttpResponse::Ok().json(reports::year_overview(&state, pick_year(&query, &config))))
}

/// Twelve-month request series, zero-filled (admin).
#[utoipa::path(
    get,
    path = "/api/dashboard/monthly",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Monthly trend", body = MonthlySeries),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn monthly(
    auth: AuthUser,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    let year = pick_year(&query, &config);
    let months = reports::monthly_series(&state.leaves, year).to_vec();
    Ok(HttpResponse::Ok().json(MonthlySeries { year, months }))
}

/// Who is on (or awaiting) leave in a month (admin). Defaults to the
/// current calendar month.
#[utoipa::path(
    get,
    path = "/api/dashboard/on-leave",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Employees on leave", body = Vec<OnLeaveRow>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn on_leave(
    auth: AuthUser,
    state: web::Data<SharedState>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    let state = state.read().expect("state lock poisoned");
    Ok(HttpResponse::Ok().json(reports::on_leave_in_month(&state, year, month)))
}

/// Per-department average leave usage for a year (admin).
#[utoipa::path(
    get,
    path = "/api/dashboard/departments",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Department usage", body = Vec<DepartmentUsage>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn departments(
    auth: AuthUser,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    Ok(HttpResponse::Ok().json(reports::department_usage(&state, pick_year(&query, &config))))
}

/// Year-scoped usage per employee (admin).
#[utoipa::path(
    get,
    path = "/api/dashboard/employees",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Per-employee year rows", body = Vec<EmployeeYearRow>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn employees(
    auth: AuthUser,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    Ok(HttpResponse::Ok().json(reports::employee_year_rows(&state, pick_year(&query, &config))))
}
