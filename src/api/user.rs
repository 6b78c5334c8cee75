use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::balance::{self, LeaveBalance, YearBalance};
use crate::engine::registry::{self, NewUser, UserPatch};
use crate::model::user::User;
use crate::state::SharedState;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    #[schema(example = 4)]
    pub total: u32,
}

/// Overall balance from the registry counters, plus the year-scoped view
/// recomputed from the log when a year is requested.
#[derive(Serialize, ToSchema)]
pub struct BalanceView {
    pub overall: LeaveBalance,
    pub year_scoped: Option<YearBalance>,
}

#[derive(Deserialize, ToSchema)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Fields a non-admin may change on their own profile.
#[derive(Deserialize, ToSchema)]
pub struct ProfileUpdate {
    #[schema(example = "Mark Torres")]
    pub name: Option<String>,
    #[schema(example = "Data Team")]
    pub department: Option<String>,
    #[schema(example = "Data Engineer")]
    pub position: Option<String>,
}

/// All registered users (admin).
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "User list", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    state: web::Data<SharedState>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    let mut data: Vec<User> = state.users.values().cloned().collect();
    data.sort_by(|a, b| a.name.cmp(&b.name));
    let total = data.len() as u32;
    Ok(HttpResponse::Ok().json(UserListResponse { data, total }))
}

/// Register a new user (admin).
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, description = "Invalid email or missing name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn create_user(
    auth: AuthUser,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
    payload: web::Json<NewUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let mut state = state.write().expect("state lock poisoned");
    let user = registry::create(&mut state, payload.into_inner(), &config.email_domain)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Patch any field of any user, including allocation and used counters (admin).
#[utoipa::path(
    put,
    path = "/api/users/{email}",
    params(("email" = String, Path, description = "Registry key")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    auth: AuthUser,
    state: web::Data<SharedState>,
    path: web::Path<String>,
    payload: web::Json<UserPatch>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let mut state = state.write().expect("state lock poisoned");
    let user = registry::update(&mut state, &path.into_inner(), payload.into_inner())?;
    Ok(HttpResponse::Ok().json(user))
}

/// Self-service profile update: name, department, position only.
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_profile(
    auth: AuthUser,
    state: web::Data<SharedState>,
    payload: web::Json<ProfileUpdate>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let patch = UserPatch {
        name: payload.name,
        department: payload.department,
        position: payload.position,
        ..Default::default()
    };
    let mut state = state.write().expect("state lock poisoned");
    let user = registry::update(&mut state, &auth.email, patch)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Delete a user and cascade away their leave requests (admin).
#[utoipa::path(
    delete,
    path = "/api/users/{email}",
    params(("email" = String, Path, description = "Registry key")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden or self-deletion"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete_user(
    auth: AuthUser,
    state: web::Data<SharedState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let email = path.into_inner();
    let mut state = state.write().expect("state lock poisoned");
    registry::delete(&mut state, &email, &auth.email)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" })))
}

/// The authenticated user's balance.
#[utoipa::path(
    get,
    path = "/api/balance",
    params(("year" = Option<i32>, Query, description = "Also compute the year-scoped view")),
    responses(
        (status = 200, description = "Leave balance", body = BalanceView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn my_balance(
    auth: AuthUser,
    state: web::Data<SharedState>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    let state = state.read().expect("state lock poisoned");
    let user = state.user(&auth.email)?;
    Ok(HttpResponse::Ok().json(BalanceView {
        overall: balance::balance(user),
        year_scoped: query
            .year
            .map(|year| balance::year_balance(user, &state.leaves, year)),
    }))
}

/// Any user's balance by email (admin).
#[utoipa::path(
    get,
    path = "/api/users/{email}/balance",
    params(
        ("email" = String, Path, description = "Registry key"),
        ("year" = Option<i32>, Query, description = "Also compute the year-scoped view")
    ),
    responses(
        (status = 200, description = "Leave balance", body = BalanceView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn user_balance(
    auth: AuthUser,
    state: web::Data<SharedState>,
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let state = state.read().expect("state lock poisoned");
    let user = state.user(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(BalanceView {
        overall: balance::balance(user),
        year_scoped: query
            .year
            .map(|year| balance::year_balance(user, &state.leaves, year)),
    }))
}
