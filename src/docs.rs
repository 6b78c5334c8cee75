use crate::api::dashboard::{DashboardQuery, MonthlySeries};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, MyLeavesResponse};
use crate::api::user::{BalanceView, ProfileUpdate, UserListResponse};
use crate::engine::balance::{LeaveBalance, YearBalance};
use crate::engine::registry::{NewUser, UserPatch};
use crate::engine::reports::{DepartmentUsage, EmployeeYearRow, OnLeaveRow, YearOverview};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::model::user::User;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management Portal API",
        version = "1.0.0",
        description = r#"
## Leave Management Portal

This API powers an internal **leave-management portal**: employees submit
leave requests, admins approve or reject them, and dashboards summarize
balances and trends.

### 🔹 Key Features
- **Leave Requests**
  - Submit, list, approve and reject requests through a strict
    Pending → Approved/Rejected lifecycle
- **Balances**
  - Overall balance from allocation counters, year-scoped balance recomputed
    from the request log
- **User Registry**
  - Admin-managed profiles with auto-provisioning on first sign-in
- **Dashboards**
  - Yearly overviews, monthly trends, on-leave-this-month and
    department-level usage analytics

### 🔐 Security
Identity comes from an external provider; the portal exchanges its claim for
**JWT Bearer tokens**. Admin-only endpoints require the admin role.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::user::list_users,
        crate::api::user::create_user,
        crate::api::user::update_user,
        crate::api::user::update_profile,
        crate::api::user::delete_user,
        crate::api::user::my_balance,
        crate::api::user::user_balance,

        crate::api::dashboard::years,
        crate::api::dashboard::overview,
        crate::api::dashboard::monthly,
        crate::api::dashboard::on_leave,
        crate::api::dashboard::departments,
        crate::api::dashboard::employees
    ),
    components(
        schemas(
            User,
            Role,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            MyLeavesResponse,
            NewUser,
            UserPatch,
            ProfileUpdate,
            UserListResponse,
            LeaveBalance,
            YearBalance,
            BalanceView,
            DashboardQuery,
            MonthlySeries,
            YearOverview,
            OnLeaveRow,
            DepartmentUsage,
            EmployeeYearRow
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Identity-claim exchange and token APIs"),
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "User", description = "User registry and balance APIs"),
        (name = "Dashboard", description = "Reporting and analytics APIs"),
    )
)]
pub struct ApiDoc;
