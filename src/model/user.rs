use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "name": "Mark Torres",
        "email": "mark.torres@btgi.com.au",
        "role": "admin",
        "department": "Data Team",
        "position": "Data Engineer",
        "annual_leave": 10,
        "sick_leave": 5,
        "used_annual": 1,
        "used_sick": 3
    })
)]
pub struct User {
    #[schema(example = "Mark Torres")]
    pub name: String,

    #[schema(example = "mark.torres@btgi.com.au", format = "email")]
    pub email: String,

    pub role: Role,

    #[schema(example = "Data Team")]
    pub department: String,

    #[schema(example = "Data Engineer")]
    pub position: String,

    /// Total annual leave allocation in days, not partitioned per year.
    #[schema(example = 10)]
    pub annual_leave: u32,

    #[schema(example = 5)]
    pub sick_leave: u32,

    /// Running counter, bumped only when an annual-leave request is approved
    /// or by an explicit admin override.
    #[schema(example = 1)]
    pub used_annual: u32,

    #[schema(example = 3)]
    pub used_sick: u32,
}
