use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::user::User;
use crate::state::AppState;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

pub const DEFAULT_ANNUAL_ALLOCATION: u32 = 10;
pub const DEFAULT_SICK_ALLOCATION: u32 = 5;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewUser {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@btgi.com.au", format = "email")]
    pub email: String,
    pub role: Role,
    #[schema(example = "HR")]
    pub department: String,
    #[schema(example = "HR Officer")]
    pub position: String,
    #[schema(example = 10)]
    pub annual_leave: u32,
    #[schema(example = 5)]
    pub sick_leave: u32,
}

/// Partial update; absent fields keep their current value. The used counters
/// are included on purpose: direct edits are the sanctioned admin override
/// path next to approval-driven increments.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub annual_leave: Option<u32>,
    pub sick_leave: Option<u32>,
    pub used_annual: Option<u32>,
    pub used_sick: Option<u32>,
}

/// Canonical form of the identity key. Login lowercases the provider's claim
/// the same way; a mixed-case admin entry must land on the same registry slot.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str, domain: &str) -> Result<(), ApiError> {
    let local = email.strip_suffix(domain).unwrap_or("");
    if !email.ends_with(domain) || local.is_empty() || local.contains('@') {
        return Err(ApiError::InvalidEmail(domain.to_string()));
    }
    Ok(())
}

pub fn create(state: &mut AppState, new: NewUser, email_domain: &str) -> Result<User, ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::validation("Name and Email are required"));
    }
    let email = normalize_email(&new.email);
    validate_email(&email, email_domain)?;
    if state.users.contains_key(&email) {
        return Err(ApiError::DuplicateEmail);
    }

    let user = User {
        name: new.name,
        email: email.clone(),
        role: new.role,
        department: new.department,
        position: new.position,
        annual_leave: new.annual_leave,
        sick_leave: new.sick_leave,
        used_annual: 0,
        used_sick: 0,
    };
    state.users.insert(email.clone(), user.clone());
    if let Err(e) = state.persist_users() {
        state.users.remove(&email);
        return Err(e);
    }

    info!(email = %user.email, role = %user.role, "user created");
    Ok(user)
}

pub fn update(state: &mut AppState, email: &str, patch: UserPatch) -> Result<User, ApiError> {
    let email = &normalize_email(email);
    if !state.users.contains_key(email) {
        return Err(ApiError::NotFound("User"));
    }
    if matches!(&patch.name, Some(n) if n.trim().is_empty()) {
        return Err(ApiError::validation("Name is required"));
    }

    let prev = state.users[email].clone();
    {
        let user = state.users.get_mut(email).expect("checked above");
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(department) = patch.department {
            user.department = department;
        }
        if let Some(position) = patch.position {
            user.position = position;
        }
        if let Some(annual_leave) = patch.annual_leave {
            user.annual_leave = annual_leave;
        }
        if let Some(sick_leave) = patch.sick_leave {
            user.sick_leave = sick_leave;
        }
        if let Some(used_annual) = patch.used_annual {
            user.used_annual = used_annual;
        }
        if let Some(used_sick) = patch.used_sick {
            user.used_sick = used_sick;
        }
    }

    if let Err(e) = state.persist_users() {
        state.users.insert(email.to_string(), prev);
        return Err(e);
    }

    info!(email, "user updated");
    Ok(state.users[email].clone())
}

/// Deletes a user and cascades over the log: every request owned by the email
/// goes with the account. An admin cannot delete their own account.
pub fn delete(state: &mut AppState, email: &str, acting_email: &str) -> Result<(), ApiError> {
    let email = normalize_email(email);
    if email == acting_email {
        return Err(ApiError::SelfDeletion);
    }
    let removed = state
        .users
        .remove(&email)
        .ok_or(ApiError::NotFound("User"))?;

    let mut removed_leaves = Vec::new();
    state.leaves.retain(|l| {
        if l.user_email == email {
            removed_leaves.push(l.clone());
            false
        } else {
            true
        }
    });

    let persisted = state.persist_users().and_then(|_| state.persist_leaves());
    if let Err(e) = persisted {
        state.users.insert(email.clone(), removed);
        state.leaves.extend(removed_leaves);
        state.leaves.sort_by_key(|l| l.id);
        return Err(e);
    }

    info!(email = %email, cascaded = removed_leaves.len(), "user deleted");
    Ok(())
}

/// Consumes an identity claim from the external provider. A known email gets
/// its display name refreshed from the claim; an unknown one is provisioned
/// with default allocations, admin role only for the configured address.
pub fn provision(
    state: &mut AppState,
    email: &str,
    display_name: &str,
    admin_email: &str,
) -> Result<User, ApiError> {
    if let Some(user) = state.users.get_mut(email) {
        if user.name != display_name {
            user.name = display_name.to_string();
            state.persist_users()?;
        }
        return Ok(state.users[email].clone());
    }

    let role = if email == admin_email {
        Role::Admin
    } else {
        Role::User
    };
    warn!(email, %role, "unknown identity, auto-provisioning");

    let user = User {
        name: display_name.to_string(),
        email: email.to_string(),
        role,
        department: "Unassigned".to_string(),
        position: "Employee".to_string(),
        annual_leave: DEFAULT_ANNUAL_ALLOCATION,
        sick_leave: DEFAULT_SICK_ALLOCATION,
        used_annual: 0,
        used_sick: 0,
    };
    state.users.insert(email.to_string(), user.clone());
    if let Err(e) = state.persist_users() {
        state.users.remove(email);
        return Err(e);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::fixture_state;

    const DOMAIN: &str = "@btgi.com.au";

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane Doe".into(),
            email: email.into(),
            role: Role::User,
            department: "HR".into(),
            position: "HR Officer".into(),
            annual_leave: 10,
            sick_leave: 5,
        }
    }

    #[test]
    fn create_enforces_domain_policy() {
        let mut state = fixture_state();
        assert!(matches!(
            create(&mut state, new_user("jane@gmail.com"), DOMAIN),
            Err(ApiError::InvalidEmail(_))
        ));
        assert!(matches!(
            create(&mut state, new_user("@btgi.com.au"), DOMAIN),
            Err(ApiError::InvalidEmail(_))
        ));
        assert!(create(&mut state, new_user("jane.doe@btgi.com.au"), DOMAIN).is_ok());
    }

    #[test]
    fn create_rejects_duplicates() {
        let mut state = fixture_state();
        let dup = create(&mut state, new_user("mark.torres@btgi.com.au"), DOMAIN);
        assert!(matches!(dup, Err(ApiError::DuplicateEmail)));
        // Case must not smuggle a second entry past the duplicate check.
        let dup = create(&mut state, new_user("Mark.Torres@btgi.com.au"), DOMAIN);
        assert!(matches!(dup, Err(ApiError::DuplicateEmail)));
    }

    #[test]
    fn mixed_case_creation_and_login_share_one_registry_entry() {
        let mut state = fixture_state();
        let before = state.users.len();

        let user = create(&mut state, new_user("Jane.Doe@btgi.com.au"), DOMAIN).unwrap();
        assert_eq!(user.email, "jane.doe@btgi.com.au");

        // First sign-in arrives lowercased; it must land on the admin-created
        // account instead of provisioning a second one.
        let signed_in = provision(
            &mut state,
            "jane.doe@btgi.com.au",
            "Jane Doe",
            "mark.torres@btgi.com.au",
        )
        .unwrap();
        assert_eq!(signed_in.department, "HR");
        assert_eq!(state.users.len(), before + 1);
    }

    #[test]
    fn created_user_starts_with_zero_usage() {
        let mut state = fixture_state();
        let user = create(&mut state, new_user("jane.doe@btgi.com.au"), DOMAIN).unwrap();
        assert_eq!(user.used_annual, 0);
        assert_eq!(user.used_sick, 0);
    }

    #[test]
    fn update_patches_only_provided_fields() {
        let mut state = fixture_state();
        let patch = UserPatch {
            position: Some("Lead Data Engineer".into()),
            used_annual: Some(9),
            ..Default::default()
        };
        let user = update(&mut state, "jhunriel.gaspar@btgi.com.au", patch).unwrap();
        assert_eq!(user.position, "Lead Data Engineer");
        assert_eq!(user.used_annual, 9);
        // Untouched fields survive.
        assert_eq!(user.department, "Data Team");
        assert_eq!(user.used_sick, 2);
    }

    #[test]
    fn update_unknown_email_is_not_found() {
        let mut state = fixture_state();
        let missing = update(&mut state, "ghost@btgi.com.au", UserPatch::default());
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn delete_cascades_to_owned_requests() {
        let mut state = fixture_state();
        let owned = state
            .leaves
            .iter()
            .filter(|l| l.user_email == "jhunriel.gaspar@btgi.com.au")
            .count();
        assert!(owned > 0);

        delete(
            &mut state,
            "jhunriel.gaspar@btgi.com.au",
            "mark.torres@btgi.com.au",
        )
        .unwrap();

        assert!(state.user("jhunriel.gaspar@btgi.com.au").is_err());
        assert!(
            state
                .leaves
                .iter()
                .all(|l| l.user_email != "jhunriel.gaspar@btgi.com.au")
        );
    }

    #[test]
    fn delete_refuses_self() {
        let mut state = fixture_state();
        let own = delete(
            &mut state,
            "mark.torres@btgi.com.au",
            "mark.torres@btgi.com.au",
        );
        assert!(matches!(own, Err(ApiError::SelfDeletion)));
        assert!(state.user("mark.torres@btgi.com.au").is_ok());
    }

    #[test]
    fn failed_persist_rolls_registry_mutations_back() {
        let mut state = crate::state::test_support::unwritable_state();

        let created = create(&mut state, new_user("jane.doe@btgi.com.au"), DOMAIN);
        assert!(matches!(created, Err(ApiError::Storage(_))));
        assert!(state.user("jane.doe@btgi.com.au").is_err());

        let patch = UserPatch {
            position: Some("Lead Data Engineer".into()),
            ..Default::default()
        };
        let updated = update(&mut state, "jhunriel.gaspar@btgi.com.au", patch);
        assert!(matches!(updated, Err(ApiError::Storage(_))));
        assert_eq!(
            state.user("jhunriel.gaspar@btgi.com.au").unwrap().position,
            "Data Engineer"
        );

        let deleted = delete(
            &mut state,
            "jhunriel.gaspar@btgi.com.au",
            "mark.torres@btgi.com.au",
        );
        assert!(matches!(deleted, Err(ApiError::Storage(_))));
        assert!(state.user("jhunriel.gaspar@btgi.com.au").is_ok());
        assert_eq!(state.leaves.len(), 11);
    }

    #[test]
    fn provision_refreshes_name_for_known_user() {
        let mut state = fixture_state();
        let user = provision(
            &mut state,
            "aj.morong@btgi.com.au",
            "A.J. Morong",
            "mark.torres@btgi.com.au",
        )
        .unwrap();
        assert_eq!(user.name, "A.J. Morong");
        assert_eq!(user.used_annual, 5); // counters untouched
    }

    #[test]
    fn provision_creates_unknown_user_with_defaults() {
        let mut state = fixture_state();
        let user = provision(
            &mut state,
            "new.hire@btgi.com.au",
            "New Hire",
            "mark.torres@btgi.com.au",
        )
        .unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.annual_leave, DEFAULT_ANNUAL_ALLOCATION);
        assert_eq!(user.sick_leave, DEFAULT_SICK_ALLOCATION);
        assert_eq!(user.department, "Unassigned");
    }

    #[test]
    fn provision_grants_admin_to_configured_address() {
        let mut state = fixture_state();
        state.users.remove("mark.torres@btgi.com.au");
        let user = provision(
            &mut state,
            "mark.torres@btgi.com.au",
            "Mark Torres",
            "mark.torres@btgi.com.au",
        )
        .unwrap();
        assert_eq!(user.role, Role::Admin);
    }
}
