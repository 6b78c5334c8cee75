use crate::model::leave_request::LeaveRequest;
use crate::model::user::User;
use anyhow::{Context, Result};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// File-backed document store: one JSON map of users keyed by email and one
/// JSON array of leave requests. Every mutating operation saves the touched
/// document before reporting success.
#[derive(Clone)]
pub struct JsonStore {
    users_path: PathBuf,
    leaves_path: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: &str) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data dir {data_dir}"))?;
        let dir = PathBuf::from(data_dir);
        Ok(Self {
            users_path: dir.join("users.json"),
            leaves_path: dir.join("leaves.json"),
        })
    }

    /// Loads the user document, seeding the default dataset on first run.
    pub fn load_users(&self) -> Result<HashMap<String, User>> {
        if self.users_path.exists() {
            let raw = fs::read_to_string(&self.users_path)
                .with_context(|| format!("failed to read {}", self.users_path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("malformed user document {}", self.users_path.display()))
        } else {
            info!(path = %self.users_path.display(), "no user document, seeding defaults");
            let users = default_users();
            self.save_users(&users)?;
            Ok(users)
        }
    }

    pub fn save_users(&self, users: &HashMap<String, User>) -> Result<()> {
        let raw = serde_json::to_string_pretty(users).context("failed to encode users")?;
        fs::write(&self.users_path, raw)
            .with_context(|| format!("failed to write {}", self.users_path.display()))
    }

    /// Loads the leave-request document, seeding the default dataset on first run.
    pub fn load_requests(&self) -> Result<Vec<LeaveRequest>> {
        if self.leaves_path.exists() {
            let raw = fs::read_to_string(&self.leaves_path)
                .with_context(|| format!("failed to read {}", self.leaves_path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("malformed leave document {}", self.leaves_path.display()))
        } else {
            info!(path = %self.leaves_path.display(), "no leave document, seeding defaults");
            let leaves = default_requests();
            self.save_requests(&leaves)?;
            Ok(leaves)
        }
    }

    pub fn save_requests(&self, leaves: &[LeaveRequest]) -> Result<()> {
        let raw = serde_json::to_string_pretty(leaves).context("failed to encode leaves")?;
        fs::write(&self.leaves_path, raw)
            .with_context(|| format!("failed to write {}", self.leaves_path.display()))
    }
}

/// Default user registry written on first run.
pub fn default_users() -> HashMap<String, User> {
    serde_json::from_value(json!({
        "mark.torres@btgi.com.au": {
            "name": "Mark Torres",
            "email": "mark.torres@btgi.com.au",
            "role": "admin",
            "department": "Data Team",
            "position": "Data Engineer",
            "annual_leave": 10,
            "sick_leave": 5,
            "used_annual": 1,
            "used_sick": 3
        },
        "jhunriel.gaspar@btgi.com.au": {
            "name": "Jhunriel Gaspar",
            "email": "jhunriel.gaspar@btgi.com.au",
            "role": "user",
            "department": "Data Team",
            "position": "Data Engineer",
            "annual_leave": 10,
            "sick_leave": 5,
            "used_annual": 8,
            "used_sick": 2
        },
        "elsy.asmar@btgi.com.au": {
            "name": "Elsy Asmar",
            "email": "elsy.asmar@btgi.com.au",
            "role": "admin",
            "department": "Managers",
            "position": "Indirect Tax Manager",
            "annual_leave": 20,
            "sick_leave": 10,
            "used_annual": 4,
            "used_sick": 1
        },
        "aj.morong@btgi.com.au": {
            "name": "AJ Morong",
            "email": "aj.morong@btgi.com.au",
            "role": "user",
            "department": "Transformation",
            "position": "Senior Associate",
            "annual_leave": 10,
            "sick_leave": 5,
            "used_annual": 5,
            "used_sick": 2
        }
    }))
    .expect("default user fixture is valid")
}

/// Default leave log written on first run.
pub fn default_requests() -> Vec<LeaveRequest> {
    serde_json::from_value(json!([
        {
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
        },
        {
            "id": 2,
            "user_email": "jhunriel.gaspar@btgi.com.au",
            "user_name": "Jhunriel Gaspar",
            "leave_type": "Annual Leave",
            "start_date": "2025-10-10",
            "end_date": "2025-10-12",
            "days": 3,
            "reason": "Personal matters",
            "status": "Approved",
            "applied_date": "2025-09-25",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-09-26"
        },
        {
            "id": 3,
            "user_email": "jhunriel.gaspar@btgi.com.au",
            "user_name": "Jhunriel Gaspar",
            "leave_type": "Sick Leave",
            "start_date": "2025-08-05",
            "end_date": "2025-08-07",
            "days": 3,
            "reason": "Medical appointment and recovery",
            "status": "Approved",
            "applied_date": "2025-08-04",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-08-04"
        },
        {
            "id": 4,
            "user_email": "elsy.asmar@btgi.com.au",
            "user_name": "Elsy Asmar",
            "leave_type": "Annual Leave",
            "start_date": "2025-07-20",
            "end_date": "2025-07-23",
            "days": 4,
            "reason": "Summer break",
            "status": "Approved",
            "applied_date": "2025-07-01",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-07-02"
        },
        {
            "id": 5,
            "user_email": "elsy.asmar@btgi.com.au",
            "user_name": "Elsy Asmar",
            "leave_type": "Sick Leave",
            "start_date": "2025-09-08",
            "end_date": "2025-09-08",
            "days": 1,
            "reason": "Medical consultation",
            "status": "Approved",
            "applied_date": "2025-09-07",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-09-07"
        },
        {
            "id": 6,
            "user_email": "aj.morong@btgi.com.au",
            "user_name": "AJ Morong",
            "leave_type": "Annual Leave",
            "start_date": "2025-08-12",
            "end_date": "2025-08-16",
            "days": 5,
            "reason": "Attending family event",
            "status": "Approved",
            "applied_date": "2025-07-28",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-07-29"
        },
        {
            "id": 7,
            "user_email": "aj.morong@btgi.com.au",
            "user_name": "AJ Morong",
            "leave_type": "Sick Leave",
            "start_date": "2025-10-15",
            "end_date": "2025-10-16",
            "days": 2,
            "reason": "Flu symptoms",
            "status": "Approved",
            "applied_date": "2025-10-14",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-10-14"
        },
        {
            "id": 8,
            "user_email": "mark.torres@btgi.com.au",
            "user_name": "Mark Torres",
            "leave_type": "Annual Leave",
            "start_date": "2025-06-10",
            "end_date": "2025-06-10",
            "days": 1,
            "reason": "Personal appointment",
            "status": "Approved",
            "applied_date": "2025-06-05",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-06-05"
        },
        {
            "id": 9,
            "user_email": "mark.torres@btgi.com.au",
            "user_name": "Mark Torres",
            "leave_type": "Sick Leave",
            "start_date": "2025-09-20",
            "end_date": "2025-09-22",
            "days": 3,
            "reason": "Medical treatment",
            "status": "Approved",
            "applied_date": "2025-09-19",
            "reviewed_by": "Mark Torres",
            "reviewed_date": "2025-09-19"
        },
        {
            "id": 10,
            "user_email": "jhunriel.gaspar@btgi.com.au",
            "user_name": "Jhunriel Gaspar",
            "leave_type": "Annual Leave",
            "start_date": "2025-11-15",
            "end_date": "2025-11-18",
            "days": 4,
            "reason": "Extended weekend trip",
            "status": "Pending",
            "applied_date": "2025-10-28",
            "reviewed_by": null,
            "reviewed_date": null
        },
        {
            "id": 11,
            "user_email": "elsy.asmar@btgi.com.au",
            "user_name": "Elsy Asmar",
            "leave_type": "Annual Leave",
            "start_date": "2025-12-20",
            "end_date": "2025-12-31",
            "days": 12,
            "reason": "Year-end holidays",
            "status": "Pending",
            "applied_date": "2025-10-25",
            "reviewed_by": null,
            "reviewed_date": null
        }
    ]))
    .expect("default leave fixture is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveStatus;
    use crate::model::role::Role;

    fn temp_store() -> JsonStore {
        let dir = std::env::temp_dir().join(format!("leave-portal-{}", uuid::Uuid::new_v4()));
        JsonStore::new(dir.to_str().unwrap()).unwrap()
    }

    #[test]
    fn first_load_seeds_defaults() {
        let store = temp_store();
        let users = store.load_users().unwrap();
        let leaves = store.load_requests().unwrap();
        assert_eq!(users.len(), 4);
        assert_eq!(leaves.len(), 11);
        assert_eq!(users["mark.torres@btgi.com.au"].role, Role::Admin);
        assert_eq!(
            leaves.iter().filter(|l| l.status == LeaveStatus::Pending).count(),
            2
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store();
        let mut users = store.load_users().unwrap();
        users.get_mut("aj.morong@btgi.com.au").unwrap().used_sick = 4;
        store.save_users(&users).unwrap();

        let reloaded = store.load_users().unwrap();
        assert_eq!(reloaded["aj.morong@btgi.com.au"].used_sick, 4);
    }

    #[test]
    fn seeded_files_exist_on_disk() {
        let store = temp_store();
        store.load_users().unwrap();
        store.load_requests().unwrap();
        assert!(store.users_path.exists());
        assert!(store.leaves_path.exists());
    }
}
