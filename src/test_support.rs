//! Fixtures for tests running against `MemoryStore`.

use std::sync::OnceLock;

use crate::{
    auth::password::hash_password,
    model::{
        employee::{EmployeeProfile, NewEmployee},
        user::{NewAccount, User},
    },
    repository::{Store, memory::MemoryStore},
};

pub const PASSWORD: &str = "password123";

/// Argon2 is slow in debug builds; hash the shared password once.
fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).unwrap()).clone()
}

/// Registers `company` with an admin `admin@<company>.io`.
pub async fn signup(store: &MemoryStore, company: &str) -> User {
    let (_, admin) = store
        .companies()
        .create_with_admin(
            company,
            NewAccount {
                email: format!("admin@{}.io", company.to_lowercase()),
                password_hash: password_hash(),
                full_name: format!("{company} Admin"),
            },
        )
        .await
        .unwrap();
    admin
}

/// Hires an employee into the admin's company, department "General".
pub async fn hire(store: &MemoryStore, admin: &User, email: &str) -> (User, EmployeeProfile) {
    let profile = store
        .employees()
        .create(NewEmployee {
            company_id: admin.company_id,
            account: NewAccount {
                email: email.to_string(),
                password_hash: password_hash(),
                full_name: format!("Employee {email}"),
            },
            employee_code: format!("GEN-{email}"),
            department: "General".into(),
            job_title: "Employee".into(),
            salary: 3000,
            year_of_joining: 2026,
        })
        .await
        .unwrap();
    let user = store
        .users()
        .find_by_id(profile.user_id)
        .await
        .unwrap()
        .unwrap();
    (user, profile)
}
