use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    auth::{password::hash_password, policy::require_role},
    error::AppError,
    model::{
        Paging,
        employee::{EmployeeFilter, EmployeeProfile, NewEmployee},
        role::Role,
        user::{NewAccount, User},
    },
    repository::{StoreError, Store, UniqueKey},
    service::{
        Listing,
        account::{normalize_email, required_text, validate_password},
        own_profile,
    },
};

const DEFAULT_DEPARTMENT: &str = "General";
const DEFAULT_JOB_TITLE: &str = "Employee";
const CODE_ATTEMPTS: usize = 5;
const TEMP_PASSWORD_LEN: usize = 12;

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateEmployee {
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "jane@acme.io", format = "email")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// Generated and returned once when absent
    #[schema(format = "password")]
    pub password: Option<String>,
    /// Generated from the department when absent
    #[schema(example = "ENG0042")]
    pub employee_code: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
    #[schema(example = "Backend Engineer")]
    pub job_title: Option<String>,
    #[schema(example = 5000)]
    pub salary: Option<i64>,
    #[schema(example = 2026)]
    pub year_of_joining: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedEmployee {
    pub employee: EmployeeProfile,
    /// Present only when the password was generated
    pub temporary_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordReset {
    pub employee_id: u64,
    /// Shown once; only its hash is stored
    pub temporary_password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub salary: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Exact department match
    pub department: Option<String>,
    /// Search by name or employee code
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// First three letters of the department, upper-cased, then four random digits.
fn generate_employee_code(department: &str) -> String {
    let prefix: String = department
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let prefix = if prefix.is_empty() { "EMP".to_string() } else { prefix };
    format!("{}{:04}", prefix, OsRng.next_u32() % 10_000)
}

/// Random password with at least one upper, lower, digit and symbol.
fn generate_temporary_password() -> String {
    const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
    const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
    const DIGIT: &[u8] = b"23456789";
    const SYMBOL: &[u8] = b"!@#$%^&*-_=+";

    let pick = |set: &[u8]| set[(OsRng.next_u32() as usize) % set.len()];
    let all: Vec<u8> = [UPPER, LOWER, DIGIT, SYMBOL].concat();

    let mut chars = vec![pick(UPPER), pick(LOWER), pick(DIGIT), pick(SYMBOL)];
    while chars.len() < TEMP_PASSWORD_LEN {
        chars.push(pick(&all));
    }
    for i in (1..chars.len()).rev() {
        let j = (OsRng.next_u32() as usize) % (i + 1);
        chars.swap(i, j);
    }
    chars.into_iter().map(char::from).collect()
}

/// Creates a login and its employee profile inside the admin's company.
#[instrument(name = "create_employee", skip(store, admin, req), fields(company_id = admin.company_id))]
pub async fn create_employee(
    store: &dyn Store,
    admin: &User,
    req: CreateEmployee,
    today: NaiveDate,
) -> Result<CreatedEmployee, AppError> {
    require_role(admin, Role::Admin)?;
    req.validate()?;

    let email = normalize_email(required_text(&req.email, "email")?);
    let full_name = required_text(&req.full_name, "full_name")?.to_string();
    if req.salary.is_some_and(|s| s < 0) {
        return Err(AppError::validation("salary must not be negative"));
    }

    let (password, temporary_password) = match req.password {
        Some(p) => {
            validate_password(&p)?;
            (p, None)
        }
        None => {
            let p = generate_temporary_password();
            (p.clone(), Some(p))
        }
    };

    let department = req
        .department
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string());
    let given_code = req.employee_code.filter(|c| !c.trim().is_empty());

    let mut new = NewEmployee {
        company_id: admin.company_id,
        account: NewAccount {
            email,
            password_hash: hash_password(&password)?,
            full_name,
        },
        employee_code: given_code
            .clone()
            .unwrap_or_else(|| generate_employee_code(&department)),
        department,
        job_title: req
            .job_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string()),
        salary: req.salary.unwrap_or(0),
        year_of_joining: req.year_of_joining.unwrap_or_else(|| today.year()),
    };

    let mut attempt = 1;
    let employee = loop {
        match store.employees().create(new.clone()).await {
            Ok(profile) => break profile,
            Err(StoreError::Conflict(UniqueKey::EmployeeCode))
                if given_code.is_none() && attempt < CODE_ATTEMPTS =>
            {
                warn!(code = %new.employee_code, attempt, "Generated employee code collided");
                new.employee_code = generate_employee_code(&new.department);
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    info!(employee_id = employee.id, user_id = employee.user_id, "Employee created");
    Ok(CreatedEmployee {
        employee,
        temporary_password,
    })
}

pub async fn list_employees(
    store: &dyn Store,
    admin: &User,
    query: EmployeeQuery,
) -> Result<Listing<EmployeeProfile>, AppError> {
    require_role(admin, Role::Admin)?;

    let paging = Paging {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = EmployeeFilter {
        department: query.department,
        search: query.search.filter(|s| !s.trim().is_empty()),
        paging: Some(paging),
    };

    let repo = store.employees();
    let data = repo.find_own(admin.company_id, &filter).await?;
    let total = repo.count_own(admin.company_id, &filter).await?;
    Ok(Listing::new(data, total, &paging))
}

pub async fn get_employee(
    store: &dyn Store,
    admin: &User,
    id: u64,
) -> Result<EmployeeProfile, AppError> {
    require_role(admin, Role::Admin)?;

    store
        .employees()
        .find_by_id_scoped(admin.company_id, id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::not_found("Employee not found"),
            e => e.into(),
        })
}

#[instrument(name = "update_employee", skip(store, admin, changes), fields(company_id = admin.company_id))]
pub async fn update_employee(
    store: &dyn Store,
    admin: &User,
    id: u64,
    changes: UpdateEmployee,
) -> Result<EmployeeProfile, AppError> {
    let mut employee = get_employee(store, admin, id).await?;

    if let Some(name) = changes.full_name {
        employee.full_name = required_text(&name, "full_name")?.to_string();
    }
    if let Some(department) = changes.department {
        employee.department = required_text(&department, "department")?.to_string();
    }
    if let Some(title) = changes.job_title {
        employee.job_title = required_text(&title, "job_title")?.to_string();
    }
    if let Some(salary) = changes.salary {
        if salary < 0 {
            return Err(AppError::validation("salary must not be negative"));
        }
        employee.salary = salary;
    }

    store
        .employees()
        .update(admin.company_id, &employee)
        .await?;

    info!(employee_id = employee.id, "Employee updated");
    Ok(employee)
}

/// Soft delete: the profile stays, the login is disabled.
#[instrument(name = "deactivate_employee", skip(store, admin), fields(company_id = admin.company_id))]
pub async fn deactivate_employee(store: &dyn Store, admin: &User, id: u64) -> Result<(), AppError> {
    let employee = get_employee(store, admin, id).await?;

    let mut user = store
        .users()
        .find_by_id(employee.user_id)
        .await?
        .filter(|u| u.company_id == admin.company_id)
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    user.is_active = false;
    store.users().update(&user).await?;

    info!(employee_id = employee.id, user_id = user.id, "Employee deactivated");
    Ok(())
}

/// Replaces the employee's password with a generated one and returns it.
#[instrument(name = "reset_password", skip(store, admin), fields(company_id = admin.company_id))]
pub async fn reset_password(
    store: &dyn Store,
    admin: &User,
    id: u64,
) -> Result<PasswordReset, AppError> {
    let employee = get_employee(store, admin, id).await?;

    let mut user = store
        .users()
        .find_by_id(employee.user_id)
        .await?
        .filter(|u| u.company_id == admin.company_id)
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    let temporary_password = generate_temporary_password();
    user.password_hash = hash_password(&temporary_password)?;
    store.users().update(&user).await?;

    info!(employee_id = employee.id, user_id = user.id, "Employee password reset");
    Ok(PasswordReset {
        employee_id: employee.id,
        temporary_password,
    })
}

pub async fn my_profile(store: &dyn Store, user: &User) -> Result<EmployeeProfile, AppError> {
    own_profile(store, user).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::password::verify_password, repository::memory::MemoryStore, test_support,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn request(email: &str) -> CreateEmployee {
        CreateEmployee {
            email: email.into(),
            full_name: "Jane Doe".into(),
            password: None,
            employee_code: None,
            department: Some("Engineering".into()),
            job_title: None,
            salary: None,
            year_of_joining: None,
        }
    }

    #[test]
    fn generated_code_uses_department_prefix() {
        let code = generate_employee_code("engineering");
        assert_eq!(&code[..3], "ENG");
        assert_eq!(code.len(), 7);
        assert!(code[3..].chars().all(|c| c.is_ascii_digit()));

        assert!(generate_employee_code("").starts_with("EMP"));
    }

    #[test]
    fn temporary_password_mixes_character_classes() {
        let p = generate_temporary_password();
        assert_eq!(p.len(), TEMP_PASSWORD_LEN);
        assert!(p.chars().any(|c| c.is_ascii_uppercase()));
        assert!(p.chars().any(|c| c.is_ascii_lowercase()));
        assert!(p.chars().any(|c| c.is_ascii_digit()));
        assert!(p.chars().any(|c| !c.is_ascii_alphanumeric()));
    }

    #[actix_web::test]
    async fn admin_creates_employee_with_defaults() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;

        let created = create_employee(&store, &admin, request("Jane@Acme.io"), today())
            .await
            .unwrap();

        let e = &created.employee;
        assert_eq!(e.company_id, admin.company_id);
        assert_eq!(e.job_title, "Employee");
        assert_eq!(e.salary, 0);
        assert_eq!(e.year_of_joining, 2026);
        assert!(e.employee_code.starts_with("ENG"));

        let password = created.temporary_password.expect("generated password");
        let user = store.users().find_by_id(e.user_id).await.unwrap().unwrap();
        assert_eq!(user.email, "jane@acme.io");
        assert_eq!(user.role, Role::Employee);
        assert!(verify_password(&password, &user.password_hash));
    }

    #[actix_web::test]
    async fn supplied_password_is_not_echoed() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        let mut req = request("jane@acme.io");
        req.password = Some("chosen-password".into());

        let created = create_employee(&store, &admin, req, today()).await.unwrap();
        assert!(created.temporary_password.is_none());
    }

    #[actix_web::test]
    async fn malformed_employee_email_is_rejected() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;

        let err = create_employee(&store, &admin, request("jane.acme.io"), today())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::validation("email must be a valid address"));
        assert!(store.users().find_by_email("jane.acme.io").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn reset_password_replaces_the_login_secret() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        let (user, profile) = test_support::hire(&store, &admin, "e@acme.io").await;

        let reset = reset_password(&store, &admin, profile.id).await.unwrap();
        assert_eq!(reset.employee_id, profile.id);
        assert_eq!(reset.temporary_password.len(), TEMP_PASSWORD_LEN);

        let stored = store.users().find_by_id(user.id).await.unwrap().unwrap();
        assert!(verify_password(&reset.temporary_password, &stored.password_hash));
        assert!(!verify_password(test_support::PASSWORD, &stored.password_hash));
        assert!(stored.is_active);

        assert!(matches!(
            reset_password(&store, &user, profile.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn employees_cannot_manage_employees() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        let (employee, profile) = test_support::hire(&store, &admin, "e@acme.io").await;

        let err = create_employee(&store, &employee, request("x@acme.io"), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(matches!(
            get_employee(&store, &employee, profile.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn duplicate_email_and_code_conflict() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        let mut first = request("jane@acme.io");
        first.employee_code = Some("JD-1".into());
        create_employee(&store, &admin, first, today()).await.unwrap();

        let err = create_employee(&store, &admin, request("jane@acme.io"), today())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::conflict("Email already registered"));

        let mut same_code = request("other@acme.io");
        same_code.employee_code = Some("JD-1".into());
        let err = create_employee(&store, &admin, same_code, today())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::conflict("Employee code already in use"));
    }

    #[actix_web::test]
    async fn admin_cannot_see_or_touch_other_tenant() {
        let store = MemoryStore::new();
        let acme = test_support::signup(&store, "Acme").await;
        let globex = test_support::signup(&store, "Globex").await;
        let (_, profile) = test_support::hire(&store, &globex, "g@globex.io").await;

        assert!(matches!(
            get_employee(&store, &acme, profile.id).await,
            Err(AppError::NotFound(_))
        ));
        let changes = UpdateEmployee {
            salary: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            update_employee(&store, &acme, profile.id, changes).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            deactivate_employee(&store, &acme, profile.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            reset_password(&store, &acme, profile.id).await,
            Err(AppError::NotFound(_))
        ));

        let listing = list_employees(&store, &acme, EmployeeQuery::default())
            .await
            .unwrap();
        assert_eq!(listing.total, 0);
        assert!(listing.data.is_empty());
    }

    #[actix_web::test]
    async fn list_filters_and_paginates() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        for i in 0..3 {
            test_support::hire(&store, &admin, &format!("e{i}@acme.io")).await;
        }

        let listing = list_employees(
            &store,
            &admin,
            EmployeeQuery {
                per_page: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(listing.data.len(), 2);
        assert_eq!(listing.per_page, 2);

        let listing = list_employees(
            &store,
            &admin,
            EmployeeQuery {
                department: Some("Sales".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(listing.total, 0);
    }

    #[actix_web::test]
    async fn update_and_deactivate() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        let (user, profile) = test_support::hire(&store, &admin, "e@acme.io").await;

        let updated = update_employee(
            &store,
            &admin,
            profile.id,
            UpdateEmployee {
                department: Some("Finance".into()),
                salary: Some(4200),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.department, "Finance");
        assert_eq!(updated.salary, 4200);

        let err = update_employee(
            &store,
            &admin,
            profile.id,
            UpdateEmployee {
                salary: Some(-5),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        deactivate_employee(&store, &admin, profile.id).await.unwrap();
        let stored = store.users().find_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[actix_web::test]
    async fn my_profile_is_for_employees() {
        let store = MemoryStore::new();
        let admin = test_support::signup(&store, "Acme").await;
        let (user, profile) = test_support::hire(&store, &admin, "e@acme.io").await;

        assert_eq!(my_profile(&store, &user).await.unwrap().id, profile.id);
        assert!(matches!(
            my_profile(&store, &admin).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
