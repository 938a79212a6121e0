use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::policy::require_role,
    error::AppError,
    model::{
        Paging,
        payroll::{NewPayroll, Payroll, PayrollFilter},
        role::Role,
        user::User,
    },
    repository::{Store, StoreError},
    service::{Listing, own_profile},
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 3)]
    pub employee_id: u64,
    #[schema(example = 50000)]
    pub basic_salary: i64,
    #[schema(example = 2000)]
    pub deductions: i64,
    #[schema(example = "2026-01")]
    pub month: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdatePayroll {
    pub basic_salary: Option<i64>,
    pub deductions: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayrollQuery {
    pub employee_id: Option<u64>,
    /// `YYYY-MM`
    pub month: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Accepts `YYYY-MM` with a month between 01 and 12.
fn validate_month(month: &str) -> Result<(), AppError> {
    let invalid = || AppError::validation("month must be in YYYY-MM format");

    let (year, mm) = month.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || mm.len() != 2 || !year.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match mm.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(invalid()),
    }
}

fn validate_amounts(basic_salary: i64, deductions: i64) -> Result<(), AppError> {
    if basic_salary < 0 || deductions < 0 {
        return Err(AppError::validation(
            "basic_salary and deductions must not be negative",
        ));
    }
    Ok(())
}

fn not_found() -> AppError {
    AppError::not_found("Payroll not found")
}

#[instrument(name = "create_payroll", skip(store, admin, req), fields(company_id = admin.company_id, employee_id = req.employee_id))]
pub async fn create(
    store: &dyn Store,
    admin: &User,
    req: CreatePayroll,
) -> Result<Payroll, AppError> {
    require_role(admin, Role::Admin)?;
    validate_month(&req.month)?;
    validate_amounts(req.basic_salary, req.deductions)?;

    store
        .employees()
        .find_by_id_scoped(admin.company_id, req.employee_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::not_found("Employee not found"),
            e => e.into(),
        })?;

    let payroll = store
        .payrolls()
        .create(NewPayroll {
            employee_id: req.employee_id,
            basic_salary: req.basic_salary,
            deductions: req.deductions,
            month: req.month,
        })
        .await?;

    info!(payroll_id = payroll.id, net_salary = payroll.net_salary, "Payroll created");
    Ok(payroll)
}

#[instrument(name = "update_payroll", skip(store, admin, changes), fields(company_id = admin.company_id))]
pub async fn update(
    store: &dyn Store,
    admin: &User,
    id: u64,
    changes: UpdatePayroll,
) -> Result<Payroll, AppError> {
    require_role(admin, Role::Admin)?;

    let mut payroll = find_in_company(store, admin.company_id, id).await?;
    payroll.basic_salary = changes.basic_salary.unwrap_or(payroll.basic_salary);
    payroll.deductions = changes.deductions.unwrap_or(payroll.deductions);
    validate_amounts(payroll.basic_salary, payroll.deductions)?;
    payroll.net_salary = Payroll::net(payroll.basic_salary, payroll.deductions);

    store.payrolls().update(admin.company_id, &payroll).await?;

    info!(payroll_id = payroll.id, net_salary = payroll.net_salary, "Payroll updated");
    Ok(payroll)
}

async fn find_in_company(store: &dyn Store, company_id: u64, id: u64) -> Result<Payroll, AppError> {
    store
        .payrolls()
        .find_by_id_scoped(company_id, id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => not_found(),
            e => e.into(),
        })
}

/// Admins see any payroll of their company, employees only their own.
pub async fn get(store: &dyn Store, user: &User, id: u64) -> Result<Payroll, AppError> {
    match user.role {
        Role::Admin => find_in_company(store, user.company_id, id).await,
        Role::Employee => {
            let employee = own_profile(store, user).await?;
            let payroll = find_in_company(store, user.company_id, id).await?;
            if payroll.employee_id != employee.id {
                return Err(not_found());
            }
            Ok(payroll)
        }
    }
}

pub async fn my_payroll(
    store: &dyn Store,
    user: &User,
    paging: Paging,
) -> Result<Listing<Payroll>, AppError> {
    let employee = own_profile(store, user).await?;

    let filter = PayrollFilter {
        employee_id: Some(employee.id),
        month: None,
        paging: Some(paging),
    };
    list(store, user.company_id, filter, paging).await
}

pub async fn company_payroll(
    store: &dyn Store,
    admin: &User,
    query: PayrollQuery,
) -> Result<Listing<Payroll>, AppError> {
    require_role(admin, Role::Admin)?;
    if let Some(month) = &query.month {
        validate_month(month)?;
    }

    let paging = Paging {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = PayrollFilter {
        employee_id: query.employee_id,
        month: query.month,
        paging: Some(paging),
    };
    list(store, admin.company_id, filter, paging).await
}

async fn list(
    store: &dyn Store,
    company_id: u64,
    filter: PayrollFilter,
    paging: Paging,
) -> Result<Listing<Payroll>, AppError> {
    let repo = store.payrolls();
    let data = repo.find_own(company_id, &filter).await?;
    let total = repo.count_own(company_id, &filter).await?;
    Ok(Listing::new(data, total, &paging))
}
