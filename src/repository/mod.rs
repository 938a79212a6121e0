//! Tenant-scoped persistence.
//!
//! Every read and write below `Company` takes the caller's `company_id` and
//! filters on it, either directly or through `employee_profiles.company_id`.

#[cfg(test)]
pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use derive_more::Display;
use strum_macros::EnumIter;

use crate::model::{
    attendance::Attendance,
    company::Company,
    employee::EmployeeProfile,
    leave_request::LeaveRequest,
    payroll::Payroll,
    user::{NewAccount, User},
};

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "record not found")]
    NotFound,
    #[display(fmt = "unique key violated: {:?}", _0)]
    Conflict(UniqueKey),
    /// The stored record is in a terminal state and was left untouched.
    #[display(fmt = "record already finalized")]
    Stale,
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {}

/// Unique keys the store enforces on insert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
pub enum UniqueKey {
    CompanyName,
    Email,
    EmployeeCode,
    EmployeeUser,
    AttendanceDay,
}

impl UniqueKey {
    /// Index name in `sql/schema.sql`.
    pub fn constraint(self) -> &'static str {
        match self {
            UniqueKey::CompanyName => "uq_companies_name",
            UniqueKey::Email => "uq_users_email",
            UniqueKey::EmployeeCode => "uq_employee_profiles_code",
            UniqueKey::EmployeeUser => "uq_employee_profiles_user",
            UniqueKey::AttendanceDay => "uq_attendance_employee_date",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            UniqueKey::CompanyName => "Company already exists",
            UniqueKey::Email => "Email already registered",
            UniqueKey::EmployeeCode => "Employee code already in use",
            UniqueKey::EmployeeUser => "User already has an employee profile",
            UniqueKey::AttendanceDay => "Already checked in today",
        }
    }
}

/// An entity that lives inside a tenant.
pub trait Scoped: Send + Sync + Sized {
    /// Insert payload; the store assigns the id.
    type New: Send + Sync;
    type Filter: Send + Sync + Default;
}

impl Scoped for EmployeeProfile {
    type New = crate::model::employee::NewEmployee;
    type Filter = crate::model::employee::EmployeeFilter;
}

impl Scoped for Attendance {
    type New = crate::model::attendance::NewAttendance;
    type Filter = crate::model::attendance::AttendanceFilter;
}

impl Scoped for LeaveRequest {
    type New = crate::model::leave_request::NewLeave;
    type Filter = crate::model::leave_request::LeaveFilter;
}

impl Scoped for Payroll {
    type New = crate::model::payroll::NewPayroll;
    type Filter = crate::model::payroll::PayrollFilter;
}

#[async_trait]
pub trait ScopedRepository<T: Scoped>: Send + Sync {
    /// Records of `company_id` matching `filter`, honouring its paging.
    async fn find_own(&self, company_id: u64, filter: &T::Filter) -> Result<Vec<T>, StoreError>;

    /// Number of records matching `filter`, ignoring paging.
    async fn count_own(&self, company_id: u64, filter: &T::Filter) -> Result<i64, StoreError>;

    /// `NotFound` when the record is missing or belongs to another company.
    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<T, StoreError>;

    async fn create(&self, new: T::New) -> Result<T, StoreError>;

    /// Writes the mutable fields of `entity`. Runs with the row locked and
    /// fails with `Stale` if the stored row is already in a terminal state.
    async fn update(&self, company_id: u64, entity: &T) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Creates the company and its first admin in one transaction.
    async fn create_with_admin(
        &self,
        name: &str,
        admin: NewAccount,
    ) -> Result<(Company, User), StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Company>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Writes password hash, full name and active flag, scoped by the user's company.
    async fn update(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait EmployeeRepository: ScopedRepository<EmployeeProfile> {
    async fn find_by_user(
        &self,
        company_id: u64,
        user_id: u64,
    ) -> Result<Option<EmployeeProfile>, StoreError>;
}

/// Everything a request needs from persistence. Injected per request as
/// `web::Data<dyn Store>`.
pub trait Store: Send + Sync {
    fn companies(&self) -> &dyn CompanyRepository;
    fn users(&self) -> &dyn UserRepository;
    fn employees(&self) -> &dyn EmployeeRepository;
    fn attendance(&self) -> &dyn ScopedRepository<Attendance>;
    fn leaves(&self) -> &dyn ScopedRepository<LeaveRequest>;
    fn payrolls(&self) -> &dyn ScopedRepository<Payroll>;
}
