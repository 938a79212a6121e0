use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::{FromRow, MySqlPool, mysql::MySqlRow};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    model::{
        Paging,
        attendance::{Attendance, AttendanceFilter, NewAttendance},
        company::Company,
        employee::{EmployeeFilter, EmployeeProfile, NewEmployee},
        leave_request::{LeaveFilter, LeaveRequest, LeaveStatus, NewLeave},
        payroll::{NewPayroll, Payroll, PayrollFilter},
        role::Role,
        user::{NewAccount, User},
    },
    repository::{
        CompanyRepository, EmployeeRepository, ScopedRepository, Store, StoreError, UniqueKey,
        UserRepository,
    },
    utils::db_utils::{Conditions, contains_pattern, limit_clause},
};

const EMPLOYEE_FROM: &str = "FROM employee_profiles e";
const EMPLOYEE_SELECT: &str = "SELECT e.id, e.user_id, e.company_id, e.employee_code, e.full_name, \
     e.department, e.job_title, e.salary, e.year_of_joining";

const ATTENDANCE_FROM: &str = "FROM attendance a JOIN employee_profiles e ON e.id = a.employee_id";
const ATTENDANCE_SELECT: &str =
    "SELECT a.id, a.employee_id, a.date, a.check_in_time, a.check_out_time, a.status";

const LEAVE_FROM: &str = "FROM leave_requests l JOIN employee_profiles e ON e.id = l.employee_id";
const LEAVE_SELECT: &str = "SELECT l.id, l.employee_id, l.leave_type, l.start_date, l.end_date, \
     l.status, l.admin_comment";

const PAYROLL_FROM: &str = "FROM payroll p JOIN employee_profiles e ON e.id = p.employee_id";
const PAYROLL_SELECT: &str =
    "SELECT p.id, p.employee_id, p.basic_salary, p.deductions, p.net_salary, p.month";

const USER_SELECT: &str =
    "SELECT id, company_id, email, password_hash, full_name, role, is_active FROM users";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // 23000: integrity constraint violation
            if db_err.code().as_deref() == Some("23000") {
                if let Some(key) = violated_key(db_err.message()) {
                    return StoreError::Conflict(key);
                }
            }
        }
        StoreError::Database(e)
    }
}

/// Reads the index name from "Duplicate entry '...' for key '[table.]index'".
/// The entry itself is user data and is never inspected.
fn violated_key(message: &str) -> Option<UniqueKey> {
    let key = message.rsplit_once("for key '")?.1.strip_suffix('\'')?;
    let index = key.rsplit_once('.').map_or(key, |(_, index)| index);
    UniqueKey::iter().find(|k| k.constraint() == index)
}

/// MySQL-backed store. Cloning shares the pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_scoped<T>(
        &self,
        select: &str,
        from: &str,
        conditions: &Conditions,
        order_by: &str,
        paging: Option<&Paging>,
    ) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let sql = format!(
            "{} {} {} ORDER BY {} {}",
            select,
            from,
            conditions.where_clause(),
            order_by,
            limit_clause(paging)
        );
        debug!(sql = %sql, bindings = ?conditions.values(), "Fetching scoped records");

        let rows = sqlx::query_as_with::<_, T, _>(&sql, conditions.arguments_paged(paging))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_one_scoped<T>(
        &self,
        select: &str,
        from: &str,
        conditions: &Conditions,
    ) -> Result<T, StoreError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let sql = format!("{} {} {}", select, from, conditions.where_clause());
        debug!(sql = %sql, bindings = ?conditions.values(), "Fetching scoped record");

        sqlx::query_as_with::<_, T, _>(&sql, conditions.arguments())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn count_scoped(&self, from: &str, conditions: &Conditions) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) {} {}", from, conditions.where_clause());
        debug!(sql = %sql, bindings = ?conditions.values(), "Counting scoped records");

        let total = sqlx::query_scalar_with::<_, i64, _>(&sql, conditions.arguments())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

impl Store for MySqlStore {
    fn companies(&self) -> &dyn CompanyRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn employees(&self) -> &dyn EmployeeRepository {
        self
    }

    fn attendance(&self) -> &dyn ScopedRepository<Attendance> {
        self
    }

    fn leaves(&self) -> &dyn ScopedRepository<LeaveRequest> {
        self
    }

    fn payrolls(&self) -> &dyn ScopedRepository<Payroll> {
        self
    }
}

// -------------------- companies & users --------------------

#[async_trait]
impl CompanyRepository for MySqlStore {
    async fn create_with_admin(
        &self,
        name: &str,
        admin: NewAccount,
    ) -> Result<(Company, User), StoreError> {
        let mut tx = self.pool.begin().await?;

        let company_id = sqlx::query("INSERT INTO companies (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .last_insert_id();

        let user_id = sqlx::query(
            r#"
            INSERT INTO users (company_id, email, password_hash, full_name, role, is_active)
            VALUES (?, ?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(company_id)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.full_name)
        .bind(Role::Admin.as_ref())
        .execute(&mut *tx)
        .await?
        .last_insert_id();

        tx.commit().await?;

        Ok((
            Company {
                id: company_id,
                name: name.to_string(),
            },
            User {
                id: user_id,
                company_id,
                email: admin.email,
                password_hash: admin.password_hash,
                full_name: admin.full_name,
                role: Role::Admin,
                is_active: true,
            },
        ))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Company>, StoreError> {
        let company = sqlx::query_as::<_, Company>("SELECT id, name FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }
}

#[async_trait]
impl UserRepository for MySqlStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", USER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!("{} WHERE email = ?", USER_SELECT))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE id = ? AND company_id = ? FOR UPDATE")
            .bind(user.id)
            .bind(user.company_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        sqlx::query(
            "UPDATE users SET password_hash = ?, full_name = ?, is_active = ? WHERE id = ?",
        )
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// -------------------- employees --------------------

fn employee_conditions(company_id: u64, filter: &EmployeeFilter) -> Conditions {
    let mut c = Conditions::scoped("e.company_id", company_id);
    if let Some(department) = &filter.department {
        c.push("e.department = ?", department.as_str());
    }
    if let Some(search) = &filter.search {
        c.push_repeated(
            "(e.full_name LIKE ? OR e.employee_code LIKE ?)",
            contains_pattern(search),
        );
    }
    c
}

#[async_trait]
impl ScopedRepository<EmployeeProfile> for MySqlStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeProfile>, StoreError> {
        let conditions = employee_conditions(company_id, filter);
        self.fetch_scoped(
            EMPLOYEE_SELECT,
            EMPLOYEE_FROM,
            &conditions,
            "e.id DESC",
            filter.paging.as_ref(),
        )
        .await
    }

    async fn count_own(&self, company_id: u64, filter: &EmployeeFilter) -> Result<i64, StoreError> {
        self.count_scoped(EMPLOYEE_FROM, &employee_conditions(company_id, filter))
            .await
    }

    async fn find_by_id_scoped(
        &self,
        company_id: u64,
        id: u64,
    ) -> Result<EmployeeProfile, StoreError> {
        let mut conditions = Conditions::scoped("e.company_id", company_id);
        conditions.push("e.id = ?", id);
        self.fetch_one_scoped(EMPLOYEE_SELECT, EMPLOYEE_FROM, &conditions)
            .await
    }

    async fn create(&self, new: NewEmployee) -> Result<EmployeeProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query(
            r#"
            INSERT INTO users (company_id, email, password_hash, full_name, role, is_active)
            VALUES (?, ?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(new.company_id)
        .bind(&new.account.email)
        .bind(&new.account.password_hash)
        .bind(&new.account.full_name)
        .bind(Role::Employee.as_ref())
        .execute(&mut *tx)
        .await?
        .last_insert_id();

        let id = sqlx::query(
            r#"
            INSERT INTO employee_profiles
            (user_id, company_id, employee_code, full_name, department, job_title, salary, year_of_joining)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(new.company_id)
        .bind(&new.employee_code)
        .bind(&new.account.full_name)
        .bind(&new.department)
        .bind(&new.job_title)
        .bind(new.salary)
        .bind(new.year_of_joining)
        .execute(&mut *tx)
        .await?
        .last_insert_id();

        tx.commit().await?;

        Ok(EmployeeProfile {
            id,
            user_id,
            company_id: new.company_id,
            employee_code: new.employee_code,
            full_name: new.account.full_name,
            department: new.department,
            job_title: new.job_title,
            salary: new.salary,
            year_of_joining: new.year_of_joining,
        })
    }

    async fn update(&self, company_id: u64, entity: &EmployeeProfile) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, u64>(
            "SELECT id FROM employee_profiles WHERE id = ? AND company_id = ? FOR UPDATE",
        )
        .bind(entity.id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE employee_profiles
            SET full_name = ?, department = ?, job_title = ?, salary = ?
            WHERE id = ?
            "#,
        )
        .bind(&entity.full_name)
        .bind(&entity.department)
        .bind(&entity.job_title)
        .bind(entity.salary)
        .bind(entity.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for MySqlStore {
    async fn find_by_user(
        &self,
        company_id: u64,
        user_id: u64,
    ) -> Result<Option<EmployeeProfile>, StoreError> {
        let mut conditions = Conditions::scoped("e.company_id", company_id);
        conditions.push("e.user_id = ?", user_id);
        match self
            .fetch_one_scoped(EMPLOYEE_SELECT, EMPLOYEE_FROM, &conditions)
            .await
        {
            Ok(profile) => Ok(Some(profile)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// -------------------- attendance --------------------

fn attendance_conditions(company_id: u64, filter: &AttendanceFilter) -> Conditions {
    let mut c = Conditions::scoped("e.company_id", company_id);
    if let Some(employee_id) = filter.employee_id {
        c.push("a.employee_id = ?", employee_id);
    }
    if let Some(date) = filter.date {
        c.push("a.date = ?", date);
    }
    c
}

#[async_trait]
impl ScopedRepository<Attendance> for MySqlStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &AttendanceFilter,
    ) -> Result<Vec<Attendance>, StoreError> {
        let conditions = attendance_conditions(company_id, filter);
        self.fetch_scoped(
            ATTENDANCE_SELECT,
            ATTENDANCE_FROM,
            &conditions,
            "a.date DESC, a.id DESC",
            filter.paging.as_ref(),
        )
        .await
    }

    async fn count_own(&self, company_id: u64, filter: &AttendanceFilter) -> Result<i64, StoreError> {
        self.count_scoped(ATTENDANCE_FROM, &attendance_conditions(company_id, filter))
            .await
    }

    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<Attendance, StoreError> {
        let mut conditions = Conditions::scoped("e.company_id", company_id);
        conditions.push("a.id = ?", id);
        self.fetch_one_scoped(ATTENDANCE_SELECT, ATTENDANCE_FROM, &conditions)
            .await
    }

    /// Relies on `uq_attendance_employee_date`: of two concurrent check-ins only
    /// one insert succeeds, the other maps to `Conflict(AttendanceDay)`.
    async fn create(&self, new: NewAttendance) -> Result<Attendance, StoreError> {
        let id = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in_time, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.date)
        .bind(new.check_in_time)
        .bind(new.status.as_ref())
        .execute(&self.pool)
        .await?
        .last_insert_id();

        Ok(Attendance {
            id,
            employee_id: new.employee_id,
            date: new.date,
            check_in_time: new.check_in_time,
            check_out_time: None,
            status: new.status,
        })
    }

    async fn update(&self, company_id: u64, entity: &Attendance) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let (check_out,) = sqlx::query_as::<_, (Option<NaiveTime>,)>(
            r#"
            SELECT a.check_out_time
            FROM attendance a JOIN employee_profiles e ON e.id = a.employee_id
            WHERE a.id = ? AND e.company_id = ?
            FOR UPDATE
            "#,
        )
        .bind(entity.id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        if check_out.is_some() {
            return Err(StoreError::Stale);
        }

        sqlx::query("UPDATE attendance SET check_out_time = ?, status = ? WHERE id = ?")
            .bind(entity.check_out_time)
            .bind(entity.status.as_ref())
            .bind(entity.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

// -------------------- leave --------------------

fn leave_conditions(company_id: u64, filter: &LeaveFilter) -> Conditions {
    let mut c = Conditions::scoped("e.company_id", company_id);
    if let Some(employee_id) = filter.employee_id {
        c.push("l.employee_id = ?", employee_id);
    }
    if let Some(status) = filter.status {
        c.push("l.status = ?", status.as_ref());
    }
    c
}

#[async_trait]
impl ScopedRepository<LeaveRequest> for MySqlStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &LeaveFilter,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let conditions = leave_conditions(company_id, filter);
        self.fetch_scoped(
            LEAVE_SELECT,
            LEAVE_FROM,
            &conditions,
            "l.start_date DESC, l.id DESC",
            filter.paging.as_ref(),
        )
        .await
    }

    async fn count_own(&self, company_id: u64, filter: &LeaveFilter) -> Result<i64, StoreError> {
        self.count_scoped(LEAVE_FROM, &leave_conditions(company_id, filter))
            .await
    }

    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<LeaveRequest, StoreError> {
        let mut conditions = Conditions::scoped("e.company_id", company_id);
        conditions.push("l.id = ?", id);
        self.fetch_one_scoped(LEAVE_SELECT, LEAVE_FROM, &conditions)
            .await
    }

    async fn create(&self, new: NewLeave) -> Result<LeaveRequest, StoreError> {
        let id = sqlx::query(
            r#"
            INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.leave_type.as_ref())
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&self.pool)
        .await?
        .last_insert_id();

        Ok(LeaveRequest {
            id,
            employee_id: new.employee_id,
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            status: LeaveStatus::Pending,
            admin_comment: None,
        })
    }

    async fn update(&self, company_id: u64, entity: &LeaveRequest) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let (status,) = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT l.status
            FROM leave_requests l JOIN employee_profiles e ON e.id = l.employee_id
            WHERE l.id = ? AND e.company_id = ?
            FOR UPDATE
            "#,
        )
        .bind(entity.id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        if status != LeaveStatus::Pending.as_ref() {
            return Err(StoreError::Stale);
        }

        sqlx::query("UPDATE leave_requests SET status = ?, admin_comment = ? WHERE id = ?")
            .bind(entity.status.as_ref())
            .bind(&entity.admin_comment)
            .bind(entity.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

// -------------------- payroll --------------------

fn payroll_conditions(company_id: u64, filter: &PayrollFilter) -> Conditions {
    let mut c = Conditions::scoped("e.company_id", company_id);
    if let Some(employee_id) = filter.employee_id {
        c.push("p.employee_id = ?", employee_id);
    }
    if let Some(month) = &filter.month {
        c.push("p.month = ?", month.as_str());
    }
    c
}

#[async_trait]
impl ScopedRepository<Payroll> for MySqlStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &PayrollFilter,
    ) -> Result<Vec<Payroll>, StoreError> {
        let conditions = payroll_conditions(company_id, filter);
        self.fetch_scoped(
            PAYROLL_SELECT,
            PAYROLL_FROM,
            &conditions,
            "p.id DESC",
            filter.paging.as_ref(),
        )
        .await
    }

    async fn count_own(&self, company_id: u64, filter: &PayrollFilter) -> Result<i64, StoreError> {
        self.count_scoped(PAYROLL_FROM, &payroll_conditions(company_id, filter))
            .await
    }

    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<Payroll, StoreError> {
        let mut conditions = Conditions::scoped("e.company_id", company_id);
        conditions.push("p.id = ?", id);
        self.fetch_one_scoped(PAYROLL_SELECT, PAYROLL_FROM, &conditions)
            .await
    }

    async fn create(&self, new: NewPayroll) -> Result<Payroll, StoreError> {
        let net_salary = Payroll::net(new.basic_salary, new.deductions);

        let id = sqlx::query(
            r#"
            INSERT INTO payroll (employee_id, basic_salary, deductions, net_salary, month)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.basic_salary)
        .bind(new.deductions)
        .bind(net_salary)
        .bind(&new.month)
        .execute(&self.pool)
        .await?
        .last_insert_id();

        Ok(Payroll {
            id,
            employee_id: new.employee_id,
            basic_salary: new.basic_salary,
            deductions: new.deductions,
            net_salary,
            month: new.month,
        })
    }

    async fn update(&self, company_id: u64, entity: &Payroll) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, u64>(
            r#"
            SELECT p.id
            FROM payroll p JOIN employee_profiles e ON e.id = p.employee_id
            WHERE p.id = ? AND e.company_id = ?
            FOR UPDATE
            "#,
        )
        .bind(entity.id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        sqlx::query(
            "UPDATE payroll SET basic_salary = ?, deductions = ?, net_salary = ? WHERE id = ?",
        )
        .bind(entity.basic_salary)
        .bind(entity.deductions)
        .bind(Payroll::net(entity.basic_salary, entity.deductions))
        .bind(entity.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
