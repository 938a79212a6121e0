//! In-process store with the same unique keys, tenant scoping and terminal
//! state rules as the MySQL store. Used by tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

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
};

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    users: Vec<User>,
    employees: Vec<EmployeeProfile>,
    attendance: Vec<Attendance>,
    leaves: Vec<LeaveRequest>,
    payrolls: Vec<Payroll>,
    last_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn employee_company(&self, employee_id: u64) -> Option<u64> {
        self.employees
            .iter()
            .find(|e| e.id == employee_id)
            .map(|e| e.company_id)
    }

    fn check_email(&self, email: &str) -> Result<(), StoreError> {
        if self.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict(UniqueKey::Email));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn page<T: Clone>(mut rows: Vec<T>, paging: Option<&Paging>) -> Vec<T> {
    if let Some(p) = paging {
        rows = rows
            .into_iter()
            .skip(p.offset() as usize)
            .take(p.per_page() as usize)
            .collect();
    }
    rows
}

impl Store for MemoryStore {
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

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn create_with_admin(
        &self,
        name: &str,
        admin: NewAccount,
    ) -> Result<(Company, User), StoreError> {
        let mut t = self.lock();
        if t.companies.iter().any(|c| c.name == name) {
            return Err(StoreError::Conflict(UniqueKey::CompanyName));
        }
        t.check_email(&admin.email)?;

        let company = Company {
            id: t.next_id(),
            name: name.to_string(),
        };
        let user = User {
            id: t.next_id(),
            company_id: company.id,
            email: admin.email,
            password_hash: admin.password_hash,
            full_name: admin.full_name,
            role: Role::Admin,
            is_active: true,
        };
        t.companies.push(company.clone());
        t.users.push(user.clone());
        Ok((company, user))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Company>, StoreError> {
        Ok(self.lock().companies.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut t = self.lock();
        let stored = t
            .users
            .iter_mut()
            .find(|u| u.id == user.id && u.company_id == user.company_id)
            .ok_or(StoreError::NotFound)?;
        stored.password_hash = user.password_hash.clone();
        stored.full_name = user.full_name.clone();
        stored.is_active = user.is_active;
        Ok(())
    }
}

/// Search is a case-insensitive substring match, like LIKE under MySQL's default collation.
fn employee_matches(e: &EmployeeProfile, company_id: u64, filter: &EmployeeFilter) -> bool {
    e.company_id == company_id
        && filter.department.as_ref().is_none_or(|d| &e.department == d)
        && filter.search.as_ref().is_none_or(|s| {
            let s = s.to_lowercase();
            e.full_name.to_lowercase().contains(&s) || e.employee_code.to_lowercase().contains(&s)
        })
}

#[async_trait]
impl ScopedRepository<EmployeeProfile> for MemoryStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeProfile>, StoreError> {
        let t = self.lock();
        let rows = t
            .employees
            .iter()
            .rev()
            .filter(|e| employee_matches(e, company_id, filter))
            .cloned()
            .collect();
        Ok(page(rows, filter.paging.as_ref()))
    }

    async fn count_own(&self, company_id: u64, filter: &EmployeeFilter) -> Result<i64, StoreError> {
        let t = self.lock();
        Ok(t.employees
            .iter()
            .filter(|e| employee_matches(e, company_id, filter))
            .count() as i64)
    }

    async fn find_by_id_scoped(
        &self,
        company_id: u64,
        id: u64,
    ) -> Result<EmployeeProfile, StoreError> {
        self.lock()
            .employees
            .iter()
            .find(|e| e.id == id && e.company_id == company_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewEmployee) -> Result<EmployeeProfile, StoreError> {
        let mut t = self.lock();
        t.check_email(&new.account.email)?;
        if t.employees.iter().any(|e| e.employee_code == new.employee_code) {
            return Err(StoreError::Conflict(UniqueKey::EmployeeCode));
        }

        let user = User {
            id: t.next_id(),
            company_id: new.company_id,
            email: new.account.email,
            password_hash: new.account.password_hash,
            full_name: new.account.full_name.clone(),
            role: Role::Employee,
            is_active: true,
        };
        let profile = EmployeeProfile {
            id: t.next_id(),
            user_id: user.id,
            company_id: new.company_id,
            employee_code: new.employee_code,
            full_name: new.account.full_name,
            department: new.department,
            job_title: new.job_title,
            salary: new.salary,
            year_of_joining: new.year_of_joining,
        };
        t.users.push(user);
        t.employees.push(profile.clone());
        Ok(profile)
    }

    async fn update(&self, company_id: u64, entity: &EmployeeProfile) -> Result<(), StoreError> {
        let mut t = self.lock();
        let stored = t
            .employees
            .iter_mut()
            .find(|e| e.id == entity.id && e.company_id == company_id)
            .ok_or(StoreError::NotFound)?;
        stored.full_name = entity.full_name.clone();
        stored.department = entity.department.clone();
        stored.job_title = entity.job_title.clone();
        stored.salary = entity.salary;
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn find_by_user(
        &self,
        company_id: u64,
        user_id: u64,
    ) -> Result<Option<EmployeeProfile>, StoreError> {
        Ok(self
            .lock()
            .employees
            .iter()
            .find(|e| e.user_id == user_id && e.company_id == company_id)
            .cloned())
    }
}

fn attendance_matches(t: &Tables, a: &Attendance, company_id: u64, filter: &AttendanceFilter) -> bool {
    t.employee_company(a.employee_id) == Some(company_id)
        && filter.employee_id.is_none_or(|id| a.employee_id == id)
        && filter.date.is_none_or(|d| a.date == d)
}

#[async_trait]
impl ScopedRepository<Attendance> for MemoryStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &AttendanceFilter,
    ) -> Result<Vec<Attendance>, StoreError> {
        let t = self.lock();
        let mut rows: Vec<Attendance> = t
            .attendance
            .iter()
            .filter(|a| attendance_matches(&t, a, company_id, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(page(rows, filter.paging.as_ref()))
    }

    async fn count_own(&self, company_id: u64, filter: &AttendanceFilter) -> Result<i64, StoreError> {
        let t = self.lock();
        Ok(t.attendance
            .iter()
            .filter(|a| attendance_matches(&t, a, company_id, filter))
            .count() as i64)
    }

    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<Attendance, StoreError> {
        let t = self.lock();
        t.attendance
            .iter()
            .find(|a| a.id == id && t.employee_company(a.employee_id) == Some(company_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewAttendance) -> Result<Attendance, StoreError> {
        let mut t = self.lock();
        if t
            .attendance
            .iter()
            .any(|a| a.employee_id == new.employee_id && a.date == new.date)
        {
            return Err(StoreError::Conflict(UniqueKey::AttendanceDay));
        }
        let record = Attendance {
            id: t.next_id(),
            employee_id: new.employee_id,
            date: new.date,
            check_in_time: new.check_in_time,
            check_out_time: None,
            status: new.status,
        };
        t.attendance.push(record.clone());
        Ok(record)
    }

    async fn update(&self, company_id: u64, entity: &Attendance) -> Result<(), StoreError> {
        let mut t = self.lock();
        let idx = t
            .attendance
            .iter()
            .position(|a| a.id == entity.id && t.employee_company(a.employee_id) == Some(company_id))
            .ok_or(StoreError::NotFound)?;
        let stored = &mut t.attendance[idx];
        if stored.is_closed() {
            return Err(StoreError::Stale);
        }
        stored.check_out_time = entity.check_out_time;
        stored.status = entity.status;
        Ok(())
    }
}

fn leave_matches(t: &Tables, l: &LeaveRequest, company_id: u64, filter: &LeaveFilter) -> bool {
    t.employee_company(l.employee_id) == Some(company_id)
        && filter.employee_id.is_none_or(|id| l.employee_id == id)
        && filter.status.is_none_or(|s| l.status == s)
}

#[async_trait]
impl ScopedRepository<LeaveRequest> for MemoryStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &LeaveFilter,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let t = self.lock();
        let mut rows: Vec<LeaveRequest> = t
            .leaves
            .iter()
            .filter(|l| leave_matches(&t, l, company_id, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(page(rows, filter.paging.as_ref()))
    }

    async fn count_own(&self, company_id: u64, filter: &LeaveFilter) -> Result<i64, StoreError> {
        let t = self.lock();
        Ok(t.leaves
            .iter()
            .filter(|l| leave_matches(&t, l, company_id, filter))
            .count() as i64)
    }

    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<LeaveRequest, StoreError> {
        let t = self.lock();
        t.leaves
            .iter()
            .find(|l| l.id == id && t.employee_company(l.employee_id) == Some(company_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewLeave) -> Result<LeaveRequest, StoreError> {
        let mut t = self.lock();
        let leave = LeaveRequest {
            id: t.next_id(),
            employee_id: new.employee_id,
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            status: LeaveStatus::Pending,
            admin_comment: None,
        };
        t.leaves.push(leave.clone());
        Ok(leave)
    }

    async fn update(&self, company_id: u64, entity: &LeaveRequest) -> Result<(), StoreError> {
        let mut t = self.lock();
        let idx = t
            .leaves
            .iter()
            .position(|l| l.id == entity.id && t.employee_company(l.employee_id) == Some(company_id))
            .ok_or(StoreError::NotFound)?;
        let stored = &mut t.leaves[idx];
        if stored.status.is_terminal() {
            return Err(StoreError::Stale);
        }
        stored.status = entity.status;
        stored.admin_comment = entity.admin_comment.clone();
        Ok(())
    }
}

fn payroll_matches(t: &Tables, p: &Payroll, company_id: u64, filter: &PayrollFilter) -> bool {
    t.employee_company(p.employee_id) == Some(company_id)
        && filter.employee_id.is_none_or(|id| p.employee_id == id)
        && filter.month.as_ref().is_none_or(|m| &p.month == m)
}

#[async_trait]
impl ScopedRepository<Payroll> for MemoryStore {
    async fn find_own(
        &self,
        company_id: u64,
        filter: &PayrollFilter,
    ) -> Result<Vec<Payroll>, StoreError> {
        let t = self.lock();
        let rows = t
            .payrolls
            .iter()
            .rev()
            .filter(|p| payroll_matches(&t, p, company_id, filter))
            .cloned()
            .collect();
        Ok(page(rows, filter.paging.as_ref()))
    }

    async fn count_own(&self, company_id: u64, filter: &PayrollFilter) -> Result<i64, StoreError> {
        let t = self.lock();
        Ok(t.payrolls
            .iter()
            .filter(|p| payroll_matches(&t, p, company_id, filter))
            .count() as i64)
    }

    async fn find_by_id_scoped(&self, company_id: u64, id: u64) -> Result<Payroll, StoreError> {
        let t = self.lock();
        t.payrolls
            .iter()
            .find(|p| p.id == id && t.employee_company(p.employee_id) == Some(company_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewPayroll) -> Result<Payroll, StoreError> {
        let mut t = self.lock();
        let payroll = Payroll {
            id: t.next_id(),
            employee_id: new.employee_id,
            basic_salary: new.basic_salary,
            deductions: new.deductions,
            net_salary: Payroll::net(new.basic_salary, new.deductions),
            month: new.month,
        };
        t.payrolls.push(payroll.clone());
        Ok(payroll)
    }

    async fn update(&self, company_id: u64, entity: &Payroll) -> Result<(), StoreError> {
        let mut t = self.lock();
        let idx = t
            .payrolls
            .iter()
            .position(|p| p.id == entity.id && t.employee_company(p.employee_id) == Some(company_id))
            .ok_or(StoreError::NotFound)?;
        let stored = &mut t.payrolls[idx];
        stored.basic_salary = entity.basic_salary;
        stored.deductions = entity.deductions;
        stored.net_salary = Payroll::net(entity.basic_salary, entity.deductions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn account(email: &str) -> NewAccount {
        NewAccount {
            email: email.into(),
            password_hash: "h".into(),
            full_name: "Someone".into(),
        }
    }

    #[actix_web::test]
    async fn company_name_and_email_are_unique() {
        let store = MemoryStore::new();
        store
            .create_with_admin("Acme", account("a@acme.io"))
            .await
            .unwrap();

        let dup_name = store.create_with_admin("Acme", account("b@acme.io")).await;
        assert!(matches!(
            dup_name,
            Err(StoreError::Conflict(UniqueKey::CompanyName))
        ));

        let dup_email = store
            .companies()
            .create_with_admin("Globex", account("a@acme.io"))
            .await;
        assert!(matches!(dup_email, Err(StoreError::Conflict(UniqueKey::Email))));
    }

    #[actix_web::test]
    async fn attendance_update_refuses_closed_rows() {
        let store = MemoryStore::new();
        let (company, _) = store
            .create_with_admin("Acme", account("a@acme.io"))
            .await
            .unwrap();
        let profile = ScopedRepository::<EmployeeProfile>::create(
            &store,
            NewEmployee {
                company_id: company.id,
                account: account("e@acme.io"),
                employee_code: "GEN0001".into(),
                department: "General".into(),
                job_title: "Employee".into(),
                salary: 0,
                year_of_joining: 2026,
            },
        )
        .await
        .unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let mut record = store
            .attendance()
            .create(NewAttendance {
                employee_id: profile.id,
                date: day,
                check_in_time: nine,
                status: crate::model::attendance::AttendanceStatus::Present,
            })
            .await
            .unwrap();

        record.check_out_time = Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        store.attendance().update(company.id, &record).await.unwrap();
        assert!(matches!(
            store.attendance().update(company.id, &record).await,
            Err(StoreError::Stale)
        ));
        assert!(matches!(
            store.attendance().update(company.id + 100, &record).await,
            Err(StoreError::NotFound)
        ));
    }

    #[actix_web::test]
    async fn employee_search_ignores_case_and_treats_wildcards_literally() {
        let store = MemoryStore::new();
        let (company, _) = store
            .create_with_admin("Acme", account("a@acme.io"))
            .await
            .unwrap();
        ScopedRepository::<EmployeeProfile>::create(
            &store,
            NewEmployee {
                company_id: company.id,
                account: NewAccount {
                    full_name: "Jane Doe".into(),
                    ..account("jane@acme.io")
                },
                employee_code: "ENG0042".into(),
                department: "Engineering".into(),
                job_title: "Engineer".into(),
                salary: 0,
                year_of_joining: 2026,
            },
        )
        .await
        .unwrap();

        let hits = |term: &str| EmployeeFilter {
            search: Some(term.into()),
            ..Default::default()
        };
        for (term, expected) in [("jane", 1), ("DOE", 1), ("eng00", 1), ("%", 0), ("_", 0)] {
            let found = ScopedRepository::<EmployeeProfile>::find_own(&store, company.id, &hits(term))
                .await
                .unwrap();
            assert_eq!(found.len(), expected, "search {term:?}");
        }
    }
}
