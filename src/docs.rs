use crate::{
    model::{
        attendance::{Attendance, AttendanceStatus},
        company::Company,
        employee::EmployeeProfile,
        leave_request::{LeaveRequest, LeaveStatus, LeaveType},
        payroll::Payroll,
        role::Role,
        user::User,
    },
    models::{ChangePasswordRequest, LoginRequest, SignupRequest, SignupResponse, TokenResponse},
    service::{
        AttendanceListResponse, EmployeeListResponse, LeaveListResponse, PayrollListResponse,
        employee::{CreateEmployee, CreatedEmployee, PasswordReset, UpdateEmployee},
        leave::{ApplyLeave, DecideLeave},
        payroll::{CreatePayroll, UpdatePayroll},
        report::DashboardReport,
    },
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

/// Prefix the handler annotations are written against.
const DOCUMENTED_PREFIX: &str = "/api";

/// The OpenAPI document with protected paths moved under `api_prefix`
/// (`API_PREFIX`), so the served document matches the mounted routes.
pub fn document(api_prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = api_prefix.trim_end_matches('/');
    if prefix != DOCUMENTED_PREFIX {
        doc.paths.paths = std::mem::take(&mut doc.paths.paths)
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOCUMENTED_PREFIX) {
                Some(rest) if rest.starts_with('/') => (format!("{}{}", prefix, rest), item),
                _ => (path, item),
            })
            .collect();
    }
    doc
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Multi-tenant HRM API",
        version = "1.0.0",
        description = r#"
## Multi-tenant Human Resource Management (HRM) API

Every company is an isolated tenant. Admins manage their own company's
employees, attendance, leave and payroll; employees see and act on their own
records only.

### Key Features
- **Companies & Accounts**
  - Company signup with its first admin, login, password change
- **Employee Management**
  - Create, update, list, view and deactivate employee profiles
  - Admin password reset with a one-time temporary password
- **Attendance**
  - Daily check-in and check-out
- **Leave**
  - Apply, approve or reject; decisions are final
- **Payroll**
  - Monthly entries with derived net salary
- **Reports**
  - Admin dashboard counts

### Security
Protected endpoints require a **JWT Bearer** token from `/auth/login`.
Records outside the caller's company are reported as not found.

### Errors
Failures return `{"error": <kind>, "message": <text>}`.
"#,
    ),
    paths(
        crate::auth::handlers::company_signup,
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        crate::auth::handlers::change_password,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::my_profile,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::deactivate_employee,
        crate::api::employee::reset_password,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_attendance,
        crate::api::attendance::company_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::payroll::create_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::my_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::update_payroll,

        crate::api::report::dashboard
    ),
    components(
        schemas(
            Role,
            Company,
            User,
            SignupRequest,
            SignupResponse,
            LoginRequest,
            TokenResponse,
            ChangePasswordRequest,
            EmployeeProfile,
            CreateEmployee,
            CreatedEmployee,
            UpdateEmployee,
            PasswordReset,
            EmployeeListResponse,
            Attendance,
            AttendanceStatus,
            AttendanceListResponse,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            ApplyLeave,
            DecideLeave,
            LeaveListResponse,
            Payroll,
            CreatePayroll,
            UpdatePayroll,
            PayrollListResponse,
            DashboardReport
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Company signup, login and account APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Reports", description = "Dashboard APIs"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
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
