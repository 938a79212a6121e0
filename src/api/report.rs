use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    repository::Store,
    service::report,
};

/// Admin dashboard counts for the caller's company
#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = crate::service::report::DashboardReport),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn dashboard(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let report = report::dashboard(store.get_ref(), &auth.user, today).await?;
    Ok(HttpResponse::Ok().json(report))
}
