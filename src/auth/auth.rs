use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::LocalBoxFuture;

use crate::{
    auth::identity, error::AppError, model::user::User, models::Claims, repository::Store,
};

/// The resolved principal of a protected request.
///
/// `auth_middleware` verifies the bearer token and stores its claims; this
/// extractor turns them into the current `User` row.
pub struct AuthUser {
    pub user: User,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let store = req.app_data::<Data<dyn Store>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or_else(|| AppError::unauthenticated("Missing token"))?;
            let store = store.ok_or_else(|| AppError::internal("Store missing from app data"))?;

            let user = identity::resolve(store.get_ref(), &claims).await?;
            Ok(AuthUser { user })
        })
    }
}
