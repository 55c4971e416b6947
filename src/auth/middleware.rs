use crate::auth::auth::{AuthUser, bearer};
use crate::config::Config;
use crate::error::ApiError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

/// Opens the session for every request under the protected scope.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or(ApiError::Internal)?;

    let user = match bearer(req.request()) {
        Some(token) => AuthUser::from_token(token, &config.jwt_secret),
        None => Err(ApiError::Unauthorized(
            "Missing or malformed Authorization header".into(),
        )),
    };

    match user {
        Ok(user) => {
            tracing::debug!(pegawai_id = user.pegawai_id, role = %user.role, "Session opened");
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(e) => {
            let resp = HttpResponse::Unauthorized().json(json!({ "message": e.to_string() }));
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
