//! Request extractors

use crate::error::AppError;
use crate::models::ActorContext;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the requesting account id
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// Header carrying the requesting account's tenant id
pub const COMPANY_ID_HEADER: &str = "x-company-id";

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account_id = header_id(parts, ACCOUNT_ID_HEADER)?;
        let company_id = header_id(parts, COMPANY_ID_HEADER)?;
        Ok(ActorContext::new(account_id, company_id))
    }
}

fn header_id(parts: &Parts, name: &str) -> Result<u64, AppError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::Validation(format!("Missing '{}' header", name)))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| AppError::Validation(format!("Malformed '{}' header", name)))
}
