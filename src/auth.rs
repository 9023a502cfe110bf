use crate::errors::ServiceError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Tenant and user identity for one request.
///
/// Authentication itself lives upstream; this core trusts the session
/// context handed to it via `X-Tenant-Id` / `X-User-Id` headers.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid, user_id: Uuid) -> Self {
        Self { tenant_id, user_id }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_uuid(parts, "x-tenant-id")?;
        let user_id = header_uuid(parts, "x-user-id")?;
        Ok(Self { tenant_id, user_id })
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ServiceError> {
    let raw = parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::ValidationError(format!("missing {} header", name)))?;
    Uuid::parse_str(raw)
        .map_err(|_| ServiceError::ValidationError(format!("invalid {} header", name)))
}
