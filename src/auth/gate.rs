//! Bearer-token gate for admin routes.
//!
//! Handlers take a [`Principal`] argument to require a valid token, then call
//! [`Principal::require`] with the capability the route needs.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};

use super::token::TokenSigner;
use crate::error::ApiError;

/// What an admin route lets the caller do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageProperties,
    ManageBookings,
    ManageLeads,
    ViewDashboard,
    UploadImages,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ManageProperties,
        Capability::ManageBookings,
        Capability::ManageLeads,
        Capability::ViewDashboard,
        Capability::UploadImages,
    ];
}

/// Capabilities granted to a role.
///
/// Every account is an administrator today, so every role gets everything.
pub fn capabilities_for(_role: &str) -> &'static [Capability] {
    &Capability::ALL
}

/// Authenticated caller, decoded from the bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Principal {
    pub fn can(&self, capability: Capability) -> bool {
        capabilities_for(&self.role).contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if self.can(capability) {
            Ok(())
        } else {
            warn!(user = %self.email, ?capability, "Capability denied");
            Err(ApiError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    Arc<TokenSigner>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            debug!(path = %parts.uri.path(), "Missing access token");
            return Err(ApiError::AuthenticationRequired);
        };

        let signer = Arc::<TokenSigner>::from_ref(state);
        let claims = signer.verify(token).map_err(|e| {
            warn!(path = %parts.uri.path(), error = %e, "Rejected access token");
            ApiError::InvalidToken
        })?;

        Ok(Principal {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        })
    }
}
