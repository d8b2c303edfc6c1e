//! The `verified` guard.

use {
    super::{AuthenticatedUser, Guard, GuardDecision, expects_json, json_message, redirect_found},
    axum::{extract::Request, http::StatusCode},
};

/// Requires an [`AuthenticatedUser`] with a verified email address.
///
/// Meant to run after `auth`. Without a verified user, JSON clients get a
/// 403 and everyone else is redirected to the verification route.
#[derive(Debug, Clone)]
pub struct VerifiedGuard {
    verification_route: String,
}

impl VerifiedGuard {
    pub fn new(verification_route: &str) -> Self {
        Self {
            verification_route: verification_route.to_string(),
        }
    }
}

impl Guard for VerifiedGuard {
    fn check(&self, request: &mut Request) -> GuardDecision {
        let verified = request
            .extensions()
            .get::<AuthenticatedUser>()
            .is_some_and(|user| user.email_verified);

        if verified {
            GuardDecision::Allow
        } else if expects_json(request.headers()) {
            GuardDecision::Deny(json_message(
                StatusCode::FORBIDDEN,
                "Your email address is not verified.",
            ))
        } else {
            GuardDecision::Deny(redirect_found(&self.verification_route))
        }
    }
}
