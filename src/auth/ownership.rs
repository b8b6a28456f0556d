//! Ownership checks for user-owned resources.
//!
//! Every secret belongs to exactly one account. Reads and deletes are allowed
//! only when the authenticated principal is that account; any mismatch is an
//! explicit [`AuthError::Forbidden`].

use tracing::warn;

use crate::auth::models::{AuthError, Principal};
use crate::domain::{AccountId, DecodedSecret, Secret};

/// Resources that record the account that owns them.
pub trait Owned {
    fn owner_id(&self) -> AccountId;
}

impl Owned for Secret {
    fn owner_id(&self) -> AccountId {
        self.owner_id
    }
}

impl Owned for DecodedSecret {
    fn owner_id(&self) -> AccountId {
        self.owner_id
    }
}

/// Check whether the principal owns the resource.
pub fn is_owner<T: Owned + ?Sized>(resource: &T, principal: &Principal) -> bool {
    resource.owner_id() == principal.owner_id()
}

/// Require ownership before returning a resource's contents.
pub fn authorize_read<T: Owned + ?Sized>(
    resource: &T,
    principal: &Principal,
) -> Result<(), AuthError> {
    require_owner(resource, principal, "read")
}

/// Require ownership before deleting a resource.
pub fn authorize_delete<T: Owned + ?Sized>(
    resource: &T,
    principal: &Principal,
) -> Result<(), AuthError> {
    require_owner(resource, principal, "delete")
}

fn require_owner<T: Owned + ?Sized>(
    resource: &T,
    principal: &Principal,
    action: &'static str,
) -> Result<(), AuthError> {
    if is_owner(resource, principal) {
        return Ok(());
    }

    warn!(
        action,
        owner_id = %resource.owner_id(),
        requestor_id = %principal.owner_id(),
        "ownership check failed"
    );
    Err(AuthError::Forbidden)
}
