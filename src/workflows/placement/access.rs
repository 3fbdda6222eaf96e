use super::domain::{Role, UserId};
use super::PlacementError;

/// Authenticated caller identity, resolved by the transport layer before an
/// operation is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Rejects the call before the operation body runs unless the actor's role
/// is in the declared set.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), PlacementError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    Err(PlacementError::Forbidden(format!(
        "{} may not perform this operation",
        actor.role.label()
    )))
}

/// Owner-or-admin gate used by get/update/delete style operations.
pub fn require_owner_or_admin(actor: &Actor, owner: &UserId) -> Result<(), PlacementError> {
    if actor.is_admin() || actor.id == *owner {
        return Ok(());
    }
    Err(PlacementError::Forbidden(
        "only the owner or an administrator may access this record".to_string(),
    ))
}

/// Owner-only gate for operations admins are not allowed to perform on the
/// owner's behalf (withdrawal, proposal edits).
pub fn require_owner(actor: &Actor, owner: &UserId) -> Result<(), PlacementError> {
    if actor.id == *owner {
        return Ok(());
    }
    Err(PlacementError::Forbidden(
        "only the owner may perform this operation".to_string(),
    ))
}
