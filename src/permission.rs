//! The pure permission predicate guarding snippet mutation.
//!
//! Reads are always allowed. Creating requires an authenticated
//! principal. Mutating an existing snippet additionally requires the
//! principal to be its owner. Invoked before every state-changing
//! operation, never after.

use crate::auth::Principal;

/// `owner_id` is the owner of the targeted snippet, or `None` when the
/// request creates a new one. `mutating` is false for reads.
pub fn may_modify(principal: &Principal, owner_id: Option<i64>, mutating: bool) -> bool {
    if !mutating {
        return true;
    }

    let Some(user) = principal.user() else {
        return false;
    };

    match owner_id {
        Some(owner_id) => user.id == owner_id,
        None => true,
    }
}
