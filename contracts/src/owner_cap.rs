// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Owner Capability
//!
//! An [`OwnerCap`] is the admin key of exactly one vault. Whoever holds it
//! can deposit, withdraw and change the rate; nobody else can. The contract
//! does not care who the original creator was.
//!
//! Caps are unforgeable: the constructor is private to this crate and only
//! [`create_vault`](crate::vault::create_vault) calls it. They are also not
//! `Clone` and not deserializable, so the only way to have one is to have
//! been handed one.

use serde::Serialize;

use mintvault_protocol::object::ObjectId;

/// Authorization token for the owner-restricted operations of one vault.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct OwnerCap {
    /// This capability's own identity.
    id: ObjectId,
    /// The one vault it authorizes.
    vault_id: ObjectId,
}

impl OwnerCap {
    pub(crate) fn issue(vault_id: ObjectId) -> Self {
        Self {
            id: ObjectId::fresh(),
            vault_id,
        }
    }

    /// The capability's identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the vault this capability controls.
    pub fn vault_id(&self) -> ObjectId {
        self.vault_id
    }

    /// Returns `true` if this capability authorizes the vault `vault_id`.
    pub fn authorizes(&self, vault_id: ObjectId) -> bool {
        self.vault_id == vault_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorizes_only_its_vault() {
        let vault = ObjectId::fresh();
        let cap = OwnerCap::issue(vault);
        assert!(cap.authorizes(vault));
        assert!(!cap.authorizes(ObjectId::fresh()));
        assert_eq!(cap.vault_id(), vault);
    }

    #[test]
    fn caps_for_same_vault_have_distinct_ids() {
        let vault = ObjectId::fresh();
        assert_ne!(OwnerCap::issue(vault).id(), OwnerCap::issue(vault).id());
    }
}
