// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault Metadata
//!
//! Every vault has exactly one [`VaultMetadata`] record, created in the same
//! call as the vault itself and immutable afterwards. It carries the display
//! fields wallets show to users and, more importantly, the lookup key of the
//! vault's minting authority.
//!
//! That key is the metadata's own identity. Mint and redeem take the
//! metadata as an argument and look the authority up under its key; handing
//! vault A the metadata of vault B finds nothing and is rejected before any
//! value moves.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mintvault_protocol::object::ObjectId;

/// Display fields supplied by the vault creator. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFields {
    /// Human-readable name of the output asset.
    pub name: String,
    /// Ticker symbol of the output asset.
    pub symbol: String,
    /// Free-form description.
    pub description: String,
    /// Optional icon URL.
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Immutable descriptor bound 1:1 to a `Vault<I, O>`.
#[derive(Serialize)]
#[serde(bound = "")]
pub struct VaultMetadata<I, O> {
    /// Identity of this record, and the key of the vault's minting authority.
    id: ObjectId,
    /// The paired vault.
    vault_id: ObjectId,
    #[serde(flatten)]
    fields: MetadataFields,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    _assets: PhantomData<fn() -> (I, O)>,
}

impl<I, O> VaultMetadata<I, O> {
    pub(crate) fn new(id: ObjectId, vault_id: ObjectId, fields: MetadataFields) -> Self {
        Self {
            id,
            vault_id,
            fields,
            created_at: Utc::now(),
            _assets: PhantomData,
        }
    }

    /// The record's identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Key under which the paired vault stores its minting authority.
    pub fn lookup_key(&self) -> ObjectId {
        self.id
    }

    /// Identity of the paired vault.
    pub fn vault_id(&self) -> ObjectId {
        self.vault_id
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn symbol(&self) -> &str {
        &self.fields.symbol
    }

    pub fn description(&self) -> &str {
        &self.fields.description
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.fields.icon_url.as_deref()
    }

    /// All display fields at once.
    pub fn fields(&self) -> &MetadataFields {
        &self.fields
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Hand-written so that `I` and `O` (zero-sized markers) need not be Clone/Debug.
impl<I, O> Clone for VaultMetadata<I, O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            vault_id: self.vault_id,
            fields: self.fields.clone(),
            created_at: self.created_at,
            _assets: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for VaultMetadata<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultMetadata")
            .field("id", &self.id)
            .field("vault_id", &self.vault_id)
            .field("symbol", &self.fields.symbol)
            .field("name", &self.fields.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct In;
    struct Out;

    fn fields() -> MetadataFields {
        MetadataFields {
            name: "Staked Reserve".into(),
            symbol: "sRSV".into(),
            description: "Receipt for reserve held in the vault".into(),
            icon_url: Some("https://example.com/srsv.png".into()),
        }
    }

    #[test]
    fn lookup_key_is_own_identity() {
        let id = ObjectId::fresh();
        let meta = VaultMetadata::<In, Out>::new(id, ObjectId::fresh(), fields());
        assert_eq!(meta.lookup_key(), id);
        assert_eq!(meta.id(), id);
    }

    #[test]
    fn display_fields_are_exposed() {
        let meta = VaultMetadata::<In, Out>::new(ObjectId::fresh(), ObjectId::fresh(), fields());
        assert_eq!(meta.symbol(), "sRSV");
        assert_eq!(meta.name(), "Staked Reserve");
        assert_eq!(meta.icon_url(), Some("https://example.com/srsv.png"));
    }

    #[test]
    fn serializes_flat() {
        let meta = VaultMetadata::<In, Out>::new(ObjectId::fresh(), ObjectId::fresh(), fields());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["symbol"], "sRSV");
        assert_eq!(json["id"], meta.id().to_string());
        assert!(json.get("_assets").is_none());
    }

    #[test]
    fn icon_url_optional_in_fields() {
        let parsed: MetadataFields = serde_json::from_str(
            r#"{"name":"n","symbol":"S","description":"d"}"#,
        )
        .unwrap();
        assert_eq!(parsed.icon_url, None);
    }
}
