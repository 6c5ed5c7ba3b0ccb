// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Object Identity
//!
//! Every long-lived thing in Mintvault (vaults, metadata records, owner
//! capabilities, treasuries, coins) carries an [`ObjectId`]. Identities are
//! allocated once, never reused, and never change for the lifetime of the
//! object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A process-unique, stable object identifier.
///
/// Backed by a random (v4) UUID. Collisions are possible in the same sense
/// that guessing someone's private key is possible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Allocates a fresh identity.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID. Used when rehydrating ids received over the wire.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.simple().to_string();
        write!(f, "ObjectId({}...)", &s[..12])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
