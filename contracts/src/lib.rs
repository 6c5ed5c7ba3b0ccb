// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Mintvault Contracts
//!
//! The fixed-rate vault and the two objects it is created with:
//!
//! - **Vault** -- holds a reserve of an input asset and the minting
//!   authority of an output asset; converts between them at a managed rate.
//! - **Owner Capability** -- the admin key of one vault. Deposit, withdraw
//!   and rate changes require it.
//! - **Metadata** -- the immutable descriptor whose identity is the only key
//!   to the vault's minting authority.
//!
//! ## Design Principles
//!
//! 1. Every conversion is overflow-checked and floor-rounded. The vault
//!    never pays out more than it was paid.
//! 2. Authority is possession. There are no signatures or allow-lists here,
//!    only objects you either hold or do not.
//! 3. A failed call changes nothing, and hands back what it was given.

pub mod metadata;
pub mod owner_cap;
pub mod vault;

pub use metadata::{MetadataFields, VaultMetadata};
pub use owner_cap::OwnerCap;
pub use vault::{create_vault, CreatedVault, Rejected, Vault, VaultError, VaultSummary};
