// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Mintvault Protocol -- Core Library
//!
//! The primitives every Mintvault contract is built from. Nothing in here
//! knows what a vault is; it only knows how to count money without losing
//! any of it.
//!
//! ## Architecture
//!
//! - **math** -- Fixed-point conversion between two assets at a rate. Pure,
//!   overflow-checked, floor-rounded.
//! - **coin** -- `Balance<T>` and `Coin<T>`, the fungible value containers.
//! - **treasury** -- `TreasuryCap<T>`, the minting authority for an asset.
//! - **attachment** -- Typed, write-once keyed slots one object uses to own
//!   another.
//! - **object** -- `ObjectId`, the identity every long-lived object carries.
//! - **config** -- Protocol constants and node defaults.
//!
//! ## Design Philosophy
//!
//! 1. All amounts are `u64` in smallest-unit denomination. No floating point.
//! 2. Value is never duplicated and never silently dropped by a failed call.
//! 3. If it touches money, it has tests. Plural.

pub mod attachment;
pub mod coin;
pub mod config;
pub mod math;
pub mod object;
pub mod treasury;

pub use attachment::{AttachmentError, Attachments};
pub use coin::{Balance, Coin, CoinError};
pub use math::{compute_input, compute_output, MathError};
pub use object::ObjectId;
pub use treasury::TreasuryCap;
