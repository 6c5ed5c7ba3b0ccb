// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Treasury (Minting Authority)
//!
//! A [`TreasuryCap<T>`] is the one thing in the system allowed to create or
//! destroy units of asset `T`. Holding it *is* the issuer role: there is no
//! signature check or allow-list, just possession.
//!
//! ## Supply Tracking
//!
//! Total supply is maintained with checked arithmetic on every mint. Since
//! every non-zero [`Balance<T>`] traces back to a mint from some treasury,
//! the sum of all outstanding balances of `T` issued by one treasury never
//! exceeds `u64::MAX`.

use std::fmt;
use std::marker::PhantomData;

use crate::coin::{Balance, CoinError};
use crate::object::ObjectId;

/// Minting and burning authority for asset `T`.
pub struct TreasuryCap<T> {
    id: ObjectId,
    total_supply: u64,
    _asset: PhantomData<fn() -> T>,
}

impl<T> TreasuryCap<T> {
    /// Creates a new treasury with zero supply.
    pub fn new() -> Self {
        Self {
            id: ObjectId::fresh(),
            total_supply: 0,
            _asset: PhantomData,
        }
    }

    /// The treasury's identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Units currently in circulation.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns `true` if `amount` more units can be minted without overflow.
    pub fn can_mint(&self, amount: u64) -> bool {
        self.total_supply.checked_add(amount).is_some()
    }

    /// Mints `amount` new units.
    ///
    /// # Errors
    ///
    /// [`CoinError::SupplyOverflow`] if total supply would exceed `u64::MAX`.
    /// Supply is unchanged on failure.
    pub fn mint(&mut self, amount: u64) -> Result<Balance<T>, CoinError> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(CoinError::SupplyOverflow {
                supply: self.total_supply,
                amount,
            })?;
        self.total_supply = new_supply;

        tracing::trace!(treasury = %self.id, amount, supply = new_supply, "minted");
        Ok(Balance::new(amount))
    }

    /// Burns the whole balance, returning the amount destroyed.
    pub fn burn(&mut self, balance: Balance<T>) -> u64 {
        let amount = balance.into_value();
        // A balance of T can only exist because this supply was minted, so
        // saturation never actually bites unless two treasuries share a T.
        self.total_supply = self.total_supply.saturating_sub(amount);

        tracing::trace!(treasury = %self.id, amount, supply = self.total_supply, "burned");
        amount
    }
}

impl<T> Default for TreasuryCap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TreasuryCap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreasuryCap")
            .field("id", &self.id)
            .field("asset", &std::any::type_name::<T>())
            .field("total_supply", &self.total_supply)
            .finish()
    }
}
