// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Fungible Value Containers
//!
//! Two shapes of the same thing:
//!
//! - [`Balance<T>`] -- a bare quantity of asset `T`. Stored inside other
//!   objects (a vault's reserve, an account's holdings).
//! - [`Coin<T>`] -- a balance with its own [`ObjectId`], the unit a caller
//!   hands around.
//!
//! The asset type `T` is a zero-sized marker. It exists only at compile
//! time, so a `Balance<Usd>` can never be joined into a `Balance<Gold>`.
//!
//! ## Conservation
//!
//! Neither type is `Clone`, `Copy` or deserializable. The only way to get a
//! non-zero balance is to mint it from a [`TreasuryCap`](crate::treasury::TreasuryCap),
//! and the only way to shrink the total is to burn it there. Operations that
//! could fail after taking ownership of a value hand that value back instead
//! of dropping it.

use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

use crate::object::ObjectId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by balance and treasury operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    /// Tried to split more than the container holds.
    #[error("insufficient value: available {available}, requested {requested}")]
    InsufficientValue {
        /// Value currently held.
        available: u64,
        /// Value that was asked for.
        requested: u64,
    },

    /// Minting would push total supply past `u64::MAX`.
    #[error("supply overflow: supply {supply}, minting {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// Supply before the failed mint.
        supply: u64,
        /// Amount that was attempted.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

/// A quantity of asset `T` in its smallest denomination.
#[must_use = "dropping a non-zero Balance destroys value"]
pub struct Balance<T> {
    value: u64,
    _asset: PhantomData<fn() -> T>,
}

impl<T> Balance<T> {
    /// An empty balance. Always safe to create: it holds nothing.
    pub fn zero() -> Self {
        Self::new(0)
    }

    /// Only the treasury may conjure value.
    pub(crate) fn new(value: u64) -> Self {
        Self {
            value,
            _asset: PhantomData,
        }
    }

    /// Consumes the balance, returning the raw amount. Treasury burn path only.
    pub(crate) fn into_value(self) -> u64 {
        self.value
    }

    /// Returns the held amount.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns `true` if nothing is held.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Merges `other` into `self`, returning the new value.
    ///
    /// If the sum would exceed `u64::MAX`, nothing changes and `other` is
    /// handed back untouched as the error value.
    pub fn join(&mut self, other: Balance<T>) -> Result<u64, Balance<T>> {
        match self.value.checked_add(other.value) {
            Some(sum) => {
                self.value = sum;
                Ok(sum)
            }
            None => Err(other),
        }
    }

    /// Returns `true` if `other` can be joined without overflow.
    pub fn can_join(&self, other: &Balance<T>) -> bool {
        self.value.checked_add(other.value).is_some()
    }

    /// Splits `amount` off into a new balance.
    ///
    /// # Errors
    ///
    /// [`CoinError::InsufficientValue`] if `amount` exceeds the held value.
    /// `self` is unchanged on failure.
    pub fn split(&mut self, amount: u64) -> Result<Balance<T>, CoinError> {
        if amount > self.value {
            return Err(CoinError::InsufficientValue {
                available: self.value,
                requested: amount,
            });
        }
        self.value -= amount;
        Ok(Balance::new(amount))
    }

    /// Moves the entire value out, leaving zero behind.
    pub fn withdraw_all(&mut self) -> Balance<T> {
        let value = std::mem::take(&mut self.value);
        Balance::new(value)
    }
}

impl<T> Default for Balance<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T> fmt::Debug for Balance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Balance")
            .field("asset", &std::any::type_name::<T>())
            .field("value", &self.value)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// A transferable unit of asset `T`: a [`Balance`] wrapped with an identity.
#[must_use = "dropping a non-zero Coin destroys value"]
pub struct Coin<T> {
    id: ObjectId,
    balance: Balance<T>,
}

impl<T> Coin<T> {
    /// Wraps a balance into a fresh coin.
    pub fn from_balance(balance: Balance<T>) -> Self {
        Self {
            id: ObjectId::fresh(),
            balance,
        }
    }

    /// Unwraps the coin. Its identity is retired with it.
    pub fn into_balance(self) -> Balance<T> {
        self.balance
    }

    /// A zero-valued coin.
    pub fn zero() -> Self {
        Self::from_balance(Balance::zero())
    }

    /// The coin's identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The coin's value.
    pub fn value(&self) -> u64 {
        self.balance.value()
    }

    /// Borrow the inner balance.
    pub fn balance(&self) -> &Balance<T> {
        &self.balance
    }

    /// Splits `amount` off into a new coin with its own identity.
    pub fn split(&mut self, amount: u64) -> Result<Coin<T>, CoinError> {
        self.balance.split(amount).map(Coin::from_balance)
    }

    /// Merges `other` into this coin. `other`'s identity is retired.
    /// On overflow `other` comes back untouched.
    pub fn join(&mut self, other: Coin<T>) -> Result<u64, Coin<T>> {
        let Coin { id, balance } = other;
        self.balance
            .join(balance)
            .map_err(|balance| Coin { id, balance })
    }
}

impl<T> fmt::Debug for Coin<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coin")
            .field("id", &self.id)
            .field("asset", &std::any::type_name::<T>())
            .field("value", &self.balance.value)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Gold;

    #[test]
    fn zero_balance_is_zero() {
        let b = Balance::<Gold>::zero();
        assert!(b.is_zero());
        assert_eq!(b.value(), 0);
    }

    #[test]
    fn join_accumulates() {
        let mut a = Balance::<Gold>::new(500);
        let total = a.join(Balance::new(300)).unwrap();
        assert_eq!(total, 800);
        assert_eq!(a.value(), 800);
    }

    #[test]
    fn join_overflow_hands_value_back() {
        let mut a = Balance::<Gold>::new(u64::MAX);
        let returned = a.join(Balance::new(7)).unwrap_err();
        assert_eq!(returned.value(), 7);
        assert_eq!(a.value(), u64::MAX);
        assert!(!a.can_join(&Balance::new(1)));
        assert!(a.can_join(&Balance::zero()));
    }

    #[test]
    fn split_reduces_value() {
        let mut a = Balance::<Gold>::new(1_000);
        let b = a.split(400).unwrap();
        assert_eq!(a.value(), 600);
        assert_eq!(b.value(), 400);
    }

    #[test]
    fn split_everything_leaves_zero() {
        let mut a = Balance::<Gold>::new(42);
        let b = a.split(42).unwrap();
        assert!(a.is_zero());
        assert_eq!(b.value(), 42);
    }

    #[test]
    fn split_too_much_rejected() {
        let mut a = Balance::<Gold>::new(100);
        let err = a.split(200).unwrap_err();
        assert_eq!(
            err,
            CoinError::InsufficientValue {
                available: 100,
                requested: 200
            }
        );
        assert_eq!(a.value(), 100);
    }

    #[test]
    fn withdraw_all_empties_source() {
        let mut a = Balance::<Gold>::new(77);
        let b = a.withdraw_all();
        assert!(a.is_zero());
        assert_eq!(b.value(), 77);
    }

    #[test]
    fn coin_round_trips_through_balance() {
        let coin = Coin::from_balance(Balance::<Gold>::new(10));
        assert_eq!(coin.value(), 10);
        assert_eq!(coin.into_balance().value(), 10);
    }

    #[test]
    fn coin_split_gets_new_identity() {
        let mut coin = Coin::from_balance(Balance::<Gold>::new(10));
        let piece = coin.split(3).unwrap();
        assert_ne!(coin.id(), piece.id());
        assert_eq!(coin.value(), 7);
        assert_eq!(piece.value(), 3);
    }

    #[test]
    fn coin_join_overflow_preserves_identity() {
        let mut big = Coin::from_balance(Balance::<Gold>::new(u64::MAX));
        let small = Coin::from_balance(Balance::<Gold>::new(1));
        let small_id = small.id();
        let back = big.join(small).unwrap_err();
        assert_eq!(back.id(), small_id);
        assert_eq!(back.value(), 1);
    }

    #[test]
    fn debug_names_the_asset() {
        let b = Balance::<Gold>::new(5);
        let rendered = format!("{:?}", b);
        assert!(rendered.contains("Gold"));
        assert!(rendered.contains('5'));
    }
}
