// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Fixed-Rate Vault Contract
//!
//! A [`Vault<I, O>`] holds a reserve of input asset `I` and owns the minting
//! authority of output asset `O`. Anyone can:
//!
//! - **mint** -- pay `I` into the reserve, receive `O` at the current rate;
//! - **redeem** -- burn `O`, receive `I` out of the reserve at the current rate.
//!
//! The holder of the vault's [`OwnerCap`] can additionally **deposit** and
//! **withdraw** reserve directly and **set the rate**.
//!
//! ## Rate Model
//!
//! `effective_rate = rate / 10^rate_decimals` output units per input unit.
//! `rate` is always non-zero; `rate_decimals` is fixed at creation.
//! Conversions floor, so mint-then-redeem can only lose dust, never gain it
//! (see [`mintvault_protocol::math`]).
//!
//! ## Atomicity
//!
//! Every operation fully applies or fails with nothing changed. Operations
//! that take a value by move hand it back inside [`Rejected`] when they
//! fail, so a rejected mint does not eat the caller's payment.
//!
//! Within mint and redeem the order is always: validate, update the
//! reserve, then call the minting authority. By the time the authority
//! runs, the books already reflect the new reserve level.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintvault_protocol::attachment::Attachments;
use mintvault_protocol::coin::{Balance, Coin, CoinError};
use mintvault_protocol::config::{DISPLAY_RATE_DECIMALS, MAX_RATE_DECIMALS};
use mintvault_protocol::math::{self, MathError};
use mintvault_protocol::object::ObjectId;
use mintvault_protocol::treasury::TreasuryCap;

use crate::metadata::{MetadataFields, VaultMetadata};
use crate::owner_cap::OwnerCap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
///
/// Each kind has a stable numeric [`code`](VaultError::code) that external
/// callers can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The presented capability belongs to a different vault.
    #[error("wrong owner capability: cap targets vault {cap_vault}, not {vault}")]
    WrongOwnerCapability {
        /// The vault being operated on.
        vault: ObjectId,
        /// The vault the capability actually controls.
        cap_vault: ObjectId,
    },

    /// Withdraw or redeem asked for more than the reserve holds.
    #[error("insufficient reserves: available {available}, requested {requested}")]
    InsufficientReserves {
        /// Current reserve level.
        available: u64,
        /// Amount that was requested.
        requested: u64,
    },

    /// Rate is zero, or its precision does not fit in 64 bits.
    #[error("invalid rate: {rate} with {rate_decimals} decimals")]
    InvalidRate {
        /// The rejected rate.
        rate: u64,
        /// Precision it was paired with.
        rate_decimals: u8,
    },

    /// The metadata's key does not reach a minting authority in this vault.
    #[error("invalid metadata: {metadata} is not bound to vault {vault}")]
    InvalidMetadata {
        /// The vault being operated on.
        vault: ObjectId,
        /// The presented metadata record.
        metadata: ObjectId,
    },

    /// A conversion or reserve sum would exceed `u64::MAX`.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// The rate or a derived power of ten is zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl VaultError {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> u64 {
        match self {
            VaultError::WrongOwnerCapability { .. } => 0,
            VaultError::InsufficientReserves { .. } => 1,
            VaultError::InvalidRate { .. } => 2,
            VaultError::InvalidMetadata { .. } => 3,
            VaultError::ArithmeticOverflow => 4,
            VaultError::DivisionByZero => 5,
        }
    }

    /// Short machine-readable name for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::WrongOwnerCapability { .. } => "WrongOwnerCapability",
            VaultError::InsufficientReserves { .. } => "InsufficientReserves",
            VaultError::InvalidRate { .. } => "InvalidRate",
            VaultError::InvalidMetadata { .. } => "InvalidMetadata",
            VaultError::ArithmeticOverflow => "ArithmeticOverflow",
            VaultError::DivisionByZero => "DivisionByZero",
        }
    }
}

impl From<MathError> for VaultError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::DivisionByZero => VaultError::DivisionByZero,
            MathError::ArithmeticOverflow => VaultError::ArithmeticOverflow,
        }
    }
}

impl From<CoinError> for VaultError {
    fn from(err: CoinError) -> Self {
        match err {
            CoinError::InsufficientValue {
                available,
                requested,
            } => VaultError::InsufficientReserves {
                available,
                requested,
            },
            CoinError::SupplyOverflow { .. } => VaultError::ArithmeticOverflow,
        }
    }
}

/// A failed operation together with the value the caller presented.
///
/// Converts into [`VaultError`] with `?` for callers happy to drop the
/// refund on the floor (test code, mostly).
pub struct Rejected<V> {
    /// Why the operation failed.
    pub error: VaultError,
    /// The presented value, returned untouched.
    pub value: V,
}

impl<V> Rejected<V> {
    fn new(error: VaultError, value: V) -> Self {
        Self { error, value }
    }

    /// Splits into the error and the returned value.
    pub fn into_parts(self) -> (VaultError, V) {
        (self.error, self.value)
    }

    /// Transforms the returned value, keeping the error.
    pub fn map_value<W>(self, f: impl FnOnce(V) -> W) -> Rejected<W> {
        Rejected {
            error: self.error,
            value: f(self.value),
        }
    }
}

impl<V> fmt::Debug for Rejected<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("value", &std::any::type_name::<V>())
            .finish()
    }
}

impl<V> fmt::Display for Rejected<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation rejected: {}", self.error)
    }
}

impl<V> std::error::Error for Rejected<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<V> From<Rejected<V>> for VaultError {
    fn from(rejected: Rejected<V>) -> Self {
        rejected.error
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Serializable snapshot of a vault's public state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSummary {
    /// Vault identity.
    pub id: ObjectId,
    /// Raw rate.
    pub rate: u64,
    /// Rate precision exponent.
    pub rate_decimals: u8,
    /// `rate / 10^rate_decimals` rendered as a decimal string.
    pub effective_rate: String,
    /// Reserve held, in input smallest units.
    pub reserve: u64,
    /// When the vault was created.
    pub created_at: DateTime<Utc>,
}

/// The three objects produced by [`create_vault`].
pub struct CreatedVault<I, O> {
    /// The vault itself. Meant to be shared.
    pub vault: Vault<I, O>,
    /// Its immutable metadata. Meant to be published.
    pub metadata: VaultMetadata<I, O>,
    /// Its admin key. Belongs to the creator.
    pub owner_cap: OwnerCap,
}

/// A fixed-rate reserve of `I` backing a supply of `O`.
pub struct Vault<I, O> {
    id: ObjectId,
    rate: u64,
    rate_decimals: u8,
    reserve: Balance<I>,
    /// Holds exactly one `TreasuryCap<O>`, keyed by the metadata's identity.
    mint_authority: Attachments,
    created_at: DateTime<Utc>,
    _output: PhantomData<fn() -> O>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Creates a vault, its metadata and its owner capability in one step.
///
/// The treasury of `O` is moved into the vault and attached under the new
/// metadata's identity; from here on only that metadata can reach it.
///
/// # Arguments
///
/// * `rate` - Raw exchange multiplier. Must be non-zero.
/// * `treasury_cap` - Minting authority of the output asset.
/// * `rate_decimals` - Precision exponent, at most [`MAX_RATE_DECIMALS`].
/// * `fields` - Display fields for the metadata record.
/// * `caller` - Who is creating the vault (recorded in the log).
///
/// # Errors
///
/// [`VaultError::InvalidRate`] if `rate == 0` or `rate_decimals` exceeds
/// [`MAX_RATE_DECIMALS`]. The treasury is handed back.
pub fn create_vault<I, O: 'static>(
    rate: u64,
    treasury_cap: TreasuryCap<O>,
    rate_decimals: u8,
    fields: MetadataFields,
    caller: &str,
) -> Result<CreatedVault<I, O>, Rejected<TreasuryCap<O>>> {
    if rate == 0 || rate_decimals > MAX_RATE_DECIMALS {
        return Err(Rejected::new(
            VaultError::InvalidRate {
                rate,
                rate_decimals,
            },
            treasury_cap,
        ));
    }

    let vault_id = ObjectId::fresh();
    let metadata_id = ObjectId::fresh();
    let treasury_id = treasury_cap.id();

    let vault = Vault {
        id: vault_id,
        rate,
        rate_decimals,
        reserve: Balance::zero(),
        mint_authority: Attachments::single(metadata_id, treasury_cap),
        created_at: Utc::now(),
        _output: PhantomData,
    };
    let metadata = VaultMetadata::new(metadata_id, vault_id, fields);
    let owner_cap = OwnerCap::issue(vault_id);

    tracing::info!(
        vault = %vault_id,
        metadata = %metadata_id,
        owner_cap = %owner_cap.id(),
        treasury = %treasury_id,
        rate,
        rate_decimals,
        symbol = %metadata.symbol(),
        caller,
        "vault created"
    );

    Ok(CreatedVault {
        vault,
        metadata,
        owner_cap,
    })
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl<I, O: 'static> Vault<I, O> {
    /// The vault's identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current raw rate. Always non-zero.
    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// Rate precision exponent.
    pub fn rate_decimals(&self) -> u8 {
        self.rate_decimals
    }

    /// Reserve held, in input smallest units.
    pub fn reserve_value(&self) -> u64 {
        self.reserve.value()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` if `cap` is this vault's owner capability.
    pub fn is_valid_owner_cap(&self, cap: &OwnerCap) -> bool {
        cap.authorizes(self.id)
    }

    /// Snapshot of the public state.
    pub fn summary(&self) -> VaultSummary {
        VaultSummary {
            id: self.id,
            rate: self.rate,
            rate_decimals: self.rate_decimals,
            effective_rate: math::format_rate(
                self.rate,
                self.rate_decimals,
                DISPLAY_RATE_DECIMALS,
            ),
            reserve: self.reserve.value(),
            created_at: self.created_at,
        }
    }

    fn ensure_owner(&self, cap: &OwnerCap) -> Result<(), VaultError> {
        if self.is_valid_owner_cap(cap) {
            Ok(())
        } else {
            Err(VaultError::WrongOwnerCapability {
                vault: self.id,
                cap_vault: cap.vault_id(),
            })
        }
    }

    fn invalid_metadata(&self, metadata: &VaultMetadata<I, O>) -> VaultError {
        VaultError::InvalidMetadata {
            vault: self.id,
            metadata: metadata.id(),
        }
    }

    /// Output units `input_value` would mint at the current rate.
    pub fn quote_mint(&self, input_value: u64) -> Result<u64, VaultError> {
        Ok(math::compute_output(
            self.rate,
            input_value,
            self.rate_decimals,
        )?)
    }

    /// Input units `output_value` would redeem for at the current rate.
    /// Does not consider whether the reserve could cover it.
    pub fn quote_redeem(&self, output_value: u64) -> Result<u64, VaultError> {
        Ok(math::compute_input(
            self.rate,
            output_value,
            self.rate_decimals,
        )?)
    }

    /// Outstanding supply of the output asset, read through the binding.
    pub fn output_supply(&self, metadata: &VaultMetadata<I, O>) -> Result<u64, VaultError> {
        self.mint_authority
            .borrow::<TreasuryCap<O>>(&metadata.lookup_key())
            .map(TreasuryCap::total_supply)
            .ok_or_else(|| self.invalid_metadata(metadata))
    }

    /// Adds `value` to the reserve. Owner only. No upper bound.
    ///
    /// Returns the new reserve level.
    ///
    /// # Errors
    ///
    /// - [`VaultError::WrongOwnerCapability`] if `cap` is for another vault.
    /// - [`VaultError::ArithmeticOverflow`] if the reserve would exceed `u64::MAX`.
    pub fn deposit(&mut self, cap: &OwnerCap, value: Balance<I>) -> Result<u64, Rejected<Balance<I>>> {
        if let Err(err) = self.ensure_owner(cap) {
            return Err(Rejected::new(err, value));
        }

        let amount = value.value();
        let reserve = self
            .reserve
            .join(value)
            .map_err(|value| Rejected::new(VaultError::ArithmeticOverflow, value))?;

        tracing::debug!(vault = %self.id, amount, reserve, "reserve deposited");
        Ok(reserve)
    }

    /// Removes exactly `amount` from the reserve. Owner only.
    ///
    /// # Errors
    ///
    /// - [`VaultError::WrongOwnerCapability`] if `cap` is for another vault.
    /// - [`VaultError::InsufficientReserves`] if `amount` exceeds the reserve.
    pub fn withdraw(&mut self, cap: &OwnerCap, amount: u64) -> Result<Balance<I>, VaultError> {
        self.ensure_owner(cap)?;

        let available = self.reserve.value();
        if available < amount {
            return Err(VaultError::InsufficientReserves {
                available,
                requested: amount,
            });
        }
        let withdrawn = self.reserve.split(amount)?;

        tracing::debug!(vault = %self.id, amount, reserve = self.reserve.value(), "reserve withdrawn");
        Ok(withdrawn)
    }

    /// Replaces the rate. Owner only. Precision stays as created.
    ///
    /// # Errors
    ///
    /// - [`VaultError::WrongOwnerCapability`] if `cap` is for another vault.
    /// - [`VaultError::InvalidRate`] if `new_rate == 0`.
    pub fn set_rate(&mut self, cap: &OwnerCap, new_rate: u64) -> Result<(), VaultError> {
        self.ensure_owner(cap)?;

        if new_rate == 0 {
            return Err(VaultError::InvalidRate {
                rate: new_rate,
                rate_decimals: self.rate_decimals,
            });
        }

        let old_rate = std::mem::replace(&mut self.rate, new_rate);
        tracing::info!(vault = %self.id, old_rate, new_rate, "rate updated");
        Ok(())
    }

    /// Pays `input` into the reserve and mints output at the current rate.
    ///
    /// The reserve is credited with the full input value before the minting
    /// authority is called. Dust below one output unit stays in the reserve.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidMetadata`] if `metadata` is not this vault's.
    /// - [`VaultError::ArithmeticOverflow`] if the conversion, the reserve
    ///   or the output supply would overflow.
    ///
    /// `input` is returned untouched on every error.
    pub fn mint(
        &mut self,
        metadata: &VaultMetadata<I, O>,
        input: Balance<I>,
    ) -> Result<Balance<O>, Rejected<Balance<I>>> {
        // Checks.
        let key = metadata.lookup_key();
        let Some(treasury) = self.mint_authority.borrow_mut::<TreasuryCap<O>>(&key) else {
            let err = self.invalid_metadata(metadata);
            tracing::debug!(vault = %self.id, error = %err, "mint rejected");
            return Err(Rejected::new(err, input));
        };

        let input_value = input.value();
        let amount = match math::compute_output(self.rate, input_value, self.rate_decimals) {
            Ok(amount) => amount,
            Err(err) => return Err(Rejected::new(err.into(), input)),
        };
        if !self.reserve.can_join(&input) || !treasury.can_mint(amount) {
            return Err(Rejected::new(VaultError::ArithmeticOverflow, input));
        }

        // Effects.
        if let Err(input) = self.reserve.join(input) {
            return Err(Rejected::new(VaultError::ArithmeticOverflow, input));
        }

        // Interaction.
        let minted = match treasury.mint(amount) {
            Ok(minted) => minted,
            Err(err) => {
                // Undo the credit so the call stays all-or-nothing.
                let refund = self.reserve.split(input_value).unwrap_or_default();
                return Err(Rejected::new(err.into(), refund));
            }
        };

        tracing::debug!(
            vault = %self.id,
            input = input_value,
            output = amount,
            reserve = self.reserve.value(),
            "minted"
        );
        Ok(minted)
    }

    /// Burns `output` and pays out input from the reserve at the current rate.
    ///
    /// The whole presented output is burned; there is no partial burn. The
    /// reserve is debited before the burn happens.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidMetadata`] if `metadata` is not this vault's.
    /// - [`VaultError::ArithmeticOverflow`] if the conversion overflows.
    /// - [`VaultError::InsufficientReserves`] if the reserve cannot cover it.
    ///
    /// `output` is returned untouched on every error.
    pub fn redeem(
        &mut self,
        metadata: &VaultMetadata<I, O>,
        output: Balance<O>,
    ) -> Result<Balance<I>, Rejected<Balance<O>>> {
        // Checks.
        let key = metadata.lookup_key();
        let Some(treasury) = self.mint_authority.borrow_mut::<TreasuryCap<O>>(&key) else {
            let err = self.invalid_metadata(metadata);
            tracing::debug!(vault = %self.id, error = %err, "redeem rejected");
            return Err(Rejected::new(err, output));
        };

        let amount = match math::compute_input(self.rate, output.value(), self.rate_decimals) {
            Ok(amount) => amount,
            Err(err) => return Err(Rejected::new(err.into(), output)),
        };

        let available = self.reserve.value();
        if available < amount {
            return Err(Rejected::new(
                VaultError::InsufficientReserves {
                    available,
                    requested: amount,
                },
                output,
            ));
        }

        // Effects.
        let withdrawn = match self.reserve.split(amount) {
            Ok(withdrawn) => withdrawn,
            Err(err) => return Err(Rejected::new(err.into(), output)),
        };

        // Interaction.
        let burned = treasury.burn(output);

        tracing::debug!(
            vault = %self.id,
            output = burned,
            input = amount,
            reserve = self.reserve.value(),
            "redeemed"
        );
        Ok(withdrawn)
    }

    // -- Coin-level entry points -------------------------------------------

    /// [`deposit`](Self::deposit) for a coin. A refund comes back as a fresh
    /// coin of the same value.
    pub fn deposit_coin(&mut self, cap: &OwnerCap, coin: Coin<I>) -> Result<u64, Rejected<Coin<I>>> {
        self.deposit(cap, coin.into_balance())
            .map_err(|r| r.map_value(Coin::from_balance))
    }

    /// [`withdraw`](Self::withdraw) into a coin.
    pub fn withdraw_coin(&mut self, cap: &OwnerCap, amount: u64) -> Result<Coin<I>, VaultError> {
        self.withdraw(cap, amount).map(Coin::from_balance)
    }

    /// [`mint`](Self::mint) from a coin into a coin.
    pub fn mint_coin(
        &mut self,
        metadata: &VaultMetadata<I, O>,
        payment: Coin<I>,
    ) -> Result<Coin<O>, Rejected<Coin<I>>> {
        self.mint(metadata, payment.into_balance())
            .map(Coin::from_balance)
            .map_err(|r| r.map_value(Coin::from_balance))
    }

    /// [`redeem`](Self::redeem) from a coin into a coin.
    pub fn redeem_coin(
        &mut self,
        metadata: &VaultMetadata<I, O>,
        receipt: Coin<O>,
    ) -> Result<Coin<I>, Rejected<Coin<O>>> {
        self.redeem(metadata, receipt.into_balance())
            .map(Coin::from_balance)
            .map_err(|r| r.map_value(Coin::from_balance))
    }
}

impl<I, O> fmt::Debug for Vault<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("id", &self.id)
            .field("rate", &self.rate)
            .field("rate_decimals", &self.rate_decimals)
            .field("reserve", &self.reserve.value())
            .finish()
    }
}

impl<I, O> fmt::Debug for CreatedVault<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedVault")
            .field("vault", &self.vault)
            .field("metadata", &self.metadata)
            .field("owner_cap", &self.owner_cap)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Sui;
    struct Ticket;

    fn fields(symbol: &str) -> MetadataFields {
        MetadataFields {
            name: format!("{symbol} Ticket"),
            symbol: symbol.into(),
            description: "test vault".into(),
            icon_url: None,
        }
    }

    fn vault(rate: u64, decimals: u8) -> CreatedVault<Sui, Ticket> {
        create_vault(rate, TreasuryCap::new(), decimals, fields("TKT"), "alice").unwrap()
    }

    /// Mints `amount` of the input asset from a throwaway treasury.
    fn sui(treasury: &mut TreasuryCap<Sui>, amount: u64) -> Balance<Sui> {
        treasury.mint(amount).unwrap()
    }

    // -- Creation ----------------------------------------------------------

    #[test]
    fn create_binds_all_three_objects() {
        let CreatedVault {
            vault,
            metadata,
            owner_cap,
        } = vault(200_000_000, 9);

        assert_eq!(vault.rate(), 200_000_000);
        assert_eq!(vault.rate_decimals(), 9);
        assert_eq!(vault.reserve_value(), 0);
        assert_eq!(metadata.vault_id(), vault.id());
        assert_eq!(owner_cap.vault_id(), vault.id());
        assert!(vault.is_valid_owner_cap(&owner_cap));
        assert_eq!(vault.output_supply(&metadata), Ok(0));
    }

    #[test]
    fn create_with_zero_rate_returns_treasury() {
        let treasury = TreasuryCap::<Ticket>::new();
        let treasury_id = treasury.id();
        let rejected = create_vault::<Sui, Ticket>(0, treasury, 9, fields("X"), "bob").unwrap_err();

        assert!(matches!(rejected.error, VaultError::InvalidRate { rate: 0, .. }));
        assert_eq!(rejected.value.id(), treasury_id);
    }

    #[test]
    fn create_with_oversized_precision_rejected() {
        let rejected =
            create_vault::<Sui, Ticket>(1, TreasuryCap::new(), 20, fields("X"), "bob").unwrap_err();
        assert_eq!(rejected.error.kind(), "InvalidRate");
        assert!(create_vault::<Sui, Ticket>(1, TreasuryCap::new(), 19, fields("X"), "bob").is_ok());
    }

    // -- Owner operations ----------------------------------------------------

    #[test]
    fn deposit_then_withdraw_restores_reserve() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            owner_cap,
            ..
        } = vault(1, 0);

        let before = vault.reserve_value();
        assert_eq!(vault.deposit(&owner_cap, sui(&mut treasury, 750)).unwrap(), 750);
        let back = vault.withdraw(&owner_cap, 750).unwrap();

        assert_eq!(back.value(), 750);
        assert_eq!(vault.reserve_value(), before);
    }

    #[test]
    fn withdraw_beyond_reserve_rejected() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            owner_cap,
            ..
        } = vault(1, 0);
        vault.deposit(&owner_cap, sui(&mut treasury, 100)).unwrap();

        let err = vault.withdraw(&owner_cap, 101).unwrap_err();
        assert_eq!(
            err,
            VaultError::InsufficientReserves {
                available: 100,
                requested: 101
            }
        );
        assert_eq!(vault.reserve_value(), 100);
    }

    #[test]
    fn foreign_cap_rejected_everywhere() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            owner_cap,
            ..
        } = vault(5, 1);
        let other = self::vault(5, 1);
        vault.deposit(&owner_cap, sui(&mut treasury, 10)).unwrap();

        let rejected = vault.deposit(&other.owner_cap, sui(&mut treasury, 99)).unwrap_err();
        assert_eq!(rejected.error.code(), 0);
        assert_eq!(rejected.value.value(), 99);

        assert!(matches!(
            vault.withdraw(&other.owner_cap, 1),
            Err(VaultError::WrongOwnerCapability { .. })
        ));
        assert!(matches!(
            vault.set_rate(&other.owner_cap, 7),
            Err(VaultError::WrongOwnerCapability { .. })
        ));
        assert!(!vault.is_valid_owner_cap(&other.owner_cap));

        assert_eq!(vault.reserve_value(), 10);
        assert_eq!(vault.rate(), 5);
    }

    #[test]
    fn set_rate_keeps_precision() {
        let CreatedVault {
            mut vault,
            owner_cap,
            ..
        } = vault(200_000_000, 9);
        vault.set_rate(&owner_cap, 500_000_000).unwrap();
        assert_eq!(vault.rate(), 500_000_000);
        assert_eq!(vault.rate_decimals(), 9);
    }

    #[test]
    fn set_rate_zero_rejected() {
        let CreatedVault {
            mut vault,
            owner_cap,
            ..
        } = vault(3, 0);
        assert_eq!(
            vault.set_rate(&owner_cap, 0),
            Err(VaultError::InvalidRate {
                rate: 0,
                rate_decimals: 0
            })
        );
        assert_eq!(vault.rate(), 3);
    }

    // -- Mint / redeem -------------------------------------------------------

    #[test]
    fn mint_credits_full_input_and_returns_quote() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            ..
        } = vault(200_000_000, 9);

        let out = vault.mint(&metadata, sui(&mut treasury, 1_000_000_000)).unwrap();
        assert_eq!(out.value(), 200_000_000);
        assert_eq!(vault.reserve_value(), 1_000_000_000);
        assert_eq!(vault.output_supply(&metadata), Ok(200_000_000));
    }

    #[test]
    fn mint_keeps_dust_in_reserve() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            ..
        } = vault(200_000_000, 9);

        let out = vault.mint(&metadata, sui(&mut treasury, 4)).unwrap();
        assert_eq!(out.value(), 0);
        assert_eq!(vault.reserve_value(), 4);
    }

    #[test]
    fn mint_with_foreign_metadata_returns_payment() {
        let mut treasury = TreasuryCap::new();
        let mut a = vault(1, 0);
        let b = vault(1, 0);

        let rejected = a.vault.mint(&b.metadata, sui(&mut treasury, 50)).unwrap_err();
        assert_eq!(
            rejected.error,
            VaultError::InvalidMetadata {
                vault: a.vault.id(),
                metadata: b.metadata.id()
            }
        );
        assert_eq!(rejected.value.value(), 50);
        assert_eq!(a.vault.reserve_value(), 0);
    }

    #[test]
    fn mint_overflow_returns_payment() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            ..
        } = vault(u64::MAX, 0);

        let rejected = vault
            .mint(&metadata, sui(&mut treasury, 10_000_000_000))
            .unwrap_err();
        assert_eq!(rejected.error, VaultError::ArithmeticOverflow);
        assert_eq!(rejected.value.value(), 10_000_000_000);
        assert_eq!(vault.reserve_value(), 0);
    }

    #[test]
    fn mint_past_output_supply_rejected() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            ..
        } = vault(2, 0);

        let half = u64::MAX / 2;
        let first = vault.mint(&metadata, sui(&mut treasury, half)).unwrap();
        assert_eq!(first.value(), u64::MAX - 1);

        // Reserve has room, the output supply does not.
        let rejected = vault.mint(&metadata, sui(&mut treasury, 1)).unwrap_err();
        assert_eq!(rejected.error, VaultError::ArithmeticOverflow);
        assert_eq!(rejected.value.value(), 1);
        assert_eq!(vault.reserve_value(), half);
        assert_eq!(vault.output_supply(&metadata), Ok(u64::MAX - 1));
    }

    #[test]
    fn mint_past_reserve_capacity_rejected() {
        let mut first_source = TreasuryCap::new();
        let mut second_source = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            ..
        } = vault(1, 19);

        let _dust = vault.mint(&metadata, sui(&mut first_source, u64::MAX - 1)).unwrap();
        let rejected = vault.mint(&metadata, sui(&mut second_source, 2)).unwrap_err();
        assert_eq!(rejected.error, VaultError::ArithmeticOverflow);
        assert_eq!(vault.reserve_value(), u64::MAX - 1);
    }

    #[test]
    fn redeem_debits_reserve_and_burns_everything() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            ..
        } = vault(200_000_000, 9);

        let mut out = vault.mint(&metadata, sui(&mut treasury, 100_000_000)).unwrap();
        assert_eq!(out.value(), 20_000_000);

        let half = out.split(10_000_000).unwrap();
        let paid = vault.redeem(&metadata, half).unwrap();
        assert_eq!(paid.value(), 50_000_000);
        assert_eq!(vault.reserve_value(), 50_000_000);
        assert_eq!(vault.output_supply(&metadata), Ok(10_000_000));
    }

    #[test]
    fn redeem_beyond_reserve_returns_receipt() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            owner_cap,
        } = vault(1, 0);

        let out = vault.mint(&metadata, sui(&mut treasury, 100)).unwrap();
        let _drained = vault.withdraw(&owner_cap, 60).unwrap();

        let rejected = vault.redeem(&metadata, out).unwrap_err();
        assert_eq!(
            rejected.error,
            VaultError::InsufficientReserves {
                available: 40,
                requested: 100
            }
        );
        assert_eq!(rejected.value.value(), 100);
        assert_eq!(vault.reserve_value(), 40);
        assert_eq!(vault.output_supply(&metadata), Ok(100));
    }

    #[test]
    fn redeem_with_foreign_metadata_rejected() {
        let mut treasury = TreasuryCap::new();
        let mut a = vault(1, 0);
        let b = vault(1, 0);
        let out = a.vault.mint(&a.metadata, sui(&mut treasury, 10)).unwrap();

        let rejected = a.vault.redeem(&b.metadata, out).unwrap_err();
        assert_eq!(rejected.error.kind(), "InvalidMetadata");
        assert_eq!(a.vault.reserve_value(), 10);
        assert!(matches!(
            a.vault.output_supply(&b.metadata),
            Err(VaultError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn rate_change_applies_to_next_conversion() {
        let mut treasury = TreasuryCap::new();
        let CreatedVault {
            mut vault,
            metadata,
            owner_cap,
        } = vault(10, 1);

        assert_eq!(vault.mint(&metadata, sui(&mut treasury, 8)).unwrap().value(), 8);
        vault.set_rate(&owner_cap, 25).unwrap();
        assert_eq!(vault.mint(&metadata, sui(&mut treasury, 8)).unwrap().value(), 20);
        assert_eq!(vault.reserve_value(), 16);
    }

    #[test]
    fn quotes_match_conversions() {
        let CreatedVault { vault, .. } = vault(200_000_000, 9);
        assert_eq!(vault.quote_mint(5), Ok(1));
        assert_eq!(vault.quote_redeem(1), Ok(5));
    }

    #[test]
    fn summary_renders_effective_rate() {
        let CreatedVault { vault, .. } = vault(200_000_000, 9);
        let summary = vault.summary();
        assert_eq!(summary.effective_rate, "0.2");
        assert_eq!(summary.id, vault.id());

        let json = serde_json::to_string(&summary).unwrap();
        let back: VaultSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn error_codes_are_stable() {
        let id = ObjectId::fresh();
        let all = [
            VaultError::WrongOwnerCapability {
                vault: id,
                cap_vault: id,
            },
            VaultError::InsufficientReserves {
                available: 0,
                requested: 1,
            },
            VaultError::InvalidRate {
                rate: 0,
                rate_decimals: 0,
            },
            VaultError::InvalidMetadata {
                vault: id,
                metadata: id,
            },
            VaultError::ArithmeticOverflow,
            VaultError::DivisionByZero,
        ];
        let codes: Vec<u64> = all.iter().map(VaultError::code).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn math_errors_map_one_to_one() {
        assert_eq!(VaultError::from(MathError::DivisionByZero), VaultError::DivisionByZero);
        assert_eq!(
            VaultError::from(MathError::ArithmeticOverflow),
            VaultError::ArithmeticOverflow
        );
    }
}
