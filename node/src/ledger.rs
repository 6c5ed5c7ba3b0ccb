// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # In-Memory Object Ledger
//!
//! The node's object store. It owns every vault, metadata record and owner
//! capability created through the API, plus one account per address.
//!
//! Object ownership is the host's job, not the contract's: the ledger
//! records which address holds each owner capability and refuses to lend a
//! cap to anyone else. The vault then does its own identity check on the
//! cap it is handed.
//!
//! ## Assets
//!
//! - [`Reserve`] -- the input asset every vault backs itself with. Issued by
//!   the node's own treasury through the faucet.
//! - [`Issued`] -- the output asset. Each vault has its own treasury of it,
//!   so issued balances are tracked per vault.
//!
//! Supply of each asset is bounded by its treasury, so no account total can
//! exceed `u64::MAX`.

use std::collections::{BTreeMap, HashMap};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintvault_contracts::{
    create_vault, CreatedVault, MetadataFields, OwnerCap, Vault, VaultError, VaultMetadata,
    VaultSummary,
};
use mintvault_protocol::coin::Balance;
use mintvault_protocol::config::MAX_FAUCET_AMOUNT;
use mintvault_protocol::object::ObjectId;
use mintvault_protocol::treasury::TreasuryCap;

/// Marker for the reserve (input) asset.
pub struct Reserve;

/// Marker for vault-issued (output) assets.
pub struct Issued;

pub type NodeVault = Vault<Reserve, Issued>;
pub type NodeMetadata = VaultMetadata<Reserve, Issued>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("vault not found: {0}")]
    VaultNotFound(ObjectId),

    #[error("owner capability not found: {0}")]
    CapNotFound(ObjectId),

    #[error("{caller} does not hold owner capability {cap}")]
    NotCapHolder { cap: ObjectId, caller: String },

    #[error("insufficient account funds: available {available}, requested {requested}")]
    InsufficientFunds { available: u64, requested: u64 },

    #[error("faucet refused: {0}")]
    FaucetRefused(String),

    #[error("invalid address: must be non-empty")]
    InvalidAddress,

    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl LedgerError {
    /// JSON-RPC error code for this error.
    ///
    /// Vault errors map to `-32100 - code` so each kind gets its own slot.
    pub fn rpc_code(&self) -> i32 {
        match self {
            LedgerError::VaultNotFound(_) | LedgerError::CapNotFound(_) => -32001,
            LedgerError::NotCapHolder { .. } => -32003,
            LedgerError::InsufficientFunds { .. } => -32004,
            LedgerError::FaucetRefused(_) => -32005,
            LedgerError::InvalidAddress => -32602,
            LedgerError::Vault(err) => -32100 - err.code() as i32,
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Identities produced by a successful vault creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultCreated {
    pub vault_id: ObjectId,
    pub metadata_id: ObjectId,
    pub owner_cap_id: ObjectId,
}

/// Balances held by one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub address: String,
    /// Reserve asset, in smallest units.
    pub reserve: u64,
    /// Issued asset per vault id. Zero entries are omitted.
    pub issued: BTreeMap<ObjectId, u64>,
}

/// Which way a quote converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QuoteDirection {
    /// Reserve in, issued out.
    Mint,
    /// Issued in, reserve out.
    Redeem,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

struct VaultEntry {
    vault: NodeVault,
    metadata: NodeMetadata,
    owner_cap_id: ObjectId,
}

struct CapEntry {
    cap: OwnerCap,
    holder: String,
}

#[derive(Default)]
struct Account {
    reserve: Balance<Reserve>,
    issued: HashMap<ObjectId, Balance<Issued>>,
}

pub struct Ledger {
    faucet_enabled: bool,
    reserve_treasury: TreasuryCap<Reserve>,
    vaults: HashMap<ObjectId, VaultEntry>,
    caps: HashMap<ObjectId, CapEntry>,
    accounts: HashMap<String, Account>,
}

impl Ledger {
    pub fn new(faucet_enabled: bool) -> Self {
        Self {
            faucet_enabled,
            reserve_treasury: TreasuryCap::new(),
            vaults: HashMap::new(),
            caps: HashMap::new(),
            accounts: HashMap::new(),
        }
    }

    pub fn faucet_enabled(&self) -> bool {
        self.faucet_enabled
    }

    pub fn vault_count(&self) -> usize {
        self.vaults.len()
    }

    /// Outstanding supply of the reserve asset.
    pub fn reserve_supply(&self) -> u64 {
        self.reserve_treasury.total_supply()
    }

    // -- Faucet ----------------------------------------------------------------

    /// Mints `amount` of the reserve asset into `address`.
    /// Returns the account's new reserve balance.
    pub fn faucet(&mut self, address: &str, amount: u64) -> Result<u64, LedgerError> {
        ensure_address(address)?;
        if !self.faucet_enabled {
            return Err(LedgerError::FaucetRefused("faucet is disabled".into()));
        }
        if amount == 0 || amount > MAX_FAUCET_AMOUNT {
            return Err(LedgerError::FaucetRefused(format!(
                "amount must be between 1 and {MAX_FAUCET_AMOUNT}"
            )));
        }

        let minted = self
            .reserve_treasury
            .mint(amount)
            .map_err(|e| LedgerError::FaucetRefused(e.to_string()))?;
        let account = self.accounts.entry(address.to_string()).or_default();
        let balance = credit(&mut account.reserve, minted);

        tracing::info!(%address, amount, balance, "faucet dispensed");
        Ok(balance)
    }

    // -- Creation --------------------------------------------------------------

    /// Creates a vault issuing a fresh asset. `caller` becomes the cap holder.
    pub fn create_vault(
        &mut self,
        caller: &str,
        rate: u64,
        rate_decimals: u8,
        fields: MetadataFields,
    ) -> Result<VaultCreated, LedgerError> {
        ensure_address(caller)?;

        let CreatedVault {
            vault,
            metadata,
            owner_cap,
        } = create_vault::<Reserve, Issued>(rate, TreasuryCap::new(), rate_decimals, fields, caller)
            .map_err(|rejected| LedgerError::Vault(rejected.error))?;

        let created = VaultCreated {
            vault_id: vault.id(),
            metadata_id: metadata.id(),
            owner_cap_id: owner_cap.id(),
        };
        self.caps.insert(
            owner_cap.id(),
            CapEntry {
                cap: owner_cap,
                holder: caller.to_string(),
            },
        );
        self.vaults.insert(
            vault.id(),
            VaultEntry {
                vault,
                metadata,
                owner_cap_id: created.owner_cap_id,
            },
        );
        Ok(created)
    }

    // -- Owner operations ------------------------------------------------------

    /// Moves `amount` of the caller's reserve asset into the vault.
    /// Returns the vault's new reserve level.
    pub fn deposit(
        &mut self,
        caller: &str,
        vault_id: ObjectId,
        cap_id: ObjectId,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        let cap = held_cap(&self.caps, cap_id, caller)?;
        let entry = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(LedgerError::VaultNotFound(vault_id))?;
        let account = self
            .accounts
            .get_mut(caller)
            .ok_or(LedgerError::InsufficientFunds {
                available: 0,
                requested: amount,
            })?;

        let payment = debit(&mut account.reserve, amount)?;
        entry.vault.deposit(cap, payment).map_err(|rejected| {
            let (err, payment) = rejected.into_parts();
            credit(&mut account.reserve, payment);
            LedgerError::Vault(err)
        })
    }

    /// Moves `amount` out of the vault's reserve into the caller's account.
    /// Returns the vault's new reserve level.
    pub fn withdraw(
        &mut self,
        caller: &str,
        vault_id: ObjectId,
        cap_id: ObjectId,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        let cap = held_cap(&self.caps, cap_id, caller)?;
        let entry = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(LedgerError::VaultNotFound(vault_id))?;

        let withdrawn = entry.vault.withdraw(cap, amount)?;
        let account = self.accounts.entry(caller.to_string()).or_default();
        credit(&mut account.reserve, withdrawn);
        Ok(entry.vault.reserve_value())
    }

    /// Replaces the vault's rate. Returns the previous rate.
    pub fn set_rate(
        &mut self,
        caller: &str,
        vault_id: ObjectId,
        cap_id: ObjectId,
        new_rate: u64,
    ) -> Result<u64, LedgerError> {
        let cap = held_cap(&self.caps, cap_id, caller)?;
        let entry = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(LedgerError::VaultNotFound(vault_id))?;

        let old_rate = entry.vault.rate();
        entry.vault.set_rate(cap, new_rate)?;
        Ok(old_rate)
    }

    /// Hands the owner capability to `recipient`. Returns the vault it controls.
    pub fn transfer_owner_cap(
        &mut self,
        caller: &str,
        cap_id: ObjectId,
        recipient: &str,
    ) -> Result<ObjectId, LedgerError> {
        ensure_address(recipient)?;
        let entry = self
            .caps
            .get_mut(&cap_id)
            .ok_or(LedgerError::CapNotFound(cap_id))?;
        if entry.holder != caller {
            return Err(LedgerError::NotCapHolder {
                cap: cap_id,
                caller: caller.to_string(),
            });
        }

        entry.holder = recipient.to_string();
        tracing::info!(cap = %cap_id, from = %caller, to = %recipient, "owner capability transferred");
        Ok(entry.cap.vault_id())
    }

    // -- Public operations -----------------------------------------------------

    /// Pays `amount` of the caller's reserve into the vault and credits the
    /// caller with the issued asset. Returns the amount issued.
    pub fn mint(&mut self, caller: &str, vault_id: ObjectId, amount: u64) -> Result<u64, LedgerError> {
        let entry = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(LedgerError::VaultNotFound(vault_id))?;
        let account = self
            .accounts
            .get_mut(caller)
            .ok_or(LedgerError::InsufficientFunds {
                available: 0,
                requested: amount,
            })?;

        let payment = debit(&mut account.reserve, amount)?;
        let issued = match entry.vault.mint(&entry.metadata, payment) {
            Ok(issued) => issued,
            Err(rejected) => {
                let (err, payment) = rejected.into_parts();
                credit(&mut account.reserve, payment);
                return Err(err.into());
            }
        };

        let output = issued.value();
        credit(account.issued.entry(vault_id).or_default(), issued);
        Ok(output)
    }

    /// Burns `amount` of the caller's issued asset for this vault and pays
    /// out reserve. Returns the reserve amount paid.
    pub fn redeem(&mut self, caller: &str, vault_id: ObjectId, amount: u64) -> Result<u64, LedgerError> {
        let entry = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(LedgerError::VaultNotFound(vault_id))?;
        let slot = self
            .accounts
            .get_mut(caller)
            .and_then(|account| account.issued.get_mut(&vault_id))
            .ok_or(LedgerError::InsufficientFunds {
                available: 0,
                requested: amount,
            })?;

        let receipt = debit(slot, amount)?;
        let paid = match entry.vault.redeem(&entry.metadata, receipt) {
            Ok(paid) => paid,
            Err(rejected) => {
                let (err, receipt) = rejected.into_parts();
                credit(slot, receipt);
                return Err(err.into());
            }
        };

        let input = paid.value();
        let account = self.accounts.entry(caller.to_string()).or_default();
        if account.issued.get(&vault_id).is_some_and(Balance::is_zero) {
            account.issued.remove(&vault_id);
        }
        credit(&mut account.reserve, paid);
        Ok(input)
    }

    // -- Views -----------------------------------------------------------------

    pub fn vault(&self, vault_id: ObjectId) -> Result<&NodeVault, LedgerError> {
        self.entry(vault_id).map(|entry| &entry.vault)
    }

    pub fn metadata(&self, vault_id: ObjectId) -> Result<&NodeMetadata, LedgerError> {
        self.entry(vault_id).map(|entry| &entry.metadata)
    }

    pub fn summary(&self, vault_id: ObjectId) -> Result<VaultSummary, LedgerError> {
        self.vault(vault_id).map(Vault::summary)
    }

    /// Identity of the vault's owner capability.
    pub fn owner_cap_of(&self, vault_id: ObjectId) -> Result<ObjectId, LedgerError> {
        self.entry(vault_id).map(|entry| entry.owner_cap_id)
    }

    /// Outstanding supply of the vault's issued asset.
    pub fn output_supply(&self, vault_id: ObjectId) -> Result<u64, LedgerError> {
        let entry = self.entry(vault_id)?;
        Ok(entry.vault.output_supply(&entry.metadata)?)
    }

    /// Address currently holding the capability.
    pub fn cap_holder(&self, cap_id: ObjectId) -> Result<&str, LedgerError> {
        self.caps
            .get(&cap_id)
            .map(|entry| entry.holder.as_str())
            .ok_or(LedgerError::CapNotFound(cap_id))
    }

    pub fn is_valid_owner_cap(&self, vault_id: ObjectId, cap_id: ObjectId) -> Result<bool, LedgerError> {
        let vault = self.vault(vault_id)?;
        let entry = self.caps.get(&cap_id).ok_or(LedgerError::CapNotFound(cap_id))?;
        Ok(vault.is_valid_owner_cap(&entry.cap))
    }

    /// Converts `amount` at the vault's current rate without moving value.
    pub fn quote(
        &self,
        vault_id: ObjectId,
        direction: QuoteDirection,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        let vault = self.vault(vault_id)?;
        let quoted = match direction {
            QuoteDirection::Mint => vault.quote_mint(amount)?,
            QuoteDirection::Redeem => vault.quote_redeem(amount)?,
        };
        Ok(quoted)
    }

    /// Balances of `address`. Unknown addresses read as empty.
    pub fn balances(&self, address: &str) -> AccountBalances {
        let (reserve, issued) = match self.accounts.get(address) {
            Some(account) => (
                account.reserve.value(),
                account
                    .issued
                    .iter()
                    .filter(|(_, balance)| !balance.is_zero())
                    .map(|(id, balance)| (*id, balance.value()))
                    .collect(),
            ),
            None => (0, BTreeMap::new()),
        };
        AccountBalances {
            address: address.to_string(),
            reserve,
            issued,
        }
    }

    fn entry(&self, vault_id: ObjectId) -> Result<&VaultEntry, LedgerError> {
        self.vaults
            .get(&vault_id)
            .ok_or(LedgerError::VaultNotFound(vault_id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_address(address: &str) -> Result<(), LedgerError> {
    if address.trim().is_empty() {
        Err(LedgerError::InvalidAddress)
    } else {
        Ok(())
    }
}

/// Lends out the cap only to its recorded holder.
fn held_cap<'a>(
    caps: &'a HashMap<ObjectId, CapEntry>,
    cap_id: ObjectId,
    caller: &str,
) -> Result<&'a OwnerCap, LedgerError> {
    let entry = caps.get(&cap_id).ok_or(LedgerError::CapNotFound(cap_id))?;
    if entry.holder != caller {
        return Err(LedgerError::NotCapHolder {
            cap: cap_id,
            caller: caller.to_string(),
        });
    }
    Ok(&entry.cap)
}

fn debit<T>(slot: &mut Balance<T>, amount: u64) -> Result<Balance<T>, LedgerError> {
    let available = slot.value();
    slot.split(amount)
        .map_err(|_| LedgerError::InsufficientFunds {
            available,
            requested: amount,
        })
}

/// Joins `value` into `slot` and returns the new total.
fn credit<T>(slot: &mut Balance<T>, value: Balance<T>) -> u64 {
    match slot.join(value) {
        Ok(total) => total,
        Err(lost) => {
            // Unreachable while supply stays bounded by a single treasury.
            tracing::error!(amount = lost.value(), "account credit overflowed");
            slot.value()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
