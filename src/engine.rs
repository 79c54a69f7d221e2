use std::path::Path;

use serde::Serialize;

use crate::account::{Account, AccountStore};
use crate::block::{AccountId, Amount, Block};
use crate::chain::LedgerChain;
use crate::error::{LedgerError, Result};

/// Stored balance next to the balance derived by replaying the chain.
///
/// The two agree only for accounts whose entire history went through
/// [`Ledger::transfer`]; a direct credit moves the stored number alone.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct BalanceReport {
    pub id: AccountId,
    pub stored: i64,
    pub replayed: i64,
}

/// Orchestrates the two stores. Owns them explicitly; there is no shared
/// or global state. The stores never reference each other: the ledger
/// reads the account store to validate, mutates it, and only then appends
/// to the chain.
pub struct Ledger {
    accounts: AccountStore,
    chain: LedgerChain,
}

impl Ledger {
    pub fn new(accounts: AccountStore, chain: LedgerChain) -> Self {
        Self { accounts, chain }
    }

    /// Loads both stores from their backing files.
    pub fn open<A, C>(accounts_path: A, chain_path: C) -> Result<Self>
    where
        A: AsRef<Path>,
        C: AsRef<Path>,
    {
        Ok(Self::new(
            AccountStore::load(accounts_path)?,
            LedgerChain::load(chain_path)?,
        ))
    }

    /// Creates an account and returns its id.
    pub fn create_account(&mut self, initial_balance: i64) -> Result<AccountId> {
        self.accounts.create(initial_balance)
    }

    /// Credits the stored balance directly and returns the new balance.
    ///
    /// No block is appended: replay-derived balances do not see this.
    pub fn credit(&mut self, id: AccountId, amount: i64) -> Result<i64> {
        self.accounts.credit(id, amount)?;
        let account = self
            .accounts
            .get(id)
            .ok_or(LedgerError::UnknownAccount(id))?;
        Ok(account.balance)
    }

    /// Moves `amount` between accounts and records it on the chain.
    ///
    /// Both parties must exist and the sender must cover the amount;
    /// nothing is mutated and no block is appended unless every check
    /// passes. The chain append happens only after both balance mutations
    /// have persisted. A self-transfer is allowed and nets to zero.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<Block> {
        if self.accounts.find(from).is_none() {
            return Err(LedgerError::UnknownAccount(from));
        }
        if self.accounts.find(to).is_none() {
            return Err(LedgerError::UnknownAccount(to));
        }
        let amount = amount.get();
        self.accounts.debit_if_sufficient(from, amount)?;
        self.accounts.credit(to, amount)?;
        self.chain.append(from, to, amount)
    }

    /// Stored balance next to the chain-replayed balance for one account.
    pub fn balance_report(&self, id: AccountId) -> Result<BalanceReport> {
        let account = self
            .accounts
            .get(id)
            .ok_or(LedgerError::UnknownAccount(id))?;
        Ok(BalanceReport {
            id,
            stored: account.balance,
            replayed: self.chain.balance_of(id),
        })
    }

    pub fn accounts(&self) -> &[Account] {
        self.accounts.accounts()
    }

    pub fn blocks(&self) -> &[Block] {
        self.chain.blocks()
    }

    pub fn block_at(&self, position: usize) -> Option<&Block> {
        self.chain.block_at(position)
    }

    pub fn account_store(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn chain(&self) -> &LedgerChain {
        &self.chain
    }
}
