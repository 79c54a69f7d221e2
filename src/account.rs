use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::AccountId;
use crate::error::{LedgerError, Result};

/// A ledger participant: sequential id plus current stored balance.
///
/// The stored balance is authoritative and independent of chain replay;
/// a validated debit never drives it negative, a raw credit can.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct Account {
    pub id: AccountId,
    pub balance: i64,
}

/// Authoritative store of current balances, backed by one flat file with
/// `<id> <balance>` per line. Every mutation rewrites the file in full.
#[derive(Debug)]
pub struct AccountStore {
    accounts: Vec<Account>,
    path: PathBuf,
    skipped: usize,
}

impl AccountStore {
    /// Loads the store from `path`.
    ///
    /// A missing file yields an empty store. Lines that do not parse as
    /// `<id> <balance>` are skipped and counted; an existing file that
    /// cannot be read fails loudly.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    accounts: Vec::new(),
                    path,
                    skipped: 0,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut accounts = Vec::new();
        let mut skipped = 0usize;
        for record in reader.deserialize() {
            match record {
                Ok(account) => accounts.push(account),
                Err(e) => match e.into_kind() {
                    csv::ErrorKind::Io(err) => return Err(err.into()),
                    _ => skipped += 1,
                },
            }
        }
        if skipped > 0 {
            warn!(file = %path.display(), skipped, "skipped malformed account records");
        }

        Ok(Self {
            accounts,
            path,
            skipped,
        })
    }

    /// Allocates the next sequential id (the count of existing accounts),
    /// appends the new account and persists the full store.
    pub fn create(&mut self, initial_balance: i64) -> Result<AccountId> {
        let id = self.accounts.len() as AccountId;
        self.accounts.push(Account {
            id,
            balance: initial_balance,
        });
        self.persist()?;
        Ok(id)
    }

    /// Adds `amount` (any sign) to the stored balance and persists.
    ///
    /// No chain entry is written: balances changed here are invisible to
    /// replay-derived balances.
    pub fn credit(&mut self, id: AccountId, amount: i64) -> Result<()> {
        let idx = self.find(id).ok_or(LedgerError::UnknownAccount(id))?;
        self.accounts[idx].balance += amount;
        self.persist()
    }

    /// Subtracts `amount` if the balance covers it, then persists.
    ///
    /// This check is the only guard against negative balances.
    pub fn debit_if_sufficient(&mut self, id: AccountId, amount: i64) -> Result<()> {
        let idx = self.find(id).ok_or(LedgerError::UnknownAccount(id))?;
        let balance = self.accounts[idx].balance;
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                id,
                balance,
                requested: amount,
            });
        }
        self.accounts[idx].balance = balance - amount;
        self.persist()
    }

    /// Position of the account with this id. Linear scan.
    pub fn find(&self, id: AccountId) -> Option<usize> {
        self.accounts.iter().position(|a| a.id == id)
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.find(id).map(|idx| &self.accounts[idx])
    }

    /// Serializes all accounts, overwriting the backing file in full.
    pub fn persist(&self) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(File::create(&self.path)?);
        for account in &self.accounts {
            writer.serialize(account)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Malformed lines skipped by the last [`load`](Self::load).
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }
}
