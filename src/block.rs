use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Identifier of a ledger participant. Ids are dense: the account store
/// assigns them sequentially from zero.
pub type AccountId = u32;

/// A value movement between two accounts.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct Transaction {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: i64,
}

/// One entry of the chain: a transaction plus its position and append time.
///
/// Blocks are never mutated or removed once appended. For chains built
/// through [`LedgerChain::append`](crate::chain::LedgerChain::append),
/// `index` always equals the block's position.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct Block {
    pub index: u64,
    /// Unix seconds at append time.
    pub timestamp: i64,
    pub transaction: Transaction,
}

/// A transfer amount validated to be positive.
///
/// The stores accept any integer; positivity belongs to the transfer path,
/// so [`Ledger::transfer`](crate::engine::Ledger::transfer) only takes an
/// `Amount`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::NonPositiveAmount(value))
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}
