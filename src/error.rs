use crate::block::AccountId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record error: {0}")]
    Record(#[from] csv::Error),
    #[error("unknown account id {0}")]
    UnknownAccount(AccountId),
    #[error("insufficient funds: account {id} holds {balance}, transfer needs {requested}")]
    InsufficientFunds {
        id: AccountId,
        balance: i64,
        requested: i64,
    },
    #[error("transfer amount must be positive, got {0}")]
    NonPositiveAmount(i64),
}
