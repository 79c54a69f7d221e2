use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::{AccountId, Block, Transaction};
use crate::error::Result;

/// Flat on-disk shape of a block. The csv deserializer works positionally
/// and cannot recurse into the nested transaction, so the record carries
/// its fields inline: `<index> <timestamp> <from> <to> <amount>`.
#[derive(Debug, Serialize, Deserialize)]
struct BlockRecord {
    index: u64,
    timestamp: i64,
    from: AccountId,
    to: AccountId,
    amount: i64,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            timestamp: block.timestamp,
            from: block.transaction.from,
            to: block.transaction.to,
            amount: block.transaction.amount,
        }
    }
}

impl From<BlockRecord> for Block {
    fn from(record: BlockRecord) -> Self {
        Self {
            index: record.index,
            timestamp: record.timestamp,
            transaction: Transaction {
                from: record.from,
                to: record.to,
                amount: record.amount,
            },
        }
    }
}

/// Append-only, ordered record of accepted transactions, backed by one
/// flat file rewritten in full on every append.
///
/// The chain performs no funds validation of its own: callers settle a
/// transfer against the account store first and append only what was
/// accepted there.
#[derive(Debug)]
pub struct LedgerChain {
    blocks: Vec<Block>,
    path: PathBuf,
    skipped: usize,
}

impl LedgerChain {
    /// Loads the chain from `path`.
    ///
    /// A missing file yields an empty chain. Malformed lines are skipped
    /// and counted; an existing file that cannot be read fails loudly.
    /// Indices are taken from the file as-is, not re-derived.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    blocks: Vec::new(),
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

        let mut blocks = Vec::new();
        let mut skipped = 0usize;
        for record in reader.deserialize::<BlockRecord>() {
            match record {
                Ok(record) => blocks.push(record.into()),
                Err(e) => match e.into_kind() {
                    csv::ErrorKind::Io(err) => return Err(err.into()),
                    _ => skipped += 1,
                },
            }
        }
        if skipped > 0 {
            warn!(file = %path.display(), skipped, "skipped malformed chain records");
        }

        Ok(Self {
            blocks,
            path,
            skipped,
        })
    }

    /// Appends a block wrapping the transaction and persists the chain.
    ///
    /// The new block's index is the current chain length, so indices match
    /// positions for every chain built through this method.
    pub fn append(&mut self, from: AccountId, to: AccountId, amount: i64) -> Result<Block> {
        let block = Block {
            index: self.blocks.len() as u64,
            timestamp: unix_now(),
            transaction: Transaction { from, to, amount },
        };
        self.blocks.push(block);
        self.persist()?;
        Ok(block)
    }

    /// Derives a balance by replaying every block: `+amount` where the user
    /// is the receiver, `-amount` where the user is the sender. O(n).
    ///
    /// Credits applied directly to the account store leave no chain entry
    /// and are invisible here; after any such credit the stored and the
    /// replayed balance diverge permanently.
    pub fn balance_of(&self, user: AccountId) -> i64 {
        let mut balance = 0;
        for block in &self.blocks {
            if block.transaction.to == user {
                balance += block.transaction.amount;
            }
            if block.transaction.from == user {
                balance -= block.transaction.amount;
            }
        }
        balance
    }

    /// Bounds-checked positional lookup.
    pub fn block_at(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    /// Serializes all blocks, overwriting the backing file in full.
    pub fn persist(&self) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(File::create(&self.path)?);
        for block in &self.blocks {
            writer.serialize(BlockRecord::from(block))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Malformed lines skipped by the last [`load`](Self::load).
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
