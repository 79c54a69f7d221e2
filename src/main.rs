use chainbook::block::{AccountId, Amount, Block};
use chainbook::engine::Ledger;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Accounts file
    #[arg(long, global = true, default_value = "accounts.txt")]
    accounts_file: PathBuf,

    /// Chain file
    #[arg(long, global = true, default_value = "chain.txt")]
    chain_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new account
    Create {
        /// Starting balance
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        balance: i64,
    },
    /// Credit an account directly, off the chain
    Credit {
        id: AccountId,
        /// Amount to add; a negative value debits without any guard
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Move funds between two accounts and record a block
    Transfer {
        from: AccountId,
        to: AccountId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// List all accounts
    Accounts {
        #[arg(long)]
        json: bool,
    },
    /// List all recorded blocks
    Blocks {
        #[arg(long)]
        json: bool,
    },
    /// Show a single block by position
    Block {
        position: usize,
        #[arg(long)]
        json: bool,
    },
    /// Compare an account's stored balance with its chain-replayed balance
    Balance {
        id: AccountId,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut ledger = Ledger::open(&cli.accounts_file, &cli.chain_file).into_diagnostic()?;

    match cli.command {
        Command::Create { balance } => {
            let id = ledger.create_account(balance).into_diagnostic()?;
            println!("Account created with id: {id}, balance: {balance}");
        }
        Command::Credit { id, amount } => {
            let balance = ledger.credit(id, amount).into_diagnostic()?;
            println!("Account {id} new balance: {balance}");
        }
        Command::Transfer { from, to, amount } => {
            let amount = Amount::new(amount).into_diagnostic()?;
            let block = ledger.transfer(from, to, amount).into_diagnostic()?;
            println!("Transfer complete, recorded as block #{}", block.index);
        }
        Command::Accounts { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(ledger.accounts()).into_diagnostic()?
                );
            } else {
                for account in ledger.accounts() {
                    println!("Account {}: balance {}", account.id, account.balance);
                }
            }
        }
        Command::Blocks { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(ledger.blocks()).into_diagnostic()?
                );
            } else {
                for block in ledger.blocks() {
                    print_block(block);
                }
            }
        }
        Command::Block { position, json } => {
            let block = ledger
                .block_at(position)
                .ok_or_else(|| miette::miette!("no block at position {position}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(block).into_diagnostic()?);
            } else {
                print_block(block);
            }
        }
        Command::Balance { id, json } => {
            let report = ledger.balance_report(id).into_diagnostic()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).into_diagnostic()?
                );
            } else {
                println!(
                    "Account {}: stored balance {}, replayed balance {}",
                    report.id, report.stored, report.replayed
                );
            }
        }
    }

    Ok(())
}

fn print_block(block: &Block) {
    println!("Block #{}", block.index);
    println!("Timestamp: {}", format_timestamp(block.timestamp));
    println!(
        "From: {}, To: {}, Amount: {}",
        block.transaction.from, block.transaction.to, block.transaction.amount
    );
    println!("-------------------------");
}

fn format_timestamp(ts: i64) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}
