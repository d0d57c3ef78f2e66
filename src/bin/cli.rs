//! txkv CLI Client
//!
//! Command-line interface for interacting with a txkv server.

use clap::{Parser, Subcommand};
use txkv::{Client, Result, TxnId};

/// txkv CLI
#[derive(Parser, Debug)]
#[command(name = "txkv-cli")]
#[command(about = "CLI for the txkv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a committed value by key
    Get {
        key: String,
    },

    /// Set a key-value pair outside any transaction
    Set {
        key: String,
        value: String,
    },

    /// Begin a transaction and print its id
    Begin,

    /// Get a value through a transaction
    TxnGet {
        txn_id: TxnId,
        key: String,
    },

    /// Buffer a write in a transaction
    TxnSet {
        txn_id: TxnId,
        key: String,
        value: String,
    },

    /// Commit a transaction
    Commit {
        txn_id: TxnId,
    },

    /// Roll back a transaction
    Rollback {
        txn_id: TxnId,
    },

    /// Ping the server
    Ping,
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => println!("{}", client.get(&key)?),
        Commands::Set { key, value } => {
            client.set(&key, &value)?;
            println!("OK");
        }
        Commands::Begin => println!("{}", client.begin()?),
        Commands::TxnGet { txn_id, key } => println!("{}", client.txn_get(txn_id, &key)?),
        Commands::TxnSet { txn_id, key, value } => {
            client.txn_set(txn_id, &key, &value)?;
            println!("OK");
        }
        Commands::Commit { txn_id } => {
            client.commit(txn_id)?;
            println!("OK");
        }
        Commands::Rollback { txn_id } => {
            client.rollback(txn_id)?;
            println!("OK");
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
