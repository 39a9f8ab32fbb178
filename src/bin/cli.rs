//! RemoteList CLI Client
//!
//! Command-line interface for interacting with a RemoteList server.

use clap::{Parser, Subcommand};
use remotelist::Client;

/// RemoteList CLI
#[derive(Parser, Debug)]
#[command(name = "remotelist-cli")]
#[command(about = "CLI for the RemoteList list store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a value to the end of a list
    Append {
        /// The list identifier
        list_id: String,

        /// The value to append
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Remove and print the last value of a list
    Remove {
        /// The list identifier
        list_id: String,
    },

    /// Print the value at an index
    Get {
        /// The list identifier
        list_id: String,

        /// 0-based index
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Print the length of a list
    Size {
        /// The list identifier
        list_id: String,
    },

    /// Ping the server
    Ping,
}

fn run(args: Args) -> remotelist::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Append { list_id, value } => {
            let success = client.append(&list_id, value)?;
            println!("{}", success);
        }
        Commands::Remove { list_id } => println!("{}", client.remove(&list_id)?),
        Commands::Get { list_id, index } => println!("{}", client.get(&list_id, index)?),
        Commands::Size { list_id } => println!("{}", client.size(&list_id)?),
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
