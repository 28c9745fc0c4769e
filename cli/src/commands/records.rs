use super::{open_session, Credentials};
use crate::config::Config;
use crate::utils::error::KeeperResult;
use clap::{Args, Subcommand};
use colored::*;
use shared::{Binary, Card, Credential, Record, RecordKind, Text};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RecordId {
    /// Record id
    pub id: String,
}

#[derive(Debug, Subcommand)]
pub enum CardCommand {
    /// Store a payment card
    Add {
        #[arg(long)]
        id: String,
        /// Name printed on the card
        #[arg(long)]
        fio: String,
        #[arg(long)]
        number: String,
        /// Expiry date, e.g. 12/30
        #[arg(long)]
        date: String,
        #[arg(long)]
        cvv: String,
        #[arg(long, default_value = "")]
        metainfo: String,
    },
    /// Show a stored card
    Get(RecordId),
    /// Delete a stored card
    Delete(RecordId),
}

#[derive(Debug, Subcommand)]
pub enum LoginCommand {
    /// Store a login/password pair
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        login: String,
        #[arg(long = "secret")]
        password: String,
        #[arg(long, default_value = "")]
        metainfo: String,
    },
    /// Show a stored login/password pair
    Get(RecordId),
    /// Delete a stored login/password pair
    Delete(RecordId),
}

#[derive(Debug, Subcommand)]
pub enum TextCommand {
    /// Store a piece of text
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "")]
        metainfo: String,
    },
    /// Show a stored text
    Get(RecordId),
    /// Delete a stored text
    Delete(RecordId),
}

#[derive(Debug, Subcommand)]
pub enum BinCommand {
    /// Store the contents of a file
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "")]
        metainfo: String,
    },
    /// Fetch stored bytes
    Get {
        id: String,
        /// Write the bytes here instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete stored bytes
    Delete(RecordId),
}

/// One record operation, independent of how it was spelled on the command line
#[derive(Debug)]
pub enum Operation {
    Add(Record),
    Get {
        kind: RecordKind,
        id: String,
        output: Option<PathBuf>,
    },
    Delete {
        kind: RecordKind,
        id: String,
    },
}

impl Operation {
    fn get(kind: RecordKind, id: String) -> Self {
        Operation::Get {
            kind,
            id,
            output: None,
        }
    }
}

impl From<CardCommand> for Operation {
    fn from(command: CardCommand) -> Self {
        match command {
            CardCommand::Add {
                id,
                fio,
                number,
                date,
                cvv,
                metainfo,
            } => Operation::Add(Record::Card(Card {
                id,
                fio,
                number,
                date,
                cvv,
                metainfo,
            })),
            CardCommand::Get(RecordId { id }) => Operation::get(RecordKind::Card, id),
            CardCommand::Delete(RecordId { id }) => Operation::Delete {
                kind: RecordKind::Card,
                id,
            },
        }
    }
}

impl From<LoginCommand> for Operation {
    fn from(command: LoginCommand) -> Self {
        match command {
            LoginCommand::Add {
                id,
                login,
                password,
                metainfo,
            } => Operation::Add(Record::Credential(Credential {
                id,
                login,
                password,
                metainfo,
            })),
            LoginCommand::Get(RecordId { id }) => Operation::get(RecordKind::Credential, id),
            LoginCommand::Delete(RecordId { id }) => Operation::Delete {
                kind: RecordKind::Credential,
                id,
            },
        }
    }
}

impl From<TextCommand> for Operation {
    fn from(command: TextCommand) -> Self {
        match command {
            TextCommand::Add {
                id,
                content,
                metainfo,
            } => Operation::Add(Record::Text(Text {
                id,
                content,
                metainfo,
            })),
            TextCommand::Get(RecordId { id }) => Operation::get(RecordKind::Text, id),
            TextCommand::Delete(RecordId { id }) => Operation::Delete {
                kind: RecordKind::Text,
                id,
            },
        }
    }
}

impl BinCommand {
    /// Reads the input file for `add`
    fn into_operation(self) -> KeeperResult<Operation> {
        Ok(match self {
            BinCommand::Add { id, file, metainfo } => Operation::Add(Record::Binary(Binary {
                id,
                data: fs::read(&file)?,
                metainfo,
            })),
            BinCommand::Get { id, output } => Operation::Get {
                kind: RecordKind::Binary,
                id,
                output,
            },
            BinCommand::Delete(RecordId { id }) => Operation::Delete {
                kind: RecordKind::Binary,
                id,
            },
        })
    }
}

pub async fn execute_card(
    config: &Config,
    credentials: &Credentials,
    command: CardCommand,
    verbose: bool,
) -> KeeperResult<()> {
    execute(config, credentials, command.into(), verbose).await
}

pub async fn execute_login(
    config: &Config,
    credentials: &Credentials,
    command: LoginCommand,
    verbose: bool,
) -> KeeperResult<()> {
    execute(config, credentials, command.into(), verbose).await
}

pub async fn execute_text(
    config: &Config,
    credentials: &Credentials,
    command: TextCommand,
    verbose: bool,
) -> KeeperResult<()> {
    execute(config, credentials, command.into(), verbose).await
}

pub async fn execute_bin(
    config: &Config,
    credentials: &Credentials,
    command: BinCommand,
    verbose: bool,
) -> KeeperResult<()> {
    execute(config, credentials, command.into_operation()?, verbose).await
}

/// Sign in and run one record operation
pub async fn execute(
    config: &Config,
    credentials: &Credentials,
    operation: Operation,
    verbose: bool,
) -> KeeperResult<()> {
    if verbose {
        println!(
            "Signing in as '{}' via {} transport...",
            credentials.user, config.transport
        );
    }
    let mut client = open_session(config, credentials).await?;

    match operation {
        Operation::Add(record) => {
            let kind = record.kind();
            let id = record.id().to_string();
            client.add(record).await?;
            println!("{} Stored {} {}", "✓".green().bold(), kind, id.bold());
        }
        Operation::Get { kind, id, output } => {
            let record = client.get(kind, &id).await?;
            match (record, output) {
                (Record::Binary(binary), Some(path)) => {
                    fs::write(&path, &binary.data)?;
                    println!(
                        "{} Wrote {} bytes to {}",
                        "✓".green().bold(),
                        binary.data.len(),
                        path.display()
                    );
                }
                (record, _) => print_record(&record),
            }
        }
        Operation::Delete { kind, id } => {
            client.delete(kind, &id).await?;
            println!("{} Deleted {} {}", "✓".green().bold(), kind, id.bold());
        }
    }

    Ok(())
}

fn print_record(record: &Record) {
    println!("{} {}", record.kind().to_string().blue().bold(), record.id().bold());
    match record {
        Record::Card(card) => {
            println!("  {} {}", "Holder:".bold(), card.fio);
            println!("  {} {}", "Number:".bold(), card.number);
            println!("  {} {}", "Expires:".bold(), card.date);
            println!("  {} {}", "CVV:".bold(), card.cvv);
            print_metainfo(&card.metainfo);
        }
        Record::Credential(credential) => {
            println!("  {} {}", "Login:".bold(), credential.login);
            println!("  {} {}", "Password:".bold(), credential.password);
            print_metainfo(&credential.metainfo);
        }
        Record::Text(text) => {
            println!("  {}", text.content);
            print_metainfo(&text.metainfo);
        }
        Record::Binary(binary) => {
            println!("  {} {} bytes", "Size:".bold(), binary.data.len());
            println!("  {}", "Use --output to save the contents".dimmed());
            print_metainfo(&binary.metainfo);
        }
    }
}

fn print_metainfo(metainfo: &str) {
    if !metainfo.is_empty() {
        println!("  {} {}", "Note:".bold(), metainfo.dimmed());
    }
}
