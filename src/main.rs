mod activity;
mod command_line;
mod config;
mod display;
mod dynamodb;
mod error;
mod generator;
mod logging;
mod query;
mod record;
mod session;
mod store;
mod table_client;
mod utils;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::config::{Command, Config, StoreKind};
use crate::session::Session;
use crate::table_client::TableClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::parse();
    logging::init_logging()?;

    let client = match config.store {
        StoreKind::Dynamodb => {
            let sdk_config = config.sdk_config().await;
            info!("Using DynamoDB in region {:?}", sdk_config.region());
            TableClient::new(dynamodb::DynamoDb::new(&sdk_config))
        }
        StoreKind::Memory => {
            info!("Using in-memory store; data is lost on exit");
            TableClient::new(store::InMemoryStore::new())
        }
    };

    let mut session = Session::new(client, &config.table);
    command_line::run_once(&mut session, config.command.unwrap_or(Command::Shell)).await
}
