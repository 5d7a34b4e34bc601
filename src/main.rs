// SPDX-License-Identifier: GPL-3.0-or-later
//
// tonwithdraw
// Copyright (C) 2025  Nikita Podvirnyi <krypt0nn@vk.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// `tonwithdraw` app version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;

use tonwithdraw_protocol::prelude::*;

pub mod consts;
pub mod utils;
pub mod rpc;
pub mod connector;
pub mod form;
pub mod tui;

use connector::{WalletConnector, TransferLinkConnector};
use rpc::{Network, RpcConfig};
use utils::LogOutput;

#[derive(Parser)]
#[command(version, about = "Withdraw TON from a minter contract as wrapped tokens")]
struct Cli {
    /// Chain network.
    #[arg(long, global = true, value_enum, default_value_t = Network::Mainnet, env = "TONWITHDRAW_NETWORK")]
    network: Network,

    /// toncenter v2 JSON-RPC endpoint. Discovered using TON Access if unset.
    #[arg(long, global = true, env = "TONWITHDRAW_ENDPOINT")]
    endpoint: Option<String>,

    /// toncenter API key.
    #[arg(long, global = true, env = "TONWITHDRAW_API_KEY")]
    api_key: Option<String>,

    /// Write logs to this file. Without it the terminal UI doesn't log
    /// anything while the tools log to stderr.
    #[arg(long, global = true, env = "TONWITHDRAW_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Connect this wallet address on start.
    #[arg(short, long)]
    wallet: Option<Address>,

    /// Fill the minter address field on start.
    #[arg(short, long)]
    minter: Option<Address>,

    #[command(subcommand)]
    command: Option<Command>
}

impl Cli {
    fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            network: self.network,
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone()
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print protocol fee and amount to receive for the withdrawal amount.
    Fee {
        /// Withdrawal amount in TON.
        amount: Coins
    },

    /// Print base64 encoded mint message body.
    Payload {
        /// Wallet address which receives the minted tokens.
        #[arg(short, long)]
        owner: Address,

        /// Withdrawal amount in TON.
        #[arg(short, long)]
        amount: Coins
    },

    /// Print balance of the minter contract.
    Balance {
        address: Address
    }
}

impl Command {
    pub async fn run(self, config: RpcConfig) -> anyhow::Result<()> {
        match self {
            Self::Fee { amount } => {
                println!("fee: {}", fee(amount));
                println!("to receive: {}", net(amount));
            }

            Self::Payload { owner, amount } => {
                let payload = build_mint_payload(owner, amount, *consts::FEE_ADDRESS)
                    .context("failed to build mint payload")?;

                println!("{payload}");
            }

            Self::Balance { address } => {
                let client = rpc::connect(&config).await
                    .context("failed to create chain client")?;

                let balance = client.get_balance(&address).await
                    .context("failed to fetch balance")?;

                println!("{balance}");
            }
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_output = match &cli.log_file {
        Some(path) => LogOutput::File(path),
        None if cli.command.is_some() => LogOutput::Stderr,
        None => LogOutput::None
    };

    utils::init_logging(log_output)?;

    let config = cli.rpc_config();

    match cli.command {
        Some(command) => command.run(config).await,
        None => {
            let client = rpc::connect(&config).await
                .context("failed to create chain client")?;

            let mut connector = TransferLinkConnector::new(config.network == Network::Testnet);

            if let Some(wallet) = cli.wallet {
                connector.connect(wallet);
            }

            tracing::info!(version = VERSION, "starting withdrawal form");

            let mut terminal = ratatui::init();

            let result = tui::run_app(
                Handle::current(),
                client,
                connector,
                cli.minter,
                &mut terminal
            ).await;

            ratatui::restore();

            result?;

            Ok(())
        }
    }
}
