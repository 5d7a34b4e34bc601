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

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedSender, UnboundedReceiver, unbounded_channel};

use tonwithdraw_protocol::types::address::Address;

use crate::form::Event;
use crate::rpc::TonClient;

/// Request to fetch the minter balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceQuery {
    pub token: u64,
    pub address: Address
}

/// Spawn background balance queries processor.
///
/// Every received query is spawned as a separate task so a slow query
/// doesn't block newer ones. Results are sent back as form events in the
/// order they are resolved; the form drops outdated ones using the query
/// token.
pub fn run_queries_handler(
    runtime: Handle,
    client: TonClient
) -> (UnboundedSender<BalanceQuery>, UnboundedReceiver<Event>) {
    let (query_sender, mut query_receiver) = unbounded_channel::<BalanceQuery>();
    let (events_sender, events_receiver) = unbounded_channel();

    runtime.clone().spawn(async move {
        while let Some(query) = query_receiver.recv().await {
            let client = client.clone();
            let events_sender = events_sender.clone();

            runtime.spawn(async move {
                let event = match client.get_balance(&query.address).await {
                    Ok(balance) => Event::BalanceResolved {
                        token: query.token,
                        balance
                    },

                    Err(err) => Event::BalanceFailed {
                        token: query.token,
                        error: err.to_string()
                    }
                };

                let _ = events_sender.send(event);
            });
        }
    });

    (query_sender, events_receiver)
}
