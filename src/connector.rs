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

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

use tonwithdraw_protocol::prelude::*;

/// Single internal message of the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionMessage {
    /// Destination contract.
    pub address: Address,

    /// Amount of TON attached to the message.
    pub amount: Coins,

    /// Base64 encoded bag of cells of the message body.
    pub payload: String
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionRequest {
    /// Unix timestamp (seconds) after which the wallet must reject the
    /// transaction.
    pub valid_until: i64,

    pub messages: Vec<TransactionMessage>
}

/// What happened with the transaction after it was handed to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionOutcome {
    /// Transaction is presented to the user as a transfer link which should
    /// be opened in the wallet app to approve it.
    Presented {
        link: String
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    #[error("wallet is not connected")]
    NotConnected,

    #[error("transaction validity period has already expired")]
    Expired,

    #[error("transaction must contain exactly one message, got {0}")]
    UnsupportedMessages(usize),

    #[error("invalid base64 transaction payload")]
    InvalidPayload
}

pub trait WalletConnector {
    /// Address of the currently connected wallet.
    fn account(&self) -> Option<&Address>;

    fn connect(&mut self, account: Address);

    fn disconnect(&mut self);

    /// Ask the wallet to sign and send the transaction.
    fn send_transaction(
        &self,
        request: &TransactionRequest
    ) -> Result<TransactionOutcome, ConnectorError>;
}

/// Wallet connector which presents transactions as `ton://transfer` links.
///
/// The link is understood by the wallet apps: it contains destination,
/// attached amount, message body (`bin`) and expiration time (`exp`).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TransferLinkConnector {
    account: Option<Address>,
    testnet: bool
}

impl TransferLinkConnector {
    #[inline]
    pub fn new(testnet: bool) -> Self {
        Self {
            account: None,
            testnet
        }
    }

    /// Build transfer link for the transaction message.
    pub fn transfer_link(
        &self,
        message: &TransactionMessage,
        valid_until: i64
    ) -> Result<String, ConnectorError> {
        let payload = STANDARD.decode(&message.payload)
            .map_err(|_| ConnectorError::InvalidPayload)?;

        let address = message.address.to_friendly(FriendlyFlags {
            bounceable: true,
            testnet: self.testnet,
            url_safe: true
        });

        Ok(format!(
            "ton://transfer/{address}?amount={}&bin={}&exp={valid_until}",
            message.amount.as_nano(),
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }
}

impl WalletConnector for TransferLinkConnector {
    #[inline(always)]
    fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    fn connect(&mut self, account: Address) {
        tracing::info!(account = %account, "wallet connected");

        self.account = Some(account);
    }

    fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            tracing::info!(account = %account, "wallet disconnected");
        }
    }

    fn send_transaction(
        &self,
        request: &TransactionRequest
    ) -> Result<TransactionOutcome, ConnectorError> {
        if self.account.is_none() {
            return Err(ConnectorError::NotConnected);
        }

        if request.valid_until <= time::UtcDateTime::now().unix_timestamp() {
            return Err(ConnectorError::Expired);
        }

        let [message] = request.messages.as_slice() else {
            return Err(ConnectorError::UnsupportedMessages(request.messages.len()));
        };

        let link = self.transfer_link(message, request.valid_until)?;

        tracing::info!(
            destination = %message.address,
            amount = %message.amount,
            valid_until = request.valid_until,
            "transaction presented to the wallet"
        );

        Ok(TransactionOutcome::Presented { link })
    }
}

#[cfg(test)]
fn test_request(valid_until: i64) -> TransactionRequest {
    TransactionRequest {
        valid_until,
        messages: vec![
            TransactionMessage {
                address: Address::new(0, [0xaa; 32]),
                amount: Coins::from_nano(50_000_000),
                payload: String::from("te6cckEBAQEAAgAAAEysuc0=")
            }
        ]
    }
}

#[test]
fn test_not_connected() {
    let connector = TransferLinkConnector::new(false);

    assert_eq!(
        connector.send_transaction(&test_request(i64::MAX)),
        Err(ConnectorError::NotConnected)
    );
}

#[test]
fn test_transfer_link() {
    let mut connector = TransferLinkConnector::new(false);

    connector.connect(Address::new(0, [1; 32]));

    assert_eq!(connector.account(), Some(&Address::new(0, [1; 32])));

    assert_eq!(
        connector.send_transaction(&test_request(i64::MAX)),
        Ok(TransactionOutcome::Presented {
            link: format!(
                "ton://transfer/EQCqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqseb?amount=50000000&bin=te6cckEBAQEAAgAAAEysuc0&exp={}",
                i64::MAX
            )
        })
    );

    assert_eq!(connector.send_transaction(&test_request(0)), Err(ConnectorError::Expired));

    let mut request = test_request(i64::MAX);

    request.messages.clear();

    assert_eq!(connector.send_transaction(&request), Err(ConnectorError::UnsupportedMessages(0)));

    request = test_request(i64::MAX);
    request.messages[0].payload = String::from("not base64!");

    assert_eq!(connector.send_transaction(&request), Err(ConnectorError::InvalidPayload));

    connector.disconnect();

    assert_eq!(connector.account(), None);
}
