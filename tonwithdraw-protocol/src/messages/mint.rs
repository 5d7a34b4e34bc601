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

use std::sync::Arc;

use crate::cell::{Cell, CellBuilder, CellError};
use crate::fee::net;
use crate::types::prelude::*;

use super::Message;
use super::transfer_notification::TransferNotificationMessage;

/// Request to the minter contract to mint wrapped tokens for the owner.
///
/// The outer message carries the full gross amount. The fee is deducted
/// inside the nested transfer notification which credits only the net
/// amount to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MintMessage {
    pub query_id: u64,
    pub owner: Address,
    pub gross_amount: Coins,
    pub fee_recipient: Address
}

impl MintMessage {
    #[inline]
    pub const fn new(owner: Address, gross_amount: Coins, fee_recipient: Address) -> Self {
        Self {
            query_id: 0,
            owner,
            gross_amount,
            fee_recipient
        }
    }

    /// Nested transfer notification message.
    pub const fn notification(&self) -> TransferNotificationMessage {
        TransferNotificationMessage {
            query_id: self.query_id,
            owner: self.owner,
            fee_recipient: self.fee_recipient,
            net_amount: net(self.gross_amount)
        }
    }
}

impl Message for MintMessage {
    const OPCODE: u32 = 21;

    fn to_cell(&self) -> Result<Cell, CellError> {
        let notification = self.notification().to_cell()?;

        let cell = CellBuilder::new()
            .store_uint(Self::OPCODE as u128, 32)?
            .store_uint(self.query_id as u128, 64)?
            .store_address(&self.owner)?
            .store_coins(self.gross_amount)?
            .store_ref(Arc::new(notification))?
            .build();

        Ok(cell)
    }
}

#[cfg(test)]
fn sample_owner() -> Address {
    let mut hash = [0; 32];

    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = i as u8;
    }

    Address::new(0, hash)
}

#[cfg(test)]
fn sample_fee_recipient() -> Address {
    Address::parse("UQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT8U4")
        .expect("failed to parse fee recipient address")
}

#[test]
fn test_amounts() -> Result<(), CellError> {
    let message = MintMessage::new(
        sample_owner(),
        Coins::from_nano(1_000_000_000),
        sample_fee_recipient()
    );

    let cell = message.to_cell()?;

    assert_eq!(cell.bits(), 399);
    assert_eq!(cell.refs().len(), 1);
    assert_eq!(cell.read_uint(0, 32), Some(21));
    assert_eq!(cell.read_uint(32, 64), Some(0));

    // Outer amount is the gross withdrawal.
    assert_eq!(cell.read_uint(363, 4), Some(4));
    assert_eq!(cell.read_uint(367, 32), Some(1_000_000_000));

    let inner = &cell.refs()[0];

    assert_eq!(inner.bits(), 671);
    assert_eq!(inner.read_uint(0, 32), Some(0x178d4519));

    // Inner amount is the gross minus the fee.
    assert_eq!(inner.read_uint(634, 4), Some(4));
    assert_eq!(inner.read_uint(638, 32), Some(900_000_000));

    Ok(())
}

#[test]
fn test_fee_recipient_is_kept() -> Result<(), CellError> {
    let fee_recipient = sample_fee_recipient();

    let hash = fee_recipient.hash();

    for gross in [50_000_000, 1_000_000_000, 123_456_789_000] {
        let message = MintMessage::new(sample_owner(), Coins::from_nano(gross), fee_recipient);

        let cell = message.to_cell()?;
        let inner = &cell.refs()[0];

        assert_eq!(inner.read_uint(367, 3), Some(0b100));
        assert_eq!(inner.read_uint(370, 8), Some(0));
        assert_eq!(inner.read_uint(378, 128), Some(u128::from_be_bytes(hash[..16].try_into().expect("16 bytes"))));
        assert_eq!(inner.read_uint(506, 128), Some(u128::from_be_bytes(hash[16..].try_into().expect("16 bytes"))));
    }

    Ok(())
}

#[test]
fn test_payload() -> Result<(), CellError> {
    let message = MintMessage::new(
        sample_owner(),
        Coins::from_nano(1_000_000_000),
        sample_fee_recipient()
    );

    let cell = message.to_cell()?;

    assert_eq!(hex::encode(cell.hash()), "f658982d1c518a5dabc6d21224a148bceb1e122537e59ba7695200291b1e4590");

    assert_eq!(
        super::build_mint_payload(sample_owner(), Coins::from_nano(1_000_000_000), sample_fee_recipient())?,
        "te6cckEBAgEAiwABYwAAABUAAAAAAAAAAIAAACBAYICgwOEBIUFhgaHB4gIiQmKCosLjAyNDY4Ojw+h3NZQBAQCnF41FGQAAAAAAAAAACAAAAgQGCAoMDhASFBYYGhweICIkJigqLC4wMjQ2ODo8PwAO9OQFFhK0HvVK+egmc/r+jfSdrsNvfMPt9WQruO+YU9DWk6QBMo5nmg=="
    );

    Ok(())
}
