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

use crate::cell::{Cell, CellBuilder, CellError};
use crate::types::prelude::*;

use super::Message;

/// Transfer notification delivered together with the minted tokens. It
/// credits `net_amount` to the owner while the fee part stays with the
/// fee recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferNotificationMessage {
    pub query_id: u64,
    pub owner: Address,
    pub fee_recipient: Address,
    pub net_amount: Coins
}

impl Message for TransferNotificationMessage {
    const OPCODE: u32 = 0x178d4519;

    fn to_cell(&self) -> Result<Cell, CellError> {
        let cell = CellBuilder::new()
            .store_uint(Self::OPCODE as u128, 32)?
            .store_uint(self.query_id as u128, 64)?
            .store_coins(Coins::ZERO)?
            .store_address(&self.owner)?
            .store_address(&self.fee_recipient)?
            .store_coins(self.net_amount)?
            .store_maybe_ref(None)?
            .build();

        Ok(cell)
    }
}

#[test]
fn test_layout() -> Result<(), CellError> {
    let message = TransferNotificationMessage {
        query_id: 42,
        owner: Address::new(0, [1; 32]),
        fee_recipient: Address::new(0, [2; 32]),
        net_amount: Coins::from_nano(900)
    };

    let cell = message.to_cell()?;

    // 32 + 64 + 4 + 267 + 267 + (4 + 16) + 1
    assert_eq!(cell.bits(), 655);
    assert!(cell.refs().is_empty());

    assert_eq!(cell.read_uint(0, 32), Some(0x178d4519));
    assert_eq!(cell.read_uint(32, 64), Some(42));
    assert_eq!(cell.read_uint(96, 4), Some(0));

    // Owner and fee recipient hashes.
    assert_eq!(cell.read_uint(111, 8), Some(1));
    assert_eq!(cell.read_uint(378, 8), Some(2));

    assert_eq!(cell.read_uint(634, 4), Some(2));
    assert_eq!(cell.read_uint(638, 16), Some(900));
    assert_eq!(cell.read_uint(654, 1), Some(0));

    Ok(())
}
