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

use crate::fee::{fee, net};

use super::coins::Coins;
use super::address::Address;

/// Withdrawal of `gross` coins from the minter contract.
///
/// Fee and net amounts are always derived from the gross amount so they
/// can't go out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WithdrawalRequest {
    minter: Address,
    gross: Coins,
    fee: Coins,
    net: Coins
}

impl WithdrawalRequest {
    pub const fn new(minter: Address, gross: Coins) -> Self {
        Self {
            minter,
            gross,
            fee: fee(gross),
            net: net(gross)
        }
    }

    #[inline(always)]
    pub const fn minter(&self) -> &Address {
        &self.minter
    }

    /// Requested withdrawal amount before the fee deduction.
    #[inline(always)]
    pub const fn gross(&self) -> Coins {
        self.gross
    }

    #[inline(always)]
    pub const fn fee(&self) -> Coins {
        self.fee
    }

    /// Amount credited to the user.
    #[inline(always)]
    pub const fn net(&self) -> Coins {
        self.net
    }
}

#[test]
fn test_amounts() {
    let request = WithdrawalRequest::new(
        Address::new(0, [1; 32]),
        Coins::from_nano(1_000_000_000)
    );

    assert_eq!(request.gross(), Coins::from_nano(1_000_000_000));
    assert_eq!(request.fee(), Coins::from_nano(100_000_000));
    assert_eq!(request.net(), Coins::from_nano(900_000_000));
    assert_eq!(request.minter(), &Address::new(0, [1; 32]));
}
