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

use crate::types::coins::Coins;

/// Numerator of the protocol fee ratio.
pub const FEE_FACTOR: u128 = 100;

/// Denominator of the protocol fee ratio.
pub const FEE_BASE: u128 = 1000;

/// Protocol fee taken from the withdrawal amount: `amount * 100 / 1000`
/// with truncating division.
///
/// Computed as `q * FEE_FACTOR + r * FEE_FACTOR / FEE_BASE` where
/// `amount = q * FEE_BASE + r`, which equals the direct formula but never
/// overflows.
pub const fn fee(amount: Coins) -> Coins {
    let amount = amount.as_nano();

    let quotient = amount / FEE_BASE;
    let remainder = amount % FEE_BASE;

    Coins::from_nano(quotient * FEE_FACTOR + remainder * FEE_FACTOR / FEE_BASE)
}

/// Amount credited to the user after the protocol fee deduction.
#[inline]
pub const fn net(amount: Coins) -> Coins {
    amount.saturating_sub(fee(amount))
}

#[test]
fn test_fee() {
    assert_eq!(fee(Coins::from_nano(1000)), Coins::from_nano(100));
    assert_eq!(fee(Coins::from_nano(999)), Coins::from_nano(99));
    assert_eq!(fee(Coins::from_nano(9)), Coins::ZERO);
    assert_eq!(fee(Coins::ZERO), Coins::ZERO);

    assert_eq!(fee(Coins::from_nano(1_000_000_000)), Coins::from_nano(100_000_000));
    assert_eq!(net(Coins::from_nano(1_000_000_000)), Coins::from_nano(900_000_000));

    assert_eq!(fee(Coins::from_nano(900_000_000)).to_string(), "0.09");
    assert_eq!(net(Coins::from_nano(900_000_000)).to_string(), "0.81");

    for amount in [1, 7, 1001, 123_456_789, 999_999_999_999, u64::MAX as u128] {
        let amount = Coins::from_nano(amount);

        assert_eq!(fee(amount).as_nano(), amount.as_nano() * FEE_FACTOR / FEE_BASE);
        assert_eq!(fee(amount).as_nano() + net(amount).as_nano(), amount.as_nano());
    }

    // Does not overflow on the largest possible value.
    assert_eq!(fee(Coins::from_nano(u128::MAX)).as_nano(), u128::MAX / 10);
}
