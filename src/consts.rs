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

use ratatui::style::Color;

use tonwithdraw_protocol::prelude::*;

/// Minimal balance which must stay on the minter contract to pay for its
/// storage: 0.05 TON.
pub const MIN_STORAGE: Coins = Coins::from_nano(50_000_000);

/// Amount of TON attached to the mint message to pay for its processing:
/// 0.05 TON.
pub const ATTACHED_GAS: Coins = Coins::from_nano(50_000_000);

/// Amount of seconds the wallet may wait before the transaction expires.
pub const TRANSACTION_VALID_FOR: i64 = 360;

/// Text of the alert shown when sending without a connected wallet.
pub const NOT_CONNECTED_ALERT: &str = "Connect wallet";

pub const TUI_PRIMARY_COLOR: Color = Color::Yellow;
pub const TUI_DISABLED_COLOR: Color = Color::DarkGray;
pub const TUI_ERROR_COLOR: Color = Color::Red;

lazy_static::lazy_static! {
    /// Address which receives the protocol fee.
    pub static ref FEE_ADDRESS: Address = Address::parse("UQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT8U4")
        .expect("failed to parse fee address");
}
