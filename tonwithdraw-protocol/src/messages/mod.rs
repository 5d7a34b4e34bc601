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

use crate::cell::{Cell, CellError};
use crate::types::prelude::*;

pub mod transfer_notification;
pub mod mint;

pub mod prelude {
    pub use super::transfer_notification::TransferNotificationMessage;
    pub use super::mint::MintMessage;
}

use prelude::*;

pub trait Message {
    /// Operation code stored in the first 32 bits of the message body.
    const OPCODE: u32;

    /// Encode current message into a cell.
    fn to_cell(&self) -> Result<Cell, CellError>;
}

/// Build base64 encoded bag of cells of the mint message.
///
/// Addresses are expected to be validated by the caller.
pub fn build_mint_payload(
    owner: Address,
    gross: Coins,
    fee_recipient: Address
) -> Result<String, CellError> {
    let message = MintMessage::new(owner, gross, fee_recipient);

    Ok(message.to_cell()?.to_boc_base64())
}
