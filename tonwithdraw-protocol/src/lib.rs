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

/// `tonwithdraw-protocol` crate version.
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;
pub mod fee;
pub mod cell;
pub mod messages;

pub mod prelude {
    pub use super::types::prelude::*;
    pub use super::messages::prelude::*;

    pub use super::messages::{Message, build_mint_payload};
    pub use super::cell::{Cell, CellBuilder, CellError};
    pub use super::fee::{fee, net};
}
