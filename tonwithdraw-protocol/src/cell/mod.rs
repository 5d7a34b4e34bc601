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

use sha2::{Sha256, Digest};

use crate::types::coins::{Coins, MAX_COINS};
use crate::types::address::Address;

pub mod boc;

/// Maximal amount of data bits stored in a single cell.
pub const MAX_BITS: usize = 1023;

/// Maximal amount of references stored in a single cell.
pub const MAX_REFS: usize = 4;

/// Amount of bits used by the `addr_std` address encoding.
pub const ADDRESS_BITS: usize = 267;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    #[error("cell data overflow: {requested} bits requested, {available} bits available")]
    BitsOverflow {
        requested: usize,
        available: usize
    },

    #[error("cell references overflow: at most 4 references allowed")]
    RefsOverflow,

    #[error("value {value} doesn't fit into {bits} bits")]
    ValueOverflow {
        value: u128,
        bits: usize
    },

    #[error("coins amount {0} doesn't fit into the coins field")]
    CoinsOverflow(u128)
}

/// Ordinary cell: up to 1023 data bits and up to 4 references to other
/// cells. Hash and depth are computed once when the cell is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    data: Vec<u8>,
    bits: usize,
    refs: Vec<Arc<Cell>>,
    depth: u16,
    hash: [u8; 32]
}

impl Cell {
    fn new(data: Vec<u8>, bits: usize, refs: Vec<Arc<Cell>>) -> Self {
        let depth = refs.iter()
            .map(|cell| cell.depth + 1)
            .max()
            .unwrap_or(0);

        let mut cell = Self {
            data,
            bits,
            refs,
            depth,
            hash: [0; 32]
        };

        let mut hasher = Sha256::new();

        hasher.update(cell.descriptors());
        hasher.update(cell.padded_data());

        for child in &cell.refs {
            hasher.update(child.depth.to_be_bytes());
        }

        for child in &cell.refs {
            hasher.update(child.hash);
        }

        cell.hash = hasher.finalize().into();

        cell
    }

    /// Amount of data bits stored in the cell.
    #[inline(always)]
    pub const fn bits(&self) -> usize {
        self.bits
    }

    #[inline(always)]
    pub fn refs(&self) -> &[Arc<Cell>] {
        &self.refs
    }

    #[inline(always)]
    pub const fn depth(&self) -> u16 {
        self.depth
    }

    /// Representation hash of the cell.
    #[inline(always)]
    pub const fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Cell descriptor bytes `d1` (references count) and `d2` (data length).
    pub fn descriptors(&self) -> [u8; 2] {
        let d1 = self.refs.len() as u8;
        let d2 = (self.bits / 8 + self.bits.div_ceil(8)) as u8;

        [d1, d2]
    }

    /// Data bytes with the completion tag: incomplete last byte gets a
    /// single `1` bit appended after the data.
    pub fn padded_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();

        let tail = self.bits % 8;

        if tail != 0
            && let Some(last) = data.last_mut()
        {
            *last |= 1 << (7 - tail);
        }

        data
    }

    /// Read `bits` bits starting from `offset` as an unsigned integer.
    ///
    /// Return `None` if requested range is out of the cell data.
    pub fn read_uint(&self, offset: usize, bits: usize) -> Option<u128> {
        if bits > 128 || offset + bits > self.bits {
            return None;
        }

        let mut value = 0;

        for i in offset..offset + bits {
            let bit = (self.data[i / 8] >> (7 - i % 8)) & 1;

            value = (value << 1) | bit as u128;
        }

        Some(value)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CellBuilder {
    data: Vec<u8>,
    bits: usize,
    refs: Vec<Arc<Cell>>
}

impl CellBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount of data bits which can still be stored.
    #[inline(always)]
    pub const fn bits_left(&self) -> usize {
        MAX_BITS - self.bits
    }

    fn reserve(&self, bits: usize) -> Result<(), CellError> {
        if bits > self.bits_left() {
            return Err(CellError::BitsOverflow {
                requested: bits,
                available: self.bits_left()
            });
        }

        Ok(())
    }

    fn push_bit(&mut self, bit: bool) {
        if self.bits % 8 == 0 {
            self.data.push(0);
        }

        if bit && let Some(last) = self.data.last_mut() {
            *last |= 1 << (7 - self.bits % 8);
        }

        self.bits += 1;
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        self.reserve(1)?;
        self.push_bit(bit);

        Ok(self)
    }

    /// Store unsigned big-endian integer of `bits` width (up to 128).
    pub fn store_uint(&mut self, value: u128, bits: usize) -> Result<&mut Self, CellError> {
        if bits > 128 || (bits < 128 && value >> bits != 0) {
            return Err(CellError::ValueOverflow { value, bits });
        }

        self.reserve(bits)?;

        for i in (0..bits).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }

        Ok(self)
    }

    /// Store coins amount as `VarUInteger 16`: 4 bits of the value length in
    /// bytes followed by the value itself.
    pub fn store_coins(&mut self, coins: Coins) -> Result<&mut Self, CellError> {
        let value = coins.as_nano();

        if value > MAX_COINS {
            return Err(CellError::CoinsOverflow(value));
        }

        let len = (128 - value.leading_zeros() as usize).div_ceil(8);

        self.reserve(4 + len * 8)?;

        self.store_uint(len as u128, 4)?
            .store_uint(value, len * 8)
    }

    /// Store address as `addr_std$10 anycast:(Maybe Anycast)=0
    /// workchain_id:int8 address:bits256`.
    pub fn store_address(&mut self, address: &Address) -> Result<&mut Self, CellError> {
        self.reserve(ADDRESS_BITS)?;

        self.store_uint(0b10, 2)?
            .store_bit(false)?
            .store_uint(address.workchain() as u8 as u128, 8)?;

        for byte in address.hash() {
            self.store_uint(*byte as u128, 8)?;
        }

        Ok(self)
    }

    pub fn store_ref(&mut self, cell: impl Into<Arc<Cell>>) -> Result<&mut Self, CellError> {
        if self.refs.len() >= MAX_REFS {
            return Err(CellError::RefsOverflow);
        }

        self.refs.push(cell.into());

        Ok(self)
    }

    /// Store `Maybe ^Cell`: a single flag bit and the reference if present.
    pub fn store_maybe_ref(
        &mut self,
        cell: Option<Arc<Cell>>
    ) -> Result<&mut Self, CellError> {
        match cell {
            Some(cell) => {
                if self.refs.len() >= MAX_REFS {
                    return Err(CellError::RefsOverflow);
                }

                self.store_bit(true)?.store_ref(cell)
            }

            None => self.store_bit(false)
        }
    }

    #[inline]
    pub fn build(&self) -> Cell {
        Cell::new(self.data.clone(), self.bits, self.refs.clone())
    }
}

#[test]
fn test_empty_cell() {
    let cell = CellBuilder::new().build();

    assert_eq!(cell.bits(), 0);
    assert_eq!(cell.depth(), 0);
    assert_eq!(cell.descriptors(), [0, 0]);
    assert_eq!(hex::encode(cell.hash()), "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7");
}

#[test]
fn test_padding() -> Result<(), CellError> {
    let cell = CellBuilder::new()
        .store_uint(0xdeadbeef, 32)?
        .store_bit(true)?
        .store_bit(false)?
        .store_bit(true)?
        .build();

    assert_eq!(cell.bits(), 35);
    assert_eq!(cell.descriptors(), [0, 9]);
    assert_eq!(hex::encode(cell.padded_data()), "deadbeefb0");
    assert_eq!(cell.read_uint(0, 32), Some(0xdeadbeef));
    assert_eq!(cell.read_uint(32, 3), Some(0b101));
    assert_eq!(cell.read_uint(33, 3), None);

    Ok(())
}

#[test]
fn test_coins() -> Result<(), CellError> {
    let cell = CellBuilder::new()
        .store_coins(Coins::ZERO)?
        .build();

    assert_eq!(cell.bits(), 4);
    assert_eq!(cell.read_uint(0, 4), Some(0));

    let cell = CellBuilder::new()
        .store_coins(Coins::from_nano(1_000_000_000))?
        .build();

    assert_eq!(cell.bits(), 36);
    assert_eq!(cell.read_uint(0, 4), Some(4));
    assert_eq!(cell.read_uint(4, 32), Some(1_000_000_000));

    assert_eq!(
        CellBuilder::new().store_coins(Coins::from_nano(MAX_COINS + 1)).map(|_| ()),
        Err(CellError::CoinsOverflow(MAX_COINS + 1))
    );

    Ok(())
}

#[test]
fn test_address() -> Result<(), CellError> {
    let address = Address::new(-1, [0xaa; 32]);

    let cell = CellBuilder::new()
        .store_address(&address)?
        .build();

    assert_eq!(cell.bits(), ADDRESS_BITS);
    assert_eq!(cell.read_uint(0, 3), Some(0b100));
    assert_eq!(cell.read_uint(3, 8), Some(0xff));
    assert_eq!(cell.read_uint(11, 128), Some(u128::from_be_bytes([0xaa; 16])));

    Ok(())
}

#[test]
fn test_limits() -> Result<(), CellError> {
    let mut builder = CellBuilder::new();

    for _ in 0..7 {
        builder.store_uint(0, 128)?;
    }

    builder.store_uint(0, 127)?;

    assert_eq!(builder.bits_left(), 0);

    assert_eq!(
        builder.store_bit(true).map(|_| ()),
        Err(CellError::BitsOverflow { requested: 1, available: 0 })
    );

    assert_eq!(
        CellBuilder::new().store_uint(256, 8).map(|_| ()),
        Err(CellError::ValueOverflow { value: 256, bits: 8 })
    );

    let child = Arc::new(CellBuilder::new().build());
    let mut builder = CellBuilder::new();

    for _ in 0..MAX_REFS {
        builder.store_ref(child.clone())?;
    }

    assert_eq!(builder.store_ref(child.clone()).map(|_| ()), Err(CellError::RefsOverflow));
    assert_eq!(builder.build().depth(), 1);

    Ok(())
}
