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

use std::collections::{HashMap, HashSet};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::Cell;

/// Bag of cells serialization magic bytes.
pub const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

/// Flag of the bag of cells header telling that CRC-32C trailer is present.
const FLAG_CRC32C: u8 = 0x40;

const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);

/// Minimal amount of bytes needed to store provided number (at least 1).
fn bytes_for(value: usize) -> usize {
    let bits = u64::BITS - (value as u64).leading_zeros();

    (bits as usize).div_ceil(8).max(1)
}

fn write_sized(out: &mut Vec<u8>, value: usize, size: usize) {
    let bytes = (value as u64).to_be_bytes();

    out.extend_from_slice(&bytes[bytes.len() - size..]);
}

/// Sort unique cells of the tree so that every cell goes before all the
/// cells it references. The root cell is always first.
fn topological_order(root: &Cell) -> Vec<&Cell> {
    fn visit<'a>(
        cell: &'a Cell,
        visited: &mut HashSet<[u8; 32]>,
        order: &mut Vec<&'a Cell>
    ) {
        if !visited.insert(*cell.hash()) {
            return;
        }

        for child in cell.refs() {
            visit(child, visited, order);
        }

        order.push(cell);
    }

    let mut visited = HashSet::new();
    let mut order = Vec::new();

    visit(root, &mut visited, &mut order);

    order.reverse();

    order
}

impl Cell {
    /// Serialize the cell tree as a single-root bag of cells with CRC-32C
    /// checksum and without cells index.
    pub fn to_boc(&self) -> Vec<u8> {
        let cells = topological_order(self);

        let indices = cells.iter()
            .enumerate()
            .map(|(i, cell)| (*cell.hash(), i))
            .collect::<HashMap<_, _>>();

        let size_bytes = bytes_for(cells.len());

        let total_size = cells.iter()
            .map(|cell| 2 + cell.bits().div_ceil(8) + cell.refs().len() * size_bytes)
            .sum::<usize>();

        let offset_bytes = bytes_for(total_size);

        let mut boc = Vec::with_capacity(32 + total_size);

        boc.extend_from_slice(&BOC_MAGIC);
        boc.push(FLAG_CRC32C | size_bytes as u8);
        boc.push(offset_bytes as u8);

        write_sized(&mut boc, cells.len(), size_bytes);
        write_sized(&mut boc, 1, size_bytes);
        write_sized(&mut boc, 0, size_bytes);
        write_sized(&mut boc, total_size, offset_bytes);

        // Root cell index.
        write_sized(&mut boc, 0, size_bytes);

        for cell in &cells {
            boc.extend_from_slice(&cell.descriptors());
            boc.extend_from_slice(&cell.padded_data());

            for child in cell.refs() {
                write_sized(&mut boc, indices[child.hash()], size_bytes);
            }
        }

        let checksum = CRC32C.checksum(&boc);

        boc.extend_from_slice(&checksum.to_le_bytes());

        boc
    }

    /// Serialize the cell tree as a bag of cells encoded in standard
    /// base64.
    #[inline]
    pub fn to_boc_base64(&self) -> String {
        STANDARD.encode(self.to_boc())
    }
}

#[test]
fn test_crc32c() {
    assert_eq!(CRC32C.checksum(b"123456789"), 0xe3069283);
}

#[test]
fn test_empty() {
    let cell = super::CellBuilder::new().build();

    assert_eq!(cell.to_boc_base64(), "te6cckEBAQEAAgAAAEysuc0=");
}

#[test]
fn test_deduplication() -> Result<(), super::CellError> {
    use std::sync::Arc;

    let child = Arc::new(super::CellBuilder::new()
        .store_uint(7, 8)?
        .build());

    let root = super::CellBuilder::new()
        .store_ref(child.clone())?
        .store_ref(child)?
        .build();

    let boc = root.to_boc();

    assert_eq!(&boc[..4], &BOC_MAGIC);
    assert_eq!(boc[4], FLAG_CRC32C | 1);

    // Two unique cells, one root, no absent cells.
    assert_eq!(&boc[6..9], &[2, 1, 0]);

    // Root goes first and references the same child twice.
    assert_eq!(&boc[11..15], &[2, 0, 1, 1]);

    let (body, checksum) = boc.split_at(boc.len() - 4);

    assert_eq!(checksum, &CRC32C.checksum(body).to_le_bytes());

    Ok(())
}
