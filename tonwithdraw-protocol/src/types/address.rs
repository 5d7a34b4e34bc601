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

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use regex::Regex;

lazy_static::lazy_static! {
    /// Raw address format: `<workchain>:<64 hex characters>`.
    pub static ref RAW_ADDRESS_REGEX: Regex = Regex::new(r#"^(-?[0-9]+):([0-9a-fA-F]{64})$"#)
        .expect("failed to build raw address regex");

    /// Friendly address format: 48 characters of base64 or base64url.
    pub static ref FRIENDLY_ADDRESS_REGEX: Regex = Regex::new(r#"^[A-Za-z0-9+/_\-]{48}$"#)
        .expect("failed to build friendly address regex");
}

/// Checksum algorithm of the friendly address format.
const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid address format: '{0}'")]
    InvalidFormat(String),

    #[error("invalid address workchain: '{0}'")]
    InvalidWorkchain(String),

    #[error("invalid friendly address tag: {0:#04x}")]
    InvalidTag(u8),

    #[error("friendly address checksum mismatch")]
    InvalidChecksum
}

/// Flags of the friendly address representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FriendlyFlags {
    pub bounceable: bool,
    pub testnet: bool,
    pub url_safe: bool
}

impl Default for FriendlyFlags {
    #[inline]
    fn default() -> Self {
        Self {
            bounceable: true,
            testnet: false,
            url_safe: true
        }
    }
}

/// Standard account address: workchain id and 256 bit account hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32]
}

impl Address {
    #[inline(always)]
    pub const fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self {
            workchain,
            hash
        }
    }

    #[inline(always)]
    pub const fn workchain(&self) -> i8 {
        self.workchain
    }

    #[inline(always)]
    pub const fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Check if provided text is a valid friendly address.
    #[inline]
    pub fn is_friendly(text: impl AsRef<str>) -> bool {
        Self::parse_friendly(text).is_ok()
    }

    /// Check if provided text is a valid raw address.
    #[inline]
    pub fn is_raw(text: impl AsRef<str>) -> bool {
        Self::parse_raw(text).is_ok()
    }

    /// Parse address in either friendly or raw format.
    pub fn parse(text: impl AsRef<str>) -> Result<Self, AddressError> {
        let text = text.as_ref();

        if text.contains(':') {
            Self::parse_raw(text)
        } else {
            Self::parse_friendly(text).map(|(address, _)| address)
        }
    }

    /// Parse `<workchain>:<hex hash>` address.
    pub fn parse_raw(text: impl AsRef<str>) -> Result<Self, AddressError> {
        let text = text.as_ref();

        let Some(captures) = RAW_ADDRESS_REGEX.captures(text) else {
            return Err(AddressError::InvalidFormat(text.to_string()));
        };

        let workchain = captures[1].parse::<i8>()
            .map_err(|_| AddressError::InvalidWorkchain(captures[1].to_string()))?;

        let mut hash = [0; 32];

        hex::decode_to_slice(&captures[2], &mut hash)
            .map_err(|_| AddressError::InvalidFormat(text.to_string()))?;

        Ok(Self::new(workchain, hash))
    }

    /// Parse 48 characters long base64 (or base64url) address.
    pub fn parse_friendly(
        text: impl AsRef<str>
    ) -> Result<(Self, FriendlyFlags), AddressError> {
        let text = text.as_ref();

        if !FRIENDLY_ADDRESS_REGEX.is_match(text) {
            return Err(AddressError::InvalidFormat(text.to_string()));
        }

        let url_safe = text.contains(['-', '_']);

        // Both alphabets are accepted, even mixed within one address.
        let normalized = text.replace('-', "+").replace('_', "/");

        let bytes = STANDARD.decode(normalized)
            .map_err(|_| AddressError::InvalidFormat(text.to_string()))?;

        if bytes.len() != 36 {
            return Err(AddressError::InvalidFormat(text.to_string()));
        }

        let checksum = u16::from_be_bytes([bytes[34], bytes[35]]);

        if CRC16.checksum(&bytes[..34]) != checksum {
            return Err(AddressError::InvalidChecksum);
        }

        let testnet = bytes[0] & TAG_TESTNET != 0;

        let bounceable = match bytes[0] & !TAG_TESTNET {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,

            _ => return Err(AddressError::InvalidTag(bytes[0]))
        };

        let mut hash = [0; 32];

        hash.copy_from_slice(&bytes[2..34]);

        let address = Self::new(bytes[1] as i8, hash);

        Ok((address, FriendlyFlags {
            bounceable,
            testnet,
            url_safe
        }))
    }

    /// Format address as `<workchain>:<hex hash>`.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// Format address in the friendly base64 form.
    pub fn to_friendly(&self, flags: FriendlyFlags) -> String {
        let mut tag = if flags.bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };

        if flags.testnet {
            tag |= TAG_TESTNET;
        }

        let mut bytes = Vec::with_capacity(36);

        bytes.push(tag);
        bytes.push(self.workchain as u8);
        bytes.extend_from_slice(&self.hash);

        let checksum = CRC16.checksum(&bytes);

        bytes.extend_from_slice(&checksum.to_be_bytes());

        if flags.url_safe {
            URL_SAFE.encode(bytes)
        } else {
            STANDARD.encode(bytes)
        }
    }
}

impl std::fmt::Display for Address {
    /// Bounceable url-safe friendly representation.
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_friendly(FriendlyFlags::default()))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[test]
fn test_crc16() {
    assert_eq!(CRC16.checksum(b"123456789"), 0x31c3);
}

#[test]
fn test_friendly() -> Result<(), AddressError> {
    let (address, flags) = Address::parse_friendly("UQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT8U4")?;

    assert_eq!(address.workchain(), 0);
    assert_eq!(address.to_raw(), "0:3bd39014584ad07bd52be7a099cfebfa37d276bb0dbdf30fb7d590aee3be614f");

    assert!(!flags.bounceable);
    assert!(!flags.testnet);
    assert!(flags.url_safe);

    assert_eq!(address.to_friendly(flags), "UQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT8U4");
    assert_eq!(address.to_string(), "EQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT5j9");

    let (standard, flags) = Address::parse_friendly("UQA705AUWErQe9Ur56CZz+v6N9J2uw298w+31ZCu475hT8U4")?;

    assert_eq!(standard, address);
    assert!(!flags.url_safe);

    let (mixed, flags) = Address::parse_friendly("UQA705AUWErQe9Ur56CZz+v6N9J2uw298w-31ZCu475hT8U4")?;

    assert_eq!(mixed, address);
    assert!(flags.url_safe);

    let mut hash = [0; 32];

    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = i as u8;
    }

    let address = Address::new(0, hash);

    assert_eq!(address.to_string(), "EQAAAQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHx2j");

    assert_eq!(address.to_friendly(FriendlyFlags {
        bounceable: true,
        testnet: true,
        url_safe: true
    }), "kQAAAQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eH6Yp");

    let (_, flags) = Address::parse_friendly("kQAAAQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eH6Yp")?;

    assert!(flags.bounceable);
    assert!(flags.testnet);

    assert_eq!(Address::new(-1, [0xff; 32]).to_string(), "Ef___________________________________________7Sg");

    Ok(())
}

#[test]
fn test_raw() -> Result<(), AddressError> {
    let address = Address::parse_raw("-1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")?;

    assert_eq!(address, Address::new(-1, [0xaa; 32]));
    assert_eq!(address.to_raw(), format!("-1:{}", "aa".repeat(32)));
    assert_eq!(Address::parse(address.to_raw())?, address);
    assert_eq!(Address::parse(address.to_string())?, address);

    Ok(())
}

#[test]
fn test_invalid() {
    assert!(Address::is_friendly("EQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT5j9"));
    assert!(Address::is_raw("0:3bd39014584ad07bd52be7a099cfebfa37d276bb0dbdf30fb7d590aee3be614f"));

    // Broken checksum.
    assert_eq!(
        Address::parse_friendly("EQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT5j8"),
        Err(AddressError::InvalidChecksum)
    );

    assert!(!Address::is_friendly(""));
    assert!(!Address::is_friendly("EQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT5j"));
    assert!(!Address::is_friendly("0:3bd39014584ad07bd52be7a099cfebfa37d276bb0dbdf30fb7d590aee3be614f"));

    assert!(!Address::is_raw("0:3bd3"));
    assert!(!Address::is_raw("x:3bd39014584ad07bd52be7a099cfebfa37d276bb0dbdf30fb7d590aee3be614f"));
    assert!(!Address::is_raw("EQA705AUWErQe9Ur56CZz-v6N9J2uw298w-31ZCu475hT5j9"));

    assert!(matches!(
        Address::parse_raw("1000:3bd39014584ad07bd52be7a099cfebfa37d276bb0dbdf30fb7d590aee3be614f"),
        Err(AddressError::InvalidWorkchain(_))
    ));
}
