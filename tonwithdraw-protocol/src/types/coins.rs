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

/// Amount of nanotons in one TON.
pub const NANOTONS_PER_TON: u128 = 1_000_000_000;

/// Amount of fractional decimal digits of the TON currency.
pub const DECIMALS: usize = 9;

/// Maximal value of the `VarUInteger 16` coins field (`2^120 - 1`).
pub const MAX_COINS: u128 = (1 << 120) - 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoinsError {
    #[error("invalid coins amount format: '{0}'")]
    Invalid(String),

    #[error("coins amount cannot be negative: '{0}'")]
    Negative(String),

    #[error("coins amount has more than 9 fractional digits: '{0}'")]
    TooPrecise(String),

    #[error("coins amount is too large: '{0}'")]
    Overflow(String)
}

/// Amount of the native currency stored as an exact integer count of
/// nanotons.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coins(u128);

impl Coins {
    pub const ZERO: Self = Self(0);

    #[inline(always)]
    pub const fn from_nano(nano: u128) -> Self {
        Self(nano)
    }

    #[inline(always)]
    pub const fn as_nano(&self) -> u128 {
        self.0
    }

    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(value) => Some(Self(value)),
            None => None
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(value) => Some(Self(value)),
            None => None
        }
    }

    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Parse decimal amount of TONs (e.g. `1.5` or `0.05`) into nanotons.
    ///
    /// Text is trimmed before parsing. Either the whole or the fractional
    /// part can be omitted (`.5`, `1.`) but not both. At most 9 fractional
    /// digits are allowed since nanoton is the smallest currency unit.
    pub fn from_decimal(text: impl AsRef<str>) -> Result<Self, CoinsError> {
        let text = text.as_ref().trim();

        if let Some(unsigned) = text.strip_prefix('-') {
            return match Self::from_decimal(unsigned) {
                Ok(_) | Err(CoinsError::TooPrecise(_)) | Err(CoinsError::Overflow(_)) => {
                    Err(CoinsError::Negative(text.to_string()))
                }

                Err(_) => Err(CoinsError::Invalid(text.to_string()))
            };
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, "")
        };

        let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());

        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(CoinsError::Invalid(text.to_string()));
        }

        if fraction.len() > DECIMALS {
            return Err(CoinsError::TooPrecise(text.to_string()));
        }

        let overflow = || CoinsError::Overflow(text.to_string());

        let whole = match whole {
            "" => 0,
            whole => whole.parse::<u128>().map_err(|_| overflow())?
        };

        let fraction = match fraction {
            "" => 0,
            fraction => {
                let digits = fraction.parse::<u128>()
                    .map_err(|_| CoinsError::Invalid(text.to_string()))?;

                digits * 10_u128.pow((DECIMALS - fraction.len()) as u32)
            }
        };

        let nano = whole.checked_mul(NANOTONS_PER_TON)
            .and_then(|whole| whole.checked_add(fraction))
            .ok_or_else(overflow)?;

        if nano > MAX_COINS {
            return Err(overflow());
        }

        Ok(Self(nano))
    }
}

impl std::fmt::Display for Coins {
    /// Format amount in TONs without trailing fractional zeros: `1`, `0.9`,
    /// `0.09`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / NANOTONS_PER_TON;
        let fraction = self.0 % NANOTONS_PER_TON;

        if fraction == 0 {
            return write!(f, "{whole}");
        }

        let fraction = format!("{fraction:09}");

        write!(f, "{whole}.{}", fraction.trim_end_matches('0'))
    }
}

impl FromStr for Coins {
    type Err = CoinsError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl From<u128> for Coins {
    #[inline(always)]
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Coins> for u128 {
    #[inline(always)]
    fn from(value: Coins) -> Self {
        value.0
    }
}

#[test]
fn test_parse() {
    assert_eq!(Coins::from_decimal("1"), Ok(Coins::from_nano(1_000_000_000)));
    assert_eq!(Coins::from_decimal("0.05"), Ok(Coins::from_nano(50_000_000)));
    assert_eq!(Coins::from_decimal(" 0.9 "), Ok(Coins::from_nano(900_000_000)));
    assert_eq!(Coins::from_decimal(".5"), Ok(Coins::from_nano(500_000_000)));
    assert_eq!(Coins::from_decimal("2."), Ok(Coins::from_nano(2_000_000_000)));
    assert_eq!(Coins::from_decimal("0.000000001"), Ok(Coins::from_nano(1)));

    assert!(matches!(Coins::from_decimal(""), Err(CoinsError::Invalid(_))));
    assert!(matches!(Coins::from_decimal("."), Err(CoinsError::Invalid(_))));
    assert!(matches!(Coins::from_decimal("abc"), Err(CoinsError::Invalid(_))));
    assert!(matches!(Coins::from_decimal("1,5"), Err(CoinsError::Invalid(_))));
    assert!(matches!(Coins::from_decimal("1.2.3"), Err(CoinsError::Invalid(_))));
    assert!(matches!(Coins::from_decimal("-abc"), Err(CoinsError::Invalid(_))));
    assert!(matches!(Coins::from_decimal("-1"), Err(CoinsError::Negative(_))));
    assert!(matches!(Coins::from_decimal("0.1234567891"), Err(CoinsError::TooPrecise(_))));
    assert!(matches!(Coins::from_decimal("2000000000000000000000000000"), Err(CoinsError::Overflow(_))));
}

#[test]
fn test_display() {
    assert_eq!(Coins::ZERO.to_string(), "0");
    assert_eq!(Coins::from_nano(1_000_000_000).to_string(), "1");
    assert_eq!(Coins::from_nano(900_000_000).to_string(), "0.9");
    assert_eq!(Coins::from_nano(90_000_000).to_string(), "0.09");
    assert_eq!(Coins::from_nano(810_000_000).to_string(), "0.81");
    assert_eq!(Coins::from_nano(12_000_000_001).to_string(), "12.000000001");

    for text in ["0.05", "1", "0.81", "123.456"] {
        assert_eq!(Coins::from_decimal(text).map(|coins| coins.to_string()), Ok(text.to_string()));
    }
}
