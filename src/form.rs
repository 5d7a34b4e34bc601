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

use tonwithdraw_protocol::prelude::*;

use crate::consts::*;
use crate::connector::{TransactionRequest, TransactionMessage};

/// Input of the form. Every event produces a new form state and at most one
/// effect which should be performed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Minter address field is changed.
    MinterChanged(String),

    /// Balance query is finished.
    BalanceResolved {
        token: u64,
        balance: Coins
    },

    /// Balance query has failed.
    BalanceFailed {
        token: u64,
        error: String
    },

    /// Withdrawal amount field is changed.
    WithdrawChanged(String),

    /// Send button is pressed.
    Submit {
        /// Currently connected wallet.
        account: Option<Address>,

        /// Current unix timestamp in seconds.
        now: i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Query balance of the minter contract. The result must be reported
    /// back with the same token.
    FetchBalance {
        token: u64,
        address: Address
    },

    /// Present the transaction to the connected wallet.
    SendTransaction(TransactionRequest),

    /// Show blocking alert to the user.
    Alert(String)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithdrawStatus {
    /// No valid withdrawal amount is set.
    Empty,

    /// Withdrawal amount is set and can be sent.
    Valid
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    minter_input: String,
    minter: Option<Address>,
    balance: Option<Coins>,
    withdraw_input: String,
    withdraw: Option<Coins>,

    /// Token of the last issued balance query.
    last_token: u64,

    /// Token of the balance query which is still awaited.
    pending_token: Option<u64>
}

impl FormState {
    #[inline(always)]
    pub fn minter_input(&self) -> &str {
        &self.minter_input
    }

    #[inline(always)]
    pub const fn minter(&self) -> Option<&Address> {
        self.minter.as_ref()
    }

    /// Last fetched balance of the minter contract.
    #[inline(always)]
    pub const fn balance(&self) -> Option<Coins> {
        self.balance
    }

    /// Is balance query still running.
    #[inline(always)]
    pub const fn is_pending(&self) -> bool {
        self.pending_token.is_some()
    }

    #[inline(always)]
    pub fn withdraw_input(&self) -> &str {
        &self.withdraw_input
    }

    /// Active withdrawal amount.
    #[inline(always)]
    pub const fn withdraw(&self) -> Option<Coins> {
        self.withdraw
    }

    pub const fn withdraw_status(&self) -> WithdrawStatus {
        match self.withdraw {
            Some(_) => WithdrawStatus::Valid,
            None => WithdrawStatus::Empty
        }
    }

    /// Protocol fee of the active withdrawal.
    #[inline]
    pub fn fee(&self) -> Option<Coins> {
        self.withdraw.map(fee)
    }

    /// Amount the user receives for the active withdrawal.
    #[inline]
    pub fn receive(&self) -> Option<Coins> {
        self.withdraw.map(net)
    }

    pub fn request(&self) -> Option<WithdrawalRequest> {
        Some(WithdrawalRequest::new(self.minter?, self.withdraw?))
    }

    fn set_withdraw(&mut self, amount: Coins) {
        self.withdraw = Some(amount);
        self.withdraw_input = amount.to_string();
    }

    fn clear_withdraw(&mut self) {
        self.withdraw = None;
        self.withdraw_input.clear();
    }

    /// Check that `amount` can be withdrawn from the contract with the given
    /// balance: the amount is at least `MIN_STORAGE` and strictly more than
    /// `MIN_STORAGE` stays on the contract afterwards.
    pub fn is_valid_withdraw(balance: Option<Coins>, amount: Coins) -> bool {
        let Some(balance) = balance else {
            return false;
        };

        if amount < MIN_STORAGE {
            return false;
        }

        // balance - MIN_STORAGE - amount > 0
        match MIN_STORAGE.checked_add(amount) {
            Some(required) => balance > required,
            None => false
        }
    }

    pub fn update(mut self, event: Event) -> (Self, Option<Effect>) {
        match event {
            Event::MinterChanged(text) => {
                let address = Address::parse(text.trim());

                self.minter_input = text;

                // Malformed addresses are silently ignored.
                let Ok(address) = address else {
                    return (self, None);
                };

                self.last_token += 1;

                let token = self.last_token;

                tracing::debug!(minter = %address, token, "requesting minter balance");

                self.minter = Some(address);
                self.balance = None;
                self.pending_token = Some(token);

                self.clear_withdraw();

                (self, Some(Effect::FetchBalance { token, address }))
            }

            Event::BalanceResolved { token, balance } => {
                if self.pending_token != Some(token) {
                    tracing::debug!(token, last_token = self.last_token, "discarding stale balance");

                    return (self, None);
                }

                tracing::debug!(token, %balance, "minter balance resolved");

                self.pending_token = None;
                self.balance = Some(balance);

                match balance.checked_sub(MIN_STORAGE) {
                    Some(default) if balance > MIN_STORAGE => self.set_withdraw(default),
                    _ => self.clear_withdraw()
                }

                (self, None)
            }

            Event::BalanceFailed { token, error } => {
                if self.pending_token == Some(token) {
                    tracing::warn!(token, %error, "failed to fetch minter balance");

                    self.pending_token = None;
                }

                (self, None)
            }

            Event::WithdrawChanged(text) => {
                let amount = Coins::from_decimal(&text);

                self.withdraw_input = text;

                match amount {
                    Ok(amount) if Self::is_valid_withdraw(self.balance, amount) => {
                        self.set_withdraw(amount);
                    }

                    Ok(_) | Err(CoinsError::Negative(_)) | Err(CoinsError::Overflow(_)) => {
                        self.clear_withdraw();
                    }

                    // Not a number: keep the state untouched.
                    Err(_) => ()
                }

                (self, None)
            }

            Event::Submit { account, now } => {
                let Some(owner) = account else {
                    return (self, Some(Effect::Alert(String::from(NOT_CONNECTED_ALERT))));
                };

                let (Some(minter), Some(_), Some(withdraw)) = (self.minter, self.balance, self.withdraw) else {
                    return (self, None);
                };

                if withdraw < MIN_STORAGE {
                    return (self, None);
                }

                let payload = match build_mint_payload(owner, withdraw, *FEE_ADDRESS) {
                    Ok(payload) => payload,
                    Err(err) => {
                        tracing::error!(?err, "failed to build mint payload");

                        return (self, None);
                    }
                };

                let request = TransactionRequest {
                    valid_until: now + TRANSACTION_VALID_FOR,
                    messages: vec![
                        TransactionMessage {
                            address: minter,
                            amount: ATTACHED_GAS,
                            payload
                        }
                    ]
                };

                (self, Some(Effect::SendTransaction(request)))
            }
        }
    }
}

#[cfg(test)]
const MINTER: &str = "EQCqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqseb";

#[cfg(test)]
fn ton(text: &str) -> Coins {
    Coins::from_decimal(text).expect("invalid test amount")
}

#[cfg(test)]
fn with_balance(balance: Coins) -> FormState {
    let (state, effect) = FormState::default()
        .update(Event::MinterChanged(MINTER.to_string()));

    let Some(Effect::FetchBalance { token, .. }) = effect else {
        panic!("balance query expected, got {effect:?}");
    };

    let (state, effect) = state.update(Event::BalanceResolved { token, balance });

    assert_eq!(effect, None);

    state
}

#[test]
fn test_malformed_minter() {
    let (state, effect) = FormState::default()
        .update(Event::MinterChanged(String::from("not an address")));

    assert_eq!(effect, None);
    assert_eq!(state.minter(), None);
    assert!(!state.is_pending());
    assert_eq!(state.minter_input(), "not an address");
}

#[test]
fn test_raw_minter() {
    let (state, effect) = FormState::default()
        .update(Event::MinterChanged(format!("0:{}", "aa".repeat(32))));

    assert_eq!(effect, Some(Effect::FetchBalance {
        token: 1,
        address: Address::new(0, [0xaa; 32])
    }));

    assert!(state.is_pending());
}

#[test]
fn test_default_withdraw() {
    let state = with_balance(ton("1"));

    assert_eq!(state.balance(), Some(ton("1")));
    assert_eq!(state.withdraw(), Some(ton("0.95")));
    assert_eq!(state.withdraw_input(), "0.95");
    assert_eq!(state.withdraw_status(), WithdrawStatus::Valid);
    assert_eq!(state.fee(), Some(ton("0.095")));
    assert_eq!(state.receive(), Some(ton("0.855")));

    // No default when there's nothing above the storage reserve.
    let state = with_balance(ton("0.05"));

    assert_eq!(state.balance(), Some(ton("0.05")));
    assert_eq!(state.withdraw(), None);
    assert_eq!(state.withdraw_status(), WithdrawStatus::Empty);
}

#[test]
fn test_validator() {
    // Balance is unknown.
    let (state, _) = FormState::default().update(Event::WithdrawChanged(String::from("1")));

    assert_eq!(state.withdraw(), None);
    assert_eq!(state.withdraw_input(), "");

    // Less than the storage reserve.
    let (state, _) = with_balance(ton("100")).update(Event::WithdrawChanged(String::from("0.04")));

    assert_eq!(state.withdraw(), None);
    assert_eq!(state.fee(), None);
    assert_eq!(state.receive(), None);

    // 0.10 - 0.05 - 0.06 = -0.01 <= 0
    let (state, _) = with_balance(ton("0.1")).update(Event::WithdrawChanged(String::from("0.06")));

    assert_eq!(state.withdraw(), None);

    // 1.0 - 0.05 - 0.95 = 0 <= 0
    let (state, _) = with_balance(ton("1")).update(Event::WithdrawChanged(String::from("0.95")));

    assert_eq!(state.withdraw(), None);

    // 1.0 - 0.05 - 0.90 = 0.05 > 0
    let (state, _) = with_balance(ton("1")).update(Event::WithdrawChanged(String::from("0.90")));

    assert_eq!(state.withdraw(), Some(ton("0.9")));
    assert_eq!(state.withdraw_input(), "0.9");
    assert_eq!(state.fee().map(|fee| fee.to_string()).as_deref(), Some("0.09"));
    assert_eq!(state.receive().map(|net| net.to_string()).as_deref(), Some("0.81"));

    let request = state.request().expect("request expected");

    assert_eq!(request.gross(), ton("0.9"));
    assert_eq!(request.fee(), ton("0.09"));
    assert_eq!(request.net(), ton("0.81"));

    // Negative values are invalid.
    let (state, _) = state.update(Event::WithdrawChanged(String::from("-1")));

    assert_eq!(state.withdraw(), None);
    assert_eq!(state.request(), None);
}

#[test]
fn test_not_a_number() {
    let state = with_balance(ton("1"));

    let (state, effect) = state.update(Event::WithdrawChanged(String::from("abc")));

    assert_eq!(effect, None);
    assert_eq!(state.withdraw(), Some(ton("0.95")));
    assert_eq!(state.withdraw_input(), "abc");
}

#[test]
fn test_huge_withdraw() {
    let state = with_balance(ton("1"));

    // Still a number, but more than any balance can hold.
    let (state, _) = state.update(Event::WithdrawChanged(String::from("99999999999999999999999999999999999999")));

    assert_eq!(state.withdraw(), None);
    assert_eq!(state.withdraw_input(), "");
    assert_eq!(state.fee(), None);

    let (_, effect) = state.update(Event::Submit {
        account: Some(Address::new(0, [1; 32])),
        now: 0
    });

    assert_eq!(effect, None);
}

#[test]
fn test_latest_balance_wins() {
    let (state, first) = FormState::default()
        .update(Event::MinterChanged(MINTER.to_string()));

    let (state, second) = state.update(Event::MinterChanged(format!("0:{}", "bb".repeat(32))));

    let (Some(Effect::FetchBalance { token: first, .. }), Some(Effect::FetchBalance { token: second, .. })) = (first, second) else {
        panic!("two balance queries expected");
    };

    assert!(second > first);

    // Newer query resolves first, the older one must be discarded.
    let (state, _) = state.update(Event::BalanceResolved { token: second, balance: ton("2") });
    let (state, _) = state.update(Event::BalanceResolved { token: first, balance: ton("100") });

    assert_eq!(state.minter(), Some(&Address::new(0, [0xbb; 32])));
    assert_eq!(state.balance(), Some(ton("2")));
    assert_eq!(state.withdraw(), Some(ton("1.95")));

    // Failure of a stale query is ignored as well.
    let (state, _) = state.update(Event::BalanceFailed { token: first, error: String::from("timeout") });

    assert_eq!(state.balance(), Some(ton("2")));
}

#[test]
fn test_new_minter_resets_balance() {
    let state = with_balance(ton("1"));

    let (state, _) = state.update(Event::MinterChanged(format!("0:{}", "bb".repeat(32))));

    assert_eq!(state.balance(), None);
    assert_eq!(state.withdraw(), None);
    assert!(state.is_pending());

    let (state, _) = state.update(Event::BalanceFailed { token: 2, error: String::from("timeout") });

    assert!(!state.is_pending());
    assert_eq!(state.balance(), None);
}

#[test]
fn test_submit_without_wallet() {
    let state = with_balance(ton("1"));

    let (_, effect) = state.update(Event::Submit {
        account: None,
        now: 1_700_000_000
    });

    assert_eq!(effect, Some(Effect::Alert(String::from(NOT_CONNECTED_ALERT))));
}

#[test]
fn test_submit_without_prerequisites() {
    let account = Some(Address::new(0, [1; 32]));

    // No minter.
    let (_, effect) = FormState::default().update(Event::Submit { account, now: 0 });

    assert_eq!(effect, None);

    // Balance is still loading.
    let (state, _) = FormState::default().update(Event::MinterChanged(MINTER.to_string()));
    let (_, effect) = state.update(Event::Submit { account, now: 0 });

    assert_eq!(effect, None);

    // Default withdrawal is below the storage reserve: 0.08 - 0.05 = 0.03.
    let state = with_balance(ton("0.08"));

    assert_eq!(state.withdraw(), Some(ton("0.03")));

    let (_, effect) = state.update(Event::Submit { account, now: 0 });

    assert_eq!(effect, None);
}

#[test]
fn test_submit() -> Result<(), CellError> {
    let owner = Address::new(0, [1; 32]);

    let (state, _) = with_balance(ton("1")).update(Event::WithdrawChanged(String::from("0.9")));

    let (_, effect) = state.update(Event::Submit {
        account: Some(owner),
        now: 1_700_000_000
    });

    let Some(Effect::SendTransaction(request)) = effect else {
        panic!("transaction expected, got {effect:?}");
    };

    assert_eq!(request.valid_until, 1_700_000_360);
    assert_eq!(request.messages.len(), 1);

    let message = &request.messages[0];

    assert_eq!(message.address.to_string(), MINTER);
    assert_eq!(message.amount, ATTACHED_GAS);
    assert_eq!(message.payload, build_mint_payload(owner, ton("0.9"), *FEE_ADDRESS)?);

    Ok(())
}
