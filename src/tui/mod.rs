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

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use ratatui::Frame;
use ratatui::crossterm::event::{self, Event as TerminalEvent, KeyCode, KeyEventKind};

use ratatui::layout::*;
use ratatui::widgets::*;
use ratatui::style::*;

use tonwithdraw_protocol::types::address::Address;

use crate::consts::*;
use crate::form::{FormState, Event, Effect};
use crate::connector::{WalletConnector, TransactionOutcome};
use crate::rpc::TonClient;

pub mod app;

use app::BalanceQuery;

pub type RatatuiTerminal = ratatui::DefaultTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Selection {
    Wallet,
    Minter,
    Withdraw,
    Buttons
}

impl Selection {
    const fn prev(&self) -> Self {
        match self {
            Self::Wallet   => Self::Wallet,
            Self::Minter   => Self::Wallet,
            Self::Withdraw => Self::Minter,
            Self::Buttons  => Self::Withdraw
        }
    }

    const fn next(&self) -> Self {
        match self {
            Self::Wallet   => Self::Minter,
            Self::Minter   => Self::Withdraw,
            Self::Withdraw => Self::Buttons,
            Self::Buttons  => Self::Buttons
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SelectedButton {
    Send,
    Exit
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Status {
    /// Transaction link to be opened in the wallet.
    Link(String),

    Error(String)
}

struct Screen<T: WalletConnector> {
    form: FormState,
    connector: T,
    queries: UnboundedSender<BalanceQuery>,

    wallet_input: String,
    minter_input: String,
    withdraw_input: String,

    alert: Option<String>,
    status: Option<Status>
}

impl<T: WalletConnector> Screen<T> {
    fn input_mut(&mut self, selection: Selection) -> Option<&mut String> {
        match selection {
            Selection::Wallet   => Some(&mut self.wallet_input),
            Selection::Minter   => Some(&mut self.minter_input),
            Selection::Withdraw => Some(&mut self.withdraw_input),
            Selection::Buttons  => None
        }
    }

    /// Pass event to the form and perform the produced effect.
    fn dispatch(&mut self, event: Event) {
        let (form, effect) = std::mem::take(&mut self.form).update(event);

        self.form = form;
        self.withdraw_input = self.form.withdraw_input().to_string();

        match effect {
            Some(Effect::FetchBalance { token, address }) => {
                self.status = None;

                if let Err(err) = self.queries.send(BalanceQuery { token, address }) {
                    tracing::error!(?err, "balance queries handler is closed");

                    self.dispatch(Event::BalanceFailed {
                        token,
                        error: err.to_string()
                    });
                }
            }

            Some(Effect::SendTransaction(request)) => {
                self.status = match self.connector.send_transaction(&request) {
                    Ok(TransactionOutcome::Presented { link }) => Some(Status::Link(link)),

                    Err(err) => {
                        tracing::warn!(?err, "failed to send transaction");

                        Some(Status::Error(err.to_string()))
                    }
                };
            }

            Some(Effect::Alert(text)) => self.alert = Some(text),

            None => ()
        }
    }

    /// Commit the field value if it was changed.
    fn commit(&mut self, selection: Selection) {
        match selection {
            Selection::Wallet => {
                let input = self.wallet_input.trim();

                if input.is_empty() {
                    self.connector.disconnect();

                    return;
                }

                match Address::parse(input) {
                    Ok(account) if self.connector.account() != Some(&account) => {
                        self.connector.connect(account);
                    }

                    Ok(_) => (),

                    // Never keep the old account behind a different text.
                    Err(err) => {
                        tracing::warn!(?err, "invalid wallet address");

                        self.connector.disconnect();
                    }
                }
            }

            Selection::Minter if self.minter_input != self.form.minter_input() => {
                self.dispatch(Event::MinterChanged(self.minter_input.clone()));
            }

            Selection::Withdraw if self.withdraw_input != self.form.withdraw_input() => {
                self.dispatch(Event::WithdrawChanged(self.withdraw_input.clone()));
            }

            _ => ()
        }
    }

    fn submit(&mut self) {
        let account = self.connector.account().copied();

        self.dispatch(Event::Submit {
            account,
            now: time::UtcDateTime::now().unix_timestamp()
        });
    }

    fn render(
        &self,
        frame: &mut Frame,
        selection: Selection,
        selected_button: SelectedButton
    ) {
        // Calculate areas for all the widgets.

        let [_, area, _] = Layout::horizontal([
            Constraint::Percentage(15),
            Constraint::Fill(1),
            Constraint::Percentage(15)
        ]).areas(frame.area());

        let [
            _,
            wallet_area,
            minter_area,
            balance_area,
            _,
            withdraw_area,
            fee_area,
            receive_area,
            _,
            buttons_area,
            _,
            status_area,
            _
        ] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Fill(1)
        ]).areas(area);

        let [_, send_button_area, _, exit_button_area, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(1),
            Constraint::Length(8),
            Constraint::Fill(1)
        ]).areas(buttons_area);

        // Prepare styles.

        let disabled_style = Style::new().fg(TUI_DISABLED_COLOR);

        let primary_block = Block::bordered()
            .border_style(Style::new().fg(TUI_PRIMARY_COLOR));

        let field_block = |field: Selection| {
            if selection == field {
                primary_block.clone()
            } else {
                Block::bordered()
            }
        };

        // Draw inputs.

        let wallet_title = match self.connector.account() {
            Some(_) => "wallet (connected)",
            None => "wallet (not connected)"
        };

        frame.render_widget(
            Paragraph::new(self.wallet_input.as_str())
                .block(field_block(Selection::Wallet).title_top(wallet_title)),
            wallet_area
        );

        frame.render_widget(
            Paragraph::new(self.minter_input.as_str())
                .block(field_block(Selection::Minter).title_top("minter")),
            minter_area
        );

        let balance = match self.form.balance() {
            Some(balance) => format!("BALANCE: {balance}"),
            None if self.form.is_pending() => String::from("BALANCE: loading..."),
            None => String::new()
        };

        frame.render_widget(Paragraph::new(balance), balance_area);

        frame.render_widget(
            Paragraph::new(self.withdraw_input.as_str())
                .block(field_block(Selection::Withdraw).title_top("withdraw")),
            withdraw_area
        );

        if let (Some(fee), Some(receive)) = (self.form.fee(), self.form.receive()) {
            frame.render_widget(Paragraph::new(format!("FEE: {fee}")), fee_area);
            frame.render_widget(Paragraph::new(format!("TO RECEIVE: {receive}")), receive_area);
        }

        // Draw buttons.

        let mut send_button = Paragraph::new("send")
            .centered()
            .block(Block::bordered());

        let mut exit_button = Paragraph::new("exit")
            .centered()
            .block(Block::bordered());

        if selection == Selection::Buttons {
            match selected_button {
                SelectedButton::Send => send_button = send_button.block(primary_block),
                SelectedButton::Exit => exit_button = exit_button.block(primary_block)
            }
        }

        frame.render_widget(send_button, send_button_area);
        frame.render_widget(exit_button, exit_button_area);

        // Draw transaction status.

        match &self.status {
            Some(Status::Link(link)) => {
                frame.render_widget(
                    Paragraph::new(format!("open in your wallet to approve:\n{link}"))
                        .wrap(Wrap { trim: false }),
                    status_area
                );
            }

            Some(Status::Error(err)) => {
                frame.render_widget(
                    Paragraph::new(err.as_str())
                        .style(Style::new().fg(TUI_ERROR_COLOR))
                        .wrap(Wrap { trim: false }),
                    status_area
                );
            }

            None => {
                frame.render_widget(
                    Paragraph::new("tab / arrows - move, enter - apply, esc - exit")
                        .style(disabled_style),
                    status_area
                );
            }
        }

        // Draw alert over everything else.

        if let Some(alert) = &self.alert {
            let [_, alert_area, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(5),
                Constraint::Fill(1)
            ]).areas(frame.area());

            let [_, alert_area, _] = Layout::horizontal([
                Constraint::Fill(1),
                Constraint::Length(40),
                Constraint::Fill(1)
            ]).areas(alert_area);

            frame.render_widget(Clear, alert_area);

            frame.render_widget(
                Paragraph::new(format!("\n{alert}"))
                    .centered()
                    .block({
                        Block::bordered()
                            .border_style(Style::new().fg(TUI_ERROR_COLOR))
                            .title_top("alert")
                    }),
                alert_area
            );
        }
    }
}

/// Run the withdrawal form.
///
/// Keyboard input and rendering happen here while balance queries run as
/// background tasks (see the `app` mod) and report back over a channel
/// drained between key presses.
pub async fn run_app(
    runtime: Handle,
    client: TonClient,
    connector: impl WalletConnector,
    minter: Option<Address>,
    terminal: &mut RatatuiTerminal
) -> anyhow::Result<()> {
    let (queries, mut updates) = app::run_queries_handler(runtime, client);

    let mut screen = Screen {
        form: FormState::default(),
        wallet_input: connector.account()
            .map(Address::to_string)
            .unwrap_or_default(),
        connector,
        queries,

        minter_input: String::new(),
        withdraw_input: String::new(),

        alert: None,
        status: None
    };

    if let Some(minter) = minter {
        screen.minter_input = minter.to_string();

        screen.commit(Selection::Minter);
    }

    let mut selection = Selection::Wallet;
    let mut selected_button = SelectedButton::Send;

    loop {
        while let Ok(event) = updates.try_recv() {
            screen.dispatch(event);
        }

        terminal.draw(|frame| screen.render(frame, selection, selected_button))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        match event::read()? {
            TerminalEvent::Key(key) if key.kind == KeyEventKind::Press => {
                // Any key closes the alert.
                if screen.alert.take().is_some() {
                    continue;
                }

                match key.code {
                    KeyCode::Esc => return Ok(()),

                    KeyCode::Char(char) => {
                        if let Some(input) = screen.input_mut(selection) {
                            input.push(char);
                        }
                    }

                    KeyCode::Backspace => {
                        if let Some(input) = screen.input_mut(selection) {
                            input.pop();
                        }
                    }

                    KeyCode::Up | KeyCode::PageUp | KeyCode::BackTab => {
                        screen.commit(selection);

                        selection = selection.prev();
                    }

                    KeyCode::Down | KeyCode::PageDown | KeyCode::Tab => {
                        screen.commit(selection);

                        selection = selection.next();
                    }

                    KeyCode::Left if selection == Selection::Buttons => {
                        selected_button = SelectedButton::Send;
                    }

                    KeyCode::Right if selection == Selection::Buttons => {
                        selected_button = SelectedButton::Exit;
                    }

                    KeyCode::Enter => match selection {
                        Selection::Buttons => match selected_button {
                            SelectedButton::Send => screen.submit(),
                            SelectedButton::Exit => return Ok(())
                        }

                        _ => screen.commit(selection)
                    }

                    _ => ()
                }
            }

            TerminalEvent::Paste(text) => {
                if let Some(input) = screen.input_mut(selection) {
                    input.push_str(&text);
                }
            }

            _ => ()
        }
    }
}

#[cfg(test)]
fn test_screen() -> (Screen<crate::connector::TransferLinkConnector>, tokio::sync::mpsc::UnboundedReceiver<BalanceQuery>) {
    let (queries, receiver) = tokio::sync::mpsc::unbounded_channel();

    let screen = Screen {
        form: FormState::default(),
        connector: crate::connector::TransferLinkConnector::new(false),
        queries,

        wallet_input: String::new(),
        minter_input: String::new(),
        withdraw_input: String::new(),

        alert: None,
        status: None
    };

    (screen, receiver)
}

#[test]
fn test_wallet_commit() {
    let (mut screen, _receiver) = test_screen();

    let account = Address::new(0, [1; 32]);

    screen.wallet_input = account.to_string();
    screen.commit(Selection::Wallet);

    assert_eq!(screen.connector.account(), Some(&account));

    // Broken checksum must not leave the old account connected.
    screen.wallet_input = String::from("EQCqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqseX");
    screen.commit(Selection::Wallet);

    assert_eq!(screen.connector.account(), None);

    screen.wallet_input = account.to_string();
    screen.commit(Selection::Wallet);

    assert_eq!(screen.connector.account(), Some(&account));

    screen.wallet_input.clear();
    screen.commit(Selection::Wallet);

    assert_eq!(screen.connector.account(), None);
}

#[test]
fn test_minter_commit() {
    let (mut screen, mut receiver) = test_screen();

    let minter = Address::new(0, [0xaa; 32]);

    screen.minter_input = minter.to_string();
    screen.commit(Selection::Minter);

    assert!(screen.form.is_pending());
    assert_eq!(receiver.try_recv().ok(), Some(BalanceQuery { token: 1, address: minter }));

    // Queries handler is gone: the balance must not stay loading.
    drop(receiver);

    screen.minter_input = Address::new(0, [0xbb; 32]).to_string();
    screen.commit(Selection::Minter);

    assert!(!screen.form.is_pending());
    assert_eq!(screen.form.balance(), None);
}
