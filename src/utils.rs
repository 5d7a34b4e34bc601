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

use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Where the log records should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput<'a> {
    /// Append records to the file.
    File(&'a Path),

    Stderr,

    /// Logging is disabled.
    None
}

/// Install global tracing subscriber. Log level is taken from `RUST_LOG`
/// and defaults to `info`.
pub fn init_logging(output: LogOutput) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter);

    let result = match output {
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {path:?}"))?;

            subscriber.with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }

        LogOutput::Stderr => subscriber.with_writer(std::io::stderr).try_init(),
        LogOutput::None => return Ok(())
    };

    result.map_err(|err| anyhow::anyhow!(err).context("failed to install logger"))
}
