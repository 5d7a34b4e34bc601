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

use serde::Deserialize;
use serde_json::{json, Value as Json};

use tonwithdraw_protocol::prelude::*;

/// List of the TON Access nodes with their health status.
pub const ACCESS_NODES_URL: &str = "https://ton.access.orbs.network/mngr/nodes";

/// Base URL of the TON Access gateway.
pub const ACCESS_GATEWAY_URL: &str = "https://ton.access.orbs.network";

pub const TONCENTER_MAINNET_URL: &str = "https://toncenter.com/api/v2/jsonRPC";
pub const TONCENTER_TESTNET_URL: &str = "https://testnet.toncenter.com/api/v2/jsonRPC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Network {
    Mainnet,
    Testnet
}

impl Network {
    /// Public toncenter endpoint used when discovery is not possible.
    pub const fn fallback_endpoint(&self) -> &'static str {
        match self {
            Self::Mainnet => TONCENTER_MAINNET_URL,
            Self::Testnet => TONCENTER_TESTNET_URL
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet"),
            Self::Testnet => f.write_str("testnet")
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("node error {code}: {message}")]
    Node {
        code: i64,
        message: String
    },

    #[error("invalid node response: {0}")]
    InvalidResponse(String),

    #[error("none of TON Access nodes is healthy")]
    NoHealthyNodes
}

/// Chain client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub network: Network,

    /// JSON-RPC endpoint. Discovered using TON Access if unset.
    pub endpoint: Option<String>,

    /// Value of the `X-API-Key` header.
    pub api_key: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessNode {
    #[serde(rename = "NodeId")]
    pub node_id: String,

    #[serde(rename = "Healthy", default)]
    pub healthy: Json
}

impl AccessNode {
    pub fn is_healthy(&self) -> bool {
        match &self.healthy {
            Json::String(value) => value == "1",
            Json::Number(value) => value.as_u64() == Some(1),
            Json::Bool(value) => *value,

            _ => false
        }
    }
}

/// Choose toncenter JSON-RPC endpoint of the first healthy TON Access node.
pub fn access_endpoint(nodes: &[AccessNode], network: Network) -> Option<String> {
    nodes.iter()
        .find(|node| node.is_healthy())
        .map(|node| {
            format!(
                "{ACCESS_GATEWAY_URL}/{}/1/{network}/toncenter-api-v2/jsonRPC",
                node.node_id
            )
        })
}

fn http_client() -> Result<reqwest::Client, RpcError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    Ok(client)
}

/// Discover JSON-RPC endpoint using TON Access nodes list.
pub async fn discover_endpoint(network: Network) -> Result<String, RpcError> {
    let response = http_client()?
        .get(ACCESS_NODES_URL)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(RpcError::Status(response.status()));
    }

    let nodes = response.json::<Vec<AccessNode>>().await?;

    access_endpoint(&nodes, network)
        .ok_or(RpcError::NoHealthyNodes)
}

/// Resolve the endpoint and create a chain client.
///
/// Configured endpoint always wins. Otherwise TON Access discovery is used
/// and on its failure the public toncenter endpoint is taken.
pub async fn connect(config: &RpcConfig) -> Result<TonClient, RpcError> {
    let endpoint = match &config.endpoint {
        Some(endpoint) => endpoint.clone(),

        None => match discover_endpoint(config.network).await {
            Ok(endpoint) => endpoint,
            Err(err) => {
                tracing::warn!(?err, "failed to discover endpoint, using public toncenter");

                config.network.fallback_endpoint().to_string()
            }
        }
    };

    tracing::info!(%endpoint, network = %config.network, "using chain endpoint");

    TonClient::new(endpoint, config.api_key.clone())
}

/// Extract balance from the `getAddressBalance` JSON-RPC response.
pub fn parse_balance_response(response: &Json) -> Result<Coins, RpcError> {
    let ok = response.get("ok")
        .and_then(Json::as_bool)
        .unwrap_or(false);

    if !ok {
        return Err(RpcError::Node {
            code: response.get("code")
                .and_then(Json::as_i64)
                .unwrap_or_default(),

            message: response.get("error")
                .and_then(Json::as_str)
                .unwrap_or("unknown error")
                .to_string()
        });
    }

    let balance = match response.get("result") {
        Some(Json::String(balance)) => balance.parse::<u128>().ok(),
        Some(Json::Number(balance)) => balance.as_u64().map(u128::from),

        _ => None
    };

    balance.map(Coins::from_nano)
        .ok_or_else(|| RpcError::InvalidResponse(response.to_string()))
}

/// toncenter v2 JSON-RPC client.
#[derive(Debug, Clone)]
pub struct TonClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>
}

impl TonClient {
    pub fn new(
        endpoint: impl ToString,
        api_key: Option<String>
    ) -> Result<Self, RpcError> {
        Ok(Self {
            http: http_client()?,
            endpoint: endpoint.to_string(),
            api_key
        })
    }

    #[inline(always)]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: Json) -> Result<Json, RpcError> {
        let mut request = self.http.post(&self.endpoint)
            .json(&json!({
                "id": 1,
                "jsonrpc": "2.0",
                "method": method,
                "params": params
            }));

        if let Some(api_key) = &self.api_key {
            request = request.header("X-API-Key", api_key);
        }

        let response = request.send().await?;

        // toncenter reports method errors with non-200 status and a JSON
        // body, so try to read it first.
        let status = response.status();

        match response.json::<Json>().await {
            Ok(json) => Ok(json),
            Err(_) if !status.is_success() => Err(RpcError::Status(status)),
            Err(err) => Err(err.into())
        }
    }

    /// Get balance of the account in nanotons.
    pub async fn get_balance(&self, address: &Address) -> Result<Coins, RpcError> {
        let response = self.call("getAddressBalance", json!({
            "address": address.to_string()
        })).await?;

        parse_balance_response(&response)
    }
}

#[test]
fn test_access_endpoint() -> Result<(), serde_json::Error> {
    let nodes = serde_json::from_value::<Vec<AccessNode>>(json!([
        { "NodeId": "broken", "Healthy": "0" },
        { "NodeId": "missing" },
        { "NodeId": "node-1", "Healthy": "1", "Weight": 10 },
        { "NodeId": "node-2", "Healthy": "1" }
    ]))?;

    assert_eq!(
        access_endpoint(&nodes, Network::Mainnet).as_deref(),
        Some("https://ton.access.orbs.network/node-1/1/mainnet/toncenter-api-v2/jsonRPC")
    );

    assert_eq!(
        access_endpoint(&nodes, Network::Testnet).as_deref(),
        Some("https://ton.access.orbs.network/node-1/1/testnet/toncenter-api-v2/jsonRPC")
    );

    assert_eq!(access_endpoint(&nodes[..2], Network::Mainnet), None);

    Ok(())
}

#[test]
fn test_balance_response() {
    let balance = parse_balance_response(&json!({
        "ok": true,
        "result": "1050000000",
        "id": 1,
        "jsonrpc": "2.0"
    }));

    assert_eq!(balance.ok(), Some(Coins::from_nano(1_050_000_000)));

    let balance = parse_balance_response(&json!({
        "ok": true,
        "result": 42
    }));

    assert_eq!(balance.ok(), Some(Coins::from_nano(42)));

    let error = parse_balance_response(&json!({
        "ok": false,
        "error": "Incorrect address",
        "code": 416
    }));

    assert!(matches!(error, Err(RpcError::Node { code: 416, .. })));

    let error = parse_balance_response(&json!({
        "ok": true,
        "result": "not a number"
    }));

    assert!(matches!(error, Err(RpcError::InvalidResponse(_))));
}
