//! Typed read operations against one node endpoint.

use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Block, Transaction, TransactionReceipt};
use alloy::transports::{RpcError, TransportError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::NodeConfig;
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to a single remote node.
///
/// Purely observational: no operation mutates remote or local state, so the
/// handle is cheap to clone and safe for concurrent read-only use. A failed
/// call fails immediately; retry policy belongs to the caller.
#[derive(Clone)]
pub struct NodeAccessor {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: url::Url,
    timeout_duration: Duration,
}

impl NodeAccessor {
    /// Connect lazily: the endpoint URL is validated, but no network traffic
    /// happens until the first query.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| Error::Connection(format!("invalid endpoint URL {:?}: {}", endpoint, e)))?;
        let provider = ProviderBuilder::new().connect_http(url.clone());
        tracing::debug!(endpoint = %url, "node accessor created");
        Ok(Self {
            provider: Arc::new(provider),
            endpoint: url,
            timeout_duration: DEFAULT_TIMEOUT,
        })
    }

    /// Connect and eagerly verify the endpoint answers `eth_chainId`.
    pub async fn connect_checked(endpoint: &str) -> Result<Self> {
        let accessor = Self::connect(endpoint)?;
        let chain_id = accessor
            .chain_id()
            .await
            .map_err(|e| Error::Connection(format!("endpoint validation failed: {}", e)))?;
        tracing::info!(endpoint = %accessor.endpoint, chain_id, "connected to node");
        Ok(accessor)
    }

    /// Build from configuration (endpoint plus per-call timeout).
    pub fn from_config(config: &NodeConfig) -> Result<Self> {
        Ok(Self::connect(&config.rpc_url)?
            .with_timeout(Duration::from_secs(config.rpc_timeout_secs)))
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout_duration: Duration) -> Self {
        self.timeout_duration = timeout_duration;
        self
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Chain ID reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        let fut = self.provider.get_chain_id();
        self.call(async move { fut.await }, "eth_chainId").await
    }

    /// Latest block number.
    pub async fn block_number(&self) -> Result<u64> {
        let fut = self.provider.get_block_number();
        self.call(async move { fut.await }, "eth_blockNumber").await
    }

    /// Balance in wei at the given height, or the latest confirmed state
    /// when `at` is `None`.
    pub async fn balance(&self, address: Address, at: Option<u64>) -> Result<U256> {
        let fut = match at {
            Some(number) => self
                .provider
                .get_balance(address)
                .block_id(BlockId::number(number)),
            None => self.provider.get_balance(address).block_id(BlockId::latest()),
        };
        self.call(async move { fut.await }, "eth_getBalance").await
    }

    /// Balance including unconfirmed transactions in the node's pending
    /// pool. Not finalized; may change or vanish.
    pub async fn pending_balance(&self, address: Address) -> Result<U256> {
        tracing::debug!(address = %address, block = "pending", "querying pending balance");
        let fut = self
            .provider
            .get_balance(address)
            .block_id(BlockId::pending());
        self.call(async move { fut.await }, "eth_getBalance").await
    }

    /// Contract code at an address. Empty bytes mean a plain account; this
    /// is the sole account-type discriminator.
    pub async fn code(&self, address: Address, at: Option<u64>) -> Result<Bytes> {
        let fut = match at {
            Some(number) => self
                .provider
                .get_code_at(address)
                .block_id(BlockId::number(number)),
            None => self.provider.get_code_at(address).block_id(BlockId::latest()),
        };
        self.call(async move { fut.await }, "eth_getCode").await
    }

    /// Whether the address hosts contract bytecode at the latest height.
    pub async fn is_contract(&self, address: Address) -> Result<bool> {
        Ok(!self.code(address, None).await?.is_empty())
    }

    /// A block with its full transaction list; latest when `number` is
    /// `None`. Fails with [`Error::NotFound`] for heights the node does not
    /// know.
    pub async fn block(&self, number: Option<u64>) -> Result<Block> {
        let tag = match number {
            Some(n) => BlockNumberOrTag::Number(n),
            None => BlockNumberOrTag::Latest,
        };
        let fut = self.provider.get_block_by_number(tag).full();
        self.call(async move { fut.await }, "eth_getBlockByNumber")
            .await?
            .ok_or_else(|| Error::NotFound(format!("block {} not known to node", tag)))
    }

    /// Number of transactions in a block, addressed by hash or number.
    pub async fn transaction_count(&self, block: BlockId) -> Result<u64> {
        let count = match block {
            BlockId::Hash(hash) => {
                let fut = self
                    .provider
                    .get_block_transaction_count_by_hash(hash.block_hash);
                self.call(async move { fut.await }, "eth_getBlockTransactionCountByHash")
                    .await?
            }
            BlockId::Number(tag) => {
                let fut = self.provider.get_block_transaction_count_by_number(tag);
                self.call(async move { fut.await }, "eth_getBlockTransactionCountByNumber")
                    .await?
            }
        };
        count.ok_or_else(|| Error::NotFound(format!("block {} not known to node", block)))
    }

    /// A transaction by hash, plus whether it is still pending (not yet in a
    /// block). Fails with [`Error::NotFound`] for unknown hashes.
    pub async fn transaction(&self, hash: TxHash) -> Result<(Transaction, bool)> {
        let fut = self.provider.get_transaction_by_hash(hash);
        let tx = self
            .call(async move { fut.await }, "eth_getTransactionByHash")
            .await?
            .ok_or_else(|| Error::NotFound(format!("transaction {} not known to node", hash)))?;
        let is_pending = tx.block_hash.is_none();
        Ok((tx, is_pending))
    }

    /// The receipt of a mined transaction. Receipts do not exist for pending
    /// transactions, so those fail with [`Error::NotFound`].
    pub async fn receipt(&self, hash: TxHash) -> Result<TransactionReceipt> {
        let fut = self.provider.get_transaction_receipt(hash);
        self.call(async move { fut.await }, "eth_getTransactionReceipt")
            .await?
            .ok_or_else(|| Error::NotFound(format!("no receipt for {} (not mined?)", hash)))
    }

    async fn call<T, F>(&self, fut: F, what: &'static str) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, TransportError>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::debug!(rpc = what, error = %e, "RPC call failed");
                Err(map_rpc_error(e))
            }
            Err(_) => Err(Error::Connection(format!(
                "{} timed out after {:?}",
                what, self.timeout_duration
            ))),
        }
    }
}

impl std::fmt::Debug for NodeAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeAccessor")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

/// Parse a hex address string, failing with [`Error::Query`] on malformed
/// input. Accepts the `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address> {
    s.parse()
        .map_err(|e| Error::Query(format!("malformed address {:?}: {}", s, e)))
}

fn map_rpc_error(e: TransportError) -> Error {
    match e {
        // The node answered with a JSON-RPC error object: our request was
        // understood but rejected.
        RpcError::ErrorResp(payload) => Error::Query(payload.to_string()),
        RpcError::SerError(e) => Error::Query(format!("request serialization: {}", e)),
        RpcError::DeserError { err, .. } => Error::Query(format!("response decoding: {}", err)),
        RpcError::NullResp => Error::NotFound("node returned null".to_string()),
        other => Error::Connection(other.to_string()),
    }
}
