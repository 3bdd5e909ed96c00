//! Typed request parameters and response shapes for the JSON-RPC methods this system needs.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RpcError;

/// Parses a JSON-RPC "quantity" (a `0x`-prefixed hex integer) into a `u128`.
///
/// # Errors
/// Returns an error if `value` is not a well-formed `0x`-prefixed hex integer.
pub fn parse_quantity(value: &str) -> Result<u128, RpcError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|err| RpcError::DataInvariant(format!("malformed quantity {value:?}: {err}")))
}

/// Deserializes a `0x`-prefixed hex quantity field directly into a `u128`.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_quantity(&raw).map_err(serde::de::Error::custom)
}

/// A block as returned by `eth_getBlockByNumber` with `full_transactions = true`.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    /// The block's miner (coinbase) address.
    pub miner: String,
    /// Total gas used by all transactions in the block.
    #[serde(rename = "gasUsed", deserialize_with = "deserialize_quantity")]
    pub gas_used: u128,
    /// The block's gas limit.
    #[serde(rename = "gasLimit", deserialize_with = "deserialize_quantity")]
    pub gas_limit: u128,
    /// The block's transactions, present in full because the request asked for them.
    pub transactions: Vec<Transaction>,
}

/// A transaction embedded in a full-transaction block response.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    /// The transaction hash.
    pub hash: String,
    /// The sender address.
    #[serde(rename = "from")]
    pub from_address: String,
    /// The recipient address, or `None` for a contract-creation transaction.
    #[serde(rename = "to")]
    pub to_address: Option<String>,
    /// The value transferred, in wei.
    #[serde(deserialize_with = "deserialize_quantity")]
    pub value: u128,
}

/// A transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionReceipt {
    /// The address of the contract created by this transaction, if any.
    #[serde(rename = "contractAddress")]
    pub contract_address: Option<String>,
    /// The sender address this receipt is for.
    #[serde(rename = "from")]
    pub from_address: String,
    /// The recipient address this receipt is for, or `None` for a contract-creation transaction.
    pub to: Option<String>,
    /// Gas actually used by the transaction.
    #[serde(rename = "gasUsed", deserialize_with = "deserialize_quantity")]
    pub gas_used: u128,
    /// The effective gas price paid, in wei.
    #[serde(rename = "effectiveGasPrice", deserialize_with = "deserialize_quantity")]
    pub effective_gas_price: u128,
}

/// The result of `eth_feeHistory`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeHistory {
    /// Base fee per gas for each block in the requested range, plus one trailing entry for the
    /// next unmined block.
    #[serde(rename = "baseFeePerGas")]
    pub base_fee_per_gas: Vec<String>,
}

impl FeeHistory {
    /// Decodes the hex quantities into `u128`, failing if the node returned an empty array (a
    /// violated data invariant per the error-handling design).
    ///
    /// # Errors
    /// Returns [`RpcError::DataInvariant`] if the array is empty or any entry is malformed.
    pub fn base_fees(&self) -> Result<Vec<u128>, RpcError> {
        if self.base_fee_per_gas.is_empty() {
            return Err(RpcError::DataInvariant(
                "fee_history returned no base fees".to_owned(),
            ));
        }
        self.base_fee_per_gas.iter().map(|s| parse_quantity(s)).collect()
    }
}

/// A block identifier, as accepted by calls like `eth_getCode`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum BlockId {
    /// A specific block number.
    Number(u64),
    /// The `"latest"` tag.
    Latest,
}

impl From<u64> for BlockId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl Serialize for BlockIdHex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{n:x}")),
            BlockId::Latest => serializer.serialize_str("latest"),
        }
    }
}

/// Wrapper forcing [`BlockId`] to serialize as a quantity (`0x...`) rather than a plain integer,
/// as the JSON-RPC spec requires for block-identifier parameters.
#[derive(Debug, Clone, Copy)]
pub struct BlockIdHex(pub BlockId);
