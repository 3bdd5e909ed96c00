//! The persistence gateway: idempotent bulk writes and resume-point reads over SQLite.

use std::collections::HashMap;

use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

use crate::{
    error::StorageError,
    models::{Block, Contract, ContractInfo},
};

/// A connection pool bound to one worker process's database session.
///
/// Each worker owns exactly one `Gateway`; tables are the only state shared across processes.
#[derive(Debug, Clone)]
pub struct Gateway {
    pool: SqlitePool,
}

impl Gateway {
    /// Opens (or creates) the database at `url` and ensures the schema exists.
    ///
    /// Schema creation is idempotent (`CREATE TABLE IF NOT EXISTS`) so it is safe to call this
    /// once per worker process rather than only once globally.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the pool cannot be opened or the schema statements fail.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        // An in-memory database only exists for the connection that created it, so a pool of
        // more than one connection would have each one see a distinct, empty database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
        let gateway = Self { pool };
        gateway.create_schema().await?;
        Ok(gateway)
    }

    /// Runs the idempotent `CREATE TABLE IF NOT EXISTS` statements for all three tables.
    async fn create_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS contracts (
                contract_address TEXT PRIMARY KEY,
                bytecode TEXT NOT NULL,
                from_address TEXT NOT NULL,
                tx_hash TEXT NOT NULL,
                block_number INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS contract_info (
                contract_address TEXT PRIMARY KEY REFERENCES contracts(contract_address),
                eth_balance REAL NOT NULL,
                largest_tx_hash TEXT,
                largest_tx_block_number INTEGER,
                largest_tx_value REAL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blocks (
                block_number INTEGER PRIMARY KEY,
                miner_address TEXT NOT NULL,
                coinbase_transfer REAL NOT NULL,
                base_fee_per_gas REAL NOT NULL,
                gas_fee REAL NOT NULL,
                gas_used INTEGER NOT NULL,
                gas_limit INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts newly discovered contracts, skipping any whose primary key already exists.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn insert_contracts(&self, rows: &[Contract]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT OR IGNORE INTO contracts
                 (contract_address, bytecode, from_address, tx_hash, block_number)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&row.contract_address)
            .bind(&row.bytecode)
            .bind(&row.from_address)
            .bind(&row.tx_hash)
            .bind(row.block_number)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Inserts newly discovered contract-info rows, skipping any whose primary key already
    /// exists (a later economic pass mutates them via [`Self::update_contract_info`] instead).
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn insert_contract_info(&self, rows: &[ContractInfo]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT OR IGNORE INTO contract_info
                 (contract_address, eth_balance, largest_tx_hash, largest_tx_block_number,
                  largest_tx_value)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&row.contract_address)
            .bind(row.eth_balance)
            .bind(&row.largest_tx_hash)
            .bind(row.largest_tx_block_number)
            .bind(row.largest_tx_value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Merges `largest_tx_*` updates into existing contract_info rows by primary key.
    ///
    /// Only the `largest_tx_*` columns are touched; `eth_balance` is left as last recorded.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn update_contract_info(&self, rows: &[ContractInfo]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "UPDATE contract_info
                 SET largest_tx_hash = ?, largest_tx_block_number = ?, largest_tx_value = ?
                 WHERE contract_address = ?",
            )
            .bind(&row.largest_tx_hash)
            .bind(row.largest_tx_block_number)
            .bind(row.largest_tx_value)
            .bind(&row.contract_address)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Inserts block economic summaries, skipping any block number already written.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn insert_blocks(&self, rows: &[Block]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT OR IGNORE INTO blocks
                 (block_number, miner_address, coinbase_transfer, base_fee_per_gas, gas_fee,
                  gas_used, gas_limit)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(row.block_number)
            .bind(&row.miner_address)
            .bind(row.coinbase_transfer)
            .bind(row.base_fee_per_gas)
            .bind(row.gas_fee)
            .bind(row.gas_used)
            .bind(row.gas_limit)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Returns the largest `blocks.block_number` strictly less than `upper_bound`, or `None` if
    /// the table has no rows below it.
    ///
    /// `upper_bound` is the resumed range's *end* (`before_block`), not its start: the caller
    /// then compares this result against the range's start to decide whether to advance it.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn last_written_block(&self, upper_bound: i64) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT MAX(block_number) AS m FROM blocks WHERE block_number < ?")
            .bind(upper_bound)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<Option<i64>, _>("m")?)
    }

    /// Returns the largest `contracts.block_number` strictly less than `upper_bound`, or `None`
    /// if the table has no rows below it. The TLSC discovery inspector checkpoints against
    /// discovered contracts rather than the `blocks` table.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn last_written_contract_block(
        &self,
        upper_bound: i64,
    ) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT MAX(block_number) AS m FROM contracts WHERE block_number < ?")
            .bind(upper_bound)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<Option<i64>, _>("m")?)
    }

    /// Returns `(block_number, contract_address)` pairs for every contract discovered in
    /// `[a, b)`, for handoff to the contract-info batch fetcher.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn contracts_in_range(
        &self,
        a: i64,
        b: i64,
    ) -> Result<Vec<(i64, String)>, StorageError> {
        let rows = sqlx::query(
            "SELECT block_number, contract_address FROM contracts
             WHERE block_number >= ? AND block_number < ?",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let block_number: i64 = row.try_get("block_number")?;
                let contract_address: String = row.try_get("contract_address")?;
                Ok((block_number, contract_address))
            })
            .collect()
    }

    /// Returns the block economic summaries written for `[a, b)`, ordered by block number.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn blocks_in_range(&self, a: i64, b: i64) -> Result<Vec<Block>, StorageError> {
        let rows = sqlx::query_as::<_, Block>(
            "SELECT block_number, miner_address, coinbase_transfer, base_fee_per_gas, gas_fee,
                    gas_used, gas_limit
             FROM blocks
             WHERE block_number >= ? AND block_number < ?
             ORDER BY block_number",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Loads the `address -> largest_tx_value` map used by the block-economics batch to detect
    /// new value records as it streams transactions.
    ///
    /// # Errors
    /// Returns [`StorageError`] on a database failure.
    pub async fn contract_info_map(&self) -> Result<HashMap<String, Option<f64>>, StorageError> {
        let rows = sqlx::query("SELECT contract_address, largest_tx_value FROM contract_info")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let address: String = row.try_get("contract_address")?;
                let value: Option<f64> = row.try_get("largest_tx_value")?;
                Ok((address, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contract(address: &str, block_number: i64) -> Contract {
        Contract {
            contract_address: address.to_owned(),
            bytecode: "0x6042".to_owned(),
            from_address: "0xdeployer".to_owned(),
            tx_hash: "0xtx".to_owned(),
            block_number,
        }
    }

    async fn memory_gateway() -> Gateway {
        Gateway::connect("sqlite::memory:").await.expect("in-memory db opens")
    }

    #[tokio::test]
    async fn insert_contracts_is_idempotent_on_conflict() {
        let gateway = memory_gateway().await;
        let rows = vec![sample_contract("0xabc", 10)];
        gateway.insert_contracts(&rows).await.unwrap();
        gateway.insert_contracts(&rows).await.unwrap();

        let found = gateway.contracts_in_range(0, 100).await.unwrap();
        assert_eq!(found, vec![(10, "0xabc".to_owned())]);
    }

    #[tokio::test]
    async fn last_written_block_respects_upper_bound() {
        let gateway = memory_gateway().await;
        assert_eq!(gateway.last_written_block(1000).await.unwrap(), None);

        gateway
            .insert_blocks(&[Block {
                block_number: 42,
                miner_address: "0xminer".to_owned(),
                coinbase_transfer: 0.0,
                base_fee_per_gas: 1.0,
                gas_fee: 0.1,
                gas_used: 21000,
                gas_limit: 30_000_000,
            }])
            .await
            .unwrap();

        assert_eq!(gateway.last_written_block(1000).await.unwrap(), Some(42));
        assert_eq!(gateway.last_written_block(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_contract_info_only_touches_largest_tx_columns() {
        let gateway = memory_gateway().await;
        gateway
            .insert_contracts(&[sample_contract("0xabc", 10)])
            .await
            .unwrap();
        gateway
            .insert_contract_info(&[ContractInfo {
                contract_address: "0xabc".to_owned(),
                eth_balance: 3.5,
                largest_tx_hash: None,
                largest_tx_block_number: None,
                largest_tx_value: None,
            }])
            .await
            .unwrap();

        gateway
            .update_contract_info(&[ContractInfo {
                contract_address: "0xabc".to_owned(),
                eth_balance: 0.0,
                largest_tx_hash: Some("0xtx2".to_owned()),
                largest_tx_block_number: Some(11),
                largest_tx_value: Some(2.0),
            }])
            .await
            .unwrap();

        let map = gateway.contract_info_map().await.unwrap();
        assert_eq!(map.get("0xabc"), Some(&Some(2.0)));
    }
}
