//! Removal of loaded model content, children before parents.

use anyhow::{Context, Result};
use sqlx::Row;
use tracing::info;

use crate::db::DbPool;

const CONTENT_TABLES: &[&str] = &[
    "location_issue",
    "rainfall_tips",
    "stage_measurement",
    "groundwater_measurement",
    "conductivity_measurement",
    "temperature_measurement",
    "discharge_measurement",
    "location_visit",
    "measuring_point_attachment",
    "location_attachment",
    "sensor",
    "data_logger",
    "measuring_point",
    "location",
];

const DOMAIN_TABLES: &[&str] = &["coded_value", "coded_value_domain"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeEntry {
    pub table: &'static str,
    pub rows: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgePlan {
    pub entries: Vec<PurgeEntry>,
}

impl PurgePlan {
    pub fn total_rows(&self) -> i64 {
        self.entries.iter().map(|entry| entry.rows).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

pub fn purge_tables(keep_domains: bool) -> Vec<&'static str> {
    let mut tables = CONTENT_TABLES.to_vec();
    if !keep_domains {
        tables.extend_from_slice(DOMAIN_TABLES);
    }
    tables
}

pub async fn plan_purge(pool: &DbPool, keep_domains: bool) -> Result<PurgePlan> {
    let mut entries = Vec::new();
    for table in purge_tables(keep_domains) {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS row_count FROM {table}"))
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        entries.push(PurgeEntry {
            table,
            rows: row.try_get("row_count")?,
        });
    }
    Ok(PurgePlan { entries })
}

/// Deletes every planned table in one transaction.
pub async fn apply_purge(pool: &DbPool, plan: &PurgePlan) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;
    for entry in &plan.entries {
        let result = sqlx::query(&format!("DELETE FROM {}", entry.table))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to purge {}", entry.table))?;
        info!(table = entry.table, rows = result.rows_affected(), "Purged table");
        deleted += result.rows_affected();
    }
    tx.commit().await?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_are_purged_before_parents() {
        let tables = purge_tables(false);
        let position = |name: &str| tables.iter().position(|table| *table == name).unwrap();
        assert!(position("sensor") < position("data_logger"));
        assert!(position("data_logger") < position("location"));
        assert!(position("measuring_point_attachment") < position("measuring_point"));
        assert!(position("coded_value") < position("coded_value_domain"));
        assert!(position("stage_measurement") < position("measuring_point"));
        assert!(position("groundwater_measurement") < position("location_visit"));
        assert!(position("location_visit") < position("location"));
    }

    #[test]
    fn keep_domains_leaves_coded_values() {
        assert!(!purge_tables(true).contains(&"coded_value_domain"));
    }
}
