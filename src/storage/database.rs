use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, info};

use crate::utils::AppResult;

/// 扁平键值快照存储，每个槽位保存一个完整的 JSON 集合
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // 确保使用create_if_missing选项
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                database_url
                    .parse::<sqlx::sqlite::SqliteConnectOptions>()?
                    .create_if_missing(true),
            )
            .await?;

        info!("数据库连接成功: {}", database_url);
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("数据库表结构初始化完成");
        Ok(())
    }

    /// 读取槽位内容，槽位不存在时返回 None
    pub async fn load_slot(&self, key: &str) -> AppResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// 整体覆盖写入槽位
    pub async fn save_slot(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!("槽位已写入: {} ({} 字节)", key, value.len());
        Ok(())
    }

    /// 删除全部快照，下次访问时重新填充示例数据
    pub async fn clear_all_slots(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM snapshots").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
