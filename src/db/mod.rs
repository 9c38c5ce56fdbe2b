//! 数据库门面模块
//!
//! [`BadgeDatabase`] 是数据层唯一入口：持有连接池与可选的通知接收端，
//! 负责校验输入、解析默认标识符、执行幂等创建和查询，并在提交后
//! 发布通知。按实体域拆分子模块：
//!
//! - `issuers`: 颁发机构
//! - `badges`: 徽章与标签搜索
//! - `persons`: 用户、登录与退出标记
//! - `assertions`: 颁发记录与哈希校验查询
//! - `series`: 团队 / 系列 / 里程碑
//! - `invitations`: 邀请与授权
//!
//! ## 事务约定
//!
//! 每个公开的变更操作在一个 sqlx 事务内完成全部写入并在返回前提交，
//! 失败时回滚。通知在提交之后发出：实体已落库，接收端报错只影响
//! 调用方看到的结果，不影响数据。

mod assertions;
mod badges;
mod invitations;
mod issuers;
mod persons;
mod series;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, instrument};

use crate::config::DatabaseConfig;
use crate::error::{BadgeDbError, Result};
use crate::notification::NotificationSink;
use crate::schema::SCHEMA;

/// 徽章数据库门面
///
/// 除连接池外不持有跨调用状态，可被多个任务共享（`Clone` 共享同一池）。
#[derive(Clone)]
pub struct BadgeDatabase {
    pool: SqlitePool,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl BadgeDatabase {
    /// 按连接 URL 打开数据库
    ///
    /// URL 为空是配置错误，在触达存储之前就失败。
    /// 打开时执行幂等建表 DDL。
    #[instrument(skip(sink))]
    pub async fn open(url: &str, sink: Option<Arc<dyn NotificationSink>>) -> Result<Self> {
        let defaults = DatabaseConfig::default();
        Self::connect_inner(
            url,
            defaults.max_connections,
            defaults.connect_timeout_seconds,
            sink,
        )
        .await
    }

    /// 按配置打开数据库
    pub async fn connect(
        config: &DatabaseConfig,
        sink: Option<Arc<dyn NotificationSink>>,
    ) -> Result<Self> {
        Self::connect_inner(
            &config.url,
            config.max_connections,
            config.connect_timeout_seconds,
            sink,
        )
        .await
    }

    async fn connect_inner(
        url: &str,
        max_connections: u32,
        connect_timeout_seconds: u64,
        sink: Option<Arc<dyn NotificationSink>>,
    ) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(BadgeDbError::Configuration(
                "数据库连接 URL 不能为空".to_string(),
            ));
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // 内存库的每个连接各自是一个独立数据库，必须限制为单连接
        let max_connections = if url.contains(":memory:") {
            1
        } else {
            max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_seconds))
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!(url, "badge database opened");

        Ok(Self { pool, sink })
    }

    /// 获取连接池引用
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        info!("badge database closed");
    }

    /// 向通知接收端发布一条事实
    ///
    /// 未配置接收端时为空操作；接收端的错误原样上抛。
    pub(crate) fn notify(&self, topic: &str, payload: &Value) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.notify(topic, payload)?;
        }
        Ok(())
    }

    /// 校验必填字符串字段非空
    pub(crate) fn require(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(BadgeDbError::Validation(format!("{field} 不能为空")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_rejects_empty_url() {
        let result = BadgeDatabase::open("", None).await;
        assert!(matches!(result, Err(BadgeDbError::Configuration(_))));

        let result = BadgeDatabase::open("   ", None).await;
        assert!(matches!(result, Err(BadgeDbError::Configuration(_))));
    }

    #[tokio::test]
    async fn open_in_memory_creates_schema() {
        let db = BadgeDatabase::open("sqlite::memory:", None).await.unwrap();
        // 建表后空库的查询应正常工作而不是报"表不存在"
        assert!(db.get_all_issuers().await.unwrap().is_empty());
        assert!(db.get_all_badges().await.unwrap().is_empty());
        db.close().await;
    }

    #[tokio::test]
    async fn connect_from_config() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        let db = BadgeDatabase::connect(&config, None).await.unwrap();
        assert!(db.get_all_persons().await.unwrap().is_empty());
    }
}
