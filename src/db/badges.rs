//! 徽章操作
//!
//! 徽章 id 是名字的 slug，名字全局唯一。标签搜索是全表过滤扫描，
//! 匹配逻辑见 `tags` 模块。

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{Badge, generate_default_id};
use crate::notification::TOPIC_BADGE_NEW;
use crate::tags;

use super::BadgeDatabase;

/// 新徽章的默认版本号
const DEFAULT_VERSION: &str = "0.5.0";

/// 徽章表的原始行，标签仍为存储形式
#[derive(sqlx::FromRow)]
struct BadgeRow {
    id: String,
    name: String,
    image: String,
    description: String,
    criteria: String,
    issuer_id: String,
    version: String,
    tags: String,
    created_on: DateTime<Utc>,
}

impl From<BadgeRow> for Badge {
    fn from(row: BadgeRow) -> Self {
        Badge {
            id: row.id,
            name: row.name,
            image: row.image,
            description: row.description,
            criteria: row.criteria,
            issuer_id: row.issuer_id,
            version: row.version,
            tags: tags::from_storage(&row.tags),
            created_on: row.created_on,
            issuer: None,
            assertions: Vec::new(),
            authorizations: Vec::new(),
        }
    }
}

const BADGE_COLUMNS: &str =
    "id, name, image, description, criteria, issuer_id, version, tags, created_on";

impl BadgeDatabase {
    /// 创建徽章，返回其 id（name 的 slug）
    ///
    /// 同名徽章已存在时返回已有 id，不写入、不通知。
    /// 标签输入为逗号分隔文本，入库前规范化。
    #[instrument(skip(self, image, description, criteria))]
    pub async fn add_badge(
        &self,
        name: &str,
        image: &str,
        description: &str,
        criteria: &str,
        issuer_id: &str,
        badge_tags: Option<&str>,
    ) -> Result<String> {
        Self::require("name", name)?;
        Self::require("image", image)?;
        Self::require("description", description)?;
        Self::require("criteria", criteria)?;
        Self::require("issuer_id", issuer_id)?;

        let id = generate_default_id(name);
        if self.badge_exists(&id).await? {
            return Ok(id);
        }

        let badge = Badge {
            id: id.clone(),
            name: name.to_string(),
            image: image.to_string(),
            description: description.to_string(),
            criteria: criteria.to_string(),
            issuer_id: issuer_id.to_string(),
            version: DEFAULT_VERSION.to_string(),
            tags: badge_tags.map(tags::normalize).unwrap_or_default(),
            created_on: Utc::now(),
            issuer: None,
            assertions: Vec::new(),
            authorizations: Vec::new(),
        };

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO badges (id, name, image, description, criteria, issuer_id, version, tags, created_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&badge.id)
        .bind(&badge.name)
        .bind(&badge.image)
        .bind(&badge.description)
        .bind(&badge.criteria)
        .bind(&badge.issuer_id)
        .bind(&badge.version)
        .bind(tags::to_storage(&badge.tags))
        .bind(badge.created_on)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(badge_id = %id, "badge created");
        self.notify(TOPIC_BADGE_NEW, &json!({ "badge": badge.export() }))?;

        Ok(id)
    }

    /// 检查徽章是否存在
    pub async fn badge_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM badges WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// 按 id 获取徽章（聚合形式）
    ///
    /// 连同颁发机构、颁发记录和授权记录一起加载，
    /// 供实体侧的 `authorized` 等纯判定使用。
    pub async fn get_badge(&self, id: &str) -> Result<Option<Badge>> {
        let row = sqlx::query_as::<_, BadgeRow>(&format!(
            "SELECT {BADGE_COLUMNS} FROM badges WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut badge = Badge::from(row);
        badge.issuer = self.get_issuer(&badge.issuer_id).await?;
        badge.assertions = self.get_assertions_by_badge(&badge.id).await?;
        badge.authorizations = self.get_authorizations_by_badge(&badge.id).await?;

        Ok(Some(badge))
    }

    /// 删除徽章
    ///
    /// 成功返回被删除的 id，目标不存在返回 None，不报错。
    pub async fn delete_badge(&self, id: &str) -> Result<Option<String>> {
        let mut tx = self.pool().begin().await?;
        let result = sqlx::query("DELETE FROM badges WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(id.to_string()))
        }
    }

    /// 列出全部徽章（不加载关联数据）
    pub async fn get_all_badges(&self) -> Result<Vec<Badge>> {
        let rows = sqlx::query_as::<_, BadgeRow>(&format!(
            "SELECT {BADGE_COLUMNS} FROM badges ORDER BY created_on ASC, id ASC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Badge::from).collect())
    }

    /// 按标签搜索徽章
    ///
    /// - `match_all = false`（ANY）：任一查询标签命中即返回
    /// - `match_all = true`（ALL）：徽章标签须覆盖全部查询标签
    pub async fn get_badges_from_tags(
        &self,
        query: &[&str],
        match_all: bool,
    ) -> Result<Vec<Badge>> {
        let query = tags::normalize_query(query);
        let badges = self
            .get_all_badges()
            .await?
            .into_iter()
            .filter(|badge| tags::matches(&badge.tags, &query, match_all))
            .collect();
        Ok(badges)
    }
}
