//! 颁发机构操作
//!
//! 自然键是 (origin, name)。默认 id 由 name 派生 slug；
//! 同名不同源的机构会在 slug 后追加序号消歧。

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{Issuer, generate_default_id};
use crate::notification::TOPIC_ISSUER_NEW;

use super::BadgeDatabase;

impl BadgeDatabase {
    /// 创建颁发机构，返回其 id
    ///
    /// (origin, name) 已存在时返回已有 id，不写入、不通知。
    #[instrument(skip(self, org, contact))]
    pub async fn add_issuer(
        &self,
        origin: &str,
        name: &str,
        org: &str,
        contact: &str,
    ) -> Result<String> {
        Self::require("origin", origin)?;
        Self::require("name", name)?;
        Self::require("org", org)?;
        Self::require("contact", contact)?;

        if let Some(existing) = self.issuer_id_for(origin, name).await? {
            return Ok(existing);
        }

        let id = self.free_issuer_id(name).await?;
        let issuer = Issuer {
            id: id.clone(),
            origin: origin.to_string(),
            name: name.to_string(),
            org: org.to_string(),
            contact: contact.to_string(),
            created_on: Utc::now(),
        };

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO issuers (id, origin, name, org, contact, created_on)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&issuer.id)
        .bind(&issuer.origin)
        .bind(&issuer.name)
        .bind(&issuer.org)
        .bind(&issuer.contact)
        .bind(issuer.created_on)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(issuer_id = %id, "issuer created");
        self.notify(TOPIC_ISSUER_NEW, &json!({ "issuer": issuer.export() }))?;

        Ok(id)
    }

    /// 按自然键检查机构是否存在
    pub async fn issuer_exists(&self, origin: &str, name: &str) -> Result<bool> {
        Ok(self.issuer_id_for(origin, name).await?.is_some())
    }

    /// 按 id 获取机构
    pub async fn get_issuer(&self, id: &str) -> Result<Option<Issuer>> {
        let issuer = sqlx::query_as::<_, Issuer>(
            r#"
            SELECT id, origin, name, org, contact, created_on
            FROM issuers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(issuer)
    }

    /// 删除机构
    ///
    /// 成功返回被删除的 id，目标不存在返回 None，不报错。
    pub async fn delete_issuer(&self, id: &str) -> Result<Option<String>> {
        let mut tx = self.pool().begin().await?;
        let result = sqlx::query("DELETE FROM issuers WHERE id = ?")
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

    /// 列出全部机构
    pub async fn get_all_issuers(&self) -> Result<Vec<Issuer>> {
        let issuers = sqlx::query_as::<_, Issuer>(
            r#"
            SELECT id, origin, name, org, contact, created_on
            FROM issuers
            ORDER BY created_on ASC, id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(issuers)
    }

    async fn issuer_id_for(&self, origin: &str, name: &str) -> Result<Option<String>> {
        let id: Option<(String,)> =
            sqlx::query_as("SELECT id FROM issuers WHERE origin = ? AND name = ?")
                .bind(origin)
                .bind(name)
                .fetch_optional(self.pool())
                .await?;
        Ok(id.map(|(id,)| id))
    }

    /// 找到未被占用的机构 id
    ///
    /// 首选 name 的 slug；被不同自然键占用时依次探测 slug-2、slug-3……
    async fn free_issuer_id(&self, name: &str) -> Result<String> {
        let base = generate_default_id(name);
        let mut candidate = base.clone();
        let mut suffix = 2u32;
        loop {
            let taken: Option<(String,)> = sqlx::query_as("SELECT id FROM issuers WHERE id = ?")
                .bind(&candidate)
                .fetch_optional(self.pool())
                .await?;
            if taken.is_none() {
                return Ok(candidate);
            }
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
    }
}
