//! 颁发记录操作
//!
//! 获奖者以加盐哈希令牌落库，按邮箱的查询全部通过"取候选集、
//! 用存储盐重算摘要比对"完成，任何路径都不反解哈希。
//! 聚合类统计（排名）同样只能逐条验证，代价是线性扫描。

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::hasher::{hash_recipient, verify_recipient};
use crate::models::{Assertion, Person};
use crate::notification::{TOPIC_BADGE_AWARD, TOPIC_RANK_ADVANCE};

use super::BadgeDatabase;

const ASSERTION_COLUMNS: &str = "id, badge_id, recipient, issued_on, issued_for, created_on";

impl BadgeDatabase {
    /// 颁发徽章
    ///
    /// 徽章不存在时返回 None。成功时返回新记录 id，并发布两条事实：
    /// `badge.award`（徽章视角）与 `person.rank.advance`（获奖者视角，
    /// 仅当获奖者是已注册用户时）。重复颁发是允许的，每次都生成
    /// 新记录和新的随机盐。
    #[instrument(skip(self, issued_on, issued_for))]
    pub async fn add_assertion(
        &self,
        badge_id: &str,
        email: &str,
        issued_on: Option<DateTime<Utc>>,
        issued_for: Option<&str>,
    ) -> Result<Option<String>> {
        Self::require("email", email)?;

        let Some(badge) = self.get_badge(badge_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let assertion = Assertion {
            id: Uuid::new_v4().to_string(),
            badge_id: badge.id.clone(),
            recipient: hash_recipient(email),
            issued_on: issued_on.unwrap_or(now),
            issued_for: issued_for.map(str::to_string),
            created_on: now,
        };

        // 排名在写入前基于"已有记录 + 本次新增"计算，
        // 与记录写入同一事务提交
        let recipient = self.get_person(email).await?;
        let rank_change = match &recipient {
            Some(person) => Some(self.compute_rank(person, email).await?),
            None => None,
        };

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO assertions (id, badge_id, recipient, issued_on, issued_for, created_on)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&assertion.id)
        .bind(&assertion.badge_id)
        .bind(&assertion.recipient)
        .bind(assertion.issued_on)
        .bind(&assertion.issued_for)
        .bind(assertion.created_on)
        .execute(&mut *tx)
        .await?;

        if let (Some(person), Some((_, new_rank))) = (&recipient, rank_change) {
            sqlx::query("UPDATE persons SET rank = ? WHERE id = ?")
                .bind(new_rank)
                .bind(&person.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(badge_id = %badge.id, assertion_id = %assertion.id, "badge awarded");

        // 授奖是两个事实：徽章被授出，获奖者排名变动
        let user_payload = match &recipient {
            Some(person) => json!({ "email": person.email, "nickname": person.nickname }),
            None => json!({ "email": email }),
        };
        self.notify(
            TOPIC_BADGE_AWARD,
            &json!({
                "badge": {
                    "badge_id": badge.id,
                    "name": badge.name,
                    "image": badge.image_path(),
                    "description": badge.description,
                    "criteria": badge.criteria,
                },
                "user": user_payload,
            }),
        )?;

        if let (Some(person), Some((old_rank, new_rank))) = (recipient, rank_change) {
            let mut person = person;
            person.rank = Some(new_rank);
            self.notify(
                TOPIC_RANK_ADVANCE,
                &json!({
                    "person": person.export(),
                    "old_rank": old_rank,
                    "new_rank": new_rank,
                }),
            )?;
        }

        Ok(Some(assertion.id))
    }

    /// 检查某邮箱是否获得过某徽章
    ///
    /// 取该徽章的候选记录，逐条用存储盐重算摘要比对。
    pub async fn assertion_exists(&self, badge_id: &str, email: &str) -> Result<bool> {
        let candidates = self.get_assertions_by_badge(badge_id).await?;
        Ok(candidates
            .iter()
            .any(|a| verify_recipient(&a.recipient, email)))
    }

    /// 列出全部颁发记录
    pub async fn get_all_assertions(&self) -> Result<Vec<Assertion>> {
        let assertions = sqlx::query_as::<_, Assertion>(&format!(
            "SELECT {ASSERTION_COLUMNS} FROM assertions ORDER BY created_on ASC, id ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(assertions)
    }

    /// 按获奖者邮箱列出颁发记录（全表验证扫描）
    pub async fn get_assertions_by_email(&self, email: &str) -> Result<Vec<Assertion>> {
        let assertions = self
            .get_all_assertions()
            .await?
            .into_iter()
            .filter(|a| verify_recipient(&a.recipient, email))
            .collect();
        Ok(assertions)
    }

    /// 按徽章列出颁发记录
    ///
    /// 徽章不存在时返回空集。
    pub async fn get_assertions_by_badge(&self, badge_id: &str) -> Result<Vec<Assertion>> {
        let assertions = sqlx::query_as::<_, Assertion>(&format!(
            "SELECT {ASSERTION_COLUMNS} FROM assertions WHERE badge_id = ? ORDER BY created_on ASC, id ASC"
        ))
        .bind(badge_id)
        .fetch_all(self.pool())
        .await?;
        Ok(assertions)
    }

    /// 计算获奖者本次颁发后的排名，返回 (旧排名, 新排名)
    ///
    /// 排名 = 持有记录数严格多于该用户的人数 + 1。
    /// 本次新增的记录计入该用户，其余用户按已有记录统计。
    async fn compute_rank(&self, person: &Person, email: &str) -> Result<(Option<i64>, i64)> {
        let assertions = self.get_all_assertions().await?;
        let persons = self.get_all_persons().await?;

        let count_for = |candidate: &str| -> i64 {
            assertions
                .iter()
                .filter(|a| verify_recipient(&a.recipient, candidate))
                .count() as i64
        };

        let own_count = count_for(email) + 1;
        let ahead = persons
            .iter()
            .filter(|p| p.email != email && count_for(&p.email) > own_count)
            .count() as i64;

        Ok((person.rank, ahead + 1))
    }
}
