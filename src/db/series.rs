//! 团队 / 系列 / 里程碑操作
//!
//! 三者遵循与核心实体相同的创建幂等与查询契约。引用型查询
//! （按团队取系列、按徽章和系列取里程碑）是过滤扫描，引用目标
//! 不存在时返回 None / false / 空集。

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Milestone, Series, Team, generate_default_id};
use crate::tags;

use super::BadgeDatabase;

/// 系列表的原始行，标签仍为存储形式
#[derive(sqlx::FromRow)]
struct SeriesRow {
    id: String,
    name: String,
    description: String,
    team_id: String,
    tags: String,
    created_on: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl From<SeriesRow> for Series {
    fn from(row: SeriesRow) -> Self {
        Series {
            id: row.id,
            name: row.name,
            description: row.description,
            team_id: row.team_id,
            tags: tags::from_storage(&row.tags),
            created_on: row.created_on,
            last_updated: row.last_updated,
        }
    }
}

const SERIES_COLUMNS: &str = "id, name, description, team_id, tags, created_on, last_updated";

impl BadgeDatabase {
    // ==================== 团队 ====================

    /// 创建团队，返回其 id（name 的 slug）
    ///
    /// 同名团队已存在时返回已有 id，不写入。
    #[instrument(skip(self))]
    pub async fn create_team(&self, name: &str) -> Result<String> {
        Self::require("name", name)?;

        let id = generate_default_id(name);
        if self.team_exists(&id).await? {
            return Ok(id);
        }

        let mut tx = self.pool().begin().await?;
        sqlx::query("INSERT INTO teams (id, name, created_on) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(team_id = %id, "team created");
        Ok(id)
    }

    /// 检查团队是否存在
    pub async fn team_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// 按 id 获取团队
    pub async fn get_team(&self, id: &str) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>("SELECT id, name, created_on FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(team)
    }

    // ==================== 系列 ====================

    /// 创建系列，返回其 id（name 的 slug）
    ///
    /// 同名系列已存在时返回已有 id，不写入。
    #[instrument(skip(self, description))]
    pub async fn create_series(
        &self,
        name: &str,
        description: &str,
        team_id: &str,
        series_tags: Option<&str>,
    ) -> Result<String> {
        Self::require("name", name)?;
        Self::require("team_id", team_id)?;

        let id = generate_default_id(name);
        if self.series_exists(&id).await? {
            return Ok(id);
        }

        let now = Utc::now();
        let normalized = series_tags.map(tags::normalize).unwrap_or_default();

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO series (id, name, description, team_id, tags, created_on, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(team_id)
        .bind(tags::to_storage(&normalized))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(series_id = %id, "series created");
        Ok(id)
    }

    /// 检查系列是否存在
    pub async fn series_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM series WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// 按 id 获取系列
    pub async fn get_series(&self, id: &str) -> Result<Option<Series>> {
        let row = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Series::from))
    }

    /// 列出某团队下的系列
    ///
    /// 团队不存在时返回 None，与空团队（Some(空集)）可区分。
    pub async fn get_series_from_team(&self, team_id: &str) -> Result<Option<Vec<Series>>> {
        if !self.team_exists(team_id).await? {
            return Ok(None);
        }
        let rows = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series WHERE team_id = ? ORDER BY created_on ASC, id ASC"
        ))
        .bind(team_id)
        .fetch_all(self.pool())
        .await?;
        Ok(Some(rows.into_iter().map(Series::from).collect()))
    }

    /// 列出全部系列
    pub async fn get_all_series(&self) -> Result<Vec<Series>> {
        let rows = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series ORDER BY created_on ASC, id ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Series::from).collect())
    }

    // ==================== 里程碑 ====================

    /// 在系列中创建里程碑
    ///
    /// 徽章或系列不存在时返回 None。(badge_id, series_id) 已有
    /// 里程碑时返回已有 id，不写入。成功创建会刷新所属系列的
    /// last_updated。
    #[instrument(skip(self))]
    pub async fn create_milestone(
        &self,
        position: i64,
        badge_id: &str,
        series_id: &str,
    ) -> Result<Option<String>> {
        if !self.badge_exists(badge_id).await? || !self.series_exists(series_id).await? {
            return Ok(None);
        }

        if let Some(existing) = self
            .get_milestone_from_badge_series(badge_id, series_id)
            .await?
        {
            return Ok(Some(existing.id));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO milestones (id, position, badge_id, series_id, created_on)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(position)
        .bind(badge_id)
        .bind(series_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        // 结构变化，刷新系列时间戳
        sqlx::query("UPDATE series SET last_updated = ? WHERE id = ?")
            .bind(now)
            .bind(series_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(milestone_id = %id, series_id, "milestone created");
        Ok(Some(id))
    }

    /// 检查里程碑是否存在
    pub async fn milestone_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM milestones WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// 按 id 获取里程碑
    pub async fn get_milestone(&self, id: &str) -> Result<Option<Milestone>> {
        let milestone = sqlx::query_as::<_, Milestone>(
            "SELECT id, position, badge_id, series_id, created_on FROM milestones WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(milestone)
    }

    /// 按序号列出某系列的里程碑
    pub async fn get_all_milestones(&self, series_id: &str) -> Result<Vec<Milestone>> {
        let milestones = sqlx::query_as::<_, Milestone>(
            r#"
            SELECT id, position, badge_id, series_id, created_on
            FROM milestones
            WHERE series_id = ?
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(series_id)
        .fetch_all(self.pool())
        .await?;
        Ok(milestones)
    }

    /// 检查 (badge, series) 对是否已有里程碑
    pub async fn milestone_exists_for_badge_series(
        &self,
        badge_id: &str,
        series_id: &str,
    ) -> Result<bool> {
        Ok(self
            .get_milestone_from_badge_series(badge_id, series_id)
            .await?
            .is_some())
    }

    /// 按 (badge, series) 对获取里程碑
    pub async fn get_milestone_from_badge_series(
        &self,
        badge_id: &str,
        series_id: &str,
    ) -> Result<Option<Milestone>> {
        let milestone = sqlx::query_as::<_, Milestone>(
            r#"
            SELECT id, position, badge_id, series_id, created_on
            FROM milestones
            WHERE badge_id = ? AND series_id = ?
            "#,
        )
        .bind(badge_id)
        .bind(series_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(milestone)
    }
}
