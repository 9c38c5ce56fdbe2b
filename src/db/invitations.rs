//! 邀请与授权操作

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Authorization, Invitation};

use super::BadgeDatabase;

/// 未显式指定时邀请的有效时长
const DEFAULT_INVITATION_TTL_HOURS: i64 = 1;

impl BadgeDatabase {
    /// 为徽章创建一张邀请
    ///
    /// 徽章不存在时返回 None。过期时间缺省为创建时间 + 1 小时。
    #[instrument(skip(self, expires_on))]
    pub async fn add_invitation(
        &self,
        badge_id: &str,
        expires_on: Option<DateTime<Utc>>,
    ) -> Result<Option<String>> {
        if !self.badge_exists(badge_id).await? {
            return Ok(None);
        }

        let now = Utc::now();
        let invitation = Invitation {
            id: Uuid::new_v4().to_string(),
            badge_id: badge_id.to_string(),
            created_on: now,
            expires_on: expires_on
                .unwrap_or_else(|| now + Duration::hours(DEFAULT_INVITATION_TTL_HOURS)),
        };

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO invitations (id, badge_id, created_on, expires_on)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&invitation.id)
        .bind(&invitation.badge_id)
        .bind(invitation.created_on)
        .bind(invitation.expires_on)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(invitation_id = %invitation.id, badge_id, "invitation created");
        Ok(Some(invitation.id))
    }

    /// 检查邀请是否存在
    pub async fn invitation_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM invitations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// 按 id 获取邀请
    pub async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>> {
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT id, badge_id, created_on, expires_on FROM invitations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(invitation)
    }

    /// 授权某用户颁发某徽章
    ///
    /// 徽章或用户不存在时返回 false。重复授权是幂等的，返回 true。
    #[instrument(skip(self))]
    pub async fn add_authorization(&self, badge_id: &str, email: &str) -> Result<bool> {
        if !self.badge_exists(badge_id).await? || !self.person_exists(Some(email)).await? {
            return Ok(false);
        }

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO authorizations (badge_id, person_id, created_on)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(badge_id)
        .bind(email)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(badge_id, person = %email, "authorization granted");
        Ok(true)
    }

    /// 列出某徽章的授权记录
    pub(crate) async fn get_authorizations_by_badge(
        &self,
        badge_id: &str,
    ) -> Result<Vec<Authorization>> {
        let authorizations = sqlx::query_as::<_, Authorization>(
            r#"
            SELECT badge_id, person_id, created_on
            FROM authorizations
            WHERE badge_id = ?
            ORDER BY created_on ASC, person_id ASC
            "#,
        )
        .bind(badge_id)
        .fetch_all(self.pool())
        .await?;
        Ok(authorizations)
    }
}
