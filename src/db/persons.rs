//! 用户操作
//!
//! 邮箱是用户的主身份（id 即邮箱）。与其他实体不同，重复注册不返回
//! 已有 id，而是返回 None：调用方依赖这一点区分"新注册"与"重复注册"。

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::Person;
use crate::notification::TOPIC_FIRST_LOGIN;

use super::BadgeDatabase;

const PERSON_COLUMNS: &str =
    "id, email, nickname, website, bio, opted_out, rank, last_login, created_on";

impl BadgeDatabase {
    /// 注册用户
    ///
    /// 返回 `Some(id)`（id 即邮箱）；邮箱已注册时返回 None 且不写入。
    /// 未提供昵称时取邮箱的本地部分。
    #[instrument(skip(self, website, bio))]
    pub async fn add_person(
        &self,
        email: &str,
        nickname: Option<&str>,
        website: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Option<String>> {
        Self::require("email", email)?;

        if self.person_exists(Some(email)).await? {
            return Ok(None);
        }

        let nickname = match nickname {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => email.split('@').next().unwrap_or(email).to_string(),
        };

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO persons (id, email, nickname, website, bio, opted_out, created_on)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(email)
        .bind(email)
        .bind(&nickname)
        .bind(website)
        .bind(bio)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(person = %email, "person registered");
        Ok(Some(email.to_string()))
    }

    /// 检查用户是否存在
    ///
    /// 未提供邮箱时返回 false，不报错。
    pub async fn person_exists(&self, email: Option<&str>) -> Result<bool> {
        let Some(email) = email else {
            return Ok(false);
        };
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM persons WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    /// 按邮箱（即 id）获取用户
    pub async fn get_person(&self, email: &str) -> Result<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;
        Ok(person)
    }

    /// 按昵称获取用户
    pub async fn get_person_by_nickname(&self, nickname: &str) -> Result<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE nickname = ?"
        ))
        .bind(nickname)
        .fetch_optional(self.pool())
        .await?;
        Ok(person)
    }

    /// 按 id 查用户邮箱，不存在返回 None
    pub async fn get_person_email(&self, id: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT email FROM persons WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|(email,)| email))
    }

    /// 删除用户
    ///
    /// 成功返回被删除的邮箱，目标不存在返回 None，不报错。
    pub async fn delete_person(&self, email: &str) -> Result<Option<String>> {
        let mut tx = self.pool().begin().await?;
        let result = sqlx::query("DELETE FROM persons WHERE email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(email.to_string()))
        }
    }

    /// 查询用户是否已选择退出
    ///
    /// 用户不存在视同未退出，返回 false。
    pub async fn person_opted_out(&self, email: &str) -> Result<bool> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT opted_out FROM persons WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|(opted_out,)| opted_out).unwrap_or(false))
    }

    /// 记录一次登录
    ///
    /// 刷新 last_login；首次登录（此前为 NULL）额外发布
    /// `person.login.first`。昵称查不到用户时为空操作。
    #[instrument(skip(self))]
    pub async fn note_login(&self, nickname: &str) -> Result<()> {
        let Some(person) = self.get_person_by_nickname(nickname).await? else {
            return Ok(());
        };
        let first_login = person.last_login.is_none();
        let now = Utc::now();

        let mut tx = self.pool().begin().await?;
        sqlx::query("UPDATE persons SET last_login = ? WHERE id = ?")
            .bind(now)
            .bind(&person.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if first_login {
            let mut user = person;
            user.last_login = Some(now);
            self.notify(TOPIC_FIRST_LOGIN, &json!({ "user": user.export() }))?;
        }

        Ok(())
    }

    /// 列出全部用户
    pub async fn get_all_persons(&self) -> Result<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons ORDER BY created_on ASC, id ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(persons)
    }
}
