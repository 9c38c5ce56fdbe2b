//! 用户（潜在/实际获奖者）实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::epoch;

/// 用户
///
/// 邮箱是主身份（id 即邮箱），昵称是可选的二级查找键，
/// 未显式提供时由创建操作取邮箱本地部分。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub website: Option<String>,
    pub bio: Option<String>,
    /// 用户选择退出后不再对外展示
    pub opted_out: bool,
    /// 按持有颁发记录数计算的排名，授予操作时刷新
    pub rank: Option<i64>,
    /// 首次登录前为 None
    pub last_login: Option<DateTime<Utc>>,
    pub created_on: DateTime<Utc>,
}

impl Person {
    /// 导出为扁平键值投影
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "nickname": self.nickname,
            "website": self.website,
            "bio": self.bio,
            "opted_out": self.opted_out,
            "rank": self.rank,
            "last_login": self.last_login.as_ref().map(epoch),
            "created_on": epoch(&self.created_on),
        })
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.nickname)
    }
}

/// 用户身份引用
///
/// 授权判定等场景同时接受邮箱字符串和已解析的 [`Person`]。
pub trait PersonIdent {
    fn email(&self) -> &str;
}

impl PersonIdent for &str {
    fn email(&self) -> &str {
        self
    }
}

impl PersonIdent for &String {
    fn email(&self) -> &str {
        self
    }
}

impl PersonIdent for &Person {
    fn email(&self) -> &str {
        &self.email
    }
}
