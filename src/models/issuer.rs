//! 颁发机构实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::epoch;

/// 颁发机构
///
/// 自然键是 (origin, name)，id 默认由 name 派生 slug，
/// slug 被不同机构占用时由创建操作追加序号消歧。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issuer {
    pub id: String,
    /// 机构主页地址
    pub origin: String,
    pub name: String,
    /// 所属组织
    pub org: String,
    /// 联系方式（邮箱）
    pub contact: String,
    pub created_on: DateTime<Utc>,
}

impl Issuer {
    /// 导出为扁平键值投影
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "origin": self.origin,
            "name": self.name,
            "org": self.org,
            "contact": self.contact,
            "created_on": epoch(&self.created_on),
        })
    }
}

impl std::fmt::Display for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
