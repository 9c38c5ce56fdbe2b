//! 分组结构实体：Team -> Series -> Milestone
//!
//! 系列把徽章组织为有序的成就轨道：Team 拥有若干 Series，
//! Series 内的 Milestone 按 position 排列并各自指向一个徽章。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::epoch;

/// 团队
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub created_on: DateTime<Utc>,
}

impl Team {
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "created_on": epoch(&self.created_on),
        })
    }
}

/// 徽章系列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    pub description: String,
    pub team_id: String,
    pub tags: Vec<String>,
    pub created_on: DateTime<Utc>,
    /// 结构变化（新增里程碑）时刷新
    pub last_updated: DateTime<Utc>,
}

impl Series {
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "team_id": self.team_id,
            "tags": if self.tags.is_empty() {
                Value::Null
            } else {
                json!(self.tags)
            },
            "created_on": epoch(&self.created_on),
            "last_updated": epoch(&self.last_updated),
        })
    }
}

/// 里程碑
///
/// (badge_id, series_id) 对唯一，同一徽章在一个系列里只出现一次。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Milestone {
    pub id: String,
    /// 在系列内的序号
    pub position: i64,
    pub badge_id: String,
    pub series_id: String,
    pub created_on: DateTime<Utc>,
}

impl Milestone {
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "position": self.position,
            "badge_id": self.badge_id,
            "series_id": self.series_id,
            "created_on": epoch(&self.created_on),
        })
    }
}
