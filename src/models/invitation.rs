//! 邀请与授权实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::epoch;

/// 邀请：尚未被认领的获奖机会
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: String,
    pub badge_id: String,
    pub created_on: DateTime<Utc>,
    /// 未显式指定时为创建时间 + 1 小时
    pub expires_on: DateTime<Utc>,
}

impl Invitation {
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_on
    }

    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "badge_id": self.badge_id,
            "created_on": epoch(&self.created_on),
            "expires_on": epoch(&self.expires_on),
        })
    }
}

/// 授权：允许某用户颁发某徽章的连接记录，无代理主键
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Authorization {
    pub badge_id: String,
    pub person_id: String,
    pub created_on: DateTime<Utc>,
}

impl Authorization {
    pub fn export(&self) -> Value {
        json!({
            "badge_id": self.badge_id,
            "person_id": self.person_id,
            "created_on": epoch(&self.created_on),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn invitation_expiry() {
        let now = Utc::now();
        let invitation = Invitation {
            id: "i1".to_string(),
            badge_id: "testbadge".to_string(),
            created_on: now,
            expires_on: now + Duration::hours(1),
        };
        assert!(!invitation.expired(now));
        assert!(invitation.expired(now + Duration::hours(2)));
    }
}
