//! 颁发记录实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{BadgeDbError, Result};

use super::epoch;

/// 可导出字段的枚举集合，`field()` 只接受这些名字
const EXPORTABLE_FIELDS: [&str; 6] = [
    "id",
    "badge_id",
    "recipient",
    "issued_on",
    "issued_for",
    "created_on",
];

/// 颁发记录
///
/// 记录"某人获得某徽章"这一事实。获奖者以加盐哈希令牌形式保存
/// （见 `hasher` 模块），按邮箱查询时逐条重算摘要比对，明文邮箱
/// 从不落库。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assertion {
    pub id: String,
    pub badge_id: String,
    /// `sha256$<salt>$<digest>` 形式的结构化令牌
    pub recipient: String,
    pub issued_on: DateTime<Utc>,
    /// 颁发依据（证据链接）
    pub issued_for: Option<String>,
    pub created_on: DateTime<Utc>,
}

impl Assertion {
    /// 按名字访问可导出字段
    ///
    /// 字段名不在枚举集合内时返回 `UnknownField` 错误，而不是静默 null：
    /// 拼错字段名是调用方 bug，必须显式暴露。
    pub fn field(&self, name: &str) -> Result<Value> {
        match name {
            "id" => Ok(json!(self.id)),
            "badge_id" => Ok(json!(self.badge_id)),
            "recipient" => Ok(json!(self.recipient)),
            "issued_on" => Ok(json!(epoch(&self.issued_on))),
            "issued_for" => Ok(json!(self.issued_for)),
            "created_on" => Ok(json!(epoch(&self.created_on))),
            _ => Err(BadgeDbError::UnknownField {
                entity: "Assertion".to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// 可导出字段名列表
    pub fn exportable_fields() -> &'static [&'static str] {
        &EXPORTABLE_FIELDS
    }

    /// 导出为扁平键值投影
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "badge_id": self.badge_id,
            "recipient": self.recipient,
            "issued_on": epoch(&self.issued_on),
            "issued_for": self.issued_for,
            "created_on": epoch(&self.created_on),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_assertion() -> Assertion {
        Assertion {
            id: "a1".to_string(),
            badge_id: "testbadge".to_string(),
            recipient: "sha256$salt$digest".to_string(),
            issued_on: Utc::now(),
            issued_for: Some("link".to_string()),
            created_on: Utc::now(),
        }
    }

    #[test]
    fn field_resolves_known_names() {
        let assertion = sample_assertion();
        assert_eq!(assertion.field("issued_for").unwrap(), json!("link"));
        assert_eq!(assertion.field("badge_id").unwrap(), json!("testbadge"));
        assert!(assertion.field("issued_on").unwrap().is_f64());
    }

    #[test]
    fn field_rejects_unknown_names() {
        let assertion = sample_assertion();
        let err = assertion.field("key").unwrap_err();
        assert!(matches!(
            err,
            BadgeDbError::UnknownField { ref entity, ref field }
                if entity == "Assertion" && field == "key"
        ));
    }

    #[test]
    fn every_exportable_field_resolves() {
        let assertion = sample_assertion();
        for name in Assertion::exportable_fields() {
            assert!(assertion.field(name).is_ok(), "field {name} should resolve");
        }
    }
}
