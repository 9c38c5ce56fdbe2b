//! 领域模型定义
//!
//! 全部为纯数据记录：实体不持有连接、不访问存储，行为仅限于
//! 不需要存储的纯计算（导出投影、授权集合判定等）。
//! 读写一律经由 `db` 模块的门面完成。

mod assertion;
mod badge;
mod invitation;
mod issuer;
mod person;
mod series;

pub use assertion::Assertion;
pub use badge::Badge;
pub use invitation::{Authorization, Invitation};
pub use issuer::Issuer;
pub use person::{Person, PersonIdent};
pub use series::{Milestone, Series, Team};

use chrono::{DateTime, Utc};

/// 由展示名派生默认标识符（slug）
///
/// 规则：转小写，按空白切分后用连字符拼接。`"my id"` -> `"my-id"`。
/// 纯函数，不保证唯一性——唯一性由各实体的创建操作负责。
pub fn generate_default_id(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// 时间戳导出形式：epoch 秒（浮点）
pub(crate) fn epoch(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_id() {
        assert_eq!(generate_default_id("my id"), "my-id");
        assert_eq!(generate_default_id("TestBadge"), "testbadge");
        assert_eq!(generate_default_id("  Multi   Word  Name "), "multi-word-name");
        assert_eq!(generate_default_id(""), "");
    }

    #[test]
    fn test_epoch_is_float_seconds() {
        let dt = DateTime::from_timestamp(1700000000, 500_000_000).unwrap();
        let e = epoch(&dt);
        assert!((e - 1700000000.5).abs() < 0.001);
    }
}
