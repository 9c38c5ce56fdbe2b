//! 通知接口模块
//!
//! 定义数据层对外发布事实的抽象接收端。传输方式（消息总线、进程内
//! 回调等）由调用方实现，数据层只负责在提交后同步调用接收端。
//!
//! ## 契约
//!
//! - 门面在每个有外部意义的变更操作内同步调用 `notify`，调用发生在
//!   事务提交之后：实体已落库，通知失败不回滚数据。
//! - 接收端返回的错误原样传播给调用方，门面不重试也不吞错，
//!   否则监控与集成故障会被掩盖。
//! - 幂等短路（重复创建返回已有 id）不产生通知。

use serde_json::Value;

use crate::error::Result;

/// 新徽章创建
pub const TOPIC_BADGE_NEW: &str = "badge.new";
/// 新颁发机构创建
pub const TOPIC_ISSUER_NEW: &str = "issuer.new";
/// 徽章授予
pub const TOPIC_BADGE_AWARD: &str = "badge.award";
/// 获奖者排名变动（与 badge.award 成对出现）
pub const TOPIC_RANK_ADVANCE: &str = "person.rank.advance";
/// 用户首次登录
pub const TOPIC_FIRST_LOGIN: &str = "person.login.first";

/// 通知接收端
///
/// 实现方收到 `(topic, payload)` 后自行决定投递方式。
/// 实现必须是 `Send + Sync`，门面跨 await 点持有它。
pub trait NotificationSink: Send + Sync {
    fn notify(&self, topic: &str, payload: &Value) -> Result<()>;
}
