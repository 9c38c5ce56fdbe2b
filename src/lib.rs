//! 徽章数据访问层
//!
//! 管理颁发机构、徽章、用户、颁发记录及分组结构（团队/系列/里程碑、
//! 邀请、授权）的关系型存储，并在有意义的变更上发布通知。
//!
//! ## 核心功能
//!
//! - **幂等创建**：按自然键重复创建返回已有 id，不产生新行
//! - **默认标识符**：由展示名派生 slug，冲突时由创建操作消歧
//! - **隐私保护查询**：获奖者邮箱以加盐哈希令牌保存，
//!   按邮箱查询通过重算摘要比对完成，明文从不落库
//! - **标签搜索**：ANY / ALL 两种集合匹配语义
//! - **通知发布**：变更提交后同步调用抽象接收端，错误原样传播
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义（纯数据，不访问存储）
//! - `db`: 数据库门面，全部读写的唯一入口
//! - `error`: 错误类型定义
//! - `config`: 数据库配置
//! - `hasher`: 获奖者邮箱哈希
//! - `tags`: 标签解析与匹配
//! - `notification`: 通知接收端抽象
//! - `schema`: 建表 DDL
//!
//! ## 使用示例
//!
//! ```no_run
//! use badge_registry::BadgeDatabase;
//!
//! # async fn demo() -> badge_registry::Result<()> {
//! let db = BadgeDatabase::open("sqlite:badges.db", None).await?;
//! let issuer_id = db
//!     .add_issuer("http://example.org", "example", "Example Org", "ops@example.org")
//!     .await?;
//! let badge_id = db
//!     .add_badge("First Steps", "first-steps.png", "Completed onboarding",
//!                "http://example.org/criteria", &issuer_id, Some("onboarding"))
//!     .await?;
//! db.add_assertion(&badge_id, "user@example.org", None, Some("http://evidence")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod hasher;
pub mod models;
pub mod notification;
pub mod schema;
pub mod tags;

pub use config::DatabaseConfig;
pub use db::BadgeDatabase;
pub use error::{BadgeDbError, Result};
pub use models::{
    Assertion, Authorization, Badge, Invitation, Issuer, Milestone, Person, PersonIdent, Series,
    Team, generate_default_id,
};
pub use notification::{
    NotificationSink, TOPIC_BADGE_AWARD, TOPIC_BADGE_NEW, TOPIC_FIRST_LOGIN, TOPIC_ISSUER_NEW,
    TOPIC_RANK_ADVANCE,
};
