//! 徽章数据层错误类型
//!
//! 定义数据访问层的配置、校验和系统错误。
//! 注意"未找到"与"重复创建"不属于错误：查询操作通过 `Option` / `bool`
//! 哨兵值表达这两种结果，错误类型只覆盖真正的失败路径。

use thiserror::Error;

/// 徽章数据层错误类型
#[derive(Debug, Error)]
pub enum BadgeDbError {
    // === 配置错误（构造阶段，致命） ===
    #[error("配置错误: {0}")]
    Configuration(String),

    // === 参数校验错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 字段访问错误 ===
    #[error("未知字段: {entity}.{field}")]
    UnknownField { entity: String, field: String },

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    // === 通知错误 ===
    /// 通知接收端失败时使用。门面自身从不构造也从不捕获此错误，
    /// 接收端抛出的任何错误原样传播给调用方。
    #[error("通知发送失败: {0}")]
    Notification(String),
}

/// 数据层 Result 类型别名
pub type Result<T> = std::result::Result<T, BadgeDbError>;

impl BadgeDbError {
    /// 获取错误码（用于日志和外层 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Notification(_) => "NOTIFICATION_ERROR",
        }
    }

    /// 检查是否为调用方使用错误（非系统错误）
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Validation(_) | Self::UnknownField { .. }
        )
    }

    /// 检查是否为可重试的错误
    ///
    /// 仅存储层故障值得重试，使用错误和通知错误重试无意义。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}
