//! 配置管理模块
//!
//! 支持配置文件加载与环境变量覆盖，提供类型安全的数据库配置。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx 连接 URL，如 `sqlite:badges.db` 或 `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:badges.db".to_string(),
            max_connections: 5,
            connect_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. {config_dir}/default.toml（默认配置，缺失时忽略）
    /// 2. 环境变量（BADGE_ 前缀，如 BADGE_DATABASE_URL -> database.url）
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let defaults = Self::default();

        let builder = Config::builder()
            .set_default("database.url", defaults.url)?
            .set_default("database.max_connections", defaults.max_connections as i64)?
            .set_default(
                "database.connect_timeout_seconds",
                defaults.connect_timeout_seconds as i64,
            )?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                Environment::with_prefix("BADGE")
                    .separator("_")
                    .try_parsing(true),
            );

        builder.build()?.get::<Self>("database")
    }
}
