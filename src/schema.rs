//! 数据库表结构定义
//!
//! 打开连接时执行一次，全部语句幂等（CREATE TABLE IF NOT EXISTS）。
//! 唯一约束在存储层兜底：并发的"查重后创建"竞态最终由这些约束拦截，
//! 而不是依赖门面内的先查后写。

/// 全量 DDL
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS issuers (
    id          TEXT PRIMARY KEY,
    origin      TEXT NOT NULL,
    name        TEXT NOT NULL,
    org         TEXT NOT NULL,
    contact     TEXT NOT NULL,
    created_on  TEXT NOT NULL,
    UNIQUE (origin, name)
);

CREATE TABLE IF NOT EXISTS badges (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    image       TEXT NOT NULL,
    description TEXT NOT NULL,
    criteria    TEXT NOT NULL,
    issuer_id   TEXT NOT NULL,
    version     TEXT NOT NULL DEFAULT '0.5.0',
    tags        TEXT NOT NULL DEFAULT '',   -- 逗号分隔，仅存储边界使用此形式
    created_on  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persons (
    id          TEXT PRIMARY KEY,           -- 即邮箱，邮箱是人的主身份
    email       TEXT NOT NULL UNIQUE,
    nickname    TEXT NOT NULL UNIQUE,
    website     TEXT,
    bio         TEXT,
    opted_out   INTEGER NOT NULL DEFAULT 0,
    rank        INTEGER,
    last_login  TEXT,                       -- 首次登录前为 NULL
    created_on  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assertions (
    id          TEXT PRIMARY KEY,
    badge_id    TEXT NOT NULL,
    recipient   TEXT NOT NULL,              -- sha256$<salt>$<digest>，永不存明文邮箱
    issued_on   TEXT NOT NULL,
    issued_for  TEXT,
    created_on  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_on  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS series (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT NOT NULL,
    team_id      TEXT NOT NULL,
    tags         TEXT NOT NULL DEFAULT '',
    created_on   TEXT NOT NULL,
    last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS milestones (
    id          TEXT PRIMARY KEY,
    position    INTEGER NOT NULL,
    badge_id    TEXT NOT NULL,
    series_id   TEXT NOT NULL,
    created_on  TEXT NOT NULL,
    UNIQUE (badge_id, series_id)
);

CREATE TABLE IF NOT EXISTS invitations (
    id          TEXT PRIMARY KEY,
    badge_id    TEXT NOT NULL,
    created_on  TEXT NOT NULL,
    expires_on  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS authorizations (
    badge_id    TEXT NOT NULL,
    person_id   TEXT NOT NULL,
    created_on  TEXT NOT NULL,
    PRIMARY KEY (badge_id, person_id)
);

CREATE INDEX IF NOT EXISTS assertions_badge_idx ON assertions(badge_id);
CREATE INDEX IF NOT EXISTS milestones_series_idx ON milestones(series_id);
CREATE INDEX IF NOT EXISTS series_team_idx ON series(team_id);
";
