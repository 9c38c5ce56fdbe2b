//! 获奖者邮箱哈希模块
//!
//! 颁发记录需要支持按邮箱查询，但不允许明文保存邮箱。方案：
//! 每条记录生成独立随机盐，保存 `sha256$<salt>$<digest>` 结构化令牌，
//! 其中 digest = SHA-256(salt || email)。盐随令牌一起保存，
//! 校验时用存储的盐重新计算摘要后比对，永不反解哈希。
//!
//! 令牌以算法标签开头，后续更换算法时旧令牌仍可按标签识别。

use rand::Rng;
use sha2::{Digest, Sha256};

/// 令牌的算法标签，同时作为格式前缀
pub const HASH_TAG: &str = "sha256";

/// 随机盐长度（字符数）
const SALT_LENGTH: usize = 16;

/// 生成随机盐
fn generate_salt() -> String {
    let mut rng = rand::rng();
    let chars: Vec<char> = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
        .chars()
        .collect();
    (0..SALT_LENGTH)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect()
}

/// 计算 salt || email 的 SHA-256 摘要（hex 编码）
fn digest(salt: &str, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(email.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 将邮箱哈希为可存储的结构化令牌
///
/// 每次调用生成新的随机盐，相同邮箱产生不同令牌，
/// 防止跨记录比对令牌推断出"同一个人"。
pub fn hash_recipient(email: &str) -> String {
    let salt = generate_salt();
    let digest = digest(&salt, email);
    format!("{HASH_TAG}${salt}${digest}")
}

/// 校验令牌是否对应给定邮箱
///
/// 用令牌中保存的盐重新计算摘要后比对。
/// 格式不合法或算法标签不匹配的令牌一律返回 false，不报错。
pub fn verify_recipient(token: &str, email: &str) -> bool {
    let mut parts = token.splitn(3, '$');
    let (Some(tag), Some(salt), Some(stored)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if tag != HASH_TAG {
        return false;
    }
    digest(salt, email) == stored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_never_contains_plaintext() {
        let token = hash_recipient("a@b.com");
        assert_ne!(token, "a@b.com");
        assert!(!token.contains("a@b.com"));
        assert!(token.starts_with("sha256$"));
    }

    #[test]
    fn token_has_three_sections() {
        let token = hash_recipient("test@tester.com");
        let parts: Vec<&str> = token.splitn(3, '$').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sha256");
        assert_eq!(parts[1].len(), SALT_LENGTH);
        // SHA-256 的 hex 摘要固定 64 字符
        assert_eq!(parts[2].len(), 64);
    }

    #[test]
    fn verify_roundtrip() {
        let token = hash_recipient("test@tester.com");
        assert!(verify_recipient(&token, "test@tester.com"));
        assert!(!verify_recipient(&token, "other@tester.com"));
    }

    #[test]
    fn same_email_different_salts() {
        let t1 = hash_recipient("same@input.com");
        let t2 = hash_recipient("same@input.com");
        // 随机盐保证相同邮箱产生不同令牌
        assert_ne!(t1, t2);
        assert!(verify_recipient(&t1, "same@input.com"));
        assert!(verify_recipient(&t2, "same@input.com"));
    }

    #[test]
    fn malformed_tokens_verify_false() {
        assert!(!verify_recipient("", "a@b.com"));
        assert!(!verify_recipient("sha256$onlysalt", "a@b.com"));
        assert!(!verify_recipient("md5$salt$digest", "a@b.com"));
        assert!(!verify_recipient("a@b.com", "a@b.com"));
    }
}
