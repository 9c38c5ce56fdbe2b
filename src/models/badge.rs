//! 徽章实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Assertion, Authorization, Issuer, PersonIdent, epoch};

/// 徽章定义
///
/// id 是 name 的 slug，name 全局唯一。标签在内存中是规范化的
/// 有序集合，逗号分隔形式只出现在存储边界。
///
/// `issuer` / `assertions` / `authorizations` 是关联数据，
/// 仅 `get_badge` 填充；列表和搜索查询返回的实例中为空。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    /// 图片路径或绝对 URL，资源本体由外部存储负责
    pub image: String,
    pub description: String,
    pub criteria: String,
    pub issuer_id: String,
    pub version: String,
    pub tags: Vec<String>,
    pub created_on: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorizations: Vec<Authorization>,
}

impl Badge {
    /// 判定某个身份是否被授权颁发此徽章
    ///
    /// 对已加载的授权记录做集合成员判定，接受邮箱或已解析的用户。
    pub fn authorized<I: PersonIdent>(&self, who: I) -> bool {
        let email = who.email();
        self.authorizations.iter().any(|a| a.person_id == email)
    }

    /// 图片的展示路径：绝对 URL 原样返回，否则归入 /pngs/ 下
    pub fn image_path(&self) -> String {
        if self.image.starts_with("http") {
            self.image.clone()
        } else {
            format!("/pngs/{}", self.image)
        }
    }

    /// 导出为扁平键值投影
    ///
    /// 颁发机构作为嵌套投影挂在 `issuer` 键下（未加载时为 null），
    /// 空标签集导出为 null。
    pub fn export(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "image": self.image_path(),
            "description": self.description,
            "criteria": self.criteria,
            "version": self.version,
            "tags": if self.tags.is_empty() {
                Value::Null
            } else {
                json!(self.tags)
            },
            "created_on": epoch(&self.created_on),
            "issuer": self.issuer.as_ref().map(|i| i.export()),
        })
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
