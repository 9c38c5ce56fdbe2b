//! 模型导出与授权判定集成测试
//!
//! 覆盖实体的结构化导出投影（扁平键值 + 嵌套引用）、默认标识符
//! 派生和实体侧的授权集合判定。

use badge_registry::{BadgeDatabase, generate_default_id};

/// 建一个不带通知接收端的内存库
async fn setup() -> BadgeDatabase {
    BadgeDatabase::open("sqlite::memory:", None)
        .await
        .expect("in-memory database should open")
}

#[tokio::test]
async fn issuer_export() {
    let db = setup().await;

    assert!(db.get_issuer("xyz").await.unwrap().is_none());

    let issuer_id = db
        .add_issuer("http://bleach.org", "aizen", "Bleach", "aizen@bleach.org")
        .await
        .unwrap();
    let issuer = db.get_issuer(&issuer_id).await.unwrap().unwrap();

    assert_eq!(issuer.to_string(), "aizen");

    let exported = issuer.export();
    assert_eq!(exported["origin"], "http://bleach.org");
    assert_eq!(exported["org"], "Bleach");
    assert_eq!(exported["contact"], "aizen@bleach.org");
    assert_eq!(exported["name"], "aizen");
    // 时间戳导出为 epoch 秒（浮点）
    assert!(exported["created_on"].is_f64());
}

#[tokio::test]
async fn default_id_generation() {
    assert_eq!(generate_default_id("my id"), "my-id");
}

#[tokio::test]
async fn badge_export_and_authorization() {
    let db = setup().await;
    let issuer_id = db
        .add_issuer("http://bleach.org", "aizen", "Bleach", "aizen@bleach.org")
        .await
        .unwrap();

    assert!(db.get_badge("kido").await.unwrap().is_none());

    let badge_id = db
        .add_badge(
            "kido",
            "kido",
            "A test badge for doing kido",
            "kido-expert",
            &issuer_id,
            None,
        )
        .await
        .unwrap();
    let badge = db.get_badge(&badge_id).await.unwrap().unwrap();

    assert_eq!(badge.to_string(), "kido");

    let exported = badge.export();
    assert_eq!(exported["name"], "kido");
    assert!(exported["tags"].is_null());
    // 相对图片路径归入 /pngs/ 下
    assert_eq!(exported["image"], "/pngs/kido");
    assert_eq!(exported["description"], "A test badge for doing kido");
    assert!(exported["created_on"].is_f64());
    assert_eq!(exported["version"], "0.5.0");
    assert_eq!(exported["criteria"], "kido-expert");
    // 颁发机构作为嵌套投影导出
    assert!(exported["issuer"].is_object());
    assert_eq!(exported["issuer"]["org"], "Bleach");

    db.add_person(
        "hinamori@bleach.org",
        Some("hinamori"),
        Some("http://bleach.org"),
        Some("lieutenant of the 5th Division"),
    )
    .await
    .unwrap();

    assert!(db.add_authorization(&badge_id, "hinamori@bleach.org").await.unwrap());

    // 重新加载以取回授权记录
    let badge = db.get_badge(&badge_id).await.unwrap().unwrap();
    assert_eq!(badge.authorizations.len(), 1);
    assert_eq!(
        badge.authorizations[0].export()["person_id"],
        "hinamori@bleach.org"
    );
    assert!(!badge.authorized("izuru@bleach.org"));

    // 邮箱和已解析的用户都可作为身份
    let person = db.get_person("hinamori@bleach.org").await.unwrap().unwrap();
    assert!(badge.authorized(&person));
    assert!(badge.authorized("hinamori@bleach.org"));
}

#[tokio::test]
async fn authorization_requires_resolvable_references() {
    let db = setup().await;
    let issuer_id = db
        .add_issuer("http://bleach.org", "aizen", "Bleach", "aizen@bleach.org")
        .await
        .unwrap();
    let badge_id = db
        .add_badge(
            "kido",
            "kido",
            "A test badge for doing kido",
            "kido-expert",
            &issuer_id,
            None,
        )
        .await
        .unwrap();

    // 未注册用户或未知徽章都不能建立授权
    assert!(!db.add_authorization(&badge_id, "ghost@bleach.org").await.unwrap());
    assert!(!db.add_authorization("no-such-badge", "ghost@bleach.org").await.unwrap());
}

#[tokio::test]
async fn badge_export_keeps_tags_and_absolute_image() {
    let db = setup().await;
    let issuer_id = db
        .add_issuer("http://bleach.org", "aizen", "Bleach", "aizen@bleach.org")
        .await
        .unwrap();
    let badge_id = db
        .add_badge(
            "Hollow Hunter",
            "https://cdn.bleach.org/hollow.png",
            "Defeated a hollow",
            "hollow-expert",
            &issuer_id,
            Some("Combat, hollow, combat"),
        )
        .await
        .unwrap();

    let badge = db.get_badge(&badge_id).await.unwrap().unwrap();
    // 标签规范化：去重、转小写、保序
    assert_eq!(badge.tags, vec!["combat", "hollow"]);

    let exported = badge.export();
    assert_eq!(exported["image"], "https://cdn.bleach.org/hollow.png");
    assert_eq!(exported["tags"][0], "combat");
    assert_eq!(exported["tags"][1], "hollow");
}

#[tokio::test]
async fn exports_roundtrip_natural_keys() {
    let db = setup().await;

    // 每个实体的导出都必须带回创建时提供的自然键字段
    let issuer_id = db
        .add_issuer("TestOrigin", "TestName", "TestOrg", "TestContact")
        .await
        .unwrap();
    let issuer = db.get_issuer(&issuer_id).await.unwrap().unwrap();
    assert_eq!(issuer.export()["origin"], "TestOrigin");
    assert_eq!(issuer.export()["name"], "TestName");

    let badge_id = db
        .add_badge(
            "TestBadge",
            "TestImage",
            "A test badge",
            "TestCriteria",
            &issuer_id,
            None,
        )
        .await
        .unwrap();
    let badge = db.get_badge(&badge_id).await.unwrap().unwrap();
    assert_eq!(badge.export()["name"], "TestBadge");

    db.add_person("test@tester.com", Some("tester"), None, None)
        .await
        .unwrap();
    let person = db.get_person("test@tester.com").await.unwrap().unwrap();
    assert_eq!(person.export()["email"], "test@tester.com");
    assert_eq!(person.export()["nickname"], "tester");

    let team_id = db.create_team("TestTeam").await.unwrap();
    let team = db.get_team(&team_id).await.unwrap().unwrap();
    assert_eq!(team.export()["name"], "TestTeam");

    let series_id = db
        .create_series("TestSeries", "A test series", &team_id, Some("test"))
        .await
        .unwrap();
    let series = db.get_series(&series_id).await.unwrap().unwrap();
    assert_eq!(series.export()["name"], "TestSeries");
    assert_eq!(series.export()["team_id"], team_id.as_str());

    let milestone_id = db
        .create_milestone(1, &badge_id, &series_id)
        .await
        .unwrap()
        .unwrap();
    let milestone = db.get_milestone(&milestone_id).await.unwrap().unwrap();
    assert_eq!(milestone.export()["position"], 1);
    assert_eq!(milestone.export()["badge_id"], badge_id.as_str());

    let invitation_id = db.add_invitation(&badge_id, None).await.unwrap().unwrap();
    let invitation = db.get_invitation(&invitation_id).await.unwrap().unwrap();
    assert_eq!(invitation.export()["badge_id"], badge_id.as_str());

    let assertion_id = db
        .add_assertion(&badge_id, "test@tester.com", None, Some("link"))
        .await
        .unwrap()
        .unwrap();
    let assertions = db.get_assertions_by_email("test@tester.com").await.unwrap();
    assert_eq!(assertions.len(), 1);
    assert_eq!(assertions[0].export()["id"], assertion_id.as_str());
    assert_eq!(assertions[0].export()["badge_id"], badge_id.as_str());
    assert_eq!(assertions[0].export()["issued_for"], "link");
}

#[tokio::test]
async fn series_last_updated_refreshes_on_structural_change() {
    let db = setup().await;
    let issuer_id = db
        .add_issuer("TestOrigin", "TestName", "TestOrg", "TestContact")
        .await
        .unwrap();
    let badge_id = db
        .add_badge(
            "TestBadge",
            "TestImage",
            "A test badge",
            "TestCriteria",
            &issuer_id,
            None,
        )
        .await
        .unwrap();
    let team_id = db.create_team("TestTeam").await.unwrap();
    let series_id = db
        .create_series("TestSeries", "A test series", &team_id, None)
        .await
        .unwrap();

    let before = db.get_series(&series_id).await.unwrap().unwrap().last_updated;

    db.create_milestone(1, &badge_id, &series_id)
        .await
        .unwrap()
        .unwrap();

    let after = db.get_series(&series_id).await.unwrap().unwrap().last_updated;
    assert!(after >= before);

    // 幂等短路不触发结构变化
    let unchanged = db.get_series(&series_id).await.unwrap().unwrap().last_updated;
    db.create_milestone(1, &badge_id, &series_id)
        .await
        .unwrap()
        .unwrap();
    let still = db.get_series(&series_id).await.unwrap().unwrap().last_updated;
    assert_eq!(still, unchanged);
}
