//! Login links, admin accounts, player roles and cosmetics.

mod common;

use chrono::Utc;
use mockall::predicate::eq;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use common::TestUnitOfWork;
use merch_api::config::Config;
use merch_api::domain::{Admin, Cosmetic, HashedPassword, Player, PlayerRole, RoleAction, WardrobeItem};
use merch_api::errors::AppError;
use merch_api::services::{
    AdminManager, AdminService, AuthService, Authenticator, CosmeticManager, CosmeticService,
    PlayerManager, PlayerService,
};

fn player(uuid: Uuid, username: &str) -> Player {
    Player {
        uuid,
        username: username.to_string(),
        creation: Utc::now(),
        last_seen: Utc::now(),
        roles: vec![PlayerRole::Default],
        stats: serde_json::json!({ "playtime": 12 }),
    }
}

// =============================================================================
// Login links
// =============================================================================

#[tokio::test]
async fn test_login_link_requires_api_secret() {
    let auth = Authenticator::new(TestUnitOfWork::default().build(), Config::for_tests()).unwrap();

    let err = auth
        .generate_link("wrong", "Steve".to_string(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_login_link_redeems_for_session() {
    let uuid = Uuid::new_v4();

    let mut uow = TestUnitOfWork::default();
    uow.players
        .expect_upsert()
        .with(eq(uuid), eq("Steve".to_string()))
        .times(1)
        .returning(|uuid, username| Ok(player(uuid, &username)));
    uow.players
        .expect_find()
        .with(eq(uuid))
        .returning(|uuid| Ok(Some(player(uuid, "Steve"))));
    uow.players.expect_touch().times(1).returning(|_| Ok(()));

    let auth = Authenticator::new(uow.build(), Config::for_tests()).unwrap();

    let link = auth
        .generate_link("test-auth-api-secret", "Steve".to_string(), uuid)
        .await
        .unwrap();
    let token = link
        .link
        .strip_prefix("https://shop.test/login?t=")
        .expect("link points at the storefront login page");

    let account = auth.redeem_link(token).await.unwrap();
    assert_eq!(account.uuid, uuid);
    assert_eq!(account.username, "Steve");

    let session = account.token.expect("redeemed link carries a session token");
    let claims = auth.verify_token(&session).unwrap();
    assert_eq!(claims.uuid, uuid);
}

#[tokio::test]
async fn test_link_stays_valid_until_expiry() {
    let uuid = Uuid::new_v4();

    let mut uow = TestUnitOfWork::default();
    uow.players
        .expect_upsert()
        .returning(|uuid, username| Ok(player(uuid, &username)));
    uow.players
        .expect_find()
        .returning(|uuid| Ok(Some(player(uuid, "Steve"))));
    uow.players.expect_touch().times(2).returning(|_| Ok(()));

    let auth = Authenticator::new(uow.build(), Config::for_tests()).unwrap();
    let link = auth
        .generate_link("test-auth-api-secret", "Steve".to_string(), uuid)
        .await
        .unwrap();
    let token = link.link.rsplit("t=").next().unwrap().to_string();

    assert_ok!(auth.redeem_link(&token).await);
    assert_ok!(auth.redeem_link(&token).await);
}

#[tokio::test]
async fn test_tampered_link_is_rejected() {
    let auth = Authenticator::new(TestUnitOfWork::default().build(), Config::for_tests()).unwrap();

    assert_err!(auth.redeem_link("not-a-link").await);
    assert_err!(auth.verify_token("not.a.jwt"));
}

// =============================================================================
// Admin accounts
// =============================================================================

#[tokio::test]
async fn test_register_refused_once_an_admin_exists() {
    let mut uow = TestUnitOfWork::default();
    uow.admins.expect_exists_any().returning(|| Ok(true));
    uow.admins.expect_create().never();

    let admins = AdminManager::new(uow.build(), Config::for_tests());

    let err = admins
        .register("second".to_string(), "long enough password".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_admin_login_and_authenticate() {
    let stored = HashedPassword::create("correct horse battery").unwrap();

    let mut uow = TestUnitOfWork::default();
    let by_name = stored.clone();
    uow.admins
        .expect_find_by_username()
        .returning(move |username| {
            Ok((username == "shopkeeper").then(|| Admin {
                id: 1,
                username: username.to_string(),
                password: by_name.clone(),
            }))
        });
    uow.admins.expect_find_by_id().with(eq(1)).returning(move |id| {
        Ok(Some(Admin {
            id,
            username: "shopkeeper".to_string(),
            password: stored.clone(),
        }))
    });

    let admins = AdminManager::new(uow.build(), Config::for_tests());

    let err = admins
        .login("shopkeeper".to_string(), "wrong password".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid username or password.");

    let err = admins
        .login("nobody".to_string(), "correct horse battery".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    let login = admins
        .login(" shopkeeper ".to_string(), "correct horse battery".to_string())
        .await
        .unwrap();
    assert_eq!(login.username, "shopkeeper");

    let admin = admins.authenticate(&login.token).await.unwrap();
    assert_eq!(admin.id, 1);
}

#[tokio::test]
async fn test_player_token_is_not_admin_session() {
    let uuid = Uuid::new_v4();
    let mut uow = TestUnitOfWork::default();
    uow.players
        .expect_find()
        .returning(|uuid| Ok(Some(player(uuid, "Steve"))));
    uow.players.expect_touch().returning(|_| Ok(()));
    uow.players
        .expect_upsert()
        .returning(|uuid, username| Ok(player(uuid, &username)));
    let uow = uow.build();

    let auth = Authenticator::new(uow.clone(), Config::for_tests()).unwrap();
    let admins = AdminManager::new(uow, Config::for_tests());

    let link = auth
        .generate_link("test-auth-api-secret", "Steve".to_string(), uuid)
        .await
        .unwrap();
    let token = link.link.rsplit("t=").next().unwrap().to_string();
    let session = auth.redeem_link(&token).await.unwrap().token.unwrap();

    assert_ok!(auth.verify_token(&session));
    assert_err!(admins.authenticate(&session).await);
}

// =============================================================================
// Player roles
// =============================================================================

#[tokio::test]
async fn test_update_roles_adds_without_duplicates() {
    let uuid = Uuid::new_v4();
    let mut uow = TestUnitOfWork::default();
    uow.players
        .expect_find()
        .returning(|uuid| Ok(Some(player(uuid, "Steve"))));
    uow.players
        .expect_set_roles()
        .withf(|_, roles: &Vec<PlayerRole>| {
            roles == &vec![PlayerRole::Default, PlayerRole::Staff]
        })
        .returning(|uuid, roles| {
            let mut updated = player(uuid, "Steve");
            updated.roles = roles;
            Ok(Some(updated))
        });

    let players = PlayerManager::new(uow.build());

    let roles = players
        .update_roles(
            uuid,
            RoleAction::Add,
            vec![PlayerRole::Default, PlayerRole::Staff],
        )
        .await
        .unwrap();
    assert_eq!(roles, vec![PlayerRole::Default, PlayerRole::Staff]);
}

#[tokio::test]
async fn test_account_of_unknown_player() {
    let mut uow = TestUnitOfWork::default();
    uow.players.expect_find().returning(|_| Ok(None));

    let players = PlayerManager::new(uow.build());

    let err = players.account(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Player not found");
}

// =============================================================================
// Cosmetics
// =============================================================================

fn wardrobe_item(id: i64, kind: &str, equipped: bool) -> WardrobeItem {
    WardrobeItem {
        id,
        name: format!("cosmetic-{}", id),
        kind: kind.to_string(),
        equipped,
        preview_image: None,
    }
}

#[tokio::test]
async fn test_equip_swaps_cosmetic_in_same_slot() {
    let uuid = Uuid::new_v4();
    let mut uow = TestUnitOfWork::default();
    uow.cosmetics.expect_find().with(eq(2)).returning(|id| {
        Ok(Some(Cosmetic {
            id,
            name: "Top Hat".to_string(),
            kind: "hat".to_string(),
            model: None,
            script: None,
            preview_image: None,
        }))
    });
    uow.cosmetics.expect_wardrobe().returning(|_| {
        Ok(vec![
            wardrobe_item(1, "hat", true),
            wardrobe_item(2, "hat", false),
            wardrobe_item(3, "cape", true),
        ])
    });
    uow.cosmetics
        .expect_set_equipped()
        .withf(|_, ids: &Vec<i64>| ids == &vec![3, 2])
        .times(1)
        .returning(|_, _| Ok(()));

    let cosmetics = CosmeticManager::new(uow.build());

    let equipped = cosmetics.equip(uuid, 2).await.unwrap();
    assert_eq!(equipped.equipped_cosmetics, vec![3, 2]);
}

#[tokio::test]
async fn test_equip_unknown_or_unowned_cosmetic() {
    let mut uow = TestUnitOfWork::default();
    uow.cosmetics.expect_find().returning(|id| {
        Ok((id == 5).then(|| Cosmetic {
            id,
            name: "Wings".to_string(),
            kind: "wings".to_string(),
            model: None,
            script: None,
            preview_image: None,
        }))
    });
    uow.cosmetics
        .expect_wardrobe()
        .returning(|_| Ok(vec![wardrobe_item(1, "hat", true)]));
    uow.cosmetics.expect_set_equipped().never();

    let cosmetics = CosmeticManager::new(uow.build());

    let err = cosmetics.equip(Uuid::new_v4(), 404).await.unwrap_err();
    assert_eq!(err.to_string(), "Unknown cosmetic");

    let err = cosmetics.equip(Uuid::new_v4(), 5).await.unwrap_err();
    assert_eq!(err.to_string(), "Cosmetic not in wardrobe");
}

#[tokio::test]
async fn test_cosmetic_data_not_found() {
    let mut uow = TestUnitOfWork::default();
    uow.cosmetics.expect_find().returning(|_| Ok(None));

    let cosmetics = CosmeticManager::new(uow.build());

    let err = cosmetics.get(1).await.unwrap_err();
    assert_eq!(err.to_string(), "Cosmetic not found");
}
