/// Repository and unit-of-work tests over an in-memory database
mod common;

use uuid::Uuid;

use common::test_context;
use shareon::error::AppError;
use shareon::services::profile::CreateProfileRequest;
use shareon::store::{Hashtag, Platform, Profile, Stamps, UnitOfWork, Wall};

fn platform(name: &str) -> Platform {
    Platform {
        id: Uuid::new_v4(),
        name: name.into(),
        app_id: None,
        api_endpoint: format!("https://api.example.com/{}", name.to_lowercase()),
        stamps: Stamps::now(),
    }
}

fn profile(platform_id: Uuid, handle: &str) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        platform_id,
        profile_handle: handle.into(),
        platform_user_id: Some("pu-1".into()),
        token: "access-token".into(),
        stamps: Stamps::now(),
        platform: None,
    }
}

#[tokio::test]
async fn get_by_id_with_and_without_include_agree_on_core_fields() {
    let (ctx, _mailer) = test_context().await;
    let mut uow = UnitOfWork::new(ctx.db.clone());

    let platform = platform("Instagram");
    let profile = profile(platform.id, "wall_of_fame");
    let profile_id = profile.id;
    uow.platforms.add(platform);
    uow.profiles.add(profile);
    uow.save().await.expect("save");

    let bare = uow
        .profiles
        .get_by_id(profile_id, &[])
        .await
        .expect("bare lookup")
        .expect("exists");
    let eager = uow
        .profiles
        .get_by_id(profile_id, &["Platform"])
        .await
        .expect("eager lookup")
        .expect("exists");

    assert_eq!(bare.id, eager.id);
    assert_eq!(bare.profile_handle, eager.profile_handle);
    assert_eq!(bare.platform_user_id, eager.platform_user_id);
    assert_eq!(bare.token, eager.token);
    assert_eq!(bare.platform_id, eager.platform_id);

    assert!(bare.platform.is_none());
    assert!(eager.platform.is_some());
}

#[tokio::test]
async fn profile_create_against_missing_platform_writes_nothing() {
    let (ctx, _mailer) = test_context().await;

    let err = ctx
        .profile_service
        .create_profile(&CreateProfileRequest {
            platform_id: Uuid::new_v4(),
            profile_handle: "ghost".into(),
            platform_user_id: None,
            token: "access-token".into(),
        })
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    let uow = UnitOfWork::new(ctx.db.clone());
    let profiles = uow.profiles.get_all().await.expect("list");
    assert!(profiles.is_empty(), "failed create must not write");
}

#[tokio::test]
async fn update_save_get_round_trips_scalar_fields() {
    let (ctx, _mailer) = test_context().await;
    let mut uow = UnitOfWork::new(ctx.db.clone());

    let mut subject = platform("Instagram");
    let id = subject.id;
    uow.platforms.add(subject.clone());
    uow.save().await.expect("save");

    subject.name = "Twitter".into();
    subject.app_id = Some("tw-app".into());
    subject.api_endpoint = "https://api.example.com/twitter".into();
    uow.platforms.update(subject);
    uow.save().await.expect("save update");

    let found = uow
        .platforms
        .get_by_id(id, &[])
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(found.name, "Twitter");
    assert_eq!(found.app_id.as_deref(), Some("tw-app"));
    assert_eq!(found.api_endpoint, "https://api.example.com/twitter");
    assert!(found.stamps.updated_at.is_some(), "update stamps the record");
}

#[tokio::test]
async fn add_range_and_update_range_commit_in_one_save() {
    let (ctx, _mailer) = test_context().await;
    let mut uow = UnitOfWork::new(ctx.db.clone());

    let platforms = vec![platform("Instagram"), platform("Twitter"), platform("TikTok")];
    uow.platforms.add_range(platforms.clone());
    assert_eq!(uow.platforms.pending(), 3);
    uow.save().await.expect("save");

    let mut stored = uow.platforms.get_all().await.expect("list");
    assert_eq!(stored.len(), 3);

    for p in &mut stored {
        p.app_id = Some("shared-app".into());
    }
    uow.platforms.update_range(stored);
    uow.save().await.expect("save updates");

    let updated = uow
        .platforms
        .get_all_where(|p| p.app_id.as_deref() == Some("shared-app"))
        .await
        .expect("filtered list");
    assert_eq!(updated.len(), 3);
}

#[tokio::test]
async fn get_all_where_filters_rows() {
    let (ctx, _mailer) = test_context().await;
    let mut uow = UnitOfWork::new(ctx.db.clone());

    uow.platforms.add(platform("Instagram"));
    uow.platforms.add(platform("Twitter"));
    uow.save().await.expect("save");

    let filtered = uow
        .platforms
        .get_all_where(|p| p.name == "Twitter")
        .await
        .expect("filtered");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Twitter");
}

#[tokio::test]
async fn nested_eager_load_resolves_dotted_paths() {
    let (ctx, _mailer) = test_context().await;
    let mut uow = UnitOfWork::new(ctx.db.clone());

    let platform = platform("Instagram");
    let platform_id = platform.id;
    let profile = profile(platform_id, "wall_of_fame");
    let profile_id = profile.id;
    let wall = Wall {
        id: Uuid::new_v4(),
        name: "Lobby".into(),
        stamps: Stamps::now(),
        profiles: Vec::new(),
        hashtags: Vec::new(),
    };
    let hashtag = Hashtag {
        id: Uuid::new_v4(),
        tag: "#conference".into(),
        platform_hashtag_id: None,
        stamps: Stamps::now(),
    };
    let wall_id = wall.id;
    let hashtag_id = hashtag.id;

    uow.platforms.add(platform);
    uow.profiles.add(profile);
    uow.walls.add(wall);
    uow.hashtags.add(hashtag);
    uow.save().await.expect("save");

    sqlx::query("INSERT INTO walls_profiles (wall_id, profile_id) VALUES (?1, ?2)")
        .bind(wall_id)
        .bind(profile_id)
        .execute(&ctx.db)
        .await
        .expect("join row");
    sqlx::query("INSERT INTO walls_hashtags (wall_id, hashtag_id) VALUES (?1, ?2)")
        .bind(wall_id)
        .bind(hashtag_id)
        .execute(&ctx.db)
        .await
        .expect("join row");

    let loaded = uow
        .walls
        .get_by_id(wall_id, &["Profiles.Platform", "Hashtags"])
        .await
        .expect("lookup")
        .expect("exists");

    assert_eq!(loaded.profiles.len(), 1);
    let nested_platform = loaded.profiles[0]
        .platform
        .as_ref()
        .expect("nested platform eager-loaded");
    assert_eq!(nested_platform.id, platform_id);
    assert_eq!(loaded.hashtags.len(), 1);
    assert_eq!(loaded.hashtags[0].tag, "#conference");
}

#[tokio::test]
async fn unknown_relation_path_is_an_error() {
    let (ctx, _mailer) = test_context().await;
    let mut uow = UnitOfWork::new(ctx.db.clone());

    let subject = platform("Instagram");
    let id = subject.id;
    uow.platforms.add(subject);
    uow.save().await.expect("save");

    let err = uow
        .platforms
        .get_by_id(id, &["Nonsense"])
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::UnknownRelation { .. }));
}
