mod common;

use sqlx::PgPool;
use std::sync::Arc;

use snaplink::domain::entities::ShortUrlPatch;
use snaplink::domain::repositories::{ShortUrlRepository, UserRepository};
use snaplink::infrastructure::persistence::{PgShortUrlRepository, PgUserRepository};

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find(pool: PgPool) {
    let user_id = common::insert_user(&pool, "ada@example.com").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let mut new_url = common::new_short_url(user_id, "abc1", "https://example.com");
    new_url.title = Some("Example".to_string());
    new_url.tags = vec!["rust".to_string(), "web".to_string()];

    let created = repo.create(new_url).await.unwrap();
    assert_eq!(created.short_code, "abc1");
    assert_eq!(created.access_count, 0);
    assert_eq!(created.tags, ["rust", "web"]);
    assert!(created.last_accessed_at.is_none());

    let found = repo.find_by_code("abc1").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.title.as_deref(), Some("Example"));

    assert!(repo.code_exists("abc1").await.unwrap());
    assert!(!repo.code_exists("ABC1").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_code_is_conflict(pool: PgPool) {
    let ada = common::insert_user(&pool, "ada@example.com").await;
    let bob = common::insert_user(&pool, "bob@example.com").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    repo.create(common::new_short_url(ada, "same", "https://a.example.com"))
        .await
        .unwrap();
    let err = repo
        .create(common::new_short_url(bob, "same", "https://b.example.com"))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_access_increments(pool: PgPool) {
    let user_id = common::insert_user(&pool, "ada@example.com").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    repo.create(common::new_short_url(user_id, "hit", "https://example.com"))
        .await
        .unwrap();

    for _ in 0..3 {
        let target = repo.record_access("hit").await.unwrap();
        assert_eq!(target.as_deref(), Some("https://example.com"));
    }

    let stored = repo.find_by_code("hit").await.unwrap().unwrap();
    assert_eq!(stored.access_count, 3);
    assert!(stored.last_accessed_at.is_some());

    assert!(repo.record_access("miss").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_owner_scoping(pool: PgPool) {
    let ada = common::insert_user(&pool, "ada@example.com").await;
    let bob = common::insert_user(&pool, "bob@example.com").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    repo.create(common::new_short_url(ada, "adas", "https://example.com"))
        .await
        .unwrap();

    assert!(repo.find_owned("adas", ada).await.unwrap().is_some());
    assert!(repo.find_owned("adas", bob).await.unwrap().is_none());

    let patch = ShortUrlPatch {
        original_url: "https://evil.example.com".to_string(),
        title: None,
        tags: None,
    };
    assert!(repo.update_owned("adas", bob, patch).await.unwrap().is_none());
    assert!(!repo.delete_owned("adas", bob).await.unwrap());

    let stored = repo.find_by_code("adas").await.unwrap().unwrap();
    assert_eq!(stored.original_url, "https://example.com");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_patch_semantics(pool: PgPool) {
    let user_id = common::insert_user(&pool, "ada@example.com").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let mut new_url = common::new_short_url(user_id, "upd", "https://example.com/old");
    new_url.title = Some("Old".to_string());
    new_url.tags = vec!["a".to_string()];
    let created = repo.create(new_url).await.unwrap();

    let kept = repo
        .update_owned(
            "upd",
            user_id,
            ShortUrlPatch {
                original_url: "https://example.com/new".to_string(),
                title: None,
                tags: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.original_url, "https://example.com/new");
    assert_eq!(kept.title.as_deref(), Some("Old"));
    assert_eq!(kept.tags, ["a"]);
    assert!(kept.updated_at >= created.updated_at);

    let cleared = repo
        .update_owned(
            "upd",
            user_id,
            ShortUrlPatch {
                original_url: "https://example.com/new".to_string(),
                title: Some(None),
                tags: Some(Vec::new()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.title.is_none());
    assert!(cleared.tags.is_empty());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_by_owner_newest_first(pool: PgPool) {
    let ada = common::insert_user(&pool, "ada@example.com").await;
    let bob = common::insert_user(&pool, "bob@example.com").await;
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    for code in ["one", "two", "three"] {
        repo.create(common::new_short_url(ada, code, "https://example.com"))
            .await
            .unwrap();
    }
    repo.create(common::new_short_url(bob, "bobs", "https://example.com"))
        .await
        .unwrap();

    let codes: Vec<String> = repo
        .list_by_owner(ada)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.short_code)
        .collect();

    assert_eq!(codes, ["three", "two", "one"]);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_delete_cascades(pool: PgPool) {
    let ada = common::insert_user(&pool, "ada@example.com").await;
    let pool = Arc::new(pool);
    let urls = PgShortUrlRepository::new(pool.clone());
    let users = PgUserRepository::new(pool);

    urls.create(common::new_short_url(ada, "casc", "https://example.com"))
        .await
        .unwrap();

    assert!(users.delete(ada).await.unwrap());
    assert!(urls.find_by_code("casc").await.unwrap().is_none());
    assert!(!urls.code_exists("casc").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ping(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    assert!(repo.ping().await.is_ok());
}
