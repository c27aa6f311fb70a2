use sqlx::PgPool;
use std::sync::Arc;

use shortlink::domain::entities::InsertOutcome;
use shortlink::domain::errors::StoreError;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::persistence::PgLinkRepository;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_link(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let outcome = repo
        .insert_if_absent("abc123", "https://example.com/")
        .await
        .unwrap();

    match outcome {
        InsertOutcome::Inserted(link) => {
            assert_eq!(link.id, "abc123");
            assert_eq!(link.target, "https://example.com/");
        }
        InsertOutcome::Collision => panic!("fresh code reported as collision"),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_collision_keeps_first_target(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool.clone()));

    repo.insert_if_absent("dup001", "https://first.example.com/")
        .await
        .unwrap();
    let second = repo
        .insert_if_absent("dup001", "https://second.example.com/")
        .await
        .unwrap();

    assert_eq!(second, InsertOutcome::Collision);

    let target: String = sqlx::query_scalar("SELECT long_url FROM links WHERE code = $1")
        .bind("dup001")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(target, "https://first.example.com/");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_other_constraint_violation_is_an_error(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo.insert_if_absent("bad!!!", "https://example.com/").await;

    assert!(matches!(result, Err(StoreError::Query(_))));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_target(pool: PgPool) {
    sqlx::query("INSERT INTO links (code, long_url) VALUES ($1, $2)")
        .bind("find01")
        .bind("https://example.com/found")
        .execute(&pool)
        .await
        .unwrap();

    let repo = PgLinkRepository::new(Arc::new(pool));

    assert_eq!(
        repo.find_target("find01").await.unwrap().as_deref(),
        Some("https://example.com/found")
    );
    assert_eq!(repo.find_target("nope00").await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_inserts_single_winner(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.insert_if_absent("race01", &format!("https://example.com/{}", i))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if !handle.await.unwrap().is_collision() {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_health_check(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    assert!(repo.health_check().await.is_ok());
}
