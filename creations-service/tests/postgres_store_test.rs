//! PostgreSQL store tests. Skipped unless `TEST_DATABASE_URL` is set.

use creations_service::models::{CreationKind, NewCreation, Tier};
use creations_service::services::{CreationStore, Database, EntitlementStore};
use uuid::Uuid;

async fn database() -> Option<Database> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return None;
        }
    };

    let db = Database::new(&url, 5, 1).await.expect("connect");
    db.run_migrations().await.expect("migrate");
    Some(db)
}

fn unique_user() -> String {
    format!("test_{}", Uuid::new_v4())
}

#[tokio::test]
async fn unknown_subscriber_is_registered_free() {
    let Some(db) = database().await else { return };
    let user = unique_user();

    let subscriber = db.subscriber(&user).await.unwrap();
    assert_eq!(subscriber.tier, Tier::Free);
    assert_eq!(subscriber.free_usage, 0);

    // A second read returns the same row instead of inserting again.
    let again = db.subscriber(&user).await.unwrap();
    assert_eq!(again, subscriber);
}

#[tokio::test]
async fn increment_is_conditional_on_limit() {
    let Some(db) = database().await else { return };
    let user = unique_user();
    db.subscriber(&user).await.unwrap();

    assert_eq!(db.increment_free_usage(&user, 2).await.unwrap(), Some(1));
    assert_eq!(db.increment_free_usage(&user, 2).await.unwrap(), Some(2));
    assert_eq!(db.increment_free_usage(&user, 2).await.unwrap(), None);
    assert_eq!(db.subscriber(&user).await.unwrap().free_usage, 2);
}

#[tokio::test]
async fn concurrent_increments_never_pass_limit() {
    let Some(db) = database().await else { return };
    let user = unique_user();
    db.subscriber(&user).await.unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let db = db.clone();
            let user = user.clone();
            tokio::spawn(async move { db.increment_free_usage(&user, 10).await })
        })
        .collect();

    let mut landed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            landed += 1;
        }
    }

    assert_eq!(landed, 10);
    assert_eq!(db.subscriber(&user).await.unwrap().free_usage, 10);
}

#[tokio::test]
async fn creations_round_trip_through_listings() {
    let Some(db) = database().await else { return };
    let user = unique_user();

    for (prompt, publish) in [("first", false), ("second", true)] {
        db.insert(NewCreation {
            user_id: user.clone(),
            prompt: prompt.to_string(),
            content: format!("content for {}", prompt),
            kind: CreationKind::BlogTitle,
            publish,
        })
        .await
        .unwrap();
    }

    let mine = db.list_for_user(&user, 10).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].prompt, "second");
    assert_eq!(mine[0].kind, CreationKind::BlogTitle);

    let published = db.list_published(100).await.unwrap();
    assert!(published
        .iter()
        .any(|c| c.user_id == user && c.prompt == "second"));
    assert!(published.iter().all(|c| c.publish));

    db.health_check().await.unwrap();
}
