//! Runs the repository against a real Postgres. Needs `DATABASE_URL` pointing
//! at a database with `schema.sql` applied:
//!
//! ```sh
//! cargo test --test postgres -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use dotenv::dotenv;
use timetrack::models::{NewUser, TaskFilter, TaskInput, TaskQuery};
use timetrack::repository::RepositoryError;
use timetrack::store::PgTaskStore;
use timetrack::TaskRepository;
use uuid::Uuid;

async fn cleanup_user(store: &PgTaskStore, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(store.pool())
        .await;
}

#[ignore]
#[actix_rt::test]
async fn test_owner_scoping_against_postgres() {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let store = PgTaskStore::connect(&database_url, Duration::from_secs(5))
        .await
        .expect("Failed to connect to test DB");

    let emails = ["pg_owner@example.com", "pg_other@example.com"];
    for email in emails {
        cleanup_user(&store, email).await;
    }

    let repo = TaskRepository::new(Arc::new(store.clone()));
    let mut identities = Vec::new();
    for (name, email) in [("PG Owner", emails[0]), ("PG Other", emails[1])] {
        let user = repo
            .register_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .expect("Failed to register user");
        identities.push(user.identity());
    }
    let (owner, other) = (&identities[0], &identities[1]);

    let input = TaskInput {
        title: "50% of the report".to_string(),
        description: "drafting".to_string(),
        tag: "work".to_string(),
        duration: 60,
        date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    };
    let task = repo.create(&input, owner).await.unwrap();

    // Wildcards in the search term are matched literally.
    let query = TaskQuery {
        title: Some("50%".to_string()),
        duration_min: Some(30),
        ..TaskQuery::default()
    };
    let found = repo
        .list(&TaskFilter::from_query(query.clone(), owner.id))
        .await
        .unwrap();
    assert_eq!(found, vec![task.clone()]);

    let wildcard = TaskQuery {
        title: Some("5_%".to_string()),
        ..TaskQuery::default()
    };
    assert!(repo
        .list(&TaskFilter::from_query(wildcard, owner.id))
        .await
        .unwrap()
        .is_empty());

    assert!(repo
        .list(&TaskFilter::from_query(query, other.id))
        .await
        .unwrap()
        .is_empty());

    assert!(matches!(
        repo.update(task.id, &input, other).await,
        Err(RepositoryError::NotFoundOrForbidden)
    ));
    assert!(matches!(
        repo.delete(task.id, other).await,
        Err(RepositoryError::NothingDeleted)
    ));
    assert!(matches!(
        repo.delete(Uuid::new_v4(), owner).await,
        Err(RepositoryError::NothingDeleted)
    ));
    repo.delete(task.id, owner).await.unwrap();

    for email in emails {
        cleanup_user(&store, email).await;
    }
}
