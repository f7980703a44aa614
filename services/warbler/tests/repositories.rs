//! Repository tests against a real PostgreSQL database
//!
//! Each test drops and recreates the schema, so point `DATABASE_URL` at a
//! disposable database and run with `cargo test -- --ignored`.

use common::{
    database::{DatabaseConfig, init_pool},
    error::unique_violation,
};
use serial_test::serial;
use sqlx::PgPool;
use warbler::{
    db,
    models::{DEFAULT_IMAGE_URL, NewMessage, NewUser, User},
    repositories::{FEED_LIMIT, MessageRepository, UserRepository},
};

async fn setup() -> PgPool {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    db::reset(&pool).await.unwrap();
    pool
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: "password".to_string(),
        image_url: None,
    }
}

async fn signup(users: &UserRepository, username: &str) -> User {
    users
        .signup(&new_user(username, &format!("{}@test.com", username)))
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_new_user_has_no_messages_or_followers() {
    let pool = setup().await;
    let users = UserRepository::new(pool);

    let user = signup(&users, "testuser").await;
    let stats = users.stats(user.id).await.unwrap();

    assert_eq!(stats.messages, 0);
    assert_eq!(stats.followers, 0);
    assert_eq!(stats.following, 0);
    assert_eq!(stats.likes, 0);
    assert!(users.followers(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_signup_hashes_password() {
    let pool = setup().await;
    let users = UserRepository::new(pool);

    let user = users
        .signup(&new_user("testtesttest", "testtest@test.com"))
        .await
        .unwrap();

    assert_eq!(user.username, "testtesttest");
    assert_eq!(user.email, "testtest@test.com");
    assert_eq!(user.image_url, DEFAULT_IMAGE_URL);
    assert_ne!(user.password, "password");
    assert!(user.password.starts_with("$argon2"));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_signup_rejects_duplicates() {
    let pool = setup().await;
    let users = UserRepository::new(pool);
    users
        .signup(&new_user("test1", "email1@email.com"))
        .await
        .unwrap();

    let err = users
        .signup(&new_user("test1", "test@test.com"))
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("users_username_key"));

    let err = users
        .signup(&new_user("test2", "email1@email.com"))
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("users_email_key"));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_authenticate() {
    let pool = setup().await;
    let users = UserRepository::new(pool);
    signup(&users, "test1").await;

    let user = users.authenticate("test1", "password").await.unwrap();
    assert_eq!(user.map(|u| u.username).as_deref(), Some("test1"));

    assert!(
        users
            .authenticate("badusername", "password")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        users
            .authenticate("test1", "badpassword")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_follow_and_unfollow() {
    let pool = setup().await;
    let users = UserRepository::new(pool);
    let alice = signup(&users, "alice").await;
    let bob = signup(&users, "bob").await;

    assert!(users.follow(alice.id, bob.id).await.unwrap());
    assert!(!users.follow(alice.id, bob.id).await.unwrap());
    assert!(users.is_following(alice.id, bob.id).await.unwrap());
    assert!(!users.is_following(bob.id, alice.id).await.unwrap());

    let following = users.following(alice.id).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].username, "bob");

    let followers = users.followers(bob.id).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].username, "alice");

    assert!(users.unfollow(alice.id, bob.id).await.unwrap());
    assert!(!users.unfollow(alice.id, bob.id).await.unwrap());
    assert!(users.following(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_search_users() {
    let pool = setup().await;
    let users = UserRepository::new(pool);
    signup(&users, "alice").await;
    signup(&users, "Malice").await;
    signup(&users, "bob").await;

    assert_eq!(users.list(None).await.unwrap().len(), 3);

    let mut found: Vec<String> = users
        .list(Some("ALI"))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    found.sort();
    assert_eq!(found, vec!["Malice", "alice"]);

    assert!(users.list(Some("%")).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_message_belongs_to_author() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);
    let user = signup(&users, "testing").await;

    let message = messages
        .create(&NewMessage {
            text: "Test message".to_string(),
            user_id: user.id,
        })
        .await
        .unwrap();
    assert_eq!(message.text, "Test message");

    let shown = messages.find_by_id(message.id).await.unwrap().unwrap();
    assert_eq!(shown.user_id, user.id);
    assert_eq!(shown.username, "testing");
    assert_eq!(users.stats(user.id).await.unwrap().messages, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_home_feed_holds_own_and_followed_messages() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);
    let alice = signup(&users, "alice").await;
    let bob = signup(&users, "bob").await;
    let carol = signup(&users, "carol").await;
    users.follow(alice.id, bob.id).await.unwrap();

    for (author, text) in [(&alice, "from alice"), (&bob, "from bob"), (&carol, "from carol")] {
        messages
            .create(&NewMessage {
                text: text.to_string(),
                user_id: author.id,
            })
            .await
            .unwrap();
    }

    let feed = messages.home_feed(alice.id, FEED_LIMIT).await.unwrap();
    let texts: Vec<&str> = feed.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["from bob", "from alice"]);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_feed_is_capped() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);
    let user = signup(&users, "chatty").await;

    for i in 0..(FEED_LIMIT + 5) {
        messages
            .create(&NewMessage {
                text: format!("message {}", i),
                user_id: user.id,
            })
            .await
            .unwrap();
    }

    let feed = messages.for_user(user.id, FEED_LIMIT).await.unwrap();
    assert_eq!(feed.len() as i64, FEED_LIMIT);
    assert_eq!(feed[0].text, format!("message {}", FEED_LIMIT + 4));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_like_is_idempotent() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);
    let author = signup(&users, "author").await;
    let fan = signup(&users, "fan").await;
    let message = messages
        .create(&NewMessage {
            text: "likeable".to_string(),
            user_id: author.id,
        })
        .await
        .unwrap();

    assert!(messages.like(fan.id, message.id).await.unwrap());
    assert!(!messages.like(fan.id, message.id).await.unwrap());
    assert!(messages.is_liked(fan.id, message.id).await.unwrap());
    assert_eq!(messages.liked_ids(fan.id).await.unwrap(), vec![message.id]);
    assert_eq!(users.stats(fan.id).await.unwrap().likes, 1);

    assert!(messages.unlike(fan.id, message.id).await.unwrap());
    assert!(!messages.unlike(fan.id, message.id).await.unwrap());
    assert!(!messages.is_liked(fan.id, message.id).await.unwrap());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_deleting_user_cascades() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);
    let alice = signup(&users, "alice").await;
    let bob = signup(&users, "bob").await;
    users.follow(bob.id, alice.id).await.unwrap();
    let message = messages
        .create(&NewMessage {
            text: "soon gone".to_string(),
            user_id: alice.id,
        })
        .await
        .unwrap();
    messages.like(bob.id, message.id).await.unwrap();

    assert!(users.delete(alice.id).await.unwrap());

    assert!(users.find_by_id(alice.id).await.unwrap().is_none());
    assert!(messages.find_by_id(message.id).await.unwrap().is_none());
    assert!(users.following(bob.id).await.unwrap().is_empty());
    assert!(messages.liked_ids(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_concurrent_likes_both_succeed() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let messages = MessageRepository::new(pool.clone());
    let author = signup(&users, "author").await;
    let fan = signup(&users, "fan").await;
    let message = messages
        .create(&NewMessage {
            text: "double click".to_string(),
            user_id: author.id,
        })
        .await
        .unwrap();

    for _ in 0..20 {
        let (first, second) = tokio::join!(
            messages.like(fan.id, message.id),
            messages.like(fan.id, message.id)
        );
        let first = first.unwrap();
        let second = second.unwrap();
        assert!(first ^ second, "exactly one call should insert the like");
        assert_eq!(messages.liked_ids(fan.id).await.unwrap(), vec![message.id]);

        sqlx::query("DELETE FROM likes").execute(&pool).await.unwrap();
    }
}
