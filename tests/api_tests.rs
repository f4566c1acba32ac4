// tests/api_tests.rs

use chrono::Utc;
use quiz_backend::{config::Config, routes, state::AppState, utils::hash::hash_password};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use uuid::Uuid;

/// Helper function to spawn the app on a random port for testing.
/// Uses an in-memory SQLite database; the returned pool shares the same
/// single connection as the running app, so tests can seed rows directly.
async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
        admin_name: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Inserts an admin account directly; admin accounts are only created by
/// seeding, never through the register endpoint.
async fn seed_admin(pool: &SqlitePool, email: &str) {
    sqlx::query(
        "INSERT INTO users (id, email, password, name, role, created_at) \
         VALUES (?, ?, ?, 'Admin', 'admin', ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(email)
    .bind(hash_password("Admin@123").unwrap())
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_returns_token_payload() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "alice@example.com",
            "password": "password123",
            "name": "Alice"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["role"], "user");
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let payload = serde_json::json!({
        "email": "bob@example.com",
        "password": "password123",
        "name": "Bob"
    });

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);

    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "bob@example.com",
            "password": "different456",
            "name": "Not Bob"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 400);

    // The first registration is unaffected and can still log in.
    let login = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": "bob@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status().as_u16(), 200);
}

#[tokio::test]
async fn register_rejects_invalid_payload() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "password": "password123",
            "name": "Eve"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "carol@example.com",
            "password": "password123",
            "name": "Carol"
        }))
        .send()
        .await
        .unwrap();

    // Wrong password and unknown email must be indistinguishable.
    let wrong_password = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": "carol@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status().as_u16(), 401);
    let wrong_password_body: serde_json::Value = wrong_password.json().await.unwrap();

    let unknown_email = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": "nobody@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_email.status().as_u16(), 401);
    let unknown_email_body: serde_json::Value = unknown_email.json().await.unwrap();

    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn login_paths_are_role_filtered() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "dave@example.com",
            "password": "password123",
            "name": "Dave"
        }))
        .send()
        .await
        .unwrap();
    seed_admin(&pool, "root@example.com").await;

    // A user account cannot pass through the admin login path.
    let user_via_admin = client
        .post(format!("{}/api/auth/admin/login", address))
        .json(&serde_json::json!({
            "email": "dave@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(user_via_admin.status().as_u16(), 401);

    // And an admin account cannot pass through the user login path.
    let admin_via_user = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": "root@example.com",
            "password": "Admin@123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(admin_via_user.status().as_u16(), 401);

    // Each role authenticates through its own path.
    let admin_login = client
        .post(format!("{}/api/auth/admin/login", address))
        .json(&serde_json::json!({
            "email": "root@example.com",
            "password": "Admin@123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(admin_login.status().as_u16(), 200);
    let body: serde_json::Value = admin_login.json().await.unwrap();
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn questions_require_authentication() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/questions", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn regular_user_cannot_reach_admin_endpoints() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let register: serde_json::Value = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "frank@example.com",
            "password": "password123",
            "name": "Frank"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = register["token"].as_str().unwrap();

    let create = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "questionText": "Q?",
            "options": ["a", "b"],
            "correctAnswer": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status().as_u16(), 403);

    for path in ["/api/admin/reports", "/api/admin/stats", "/api/admin/users"] {
        let response = client
            .get(format!("{}{}", address, path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 403, "path {}", path);
    }
}

#[tokio::test]
async fn question_crud_flow() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    seed_admin(&pool, "admin@example.com").await;
    let admin_login: serde_json::Value = client
        .post(format!("{}/api/auth/admin/login", address))
        .json(&serde_json::json!({
            "email": "admin@example.com",
            "password": "Admin@123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_token = admin_login.get("token").unwrap().as_str().unwrap();

    // Create
    let created = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "questionText": "What does HTML stand for?",
            "options": ["Hyper Text Markup Language", "High Tech Modern Language"],
            "correctAnswer": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let question: serde_json::Value = created.json().await.unwrap();
    let question_id = question["id"].as_str().unwrap().to_string();
    assert_eq!(question["correctAnswer"], 0);

    // A regular user sees the full record, correct answer included.
    let user_register: serde_json::Value = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "grace@example.com",
            "password": "password123",
            "name": "Grace"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_token = user_register["token"].as_str().unwrap();

    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["questionText"], "What does HTML stand for?");
    assert_eq!(listed[0]["correctAnswer"], 0);

    // Admin read of a single question
    let fetched = client
        .get(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status().as_u16(), 200);

    // Update is a full replace
    let updated = client
        .put(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "questionText": "What does CSS stand for?",
            "options": ["Cascading Style Sheets", "Computer Style Sheets", "Creative Style Sheets"],
            "correctAnswer": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 204);

    let relisted: Vec<serde_json::Value> = client
        .get(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(relisted[0]["questionText"], "What does CSS stand for?");
    assert_eq!(relisted[0]["options"].as_array().unwrap().len(), 3);
    assert_eq!(relisted[0]["correctAnswer"], 2);

    // Delete, then every id-addressed operation is a 404
    let deleted = client
        .delete(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = client
        .get(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);

    let update_gone = client
        .put(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "questionText": "Q?",
            "options": ["a", "b"],
            "correctAnswer": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_gone.status().as_u16(), 404);
}

#[tokio::test]
async fn question_validation_rejects_bad_input() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    seed_admin(&pool, "admin@example.com").await;
    let admin_login: serde_json::Value = client
        .post(format!("{}/api/auth/admin/login", address))
        .json(&serde_json::json!({
            "email": "admin@example.com",
            "password": "Admin@123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_token = admin_login["token"].as_str().unwrap();

    // Out-of-range correct-answer index
    let out_of_range = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "questionText": "Q?",
            "options": ["a", "b"],
            "correctAnswer": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(out_of_range.status().as_u16(), 400);

    // Empty option list
    let no_options = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "questionText": "Q?",
            "options": [],
            "correctAnswer": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_options.status().as_u16(), 400);
}

#[tokio::test]
async fn admin_user_listing_excludes_admins() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    seed_admin(&pool, "admin@example.com").await;
    for (email, name) in [("h1@example.com", "Heidi"), ("h2@example.com", "Henry")] {
        client
            .post(format!("{}/api/auth/register", address))
            .json(&serde_json::json!({
                "email": email,
                "password": "password123",
                "name": name
            }))
            .send()
            .await
            .unwrap();
    }

    let admin_login: serde_json::Value = client
        .post(format!("{}/api/auth/admin/login", address))
        .json(&serde_json::json!({
            "email": "admin@example.com",
            "password": "Admin@123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_token = admin_login["token"].as_str().unwrap();

    let users: Vec<serde_json::Value> = client
        .get(format!("{}/api/admin/users", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    for user in &users {
        assert!(user["id"].is_string());
        assert!(user["email"].is_string());
        assert!(user["name"].is_string());
        assert!(user["createdAt"].is_string());
        assert_ne!(user["email"], "admin@example.com");
        // The listing never exposes password hashes or roles.
        assert!(user.get("password").is_none());
    }
}
