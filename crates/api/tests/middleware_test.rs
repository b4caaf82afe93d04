use chrono::Local;
use omms_api::middleware::auth;
use omms_api::middleware::error_handling::map_error;
use omms_core::errors::OmmsError;
use omms_db::models::DbUser;

fn test_user() -> DbUser {
    DbUser {
        user_id: 42,
        username: "zhangsan".to_string(),
        password: "hash".to_string(),
        email: Some("zhangsan@example.com".to_string()),
        phone: None,
        real_name: Some("张三".to_string()),
        status: 1,
        created_at: Some(Local::now().naive_local()),
        updated_at: None,
        last_login_at: None,
        role_id: Some(3),
    }
}

#[tokio::test]
async fn test_error_handling_not_found() {
    let error = OmmsError::NotFound("预约不存在".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_handling_validation() {
    let error = OmmsError::Validation("该时段预约已满".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_handling_authentication() {
    let error = OmmsError::Authentication("未认证".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_error_handling_authorization() {
    let error = OmmsError::Authorization("权限不足".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_handling_conflict() {
    let error = OmmsError::Conflict("模板被引用，无法删除".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_database() {
    let error = OmmsError::Database(eyre::eyre!("connection refused"));
    let response = map_error(error);
    assert_eq!(
        response.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_password_hash_and_verify() {
    let hash = auth::hash_password("secret123").expect("hashing should succeed");
    assert!(auth::verify_password("secret123", &hash).unwrap());
    assert!(!auth::verify_password("wrong", &hash).unwrap());
}

#[test]
fn test_password_hashes_are_salted() {
    let first = auth::hash_password("secret123").unwrap();
    let second = auth::hash_password("secret123").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_token_round_trip() {
    let user = test_user();
    let token = auth::create_access_token("test-secret", &user, 30).unwrap();

    let claims = auth::decode_token("test-secret", &token).unwrap();
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.username, "zhangsan");
    assert_eq!(claims.role_id, Some(3));
    assert!(claims.exp > chrono::Utc::now().timestamp());
}

#[test]
fn test_token_rejects_wrong_secret() {
    let user = test_user();
    let token = auth::create_access_token("test-secret", &user, 30).unwrap();

    let err = auth::decode_token("other-secret", &token).unwrap_err();
    match err {
        OmmsError::Authentication(m) => assert_eq!(m, "令牌解析失败"),
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}

#[test]
fn test_token_rejects_expired() {
    let user = test_user();
    // Negative lifetime backdates the expiry claim
    let token = auth::create_access_token("test-secret", &user, -5).unwrap();

    let err = auth::decode_token("test-secret", &token).unwrap_err();
    match err {
        OmmsError::Authentication(m) => assert_eq!(m, "令牌解析失败"),
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}

#[test]
fn test_token_rejects_garbage() {
    let err = auth::decode_token("test-secret", "not-a-token").unwrap_err();
    match err {
        OmmsError::Authentication(_) => {}
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}
