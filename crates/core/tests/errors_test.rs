use std::error::Error;
use omms_core::errors::{OmmsError, OmmsResult};

#[test]
fn test_error_display() {
    let not_found = OmmsError::NotFound("预约不存在".to_string());
    let validation = OmmsError::Validation("该时段预约已满".to_string());
    let conflict = OmmsError::Conflict("模板被引用，无法删除".to_string());
    let authentication = OmmsError::Authentication("未认证".to_string());
    let authorization = OmmsError::Authorization("权限不足".to_string());
    let database = OmmsError::Database(eyre::eyre!("Database connection failed"));
    let internal = OmmsError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    assert_eq!(not_found.to_string(), "Resource not found: 预约不存在");
    assert_eq!(
        validation.to_string(),
        "Validation error: 该时段预约已满"
    );
    assert_eq!(conflict.to_string(), "Conflict: 模板被引用，无法删除");
    assert_eq!(authentication.to_string(), "Authentication error: 未认证");
    assert_eq!(authorization.to_string(), "Authorization error: 权限不足");
    assert!(database.to_string().contains("Database error:"));
    assert!(internal.to_string().contains("Internal server error:"));
}

#[test]
fn test_error_codes() {
    assert_eq!(OmmsError::NotFound(String::new()).code(), 404);
    assert_eq!(OmmsError::Validation(String::new()).code(), 400);
    assert_eq!(OmmsError::Conflict(String::new()).code(), 409);
    assert_eq!(OmmsError::Authentication(String::new()).code(), 401);
    assert_eq!(OmmsError::Authorization(String::new()).code(), 403);
    assert_eq!(OmmsError::Database(eyre::eyre!("boom")).code(), 500);
}

#[test]
fn test_client_message_masks_internal_detail() {
    let database = OmmsError::Database(eyre::eyre!("connection refused at 10.0.0.3:5432"));
    assert_eq!(database.client_message(), "内部服务器错误");

    let validation = OmmsError::Validation("库存不足".to_string());
    assert_eq!(validation.client_message(), "库存不足");
}

#[test]
fn test_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let omms_error = OmmsError::Internal(Box::new(io_error));

    assert!(omms_error.source().is_some());
}

#[test]
fn test_result_alias() {
    fn fails() -> OmmsResult<()> {
        Err(OmmsError::Validation("非法状态流转".to_string()))
    }

    assert!(fails().is_err());
}
