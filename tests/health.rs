mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn health_endpoint_reports_db_and_roles() -> Result<()> {
    let db = common::setup().await?;
    let app = common::app(&db.pool).await?;

    let (status, body) = common::send(&app, "GET", "/api/health", None, None).await?;
    assert_eq!(status, StatusCode::OK, "health endpoint did not return 200");
    assert_eq!(body["db_ok"], true, "expected db_ok: true, got: {}", body);
    assert_eq!(body["roles_seeded"], true);

    Ok(())
}
