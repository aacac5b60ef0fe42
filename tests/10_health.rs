mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn public_pages_fall_back_to_index() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client()?;

    for path in ["/", "/help", "/car/42"] {
        let res = client.get(format!("{}{}", server.base_url, path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert!(res.text().await?.contains("HanumanCars"), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn static_assets_are_served_without_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client()?;

    let res = client.get(format!("{}/logo.svg", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "<svg/>");
    Ok(())
}

#[tokio::test]
async fn protected_page_redirects_to_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client()?;

    let res = client.get(format!("{}/owner/blocks/12", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/auth?redirect=%2Fowner%2Fblocks%2F12")
    );
    Ok(())
}
