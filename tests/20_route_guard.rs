mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use hanuman_web::gateway::{app, GatewayState};
use hanuman_web::session::{bridge::build_cookie, BridgeSettings};
use hanuman_web::types::{Role, User};

struct Gateway {
    router: Router,
    _static_root: tempfile::TempDir,
}

fn gateway() -> Result<Gateway> {
    let static_root = common::static_root()?;
    // The guard decides before any backend call, so the URL is never dialled.
    let config = common::test_config("http://127.0.0.1:9", static_root.path().to_path_buf());
    Ok(Gateway {
        router: app(GatewayState::new(config)?),
        _static_root: static_root,
    })
}

fn session_cookie(email: &str, role: Role) -> String {
    let cookie = build_cookie(&BridgeSettings::default(), &User::new(email, role), "tok1");
    cookie.encoded().stripped().to_string()
}

async fn get(gateway: &Gateway, path: &str, cookie: Option<&str>) -> Result<Response> {
    let mut request = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    Ok(gateway.router.clone().oneshot(request.body(Body::empty())?).await?)
}

fn location(response: &Response) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn anonymous_request_keeps_original_path_in_redirect() -> Result<()> {
    let gateway = gateway()?;

    let res = get(&gateway, "/owner/blocks/12", None).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), Some("/auth?redirect=%2Fowner%2Fblocks%2F12"));

    let res = get(&gateway, "/bookings", None).await?;
    assert_eq!(location(&res), Some("/auth?redirect=%2Fbookings"));
    Ok(())
}

#[tokio::test]
async fn wrong_role_lands_on_own_dashboard() -> Result<()> {
    let gateway = gateway()?;
    let owner = session_cookie("a@b.com", Role::Owner);
    let user = session_cookie("u@b.com", Role::User);
    let admin = session_cookie("root@b.com", Role::Admin);

    let res = get(&gateway, "/admin", Some(&owner)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), Some("/owner"));

    let res = get(&gateway, "/owner/blocks/3", Some(&user)).await?;
    assert_eq!(location(&res), Some("/dashboard"));

    let res = get(&gateway, "/owner", Some(&admin)).await?;
    assert_eq!(location(&res), Some("/admin"));
    Ok(())
}

#[tokio::test]
async fn permitted_request_carries_identity_headers() -> Result<()> {
    let gateway = gateway()?;
    let owner = session_cookie("a@b.com", Role::Owner);

    let res = get(&gateway, "/owner/blocks/12", Some(&owner)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-user-role").and_then(|v| v.to_str().ok()), Some("owner"));
    assert_eq!(res.headers().get("x-user-email").and_then(|v| v.to_str().ok()), Some("a@b.com"));

    // Shared pages admit every role
    let res = get(&gateway, "/profile", Some(&owner)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn bearer_header_alone_does_not_unlock_role_pages() -> Result<()> {
    let gateway = gateway()?;
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::AUTHORIZATION, "Bearer tok1")
        .body(Body::empty())?;

    let res = gateway.router.clone().oneshot(request).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), Some("/auth?redirect=%2Fdashboard"));
    Ok(())
}

#[tokio::test]
async fn garbage_cookie_is_treated_as_no_session() -> Result<()> {
    let gateway = gateway()?;

    let res = get(&gateway, "/admin", Some("auth-storage=%7Bnot-json")).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), Some("/auth?redirect=%2Fadmin"));
    Ok(())
}

#[tokio::test]
async fn public_and_bypassed_paths_pass_through() -> Result<()> {
    let gateway = gateway()?;

    for path in ["/", "/auth", "/car/7", "/about", "/logo.svg", "/unlisted/page"] {
        let res = get(&gateway, path, None).await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
    }
    Ok(())
}
