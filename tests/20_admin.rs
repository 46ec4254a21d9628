mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn register_admin(server: &common::TestServer) -> Result<reqwest::Client> {
    let client = common::session_client();
    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "fullName": "Admin Tester",
            "email": common::unique_email("admin"),
            "password": "Passw0rd!",
            "address": "HQ",
            "role": "Admin",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(client)
}

#[tokio::test]
async fn dashboard_reports_counts_and_is_admin_only() -> Result<()> {
    if !common::database_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let admin = register_admin(server).await?;

    let res = admin
        .get(format!("{}/api/admin/dashboard", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["totalUsers"].as_i64().unwrap() >= 1);
    assert!(body["totalStores"].is_i64());
    assert!(body["totalRatings"].is_i64());

    // A normal user is forbidden
    let user = common::session_client();
    user.post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "fullName": "Plain User",
            "email": common::unique_email("plain"),
            "password": "Passw0rd!",
            "address": "Elsewhere",
        }))
        .send()
        .await?;
    let res = user
        .get(format!("{}/api/admin/dashboard", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // No session at all is unauthorized
    let res = reqwest::Client::new()
        .get(format!("{}/api/admin/dashboard", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn user_listing_falls_back_on_unknown_sort() -> Result<()> {
    if !common::database_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let admin = register_admin(server).await?;

    // Unknown sortBy/sortOrder must not error
    let res = admin
        .get(format!(
            "{}/api/admin/users?sortBy=definitely_not_a_column&sortOrder=sideways",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["users"].is_array());
    assert!(body["total"].as_i64().unwrap() >= 1);

    Ok(())
}

#[tokio::test]
async fn admin_user_crud_and_role_normalization() -> Result<()> {
    if !common::database_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let admin = register_admin(server).await?;
    let email = common::unique_email("managed");

    // Create with the external role vocabulary
    let res = admin
        .post(format!("{}/api/admin/users", server.base_url))
        .json(&json!({
            "name": "Managed User",
            "email": email,
            "password": "secret1",
            "address": "5 Admin Road",
            "role": "user",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Search finds it; role filter with the store_owner synonym excludes it
    let res = admin
        .get(format!("{}/api/admin/users?search={}", server.base_url, email))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["total"], json!(1));
    let id = body["users"][0]["id"].as_i64().unwrap();
    assert_eq!(body["users"][0]["role"], json!("Normal User"));
    // Non-owner rows never carry an average rating
    assert!(body["users"][0]["average_rating"].is_null());

    let res = admin
        .get(format!(
            "{}/api/admin/users?search={}&role=store_owner",
            server.base_url, email
        ))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["total"], json!(0));

    // Promote to Owner through the update endpoint
    let res = admin
        .put(format!("{}/api/admin/users/{}", server.base_url, id))
        .json(&json!({
            "name": "Managed User",
            "email": email,
            "address": "5 Admin Road",
            "role": "store_owner",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = admin
        .get(format!("{}/api/admin/users/{}", server.base_url, id))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["user"]["role"], json!("Owner"));

    // Invalid role vocabulary is rejected
    let res = admin
        .put(format!("{}/api/admin/users/{}", server.base_url, id))
        .json(&json!({
            "name": "Managed User",
            "email": email,
            "address": "5 Admin Road",
            "role": "wizard",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Delete works for a user without stores
    let res = admin
        .delete(format!("{}/api/admin/users/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn admin_cannot_delete_own_account() -> Result<()> {
    if !common::database_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let admin = register_admin(server).await?;

    let res = admin
        .get(format!("{}/api/auth/me", server.base_url))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let my_id = body["user"]["id"].as_i64().unwrap();

    let res = admin
        .delete(format!("{}/api/admin/users/{}", server.base_url, my_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn store_creation_enforces_owner_role_and_one_store_per_owner() -> Result<()> {
    if !common::database_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let admin = register_admin(server).await?;

    // An Owner-role account without a store yet
    let owner_email = common::unique_email("storeowner");
    let res = admin
        .post(format!("{}/api/admin/users", server.base_url))
        .json(&json!({
            "name": "Store Holder",
            "email": owner_email,
            "password": "secret1",
            "address": "6 Shop Street",
            "role": "store_owner",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = admin
        .get(format!("{}/api/admin/users?search={}", server.base_url, owner_email))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let owner_id = body["users"][0]["id"].as_i64().unwrap();

    // Creating a store for a non-owner fails
    let res = admin
        .get(format!("{}/api/auth/me", server.base_url))
        .send()
        .await?;
    let admin_id = res.json::<serde_json::Value>().await?["user"]["id"]
        .as_i64()
        .unwrap();
    let res = admin
        .post(format!("{}/api/admin/stores", server.base_url))
        .json(&json!({
            "name": "Wrong Owner Store",
            "email": common::unique_email("store"),
            "address": "7 Shop Street",
            "ownerId": admin_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // First store for the owner succeeds
    let res = admin
        .post(format!("{}/api/admin/stores", server.base_url))
        .json(&json!({
            "name": "First Store",
            "email": common::unique_email("store"),
            "address": "7 Shop Street",
            "ownerId": owner_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // A second store for the same owner is a conflict
    let res = admin
        .post(format!("{}/api/admin/stores", server.base_url))
        .json(&json!({
            "name": "Second Store",
            "email": common::unique_email("store"),
            "address": "8 Shop Street",
            "ownerId": owner_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Deleting the owner is blocked while the store exists
    let res = admin
        .delete(format!("{}/api/admin/users/{}", server.base_url, owner_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
