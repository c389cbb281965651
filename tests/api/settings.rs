use crate::helpers::spawn_app;

#[actix_web::test]
async fn settings_endpoints_reject_a_missing_admin_token() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(&format!("{}/settings", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn settings_are_seeded_with_install_defaults() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(&format!("{}/settings", &app.address))
        .bearer_auth(&app.admin_token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["useSandbox"], true);
    assert_eq!(body["data"]["apiLiveKey"], "ABC123");
    assert_eq!(body["data"]["apiTestKey"], "ABC123");
    // base scope carries no override flags
    assert!(body["data"].get("useSandboxOverrideForStore").is_none());
}

#[actix_web::test]
async fn store_scope_overrides_apply_per_field() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/settings", &app.address))
        .bearer_auth(&app.admin_token)
        .json(&serde_json::json!({
            "storeId": 2,
            "useSandbox": false,
            "useSandboxOverrideForStore": true,
            "apiLiveKey": "live_store_two",
            "apiLiveKeyOverrideForStore": true,
            "apiTestKey": "ignored",
            "apiTestKeyOverrideForStore": false
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());

    let store_view: serde_json::Value = app
        .api_client
        .get(&format!("{}/settings?store_id=2", &app.address))
        .bearer_auth(&app.admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(store_view["data"]["useSandbox"], false);
    assert_eq!(store_view["data"]["apiLiveKey"], "live_store_two");
    assert_eq!(store_view["data"]["apiTestKey"], "ABC123");
    assert_eq!(store_view["data"]["useSandboxOverrideForStore"], true);
    assert_eq!(store_view["data"]["apiTestKeyOverrideForStore"], false);

    // the base record is untouched
    let base_view: serde_json::Value = app
        .api_client
        .get(&format!("{}/settings", &app.address))
        .bearer_auth(&app.admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(base_view["data"]["useSandbox"], true);
    assert_eq!(base_view["data"]["apiLiveKey"], "ABC123");
}
