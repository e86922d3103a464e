// tests/console_commands.rs
//! Integration tests for the operator console: ban, kick, unban, allow, disallow, config

mod common;
use common::{Backend, TestServer};
use serde_json::json;

const CONSOLE: &str = "/api/console/command";

#[tokio::test]
async fn test_ban_kick_unban() {
    let server = TestServer::spawn(18710)
        .await
        .expect("Failed to spawn test server");

    let (status, body) = server
        .post(
            CONSOLE,
            &json!({"command": "BAN", "args": {"playerId": "PLAYERBAN1", "duration": 48, "reason": "Speed hack"}}),
        )
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Player PLAYERBAN1 banned for 48 hours");

    let (_, body) = server
        .post(CONSOLE, &json!({"command": " kick ", "args": {"playerId": "PLAYERKICK"}}))
        .await
        .unwrap();
    assert_eq!(body["message"], "Player PLAYERKICK kicked");

    let (_, listing) = server.get("/AntiCheat/BannedAccounts").await.unwrap();
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["accounts"][0]["playerId"], "PLAYERKICK");
    assert_eq!(listing["accounts"][0]["bannedBy"], "Console (Kick)");
    assert_eq!(listing["accounts"][1]["banDuration"], "2d");
    assert_eq!(listing["accounts"][1]["reason"], "Speed hack");

    let (_, body) = server
        .post(CONSOLE, &json!({"command": "unban", "args": {"playerId": "PLAYERBAN1"}}))
        .await
        .unwrap();
    assert_eq!(body["message"], "Player PLAYERBAN1 unbanned");

    let (_, listing) = server.get("/AntiCheat/BannedAccounts").await.unwrap();
    assert_eq!(listing["count"], 1);
}

#[tokio::test]
async fn test_allow_list_and_whitelist_bypass() {
    let server = TestServer::spawn_with(18711, Backend::Database)
        .await
        .expect("Failed to spawn test server");

    server
        .post(CONSOLE, &json!({"command": "config", "args": {"key": "ENABLE_WHITELIST", "value": "true"}}))
        .await
        .unwrap();
    let (_, body) = server
        .post(CONSOLE, &json!({"command": "allow", "args": {"playerId": "TRUSTED001", "playerName": "Alice"}}))
        .await
        .unwrap();
    assert_eq!(body["message"], "Player TRUSTED001 added to allowed list");

    let (_, listing) = server.get("/AntiCheat/AllowedAccounts").await.unwrap();
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["accounts"][0]["playerName"], "Alice");

    let (_, body) = server
        .post(
            "/AntiCheat/DetectVpn",
            &json!({"args": {"playerId": "TRUSTED001", "networkData": {"isVpn": true}}}),
        )
        .await
        .unwrap();
    assert_eq!(body["ResultCode"], 0);
    assert!(body.get("shouldBan").is_none());

    server
        .post(CONSOLE, &json!({"command": "disallow", "args": {"playerId": "TRUSTED001"}}))
        .await
        .unwrap();
    let (_, body) = server
        .post(
            "/AntiCheat/DetectVpn",
            &json!({"args": {"playerId": "TRUSTED001", "networkData": {"isVpn": true}}}),
        )
        .await
        .unwrap();
    assert_eq!(body["shouldBan"], true);
}

#[tokio::test]
async fn test_console_errors() {
    let server = TestServer::spawn(18712)
        .await
        .expect("Failed to spawn test server");

    let (status, body) = server
        .post(CONSOLE, &json!({"command": "ban", "args": {}}))
        .await
        .unwrap();
    assert_eq!(status, 400);
    assert_eq!(body, json!({"success": false, "message": "playerId is required"}));

    let (status, body) = server
        .post(CONSOLE, &json!({"command": "config", "args": {"key": "MADE_UP", "value": 1}}))
        .await
        .unwrap();
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Unknown config key: MADE_UP");

    let (status, body) = server.post(CONSOLE, &json!({"command": "nuke"})).await.unwrap();
    assert_eq!(status, 400);
    assert_eq!(
        body["message"],
        "Unknown command: nuke. Available: ban, kick, unban, allow, disallow, config"
    );
}
