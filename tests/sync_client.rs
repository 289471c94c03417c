use std::io::Read;
use std::thread;

use goshorts::profile::{Profile, Settings};
use goshorts::sync::{ClientConfig, HttpSyncService, SyncAction, SyncError, SyncService};
use tiny_http::{Header, Response, Server};

struct Captured {
    method: String,
    user_id: Option<String>,
    body: String,
}

/// Serve exactly one request with `status` and `reply`, handing back what
/// the client sent.
fn serve_once(status: u16, reply: &'static str) -> (String, thread::JoinHandle<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).unwrap();
        let captured = Captured {
            method: request.method().to_string(),
            user_id: request
                .headers()
                .iter()
                .find(|header| header.field.equiv("X-User-Id"))
                .map(|header| header.value.as_str().to_string()),
            body,
        };
        let response = Response::from_string(reply)
            .with_status_code(status)
            .with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
        request.respond(response).unwrap();
        captured
    });
    (format!("http://{addr}/api/user-data"), handle)
}

fn client(endpoint: String) -> HttpSyncService {
    HttpSyncService::new(ClientConfig {
        endpoint,
        user_id: "user_1700000000000_abc123xyz".to_string(),
        user_agent: "goshorts-tests".to_string(),
        timeout: None,
        http_client: None,
    })
    .unwrap()
}

#[test]
fn push_sends_user_id_and_tagged_body() {
    let (endpoint, server) = serve_once(200, r#"{"success":true,"message":"ok"}"#);
    client(endpoint)
        .push(&SyncAction::SaveVideo {
            video_id: 3,
            is_saved: true,
        })
        .unwrap();

    let captured = server.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(
        captured.user_id.as_deref(),
        Some("user_1700000000000_abc123xyz")
    );
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"action": "save_video", "video_id": 3, "is_saved": true})
    );
}

#[test]
fn settings_payload_is_nested() {
    let (endpoint, server) = serve_once(200, "");
    client(endpoint)
        .push(&SyncAction::UpdateSettings {
            settings: Settings::default(),
        })
        .unwrap();

    let body: serde_json::Value = serde_json::from_str(&server.join().unwrap().body).unwrap();
    assert_eq!(body["action"], "update_settings");
    assert_eq!(body["settings"]["language"], "ru");
    assert_eq!(body["settings"]["notifications_enabled"], true);
}

#[test]
fn fetch_state_reads_videos_settings_and_profile() {
    let (endpoint, server) = serve_once(
        200,
        r#"{
            "videos": [{"video_id": 2, "is_saved": true, "is_liked": false}],
            "settings": {"dark_mode": true, "language": "en"},
            "profile": {"profile_name": "@remote", "avatar_url": null}
        }"#,
    );
    let state = client(endpoint).fetch_state().unwrap();

    let captured = server.join().unwrap();
    assert_eq!(captured.method, "GET");
    assert!(captured.user_id.is_some());
    assert_eq!(state.videos.len(), 1);
    assert_eq!(state.videos[0].is_saved, Some(true));
    let mut settings = Settings::default();
    assert!(state.settings.unwrap().apply_to(&mut settings));
    assert!(settings.dark_mode);
    assert!(settings.notifications_enabled);
    assert_eq!(settings.language, "en");
    assert_eq!(
        state.profile.unwrap().profile_name.as_deref(),
        Some("@remote")
    );
}

#[test]
fn fetch_state_accepts_database_rows_with_nulls() {
    let (endpoint, server) = serve_once(
        200,
        r#"{
            "videos": [
                {"id": 11, "user_id": "user_x", "video_id": 4, "is_saved": null,
                 "is_liked": true, "updated_at": "2024-01-02T03:04:05Z"}
            ],
            "settings": {"id": 3, "user_id": "user_x", "dark_mode": null,
                         "language": null, "notifications_enabled": false,
                         "auto_sound": null, "updated_at": "2024-01-02T03:04:05Z"},
            "profile": {"id": 5, "user_id": "user_x", "profile_name": null,
                        "avatar_url": null, "created_at": "2024-01-01T00:00:00Z"}
        }"#,
    );
    let state = client(endpoint).fetch_state().unwrap();
    server.join().unwrap();

    assert_eq!(state.videos[0].video_id, 4);
    assert_eq!(state.videos[0].is_saved, None);
    assert_eq!(state.videos[0].is_liked, Some(true));

    let mut settings = Settings {
        dark_mode: true,
        ..Settings::default()
    };
    assert!(state.settings.unwrap().apply_to(&mut settings));
    assert!(settings.dark_mode);
    assert_eq!(settings.language, "ru");
    assert!(!settings.notifications_enabled);

    let mut profile = Profile::default();
    let before = profile.clone();
    assert!(!state.profile.unwrap().apply_to(&mut profile));
    assert_eq!(profile, before);
}

#[test]
fn server_error_maps_to_status() {
    let (endpoint, server) = serve_once(500, "boom");
    let err = client(endpoint)
        .push(&SyncAction::LikeVideo {
            video_id: 1,
            is_liked: true,
        })
        .unwrap_err();
    server.join().unwrap();
    match err {
        SyncError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn rejection_in_body_is_an_error() {
    let (endpoint, server) = serve_once(200, r#"{"success":false,"error":"unknown video"}"#);
    let err = client(endpoint)
        .push(&SyncAction::SaveVideo {
            video_id: 99,
            is_saved: true,
        })
        .unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, SyncError::Rejected(message) if message == "unknown video"));
}
