use super::*;
use time::macros::datetime;

fn sample_user() -> AuthUser {
    AuthUser {
        id: Uuid::nil(),
        email: "gerant@autosoft.fr".into(),
        user_metadata: serde_json::json!({ "role": "gerant", "id_ecole": 3 }),
    }
}

fn sample_session(expires_at: i64) -> Session {
    Session {
        access_token: "access-abc".into(),
        refresh_token: "refresh-def".into(),
        expires_at,
        user: sample_user(),
    }
}

// =============================================================================
// Session expiry
// =============================================================================

#[test]
fn session_not_expired_before_deadline() {
    let now = datetime!(2025-06-01 12:00 UTC);
    let session = sample_session(now.unix_timestamp() + 3600);
    assert!(!session.is_expired(now));
}

#[test]
fn session_expired_at_deadline() {
    let now = datetime!(2025-06-01 12:00 UTC);
    let session = sample_session(now.unix_timestamp());
    assert!(session.is_expired(now));
}

#[test]
fn session_expired_after_deadline() {
    let now = datetime!(2025-06-01 12:00 UTC);
    let session = sample_session(now.unix_timestamp() - 1);
    assert!(session.is_expired(now));
}

#[test]
fn needs_refresh_inside_margin() {
    let now = datetime!(2025-06-01 12:00 UTC);
    let session = sample_session(now.unix_timestamp() + 30);
    assert!(session.needs_refresh(now));
}

#[test]
fn needs_refresh_outside_margin() {
    let now = datetime!(2025-06-01 12:00 UTC);
    let session = sample_session(now.unix_timestamp() + 3600);
    assert!(!session.needs_refresh(now));
}

#[test]
fn expired_session_also_needs_refresh() {
    let now = datetime!(2025-06-01 12:00 UTC);
    let session = sample_session(now.unix_timestamp() - 100);
    assert!(session.needs_refresh(now));
}

// =============================================================================
// TokenResponse
// =============================================================================

#[test]
fn token_response_parses_full_payload() {
    let body = serde_json::json!({
        "access_token": "at",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1_750_000_000_i64,
        "refresh_token": "rt",
        "user": {
            "id": "00000000-0000-0000-0000-000000000000",
            "email": "gerant@autosoft.fr",
            "user_metadata": { "role": "gerant" }
        }
    })
    .to_string();

    let token: TokenResponse = serde_json::from_str(&body).unwrap();
    let session = token.into_session(datetime!(2025-06-01 12:00 UTC));
    assert_eq!(session.access_token, "at");
    assert_eq!(session.refresh_token, "rt");
    assert_eq!(session.expires_at, 1_750_000_000);
    assert_eq!(session.user.email, "gerant@autosoft.fr");
}

#[test]
fn token_response_derives_expiry_from_expires_in() {
    let body = serde_json::json!({
        "access_token": "at",
        "refresh_token": "rt",
        "expires_in": 3600,
        "user": {
            "id": "00000000-0000-0000-0000-000000000000",
            "email": "gerant@autosoft.fr"
        }
    })
    .to_string();

    let now = datetime!(2025-06-01 12:00 UTC);
    let token: TokenResponse = serde_json::from_str(&body).unwrap();
    let session = token.into_session(now);
    assert_eq!(session.expires_at, now.unix_timestamp() + 3600);
}

#[test]
fn token_response_missing_user_is_rejected() {
    let body = r#"{"access_token":"at","refresh_token":"rt"}"#;
    assert!(serde_json::from_str::<TokenResponse>(body).is_err());
}

// =============================================================================
// service_message
// =============================================================================

#[test]
fn service_message_prefers_error_description() {
    let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
    assert_eq!(service_message(body), "Invalid login credentials");
}

#[test]
fn service_message_reads_msg_field() {
    let body = r#"{"msg":"Email not confirmed"}"#;
    assert_eq!(service_message(body), "Email not confirmed");
}

#[test]
fn service_message_falls_back_to_raw_body() {
    assert_eq!(service_message("bad gateway"), "bad gateway");
}

#[test]
fn service_message_non_string_fields_fall_back() {
    let body = r#"{"error": 42}"#;
    assert_eq!(service_message(body), body);
}

// =============================================================================
// Session persistence through the store adapter
// =============================================================================

#[test]
fn persist_then_cached_round_trips() {
    let store = SessionStore::new();
    let session = sample_session(2_000_000_000);

    let jar = persist_session(&store, CookieJar::new(), &session);
    let restored = cached_session(&store, &jar).expect("session should be cached");
    assert_eq!(restored.access_token, session.access_token);
    assert_eq!(restored.expires_at, session.expires_at);
    assert_eq!(restored.user.email, session.user.email);
}

#[test]
fn persist_stamps_marker_cookie() {
    let store = SessionStore::new();
    let session = sample_session(2_000_000_000);

    let jar = persist_session(&store, CookieJar::new(), &session);
    let marker = jar
        .get(crate::services::store::AUTH_MARKER_COOKIE)
        .expect("marker cookie missing after persist");
    assert_eq!(marker.value(), "true");
}

#[test]
fn cached_session_absent_when_nothing_stored() {
    let store = SessionStore::new();
    assert!(cached_session(&store, &CookieJar::new()).is_none());
}

#[test]
fn cached_session_garbage_treated_as_absent() {
    let store = SessionStore::new();
    let jar = store.set(CookieJar::new(), SESSION_STORAGE_KEY, "not json");
    assert!(cached_session(&store, &jar).is_none());
}

#[test]
fn clear_session_removes_cache_and_expires_marker() {
    let store = SessionStore::new();
    let session = sample_session(2_000_000_000);

    let jar = persist_session(&store, CookieJar::new(), &session);
    let jar = clear_session(&store, jar);

    assert!(cached_session(&store, &CookieJar::new()).is_none());
    let marker = jar
        .get(crate::services::store::AUTH_MARKER_COOKIE)
        .expect("marker removal cookie missing");
    assert_eq!(marker.value(), "");
}

// =============================================================================
// AuthError
// =============================================================================

#[test]
fn credentials_error_is_verbatim() {
    let err = AuthError::Credentials("Invalid login credentials".into());
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[test]
fn no_session_error_message() {
    assert_eq!(AuthError::NoSession.to_string(), "no session found");
}

#[test]
fn service_error_is_prefixed() {
    let err = AuthError::Service("timed out".into());
    assert_eq!(err.to_string(), "auth service error: timed out");
}
