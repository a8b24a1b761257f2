use super::*;

fn empty_jar() -> CookieJar {
    CookieJar::new()
}

fn jar_with(name: &str, value: &str) -> CookieJar {
    CookieJar::new().add(Cookie::new(name.to_owned(), value.to_owned()))
}

// =============================================================================
// env_bool
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_STORE_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_STORE_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__TEST_STORE_EB_INVALID_41__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_STORE_EB_SURELY_UNSET_17__"), None);
}

// =============================================================================
// get
// =============================================================================

#[test]
fn get_absent_everywhere_is_none() {
    let store = SessionStore::new();
    assert_eq!(store.get(&empty_jar(), "auth-storage"), None);
}

#[test]
fn get_prefers_primary_store() {
    let store = SessionStore::new();
    let jar = store.set(jar_with("auth-storage", "from-cookie"), "auth-storage", "from-primary");
    assert_eq!(store.get(&jar, "auth-storage").as_deref(), Some("from-primary"));
}

#[test]
fn get_falls_back_to_request_cookie() {
    let store = SessionStore::new();
    let jar = jar_with("auth-storage", "cookie-value");
    assert_eq!(store.get(&jar, "auth-storage").as_deref(), Some("cookie-value"));
}

// =============================================================================
// set
// =============================================================================

#[test]
fn set_then_get_round_trips() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "abc123");
    assert_eq!(store.get(&jar, "auth-storage").as_deref(), Some("abc123"));
}

#[test]
fn set_mirrors_value_into_cookie() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "abc123");
    let mirror = jar.get("auth-storage").expect("mirror cookie missing");
    assert_eq!(mirror.value(), "abc123");
    assert_eq!(mirror.max_age(), Some(MIRROR_TTL));
    assert_eq!(mirror.path(), Some("/"));
}

#[test]
fn set_stamps_marker_cookie() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "abc123");
    let marker = jar.get(AUTH_MARKER_COOKIE).expect("marker cookie missing");
    assert_eq!(marker.value(), "true");
    assert_eq!(marker.max_age(), Some(MIRROR_TTL));
}

#[test]
fn set_stamps_marker_for_any_key() {
    // The marker side effect fires regardless of which key was written.
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "ui-theme", "dark");
    let marker = jar.get(AUTH_MARKER_COOKIE).expect("marker cookie missing");
    assert_eq!(marker.value(), "true");
}

#[test]
fn set_last_writer_wins() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "first");
    let jar = store.set(jar, "auth-storage", "second");
    assert_eq!(store.get(&jar, "auth-storage").as_deref(), Some("second"));
}

// =============================================================================
// remove
// =============================================================================

#[test]
fn remove_clears_primary_store() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "abc123");
    let _ = store.remove(jar, "auth-storage");
    assert_eq!(store.get(&empty_jar(), "auth-storage"), None);
}

#[test]
fn remove_expires_mirror_and_marker() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "abc123");
    let jar = store.remove(jar, "auth-storage");

    let mirror = jar.get("auth-storage").expect("removal cookie missing");
    assert_eq!(mirror.value(), "");
    assert_eq!(mirror.max_age(), Some(Duration::ZERO));

    let marker = jar.get(AUTH_MARKER_COOKIE).expect("marker removal missing");
    assert_eq!(marker.value(), "");
    assert_eq!(marker.max_age(), Some(Duration::ZERO));
}

#[test]
fn remove_twice_same_as_once() {
    let store = SessionStore::new();
    let jar = store.set(empty_jar(), "auth-storage", "abc123");
    let jar = store.remove(jar, "auth-storage");
    let jar = store.remove(jar, "auth-storage");

    assert_eq!(store.get(&empty_jar(), "auth-storage"), None);
    assert_eq!(jar.get("auth-storage").map(|c| c.value().to_owned()).as_deref(), Some(""));
    assert_eq!(jar.get(AUTH_MARKER_COOKIE).map(|c| c.value().to_owned()).as_deref(), Some(""));
}

#[test]
fn remove_on_empty_store_is_harmless() {
    let store = SessionStore::new();
    let jar = store.remove(empty_jar(), "auth-storage");
    assert_eq!(jar.get("auth-storage").expect("removal cookie").max_age(), Some(Duration::ZERO));
}

// =============================================================================
// expired_cookie
// =============================================================================

#[test]
fn expired_cookie_shape() {
    let cookie = expired_cookie("anything");
    assert_eq!(cookie.name(), "anything");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}
