//! Session-token capability consumed by the API client.
//!
//! Token persistence and the login flow live outside this crate; the client
//! only needs to know whether a bearer token exists and what it is.

/// The current session's bearer token, if any.
#[cfg(target_arch = "wasm32")]
pub fn token() -> Option<String> {
	let storage = web_sys::window()?.local_storage().ok()??;
	storage.get_item("token").ok()?
}

/// The current session's bearer token, if any.
#[cfg(not(target_arch = "wasm32"))]
pub fn token() -> Option<String> {
	std::env::var("ORG_CHART_TOKEN").ok()
}

/// Whether a session token is present.
pub fn is_authenticated() -> bool {
	token().is_some()
}
