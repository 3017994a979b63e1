//! GraphQL API client.
//!
//! Speaks the standard `{query, variables}` envelope over HTTP POST. On
//! `wasm32` requests go through the browser Fetch API; native builds (tests,
//! tooling) use `reqwest`. The client retries nothing — retry policy belongs
//! to whoever drives it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::auth;
use crate::components::org_chart::types::{RawRole, RoleType};

/// Default API mount point, proxied by the static host.
pub const DEFAULT_BASE_URL: &str = "/api";

/// Maximum circle nesting the tree query asks for. GraphQL cannot express a
/// recursive fragment, so the nesting is spelled out to a fixed depth.
const MAX_TREE_DEPTH: usize = 10;

/// Everything that can go wrong talking to the API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
	#[error("network error: {0}")]
	Network(String),
	#[error("server returned HTTP {0}")]
	Status(u16),
	#[error("malformed response: {0}")]
	Decode(String),
	#[error("query failed: {0}")]
	GraphQl(String),
}

#[derive(Serialize)]
struct Envelope<'a> {
	query: &'a str,
	variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
	data: Option<T>,
	#[serde(default)]
	errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
	message: String,
}

/// A member reachable from a role assignment.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Member {
	pub uid: String,
	pub user_name: String,
	pub full_name: String,
}

/// One member assignment on the detailed role.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoleMember {
	pub member: Member,
	#[serde(default)]
	pub focus: Option<String>,
}

/// Detail payload for a single role, shown in the focus overlay.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetail {
	pub uid: String,
	pub name: String,
	pub role_type: RoleType,
	#[serde(default)]
	pub purpose: String,
	#[serde(default)]
	pub role_members: Vec<RoleMember>,
}

/// GraphQL client bound to a base URL.
#[derive(Clone)]
pub struct Client {
	base_url: String,
}

impl Client {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self { base_url: base_url.into() }
	}

	/// Avatar image URL for a member.
	pub fn avatar_url(&self, member_uid: &str, size: Option<u32>) -> String {
		match size {
			Some(s) => format!("{}/avatar/{member_uid}?s={s}", self.base_url),
			None => format!("{}/avatar/{member_uid}", self.base_url),
		}
	}

	/// The root role/circle tree, optionally at a historical timeline.
	pub async fn root_role(&self, time_line: Option<&str>) -> Result<RawRole, ApiError> {
		#[derive(Deserialize)]
		#[serde(rename_all = "camelCase")]
		struct Data {
			root_role: RawRole,
		}
		let variables = json!({ "timeLineID": time_line_value(time_line) });
		let data: Data = self.query(&roles_query(), variables).await?;
		Ok(data.root_role)
	}

	/// Purpose and member assignments for a single role.
	pub async fn role_detail(
		&self,
		uid: &str,
		time_line: Option<&str>,
	) -> Result<Option<RoleDetail>, ApiError> {
		#[derive(Deserialize)]
		struct Data {
			role: Option<RoleDetail>,
		}
		let variables = json!({ "uid": uid, "timeLineID": time_line_value(time_line) });
		let data: Data = self.query(DETAIL_QUERY, variables).await?;
		Ok(data.role)
	}

	async fn query<T: DeserializeOwned>(
		&self,
		query: &str,
		variables: serde_json::Value,
	) -> Result<T, ApiError> {
		let body = serde_json::to_string(&Envelope { query, variables })
			.map_err(|e| ApiError::Decode(e.to_string()))?;
		let text = self.post(body).await?;
		let response: GraphQlResponse<T> =
			serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
		if let Some(err) = response.errors.first() {
			return Err(ApiError::GraphQl(err.message.clone()));
		}
		response.data.ok_or_else(|| ApiError::Decode("response carried no data".into()))
	}

	#[cfg(target_arch = "wasm32")]
	async fn post(&self, body: String) -> Result<String, ApiError> {
		use wasm_bindgen::{JsCast, JsValue};
		use wasm_bindgen_futures::JsFuture;
		use web_sys::{Request, RequestInit, RequestMode, Response};

		let network = |e: JsValue| ApiError::Network(format!("{e:?}"));

		let opts = RequestInit::new();
		opts.set_method("POST");
		opts.set_mode(RequestMode::Cors);
		opts.set_body(&JsValue::from_str(&body));

		let url = format!("{}/graphql", self.base_url);
		let request = Request::new_with_str_and_init(&url, &opts).map_err(network)?;
		request.headers().set("Content-Type", "application/json").map_err(network)?;
		if let Some(token) = auth::token() {
			request
				.headers()
				.set("Authorization", &format!("Bearer {token}"))
				.map_err(network)?;
		}

		let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
		let response = JsFuture::from(window.fetch_with_request(&request)).await.map_err(network)?;
		let response: Response = response
			.dyn_into()
			.map_err(|_| ApiError::Network("fetch did not yield a Response".into()))?;
		if !response.ok() {
			return Err(ApiError::Status(response.status()));
		}

		let text = JsFuture::from(response.text().map_err(network)?).await.map_err(network)?;
		text.as_string().ok_or_else(|| ApiError::Decode("response body is not text".into()))
	}

	#[cfg(not(target_arch = "wasm32"))]
	async fn post(&self, body: String) -> Result<String, ApiError> {
		let client = reqwest::Client::new();
		let mut request = client
			.post(format!("{}/graphql", self.base_url))
			.header("Content-Type", "application/json")
			.body(body);
		if let Some(token) = auth::token() {
			request = request.bearer_auth(token);
		}

		let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
		let status = response.status();
		if !status.is_success() {
			return Err(ApiError::Status(status.as_u16()));
		}
		response.text().await.map_err(|e| ApiError::Decode(e.to_string()))
	}
}

/// Timelines travel as opaque IDs; the server accepts a numeric ID and treats
/// zero as "now".
fn time_line_value(time_line: Option<&str>) -> serde_json::Value {
	match time_line {
		Some(tl) => tl.parse::<u64>().map(Into::into).unwrap_or_else(|_| tl.into()),
		None => 0.into(),
	}
}

const ROLE_FIELDS_FRAGMENT: &str = "fragment orgChartRoleFields on Role {
  uid
  name
  roleType
  depth
  roleMembers {
    focus
  }
}";

/// The tree query, with the role fragment nested to [`MAX_TREE_DEPTH`].
fn roles_query() -> String {
	let mut selection = String::from("...orgChartRoleFields");
	for _ in 0..MAX_TREE_DEPTH {
		selection = format!("...orgChartRoleFields roles {{ {selection} }}");
	}
	format!(
		"query rolesQuery($timeLineID: TimeLineID) {{ rootRole(timeLineID: $timeLineID) {{ {selection} }} }} {ROLE_FIELDS_FRAGMENT}"
	)
}

const DETAIL_QUERY: &str = "query orgChartDetailQuery($timeLineID: TimeLineID, $uid: ID!) {
  role(timeLineID: $timeLineID, uid: $uid) {
    uid
    name
    roleType
    purpose
    roleMembers {
      member {
        uid
        userName
        fullName
      }
      focus
    }
  }
}";
