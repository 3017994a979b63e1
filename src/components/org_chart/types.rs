use serde::Deserialize;

/// Role classification as reported by the API.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
	Circle,
	LeadLink,
	RepLink,
	Facilitator,
	Secretary,
	Normal,
}

impl RoleType {
	/// Designated core roles get special assignment rules and a fixed accent color.
	pub fn is_core(self) -> bool {
		matches!(
			self,
			RoleType::LeadLink | RoleType::RepLink | RoleType::Facilitator | RoleType::Secretary
		)
	}
}

/// A member assignment on a role, as returned by the tree query.
#[derive(Deserialize, Clone, Debug)]
pub struct RawRoleMember {
	/// Optional focus description for this assignment.
	#[serde(default)]
	pub focus: Option<String>,
}

/// One role in the raw tree returned by the hierarchy query.
///
/// `roles` is populated for circles only; the API reports `depth` as the
/// absolute nesting depth of the role within the organization.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RawRole {
	pub uid: String,
	pub name: String,
	pub role_type: RoleType,
	pub depth: u32,
	#[serde(default)]
	pub roles: Vec<RawRole>,
	#[serde(default)]
	pub role_members: Vec<RawRoleMember>,
}
