//! Builds the annotated, weighted tree consumed by the packing layout.
//!
//! Circles get their real children plus one synthesized `Title` pseudo-child
//! that reserves on-canvas space for the circle's label; plain roles are
//! leaves. The builder copies everything out of the input, so a caller's
//! cached query result is never touched.

use super::types::{RawRole, RoleType};

/// Node classification used by layout and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// A plain role (normal or core); always a leaf.
	Role,
	/// A circle: a role containing sub-roles.
	Circle,
	/// Synthesized label area for a circle.
	Title,
}

/// One annotated node. Children are arena indices into [`AnnotatedTree`].
#[derive(Clone, Debug)]
pub struct AnnotatedNode {
	pub kind: NodeKind,
	pub uid: String,
	pub name: String,
	pub role_type: RoleType,
	/// Absolute nesting depth as reported by the API. A title pseudo-node
	/// carries its parent circle's depth.
	pub depth: u32,
	/// Number of members assigned to the role.
	pub member_count: usize,
	/// Arena indices of this node's children (circles only).
	pub children: Vec<usize>,
}

/// Arena-allocated annotated tree; index 0 is the root and parents always
/// precede their children, so the arena order is a depth-first enumeration.
#[derive(Clone, Debug, Default)]
pub struct AnnotatedTree {
	pub nodes: Vec<AnnotatedNode>,
}

impl AnnotatedTree {
	/// Number of nodes, synthesized titles included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when the tree holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Annotates a raw role tree for packing.
pub fn build(root: &RawRole) -> AnnotatedTree {
	let mut tree = AnnotatedTree::default();
	build_node(root, &mut tree);
	tree
}

fn build_node(role: &RawRole, tree: &mut AnnotatedTree) -> usize {
	let kind = if role.role_type == RoleType::Circle {
		NodeKind::Circle
	} else {
		NodeKind::Role
	};

	let idx = tree.nodes.len();
	tree.nodes.push(AnnotatedNode {
		kind,
		uid: role.uid.clone(),
		name: role.name.clone(),
		role_type: role.role_type,
		depth: role.depth,
		member_count: role.role_members.len(),
		children: Vec::new(),
	});

	if kind == NodeKind::Circle {
		let mut children = Vec::with_capacity(role.roles.len() + 1);
		for child in &role.roles {
			children.push(build_node(child, tree));
		}

		// The circle's label competes for space like a child disk.
		let title_idx = tree.nodes.len();
		tree.nodes.push(AnnotatedNode {
			kind: NodeKind::Title,
			uid: role.uid.clone(),
			name: role.name.clone(),
			role_type: role.role_type,
			depth: role.depth,
			member_count: 0,
			children: Vec::new(),
		});
		children.push(title_idx);

		tree.nodes[idx].children = children;
	}

	idx
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::org_chart::types::RawRoleMember;

	fn raw(uid: &str, role_type: RoleType, depth: u32, roles: Vec<RawRole>) -> RawRole {
		RawRole {
			uid: uid.to_string(),
			name: uid.to_uppercase(),
			role_type,
			depth,
			roles,
			role_members: Vec::new(),
		}
	}

	#[test]
	fn single_role_has_no_children_and_no_title() {
		let tree = build(&raw("solo", RoleType::Normal, 0, vec![]));
		assert_eq!(tree.len(), 1);
		assert_eq!(tree.nodes[0].kind, NodeKind::Role);
		assert!(tree.nodes[0].children.is_empty());
	}

	#[test]
	fn every_circle_gets_exactly_one_title() {
		let root = raw(
			"root",
			RoleType::Circle,
			0,
			vec![
				raw("ops", RoleType::Normal, 1, vec![]),
				raw(
					"product",
					RoleType::Circle,
					1,
					vec![raw("design", RoleType::Normal, 2, vec![])],
				),
			],
		);
		let tree = build(&root);

		let circles = tree.nodes.iter().filter(|n| n.kind == NodeKind::Circle).count();
		let titles = tree.nodes.iter().filter(|n| n.kind == NodeKind::Title).count();
		assert_eq!(circles, 2);
		assert_eq!(titles, 2);
		// 4 real roles + 2 titles
		assert_eq!(tree.len(), 6);
	}

	#[test]
	fn title_carries_parent_identity_and_depth() {
		let root = raw("root", RoleType::Circle, 0, vec![raw("a", RoleType::Normal, 1, vec![])]);
		let tree = build(&root);

		let title = tree
			.nodes
			.iter()
			.find(|n| n.kind == NodeKind::Title)
			.expect("circle should synthesize a title");
		assert_eq!(title.uid, "root");
		assert_eq!(title.name, "ROOT");
		assert_eq!(title.depth, 0);
	}

	#[test]
	fn title_is_the_last_child_of_its_circle() {
		let root = raw(
			"root",
			RoleType::Circle,
			0,
			vec![raw("a", RoleType::Normal, 1, vec![]), raw("b", RoleType::Normal, 1, vec![])],
		);
		let tree = build(&root);

		let last = *tree.nodes[0].children.last().unwrap();
		assert_eq!(tree.nodes[last].kind, NodeKind::Title);
	}

	#[test]
	fn input_is_not_mutated() {
		let mut root = raw("root", RoleType::Circle, 0, vec![raw("a", RoleType::Normal, 1, vec![])]);
		root.role_members = vec![RawRoleMember { focus: Some("anchor".into()) }];
		let before = format!("{root:?}");
		let _ = build(&root);
		assert_eq!(format!("{root:?}"), before);
	}

	#[test]
	fn member_counts_survive_annotation() {
		let mut child = raw("a", RoleType::Normal, 1, vec![]);
		child.role_members = vec![RawRoleMember { focus: None }, RawRoleMember { focus: None }];
		let tree = build(&raw("root", RoleType::Circle, 0, vec![child]));
		let a = tree.nodes.iter().find(|n| n.uid == "a").unwrap();
		assert_eq!(a.member_count, 2);
	}
}
