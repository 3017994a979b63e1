//! Owned chart state: the packed layout, the focused node, the camera, and
//! the synchronization contract tying them to the router and the data source.
//!
//! One instance lives behind the canvas component with a single writer; every
//! method here is pure Rust so the whole bridge is testable off-browser.

use log::debug;

use super::hierarchy;
use super::nav::ChartRoute;
use super::pack::{self, PackedNode};
use super::render::{self, Scene, Tooltip};
use super::types::RawRole;
use super::viewport::{ViewportFrame, ViewportState};

/// A fetched root tree, stamped with its fetch generation and the timeline it
/// was requested for.
#[derive(Clone, Copy)]
pub struct TreeUpdate<'a> {
	pub root: &'a RawRole,
	pub generation: u64,
	pub time_line: Option<&'a str>,
}

/// Everything one synchronization step consumes.
pub struct SyncInput<'a> {
	/// The latest successfully fetched tree, if any.
	pub tree: Option<TreeUpdate<'a>>,
	/// The route currently in the URL.
	pub route: &'a ChartRoute,
	/// Whether the location genuinely changed since the last step (not just a
	/// re-render of the same path).
	pub location_changed: bool,
}

/// What the caller must do after a synchronization step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncEffect {
	None,
	/// Re-fetch the hierarchy from the data source.
	Refetch,
}

/// Cursor hover, in chart screen space.
#[derive(Clone, Copy, Debug)]
struct Hover {
	index: usize,
	x: f64,
	y: f64,
}

/// The org chart's mutable state.
pub struct OrgChartState {
	nodes: Vec<PackedNode>,
	focus: usize,
	viewport: ViewportState,
	hover: Option<Hover>,
	applied_generation: u64,
	applied_time_line: Option<String>,
}

impl Default for OrgChartState {
	fn default() -> Self {
		Self::new()
	}
}

impl OrgChartState {
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			focus: 0,
			viewport: ViewportState::new(ViewportFrame::canvas()),
			hover: None,
			applied_generation: 0,
			applied_time_line: None,
		}
	}

	/// True once the first tree has been packed.
	pub fn is_ready(&self) -> bool {
		!self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[PackedNode] {
		&self.nodes
	}

	/// The focused node; `None` only before the first tree arrives.
	pub fn focus(&self) -> Option<&PackedNode> {
		self.nodes.get(self.focus)
	}

	pub fn viewport(&self) -> &ViewportState {
		&self.viewport
	}

	/// One synchronization step. Applies, in order: a newly fetched tree
	/// (full rebuild, prior layout discarded), the route's node segment, and
	/// the reset-to-root rule for bare-chart navigation. Any resulting focus
	/// change starts a camera transition; focusing the current focus does not.
	pub fn receive(&mut self, input: SyncInput<'_>) -> SyncEffect {
		if let Some(update) = input.tree {
			if self.nodes.is_empty() || update.generation != self.applied_generation {
				let annotated = hierarchy::build(update.root);
				self.nodes = pack::pack(&annotated);
				self.focus = 0;
				self.hover = None;
				self.applied_generation = update.generation;
				self.applied_time_line = update.time_line.map(str::to_string);
				debug!("packed {} nodes (generation {})", self.nodes.len(), update.generation);
			}
		}
		if self.nodes.is_empty() {
			return SyncEffect::None;
		}

		let mut focus = self.focus;
		let mut effect = SyncEffect::None;

		if let Some(uid) = &input.route.node {
			if &self.nodes[focus].uid != uid {
				if let Some(i) = self.nodes.iter().position(|n| &n.uid == uid) {
					focus = i;
				}
			}
		}

		if input.location_changed && input.route.node.is_none() {
			focus = 0;
			// The bare chart path only needs fresh data when it also switched
			// the historical context; the packed root is otherwise current.
			if input.route.time_line.as_deref() != self.applied_time_line.as_deref() {
				effect = SyncEffect::Refetch;
			}
		}

		self.focus = focus;
		self.viewport.set_focus(ViewportFrame::of(&self.nodes[focus]));
		effect
	}

	/// Advances the camera animation.
	pub fn tick(&mut self, dt_ms: f64) {
		self.viewport.tick(dt_ms);
	}

	/// The topmost visible circle containing the point, in chart screen space.
	/// Packed order draws parents before children, so the last hit is the
	/// deepest.
	fn hit(&self, x: f64, y: f64) -> Option<usize> {
		if self.nodes.is_empty() {
			return None;
		}
		let shapes = render::visible_circles(&self.nodes, &self.viewport.frame(), self.focus);
		shapes
			.iter()
			.rev()
			.find(|s| {
				let (dx, dy) = (x - s.x, y - s.y);
				dx * dx + dy * dy <= s.r * s.r
			})
			.map(|s| s.index)
	}

	/// The node a click at this point targets.
	pub fn click_target(&self, x: f64, y: f64) -> Option<&PackedNode> {
		self.hit(x, y).map(|i| &self.nodes[i])
	}

	/// Records the cursor position for tooltip rendering.
	pub fn hover_at(&mut self, x: f64, y: f64) {
		self.hover = self.hit(x, y).map(|index| Hover { index, x, y });
	}

	pub fn clear_hover(&mut self) {
		self.hover = None;
	}

	/// The current frame's drawable scene. `detail_active` marks the focused
	/// role whose canvas label yields to the DOM detail overlay.
	pub fn scene(&self, detail_active: bool) -> Scene {
		if self.nodes.is_empty() {
			return Scene::default();
		}

		let frame = self.viewport.frame();
		let circles = render::visible_circles(&self.nodes, &frame, self.focus);
		let detail_index = detail_active.then_some(self.focus);
		let labels = render::visible_labels(&self.nodes, &frame, self.focus, detail_index);

		// Tooltips rest while the camera flies.
		let tooltip = if self.viewport.is_transitioning() {
			None
		} else {
			self.hover.and_then(|h| {
				circles
					.iter()
					.find(|s| s.index == h.index && s.hoverable)
					.map(|_| Tooltip { x: h.x, y: h.y, text: self.nodes[h.index].name.clone() })
			})
		};

		Scene { circles, labels, tooltip }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::org_chart::hierarchy::NodeKind;
	use crate::components::org_chart::types::RoleType;
	use crate::components::org_chart::viewport::TRANSITION_MS;

	fn raw(uid: &str, role_type: RoleType, depth: u32, roles: Vec<RawRole>) -> RawRole {
		RawRole {
			uid: uid.to_string(),
			name: uid.to_string(),
			role_type,
			depth,
			roles,
			role_members: Vec::new(),
		}
	}

	fn org() -> RawRole {
		raw(
			"root",
			RoleType::Circle,
			0,
			vec![
				raw("a", RoleType::Normal, 1, vec![]),
				raw("b", RoleType::Normal, 1, vec![]),
				raw("sub", RoleType::Circle, 1, vec![raw("c", RoleType::Normal, 2, vec![])]),
			],
		)
	}

	fn update<'a>(root: &'a RawRole, generation: u64, time_line: Option<&'a str>) -> TreeUpdate<'a> {
		TreeUpdate { root, generation, time_line }
	}

	fn settle(state: &mut OrgChartState) {
		state.tick(TRANSITION_MS);
	}

	#[test]
	fn first_tree_focuses_the_root_and_animates_to_it() {
		let root = org();
		let mut state = OrgChartState::new();
		assert!(!state.is_ready());

		let effect = state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::default(),
			location_changed: false,
		});
		assert_eq!(effect, SyncEffect::None);
		assert!(state.is_ready());
		assert_eq!(state.focus().unwrap().uid, "root");
		assert!(state.viewport().is_transitioning());

		settle(&mut state);
		let frame = state.viewport().frame();
		let root_node = &state.nodes()[0];
		assert!((frame.diameter - 2.0 * root_node.r).abs() < 1e-9);
	}

	#[test]
	fn route_node_segment_moves_the_focus() {
		let root = org();
		let mut state = OrgChartState::new();
		state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::default(),
			location_changed: false,
		});
		settle(&mut state);

		let route = ChartRoute::new(None, Some("a".into()));
		state.receive(SyncInput { tree: Some(update(&root, 1, None)), route: &route, location_changed: true });

		assert_eq!(state.focus().unwrap().uid, "a");
		assert!(state.viewport().is_transitioning());
		let a = state.nodes().iter().find(|n| n.uid == "a").unwrap();
		assert!((state.viewport().target().diameter - 2.0 * a.r).abs() < 1e-9);
	}

	#[test]
	fn refocusing_the_current_node_is_idempotent() {
		let root = org();
		let mut state = OrgChartState::new();
		let route = ChartRoute::new(None, Some("a".into()));
		state.receive(SyncInput { tree: Some(update(&root, 1, None)), route: &route, location_changed: false });
		settle(&mut state);

		let generation = state.viewport().generation();
		state.receive(SyncInput { tree: Some(update(&root, 1, None)), route: &route, location_changed: false });
		assert_eq!(state.viewport().generation(), generation);
		assert!(!state.viewport().is_transitioning());
	}

	#[test]
	fn unknown_route_node_is_ignored() {
		let root = org();
		let mut state = OrgChartState::new();
		state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::new(None, Some("ghost".into())),
			location_changed: false,
		});
		assert_eq!(state.focus().unwrap().uid, "root");
	}

	#[test]
	fn bare_chart_navigation_resets_focus_without_refetch() {
		let root = org();
		let mut state = OrgChartState::new();
		let tl = Some("5");
		let at_a = ChartRoute::new(Some("5".into()), Some("a".into()));
		state.receive(SyncInput { tree: Some(update(&root, 1, tl)), route: &at_a, location_changed: false });
		settle(&mut state);
		assert_eq!(state.focus().unwrap().uid, "a");

		// Node segment removed, same timeline: back to the root, no refetch,
		// but the camera does fly back.
		let bare = ChartRoute::new(Some("5".into()), None);
		let effect = state.receive(SyncInput {
			tree: Some(update(&root, 1, tl)),
			route: &bare,
			location_changed: true,
		});
		assert_eq!(effect, SyncEffect::None);
		assert_eq!(state.focus().unwrap().uid, "root");
		assert!(state.viewport().is_transitioning());
	}

	#[test]
	fn bare_chart_navigation_across_timelines_refetches() {
		let root = org();
		let mut state = OrgChartState::new();
		state.receive(SyncInput {
			tree: Some(update(&root, 1, Some("5"))),
			route: &ChartRoute::new(Some("5".into()), None),
			location_changed: false,
		});

		let effect = state.receive(SyncInput {
			tree: Some(update(&root, 1, Some("5"))),
			route: &ChartRoute::new(None, None),
			location_changed: true,
		});
		assert_eq!(effect, SyncEffect::Refetch);
		assert_eq!(state.focus().unwrap().uid, "root");
	}

	#[test]
	fn new_generation_rebuilds_and_resets_focus() {
		let root = org();
		let mut state = OrgChartState::new();
		let route = ChartRoute::new(Some("5".into()), Some("a".into()));
		state.receive(SyncInput { tree: Some(update(&root, 1, Some("5"))), route: &route, location_changed: false });
		assert_eq!(state.focus().unwrap().uid, "a");
		let before = state.nodes().len();

		// The timeline switched and a fresh tree came back, without "a".
		let other = raw(
			"root",
			RoleType::Circle,
			0,
			vec![raw("x", RoleType::Normal, 1, vec![]), raw("y", RoleType::Normal, 1, vec![])],
		);
		let route9 = ChartRoute::new(Some("9".into()), None);
		state.receive(SyncInput { tree: Some(update(&other, 2, Some("9"))), route: &route9, location_changed: true });

		assert_eq!(state.focus().unwrap().uid, "root");
		assert_ne!(state.nodes().len(), before);
		assert!(state.nodes().iter().all(|n| n.uid != "a"));
	}

	#[test]
	fn nothing_happens_before_the_first_fetch() {
		let mut state = OrgChartState::new();
		let effect = state.receive(SyncInput {
			tree: None,
			route: &ChartRoute::new(None, Some("a".into())),
			location_changed: true,
		});
		assert_eq!(effect, SyncEffect::None);
		assert!(!state.is_ready());
		assert!(state.scene(false).circles.is_empty());
	}

	#[test]
	fn click_hits_the_deepest_visible_circle() {
		let root = org();
		let mut state = OrgChartState::new();
		state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::default(),
			location_changed: false,
		});
		settle(&mut state);

		// Shoot at the center of "a": both the root and "a" contain it.
		let frame = state.viewport().frame();
		let a = state.nodes().iter().find(|n| n.uid == "a").unwrap();
		let k = pack::DIAMETER / frame.diameter;
		let (sx, sy) = ((a.x - frame.cx) * k, (a.y - frame.cy) * k);
		assert_eq!(state.click_target(sx, sy).unwrap().uid, "a");

		// Far corner hits nothing.
		assert!(state.click_target(4000.0, 4000.0).is_none());
	}

	#[test]
	fn tooltips_pause_while_transitioning() {
		let root = org();
		let mut state = OrgChartState::new();
		state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::default(),
			location_changed: false,
		});
		settle(&mut state);

		let frame = state.viewport().frame();
		let a = state.nodes().iter().find(|n| n.uid == "a").unwrap();
		let k = pack::DIAMETER / frame.diameter;
		let (sx, sy) = ((a.x - frame.cx) * k, (a.y - frame.cy) * k);
		state.hover_at(sx, sy);
		assert!(state.scene(false).tooltip.is_some());

		// Kick off a transition: the tooltip disappears until it settles.
		state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::new(None, Some("b".into())),
			location_changed: true,
		});
		assert!(state.scene(false).tooltip.is_none());
	}

	#[test]
	fn scene_skips_the_overlaid_label() {
		let root = org();
		let mut state = OrgChartState::new();
		state.receive(SyncInput {
			tree: Some(update(&root, 1, None)),
			route: &ChartRoute::new(None, Some("a".into())),
			location_changed: false,
		});
		settle(&mut state);

		let focus_index = state
			.nodes()
			.iter()
			.position(|n| n.uid == "a" && n.kind == NodeKind::Role)
			.unwrap();
		let with_overlay = state.scene(true);
		assert!(with_overlay.labels.iter().all(|l| l.index != focus_index));
		let without_overlay = state.scene(false);
		assert!(without_overlay.labels.iter().any(|l| l.index == focus_index));
	}
}
