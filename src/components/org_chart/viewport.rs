//! Focus-driven camera over the packed layout, with animated zoom transitions.

use super::pack::{PackedNode, DIAMETER};
use super::scale::{cubic_in_out, View, ZoomInterpolator};

/// Transition length in milliseconds.
pub const TRANSITION_MS: f64 = 750.0;

/// The visible region of the packed layout: a center plus the diameter of the
/// square window around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportFrame {
	pub cx: f64,
	pub cy: f64,
	pub diameter: f64,
}

impl ViewportFrame {
	/// The frame that exactly fits a packed node.
	pub fn of(node: &PackedNode) -> Self {
		Self { cx: node.x, cy: node.y, diameter: 2.0 * node.r }
	}

	/// The whole-canvas frame the camera starts from.
	pub fn canvas() -> Self {
		Self { cx: 0.0, cy: 0.0, diameter: DIAMETER }
	}

	fn to_view(self) -> View {
		[self.cx, self.cy, self.diameter]
	}

	fn from_view(v: View) -> Self {
		Self { cx: v[0], cy: v[1], diameter: v[2] }
	}
}

struct Transition {
	interp: ZoomInterpolator,
	t: f64,
}

/// Camera state. `Idle` when no transition runs; `Transitioning` while the
/// live frame is interpolated toward the target. A single writer drives it:
/// `set_focus` retargets, `tick` advances.
pub struct ViewportState {
	target: ViewportFrame,
	current: ViewportFrame,
	transition: Option<Transition>,
	generation: u64,
}

impl ViewportState {
	pub fn new(initial: ViewportFrame) -> Self {
		Self { target: initial, current: initial, transition: None, generation: 0 }
	}

	/// Retargets the camera and starts a transition from the live frame —
	/// mid-flight retargeting continues smoothly from wherever the previous
	/// transition currently is, never from its stale endpoint. Re-targeting
	/// the current target is a no-op.
	pub fn set_focus(&mut self, frame: ViewportFrame) {
		if frame == self.target {
			return;
		}
		self.generation += 1;
		self.transition = Some(Transition {
			interp: ZoomInterpolator::new(self.current.to_view(), frame.to_view()),
			t: 0.0,
		});
		self.target = frame;
	}

	/// Advances the running transition by `dt_ms`. Installing a new
	/// transition discards the previous one, so a superseded animation can
	/// never emit another frame. A saturating first tick (or an environment
	/// that never ticks smoothly) jumps straight to the target.
	pub fn tick(&mut self, dt_ms: f64) {
		let Some(tr) = &mut self.transition else {
			return;
		};
		tr.t = (tr.t + dt_ms / TRANSITION_MS).min(1.0);
		if tr.t >= 1.0 {
			self.current = self.target;
			self.transition = None;
		} else {
			self.current = ViewportFrame::from_view(tr.interp.at(cubic_in_out(tr.t)));
		}
	}

	/// The live frame, mid-transition included.
	pub fn frame(&self) -> ViewportFrame {
		self.current
	}

	/// The frame the camera is heading for (equals [`Self::frame`] when idle).
	pub fn target(&self) -> ViewportFrame {
		self.target
	}

	pub fn is_transitioning(&self) -> bool {
		self.transition.is_some()
	}

	/// Monotonic counter identifying the live transition.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}
