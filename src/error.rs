//! Application-wide error channel.
//!
//! A clonable handle shared through context: fetch failures land here, the
//! app shell shows a banner, and the chart suspends drawing until the slot
//! clears (a later successful fetch clears it too).

use leptos::prelude::*;

/// Handle to the shared error slot.
#[derive(Clone, Copy)]
pub struct AppError(RwSignal<Option<String>>);

impl AppError {
	pub fn new() -> Self {
		Self(RwSignal::new(None))
	}

	/// Reports a failure, replacing any previous one.
	pub fn set(&self, message: impl Into<String>) {
		self.0.set(Some(message.into()));
	}

	/// Clears the slot; rendering resumes.
	pub fn clear(&self) {
		self.0.set(None);
	}

	/// The current failure message, tracked reactively.
	pub fn message(&self) -> Option<String> {
		self.0.get()
	}

	/// Non-reactive check used by the frame loop.
	pub fn is_set_untracked(&self) -> bool {
		self.0.with_untracked(|e| e.is_some())
	}
}

impl Default for AppError {
	fn default() -> Self {
		Self::new()
	}
}
