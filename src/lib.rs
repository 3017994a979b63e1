//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::{OptionalParamSegment, ParamSegment, StaticSegment};
use log::{Level, info};

// Modules
pub mod api;
pub mod auth;
pub mod components;
pub mod error;
mod pages;

use crate::error::AppError;
use crate::pages::not_found::NotFound;
use crate::pages::org_chart::OrgChartPage;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the org chart (with its optional timeline
/// prefix) and handles 404's. Both chart routes keep the node segment
/// optional so switching focus never remounts the chart.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	provide_context(AppError::new());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Organization chart" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ErrorBanner />
		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=StaticSegment("") view=|| view! { <Redirect path="/orgchart" /> } />
				<Route
					path=(StaticSegment("orgchart"), OptionalParamSegment("node"))
					view=OrgChartPage
				/>
				<Route
					path=(
						StaticSegment("timeline"),
						ParamSegment("timeline"),
						StaticSegment("orgchart"),
						OptionalParamSegment("node"),
					)
					view=OrgChartPage
				/>
			</Routes>
		</Router>
	}
}

/// Banner over the shared error channel; dismissing clears the channel and
/// lets rendering resume.
#[component]
fn ErrorBanner() -> impl IntoView {
	let app_error = expect_context::<AppError>();

	view! {
		<Show when=move || app_error.message().is_some()>
			<div class="app-error-banner">
				<span>{move || app_error.message().unwrap_or_default()}</span>
				<button on:click=move |_| app_error.clear()>"Dismiss"</button>
			</div>
		</Show>
	}
}
