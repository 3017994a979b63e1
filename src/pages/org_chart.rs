use leptos::prelude::*;

use crate::components::org_chart::OrgChartCanvas;

/// Full-page organization chart with navigation-synced zooming.
#[component]
pub fn OrgChartPage() -> impl IntoView {
	view! {
		<div class="orgchart-page">
			<OrgChartCanvas />
			<div class="orgchart-overlay">
				<p class="subtitle">
					"Click a circle to drill in. Click the surrounding circle to zoom back out."
				</p>
			</div>
		</div>
	}
}
