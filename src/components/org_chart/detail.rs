use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;

use crate::api::{Client, RoleDetail};
use crate::error::AppError;

use super::nav::member_url;

/// Detail overlay for the focused role: member avatars plus purpose text.
/// Fetched on mount, keyed by the role uid and the active timeline; query
/// failures go to the shared error channel like every other fetch.
#[component]
pub fn OrgChartDetail(
	/// Role the overlay describes.
	role_uid: String,
	/// Active timeline segment, if any.
	#[prop(optional_no_strip)]
	time_line: Option<String>,
) -> impl IntoView {
	let app_error = expect_context::<AppError>();
	let client = Client::new(crate::api::DEFAULT_BASE_URL);
	let (detail, set_detail) = signal::<Option<RoleDetail>>(None);

	{
		let client = client.clone();
		let role_uid = role_uid.clone();
		let time_line = time_line.clone();
		Effect::new(move |_| {
			let client = client.clone();
			let role_uid = role_uid.clone();
			let time_line = time_line.clone();
			spawn_local(async move {
				match client.role_detail(&role_uid, time_line.as_deref()).await {
					Ok(Some(role)) => set_detail.set(Some(role)),
					Ok(None) => {}
					Err(err) => {
						warn!("role detail query failed: {err}");
						app_error.set(err.to_string());
					}
				}
			});
		});
	}

	view! {
		<div class="org-chart-detail">
			{move || {
				let client = client.clone();
				let time_line = time_line.clone();
				detail.get().map(move |role| {
					let members = role
						.role_members
						.iter()
						.map(|rm| {
							let url = member_url(&rm.member.uid, time_line.as_deref());
							let avatar = client.avatar_url(&rm.member.uid, Some(60));
							view! {
								<a href=url title=rm.member.user_name.clone()>
									<img class="avatar" src=avatar alt=rm.member.full_name.clone() />
								</a>
							}
						})
						.collect_view();
					let purpose = if role.purpose.is_empty() {
						"No purpose defined".to_string()
					} else {
						role.purpose.clone()
					};
					view! {
						<h1>{role.name.clone()}</h1>
						<div class="detail-members">{members}</div>
						<h3>"Purpose"</h3>
						<p>{purpose}</p>
					}
				})
			}}
		</div>
	}
}
