use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_location, use_navigate, use_params_map};
use leptos_router::NavigateOptions;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use crate::api::Client;
use crate::error::AppError;

use super::detail::OrgChartDetail;
use super::hierarchy::NodeKind;
use super::nav::{org_chart_url, ChartRoute};
use super::render;
use super::state::{OrgChartState, SyncEffect, SyncInput, TreeUpdate};
use super::types::RawRole;

#[component]
pub fn OrgChartCanvas() -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<OrgChartState>> = Rc::new(RefCell::new(OrgChartState::new()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let started = Rc::new(Cell::new(false));

	let app_error = expect_context::<AppError>();
	let client = Client::new(crate::api::DEFAULT_BASE_URL);

	let params = use_params_map();
	let location = use_location();
	let navigate = use_navigate();

	let time_line = Memo::new(move |_| params.with(|p| p.get("timeline")));
	let node_param = Memo::new(move |_| params.with(|p| p.get("node")));

	// Latest successful fetch, stamped with its generation and timeline.
	let (tree, set_tree) = signal::<Option<(RawRole, u64, Option<String>)>>(None);
	let (refetch_tick, set_refetch_tick) = signal(0u32);
	let fetch_generation = Rc::new(Cell::new(0u64));

	// The reactive view reads only these; everything else lives in `state`.
	let (transitioning, set_transitioning) = signal(false);
	let (detail_uid, set_detail_uid) = signal::<Option<String>>(None);

	// Fetch: runs on mount, whenever the timeline changes, and on demand.
	// Responses from superseded requests are dropped, so an old tree can
	// never land after a newer one.
	{
		let client = client.clone();
		let fetch_generation = fetch_generation.clone();
		Effect::new(move |_| {
			let tl = time_line.get();
			refetch_tick.get();

			let generation = fetch_generation.get() + 1;
			fetch_generation.set(generation);

			let client = client.clone();
			let fetch_generation = fetch_generation.clone();
			spawn_local(async move {
				match client.root_role(tl.as_deref()).await {
					Ok(root) => {
						if fetch_generation.get() == generation {
							set_tree.set(Some((root, generation, tl)));
							app_error.clear();
						}
					}
					Err(err) => {
						warn!("root role query failed: {err}");
						if fetch_generation.get() == generation {
							app_error.set(err.to_string());
						}
					}
				}
			});
		});
	}

	// Bridge: route and data changes flow into the owned state; a reset to
	// the bare chart on a stale timeline asks for a refetch.
	{
		let state = state.clone();
		let last_path: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
		Effect::new(move |_| {
			let path = location.pathname.get();
			let route = ChartRoute::new(time_line.get(), node_param.get());
			let fetched = tree.get();

			let location_changed = {
				let mut last = last_path.borrow_mut();
				let changed = last.as_deref().is_some_and(|p| p != path);
				*last = Some(path);
				changed
			};

			let effect = state.borrow_mut().receive(SyncInput {
				tree: fetched
					.as_ref()
					.map(|(root, generation, tl)| TreeUpdate {
						root,
						generation: *generation,
						time_line: tl.as_deref(),
					}),
				route: &route,
				location_changed,
			});

			if effect == SyncEffect::Refetch {
				set_refetch_tick.update(|t| *t += 1);
			}
		});
	}

	// Frame loop: tick the camera, mirror the bits the DOM needs into
	// signals, and repaint. Stops for good once the component is cleaned up.
	{
		let state = state.clone();
		let animate = animate.clone();
		let alive = alive.clone();
		let started = started.clone();
		Effect::new(move |_| {
			let Some(canvas) = canvas_ref.get() else {
				return;
			};
			if started.get() {
				return;
			}
			started.set(true);

			let canvas: HtmlCanvasElement = canvas.into();
			let (w, h) = (
				canvas
					.parent_element()
					.map(|p| f64::from(p.client_width()))
					.filter(|w| *w > 0.0)
					.unwrap_or(1000.0),
				canvas
					.parent_element()
					.map(|p| f64::from(p.client_height()))
					.filter(|h| *h > 0.0)
					.unwrap_or(500.0),
			);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let ctx: CanvasRenderingContext2d = canvas
				.get_context("2d")
				.unwrap()
				.unwrap()
				.dyn_into()
				.unwrap();

			let last_frame = Cell::new(js_sys::Date::now());
			let (state, animate_inner, alive) = (state.clone(), animate.clone(), alive.clone());
			*animate.borrow_mut() = Some(Closure::new(move || {
				if !alive.load(Ordering::Relaxed) {
					return;
				}

				let now = js_sys::Date::now();
				let dt = now - last_frame.replace(now);

				let mut s = state.borrow_mut();
				s.tick(dt);

				let is_transitioning = s.viewport().is_transitioning();
				if transitioning.get_untracked() != is_transitioning {
					set_transitioning.set(is_transitioning);
				}
				let focus_role = s
					.focus()
					.filter(|n| n.kind == NodeKind::Role)
					.map(|n| n.uid.clone());
				if detail_uid.get_untracked() != focus_role {
					set_detail_uid.set(focus_role.clone());
				}

				// Nothing draws while the error channel holds a failure.
				if app_error.is_set_untracked() || !s.is_ready() {
					ctx.clear_rect(0.0, 0.0, w, h);
				} else {
					let detail_active = focus_role.is_some() && !is_transitioning;
					let scene = s.scene(detail_active);
					render::draw(&ctx, s.nodes(), &scene, w, h);
				}
				drop(s);

				if let Some(cb) = animate_inner.borrow().as_ref() {
					let _ = web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(cb) = animate.borrow().as_ref() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		});
	}

	{
		let alive = alive.clone();
		on_cleanup(move || alive.store(false, Ordering::Relaxed));
	}

	let chart_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		let (px, py) = (f64::from(ev.client_x()) - rect.left(), f64::from(ev.client_y()) - rect.top());
		Some(render::canvas_to_chart(px, py, f64::from(canvas.width()), f64::from(canvas.height())))
	};

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = chart_point(&ev) else {
			return;
		};
		let target = state_click.borrow().click_target(x, y).map(|n| n.uid.clone());
		if let Some(uid) = target {
			let url = org_chart_url(Some(&uid), time_line.get().as_deref());
			navigate(&url, NavigateOptions::default());
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = chart_point(&ev) {
			state_mm.borrow_mut().hover_at(x, y);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		state_ml.borrow_mut().clear_hover();
	};

	view! {
		<div class="org-chart">
			<canvas
				node_ref=canvas_ref
				class="org-chart-canvas"
				on:click=on_click
				on:mousemove=on_mousemove
				on:mouseleave=on_mouseleave
				style="display: block;"
			/>
			<Show when=move || detail_uid.get().is_some() && !transitioning.get()>
				{move || {
					detail_uid.get().map(|uid| {
						view! { <OrgChartDetail role_uid=uid time_line=time_line.get() /> }
					})
				}}
			</Show>
		</div>
	}
}
