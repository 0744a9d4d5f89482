//! Leptos component wrapping the co-author graph canvas.
//!
//! The component measures its wrapper, starts the layout once the wrapper has a usable
//! size and drives everything from a `requestAnimationFrame` loop: layout ticks, hover
//! debouncing, tooltip placement and rendering. Gestures capture the pointer and listen
//! on the window until they end; those listeners are removed on release, cancel and
//! teardown.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, CanvasRenderingContext2d, Element, Event, EventTarget,
	HtmlCanvasElement, MouseEvent, PointerEvent, ResizeObserver, WheelEvent, Window,
};

use super::config::SiteData;
use super::hover::TooltipPosition;
use super::interaction::{GestureEnd, PointerInput};
use super::layout::{LayoutParam, LayoutParams};
use super::render;
use super::selection::Selection;
use super::session::GenerationToken;
use super::state::CoauthorGraphState;
use super::theme::Theme;
use super::types::{AuthorName, Publication, is_owner_alias, surname};
use super::viewport::{Point, Size, SurfaceTransform};

/// An event listener that is removed when dropped.
struct ListenerGuard {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
	fn attach(
		target: &EventTarget,
		event: &'static str,
		passive: bool,
		callback: impl FnMut(Event) + 'static,
	) -> Option<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(callback);
		let options = AddEventListenerOptions::new();
		options.set_passive(passive);
		if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
			event,
			callback.as_ref().unchecked_ref(),
			&options,
		) {
			warn!("coauthor-graph: failed to listen for {event}: {err:?}");
			return None;
		}
		Some(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Observes size changes of one element until dropped.
struct ResizeGuard {
	observer: ResizeObserver,
	_callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ResizeGuard {
	fn observe(target: &Element, callback: impl FnMut(js_sys::Array) + 'static) -> Option<Self> {
		let callback = Closure::<dyn FnMut(js_sys::Array)>::new(callback);
		let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
			Ok(observer) => observer,
			Err(err) => {
				warn!("coauthor-graph: ResizeObserver unavailable: {err:?}");
				return None;
			}
		};
		observer.observe(target);
		Some(Self {
			observer,
			_callback: callback,
		})
	}
}

impl Drop for ResizeGuard {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

/// Reactive mirrors of the state the overlays display.
#[derive(Clone, Copy)]
struct Overlay {
	hovered: RwSignal<Option<AuthorName>>,
	tooltip: RwSignal<Option<TooltipPosition>>,
	selection: RwSignal<Selection>,
	/// Set by the panel's close button; applied to the state on the next frame.
	close_requested: RwSignal<bool>,
}

/// Bundles graph state with its drawing surface and DOM listeners.
struct GraphContext {
	state: CoauthorGraphState,
	theme: Theme,
	wrapper: Element,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	/// Generation the canvas was last sized for.
	token: Option<GenerationToken>,
	needs_measure: bool,
	resize_observer: Option<ResizeGuard>,
	gesture_listeners: Vec<ListenerGuard>,
	listeners: Vec<ListenerGuard>,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

fn request_measure(context: &Weak<RefCell<Option<GraphContext>>>) {
	if let Some(context) = context.upgrade() {
		if let Some(c) = context.borrow_mut().as_mut() {
			c.needs_measure = true;
		}
	}
}

fn surface_of(canvas: &HtmlCanvasElement) -> Option<SurfaceTransform> {
	let rect = canvas.get_bounding_client_rect();
	SurfaceTransform::from_rect(
		rect.left(),
		rect.top(),
		rect.width(),
		rect.height(),
		canvas.width() as f64,
		canvas.height() as f64,
	)
}

fn pointer_input(ev: &PointerEvent) -> PointerInput {
	PointerInput {
		pointer_id: ev.pointer_id(),
		button: ev.button(),
		client: Point::new(ev.client_x() as f64, ev.client_y() as f64),
	}
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map_or(0.0, |p| p.now())
}

/// Whether the event started inside an element marked `data-no-pan`.
fn on_controls(ev: &Event) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.and_then(|el| el.closest("[data-no-pan]").ok().flatten())
		.is_some()
}

impl GraphContext {
	/// Size the canvas to its wrapper and (re)start the layout when the size changed.
	fn measure(&mut self) {
		let size = Size::new(
			self.wrapper.client_width() as f64,
			self.wrapper.client_height() as f64,
		);
		if !size.is_measured() {
			return;
		}
		self.needs_measure = false;
		if size != self.state.size {
			self.canvas.set_width(size.width as u32);
			self.canvas.set_height(size.height as u32);
			self.gesture_listeners.clear();
		}
		if self.state.resize(size) {
			debug!("coauthor-graph: surface {}x{}", size.width, size.height);
		}
		self.token = self
			.state
			.session
			.is_started()
			.then(|| self.state.session.token());
	}

	fn frame(&mut self, now: f64, overlay: Overlay) {
		if overlay.close_requested.get_untracked() {
			overlay.close_requested.set(false);
			self.state.clear_selection();
		}
		let current = self.token.is_some_and(|t| self.state.session.is_current(t));
		if self.needs_measure || !current {
			self.measure();
		}
		let surface = surface_of(&self.canvas);
		self.state.frame(now, surface.as_ref());
		render::render(&self.state, &self.ctx, &self.theme);
		self.sync(overlay);
	}

	fn sync(&self, overlay: Overlay) {
		let hovered = self.state.hover.current().cloned();
		if overlay.hovered.with_untracked(|h| *h != hovered) {
			overlay.hovered.set(hovered);
		}
		let tooltip = self.state.tooltip_position();
		if overlay.tooltip.get_untracked() != tooltip {
			overlay.tooltip.set(tooltip);
		}
		if overlay.selection.with_untracked(|s| *s != self.state.selection) {
			overlay.selection.set(self.state.selection.clone());
		}
	}

	fn end_gesture(&mut self, pointer_id: i32) {
		self.gesture_listeners.clear();
		let _ = self.wrapper.release_pointer_capture(pointer_id);
	}

	fn teardown(&mut self) {
		self.resize_observer = None;
		self.gesture_listeners.clear();
		self.listeners.clear();
		self.state.teardown();
		self.token = None;
	}
}

/// Window listeners for a gesture that just started.
fn gesture_listeners(
	window: &Window,
	context: Weak<RefCell<Option<GraphContext>>>,
	overlay: Overlay,
) -> Vec<ListenerGuard> {
	let on_move = {
		let context = context.clone();
		move |ev: Event| {
			let (Some(context), Ok(ev)) = (context.upgrade(), ev.dyn_into::<PointerEvent>()) else {
				return;
			};
			if let Some(c) = context.borrow_mut().as_mut() {
				let surface = surface_of(&c.canvas);
				c.state.pointer_move(pointer_input(&ev), surface.as_ref(), now_ms());
			}
		}
	};
	let on_up = {
		let context = context.clone();
		move |ev: Event| {
			let (Some(context), Ok(ev)) = (context.upgrade(), ev.dyn_into::<PointerEvent>()) else {
				return;
			};
			if let Some(c) = context.borrow_mut().as_mut() {
				let input = pointer_input(&ev);
				if c.state.pointer_up(input) != GestureEnd::None {
					c.end_gesture(input.pointer_id);
					c.sync(overlay);
				}
			}
		}
	};
	let on_cancel = move |ev: Event| {
		let (Some(context), Ok(ev)) = (context.upgrade(), ev.dyn_into::<PointerEvent>()) else {
			return;
		};
		if let Some(c) = context.borrow_mut().as_mut() {
			if c.state.pointer_cancel(ev.pointer_id()) != GestureEnd::None {
				c.end_gesture(ev.pointer_id());
			}
		}
	};
	[
		ListenerGuard::attach(window, "pointermove", true, on_move),
		ListenerGuard::attach(window, "pointerup", true, on_up),
		ListenerGuard::attach(window, "pointercancel", true, on_cancel),
	]
	.into_iter()
	.flatten()
	.collect()
}

fn format_param(param: LayoutParam, value: f64) -> String {
	match param {
		LayoutParam::Center => format!("{value:.2}"),
		LayoutParam::Radial => format!("{value:.3}"),
		_ => format!("{value:.0}"),
	}
}

/// Renders the interactive co-author network.
///
/// The component fills its parent's width; the drawing area keeps a fixed share of
/// the viewport height. Data changes rebuild the graph from scratch.
#[component]
pub fn CoauthorGraphCanvas(#[prop(into)] data: Signal<SiteData>) -> impl IntoView {
	let wrapper_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let mounted = Arc::new(AtomicBool::new(true));

	let overlay = Overlay {
		hovered: RwSignal::new(None),
		tooltip: RwSignal::new(None),
		selection: RwSignal::new(Selection::default()),
		close_requested: RwSignal::new(false),
	};
	let params = RwSignal::new(data.with_untracked(|d| d.config.layout));
	let controls_open = RwSignal::new(true);

	{
		let mounted = mounted.clone();
		on_cleanup(move || mounted.store(false, Ordering::Relaxed));
	}

	let (context_init, animate_init) = (context.clone(), animate.clone());
	Effect::new(move |_| {
		let data = data.get();
		if let Some(c) = context_init.borrow_mut().as_mut() {
			info!("coauthor-graph: data changed, rebuilding");
			c.state.set_publications(data.publications);
			c.sync(overlay);
			return;
		}

		let (Some(wrapper), Some(canvas)) = (wrapper_ref.get(), canvas_ref.get()) else {
			return;
		};
		let wrapper: Element = wrapper.into();
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			warn!("coauthor-graph: 2d canvas context unavailable");
			return;
		};

		let weak = Rc::downgrade(&context_init);
		let mut listeners = Vec::new();
		// The wrapper also changes size when the side panel opens or closes.
		let resize_observer = ResizeGuard::observe(&wrapper, {
			let weak = weak.clone();
			move |_| request_measure(&weak)
		});
		if resize_observer.is_none() {
			listeners.extend(ListenerGuard::attach(&window, "resize", true, {
				let weak = weak.clone();
				move |_| request_measure(&weak)
			}));
		}
		listeners.extend(ListenerGuard::attach(&wrapper, "wheel", false, {
			let weak = weak.clone();
			move |ev: Event| {
				let (Some(context), Ok(ev)) = (weak.upgrade(), ev.dyn_into::<WheelEvent>()) else {
					return;
				};
				if on_controls(&ev) {
					return;
				}
				ev.prevent_default();
				if let Some(c) = context.borrow_mut().as_mut() {
					let surface = surface_of(&c.canvas);
					let client = Point::new(ev.client_x() as f64, ev.client_y() as f64);
					c.state.wheel(ev.delta_y(), client, surface.as_ref());
				}
			}
		}));

		info!(
			"coauthor-graph: {} publications by {}",
			data.publications.len(),
			data.owner
		);
		*context_init.borrow_mut() = Some(GraphContext {
			state: CoauthorGraphState::new(&data),
			theme: Theme::default(),
			wrapper,
			canvas,
			ctx,
			token: None,
			needs_measure: true,
			resize_observer,
			gesture_listeners: Vec::new(),
			listeners,
		});

		let (context_anim, animate_inner, mounted) =
			(context_init.clone(), animate_init.clone(), mounted.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			if !mounted.load(Ordering::Relaxed) {
				if let Some(mut c) = context_anim.borrow_mut().take() {
					c.teardown();
					debug!("coauthor-graph: torn down");
				}
				animate_inner.borrow_mut().take();
				return;
			}
			if let Some(c) = context_anim.borrow_mut().as_mut() {
				c.frame(now, overlay);
			}
			if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = animate_init.borrow().as_ref() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_params = context.clone();
	Effect::new(move |_| {
		let params = params.get();
		if let Some(c) = context_params.borrow_mut().as_mut() {
			c.state.set_layout_params(params);
		}
	});

	let context_pd = context.clone();
	let on_pointerdown = move |ev: PointerEvent| {
		let no_pan = on_controls(&ev);
		let mut guard = context_pd.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		let surface = surface_of(&c.canvas);
		let input = pointer_input(&ev);
		if !c.state.pointer_down(input, no_pan, surface.as_ref()) {
			return;
		}
		ev.prevent_default();
		let _ = c.wrapper.set_pointer_capture(input.pointer_id);
		if let Some(window) = web_sys::window() {
			c.gesture_listeners = gesture_listeners(&window, Rc::downgrade(&context_pd), overlay);
		}
	};

	let context_pm = context.clone();
	let on_pointermove = move |ev: PointerEvent| {
		let no_pan = on_controls(&ev);
		if let Some(c) = context_pm.borrow_mut().as_mut() {
			// Gesture moves arrive through the window listeners.
			if c.state.interaction.is_active() {
				return;
			}
			if no_pan {
				c.state.pointer_leave();
				return;
			}
			let surface = surface_of(&c.canvas);
			c.state.pointer_move(pointer_input(&ev), surface.as_ref(), now_ms());
		}
	};

	let context_pl = context.clone();
	let on_pointerleave = move |_: PointerEvent| {
		if let Some(c) = context_pl.borrow_mut().as_mut() {
			c.state.pointer_leave();
		}
	};

	let on_close = move |_: MouseEvent| {
		overlay.selection.set(Selection::default());
		overlay.close_requested.set(true);
	};

	let sliders = LayoutParam::ALL
		.into_iter()
		.map(|param| {
			let (min, max, step) = param.range();
			view! {
				<label style="font-size: 11px; color: #00ffff;">
					{param.label()} ": "
					<span style="color: #ff00ff; font-weight: 700;">
						{move || format_param(param, params.get().get(param))}
					</span>
				</label>
				<input
					type="range"
					style="accent-color: #ff00ff;"
					min=min.to_string()
					max=max.to_string()
					step=step.to_string()
					prop:value=move || params.get().get(param).to_string()
					on:input=move |ev| {
						if let Ok(value) = event_target_value(&ev).parse::<f64>() {
							params.update(|p| p.set(param, value));
						}
					}
				/>
			}
		})
		.collect_view();

	let controls = view! {
		<div
			data-no-pan="true"
			class="coauthor-graph-controls"
			style=move || format!(
				"position: absolute; right: 10px; top: 10px; z-index: 80; \
				background: linear-gradient(135deg, rgba(18,6,24,0.72), rgba(6,12,18,0.6)); \
				border-radius: 10px; color: #9ee6ff; font-size: 12px; \
				transition: width 220ms ease, padding 160ms ease; padding: {}; width: {};",
				if controls_open.get() { "10px" } else { "6px" },
				if controls_open.get() { "260px" } else { "40px" },
			)
		>
			<div style="display: flex; justify-content: space-between; align-items: center;">
				<strong style="font-size: 13px; color: #ff00ff;">
					{move || if controls_open.get() { "Layout" } else { "" }}
				</strong>
				<div style="display: flex; gap: 6px; align-items: center;">
					<Show when=move || controls_open.get()>
						<button on:click=move |_| params.set(LayoutParams::spread())>"Spread"</button>
						<button on:click=move |_| params.set(LayoutParams::compact())>"Compact"</button>
					</Show>
					<button
						aria-label=move || if controls_open.get() { "Collapse" } else { "Open" }
						on:click=move |_| controls_open.update(|open| *open = !*open)
					>
						{move || if controls_open.get() { "–" } else { "≡" }}
					</button>
				</div>
			</div>
			<div style=move || {
				if controls_open.get() { "display: grid; gap: 8px; margin-top: 8px;" } else { "display: none;" }
			}>
				{sliders}
			</div>
		</div>
	};

	let tooltip = move || {
		let author = overlay.hovered.get()?;
		let pos = overlay.tooltip.get()?;
		Some(view! {
			<div
				class="coauthor-graph-tooltip"
				style=format!(
					"position: absolute; left: {}px; top: {}px; transform: translateX(-50%); \
					background: rgba(10,10,12,0.95); color: #fff; padding: 6px 8px; \
					border-radius: 6px; pointer-events: none; font-size: 12px; z-index: 40; \
					transition: left 120ms linear, top 120ms linear;",
					pos.left, pos.top,
				)
			>
				<div style="font-weight: 700; color: #00ffff;">{surname(&author).to_string()}</div>
				<div style="font-size: 11px; color: rgba(0,255,255,0.7);">
					"click to list publications · drag to move"
				</div>
			</div>
		})
	};

	let owner = Signal::derive(move || data.with(|d| d.owner.clone()));
	let side_panel = move || {
		let selection = overlay.selection.get();
		let Some(author) = selection.author else {
			return view! {
				<div class="coauthor-graph-hint">"Click a node to list publications for that author."</div>
			}
			.into_any();
		};
		let name = surname(&author).to_string();
		let list = if selection.publications.is_empty() {
			view! { <div>"No publications found."</div> }.into_any()
		} else {
			let items = selection
				.publications
				.into_iter()
				.map(|p| publication_item(p, &name, &owner.get()))
				.collect_view();
			view! { <ul class="coauthor-graph-publications">{items}</ul> }.into_any()
		};
		view! {
			<div class="coauthor-graph-panel" style="max-height: 70vh; overflow-y: auto;">
				<div style="display: flex; justify-content: space-between; align-items: flex-start;">
					<div>
						<h3>{name.clone()}</h3>
						<div>"Publications"</div>
					</div>
					<button aria-label="Close" on:click=on_close>"✕"</button>
				</div>
				{list}
			</div>
		}
		.into_any()
	};

	view! {
		<div class="coauthor-graph" style="display: flex; gap: 12px; align-items: flex-start;">
			<div
				node_ref=wrapper_ref
				class="coauthor-graph-surface"
				style="position: relative; flex: 1; min-width: 0; height: 70vh; touch-action: none; user-select: none;"
				on:pointerdown=on_pointerdown
				on:pointermove=on_pointermove
				on:pointerleave=on_pointerleave
			>
				<canvas
					node_ref=canvas_ref
					style="display: block; width: 100%; height: 100%; cursor: grab;"
				/>
				{controls}
				{tooltip}
			</div>
			<div style=move || {
				let width = if overlay.selection.with(|s| s.author.is_some()) { 340 } else { 180 };
				format!("width: {width}px; transition: width 240ms ease; min-width: 0;")
			}>
				{side_panel}
			</div>
		</div>
	}
}

/// One entry of the side panel. The owner is emphasized in the author list.
fn publication_item(publication: Publication, with: &str, owner: &str) -> impl IntoView + use<> {
	let link = publication.link().map(|href| {
		let has_doi = publication.doi.as_deref().is_some_and(|d| !d.is_empty());
		let label = if has_doi { "DOI" } else { "Link" };
		view! { <a href=href target="_blank" rel="noreferrer">{label}</a> }
	});
	let authors = publication
		.authors
		.iter()
		.enumerate()
		.map(|(i, author)| {
			let sep = if i == 0 { "" } else { "; " };
			let name = author.clone();
			if is_owner_alias(author, owner) {
				view! { {sep}<strong>{name}</strong> }.into_any()
			} else {
				view! { {sep}<span>{name}</span> }.into_any()
			}
		})
		.collect_view();
	view! {
		<li>
			<div style="font-weight: 700;">{publication.title.clone()}</div>
			<div>"with " {with.to_string()}</div>
			<div style="font-size: 11px;">{authors}</div>
			<div style="display: flex; justify-content: space-between;">
				<span>{publication.year.map(|y| y.to_string())}</span>
				<span>{link}</span>
			</div>
		</li>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn assert_send_sync<T: Send + Sync>(_: &T) {}

	#[test]
	fn close_button_captures_only_signals() {
		let owner = Owner::new();
		owner.with(|| {
			let overlay = Overlay {
				hovered: RwSignal::new(None),
				tooltip: RwSignal::new(None),
				selection: RwSignal::new(Selection {
					author: Some("Smith, J.".to_string()),
					publications: Vec::new(),
				}),
				close_requested: RwSignal::new(false),
			};
			let on_close = move |_: MouseEvent| {
				overlay.selection.set(Selection::default());
				overlay.close_requested.set(true);
			};
			assert_send_sync(&on_close);
			assert_send_sync(&overlay);
			overlay.close_requested.set(true);
			assert!(overlay.close_requested.get_untracked());
		});
	}

	#[test]
	fn publication_item_outlives_borrowed_names() {
		let item = {
			let owner = String::from("Filipov, V.");
			let with = surname("Smith, J.").to_string();
			publication_item(
				Publication::with_authors("Graphs", ["Filipov, V.", "Smith, J."]),
				&with,
				&owner,
			)
		};
		drop(item);
	}
}

