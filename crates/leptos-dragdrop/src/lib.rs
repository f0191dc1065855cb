//! Leptos DragDrop Utilities
//!
//! Mouse-event drag-and-drop for Leptos, generic over what is dragged and
//! what it is dropped on. Uses a movement threshold to tell a click from a
//! drag.

use std::fmt::Debug;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// Anything usable as a drag source or drop target key
pub trait DragKey: Copy + PartialEq + Debug + Send + Sync + 'static {}

impl<K> DragKey for K where K: Copy + PartialEq + Debug + Send + Sync + 'static {}

/// DnD state signals
///
/// `S` identifies the dragged element, `T` the element under the pointer.
#[derive(Clone, Copy)]
pub struct DndSignals<S: DragKey, T: DragKey> {
    pub dragging_read: ReadSignal<Option<S>>,
    pub dragging_write: WriteSignal<Option<S>>,
    pub drop_target_read: ReadSignal<Option<T>>,
    pub drop_target_write: WriteSignal<Option<T>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending source (mousedown but not yet dragging)
    pub pending_read: ReadSignal<Option<S>>,
    pub pending_write: WriteSignal<Option<S>>,
    /// Pointer position at mousedown
    pub start_read: ReadSignal<(i32, i32)>,
    pub start_write: WriteSignal<(i32, i32)>,
}

impl<S: DragKey, T: DragKey> DndSignals<S, T> {
    /// Is anything being dragged right now
    pub fn is_dragging(&self) -> bool {
        self.dragging_read.get().is_some()
    }
}

pub fn create_dnd_signals<S: DragKey, T: DragKey>() -> DndSignals<S, T> {
    let (dragging_read, dragging_write) = signal(None::<S>);
    let (drop_target_read, drop_target_write) = signal(None::<T>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_read, pending_write) = signal(None::<S>);
    let (start_read, start_write) = signal((0i32, 0i32));
    DndSignals {
        dragging_read,
        dragging_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_read,
        pending_write,
        start_read,
        start_write,
    }
}

/// Has the pointer moved far enough from `start` to count as a drag
pub fn exceeds_threshold(start: (i32, i32), current: (i32, i32)) -> bool {
    let dx = (current.0 - start.0).abs();
    let dy = (current.1 - start.1).abs();
    dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX
}

/// End drag operation
///
/// `drag_just_ended` stays set for 100ms so click handlers can ignore the
/// click that the browser fires after mouseup.
pub fn end_drag<S: DragKey, T: DragKey>(dnd: &DndSignals<S, T>) {
    dnd.dragging_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_write.set(None);
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

fn is_form_control(target: &web_sys::EventTarget) -> bool {
    target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlSelectElement>().is_some()
}

/// Create mousedown handler for draggable elements
/// Records a pending drag with its start position
pub fn make_on_mousedown<S: DragKey, T: DragKey>(
    dnd: DndSignals<S, T>,
    source: S,
) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(target) = ev.target() {
            if is_form_control(&target) {
                return;
            }
        }
        // Nested draggables (task inside column): innermost wins
        ev.stop_propagation();
        dnd.pending_write.set(Some(source));
        dnd.start_write.set((ev.client_x(), ev.client_y()));
    }
}

/// Create mouseover handler for drop targets
///
/// Stops propagation so the innermost target wins over the surface it
/// sits on.
pub fn make_on_target_mouseover<S: DragKey, T: DragKey>(
    dnd: DndSignals<S, T>,
    target: T,
) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if dnd.dragging_read.get_untracked().is_none() {
            return;
        }
        ev.stop_propagation();
        if dnd.drop_target_read.get_untracked() != Some(target) {
            dnd.drop_target_write.set(Some(target));
        }
    }
}

/// Create mouseleave handler for the area containing all targets
pub fn make_on_mouseleave<S: DragKey, T: DragKey>(
    dnd: DndSignals<S, T>,
) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_read.get_untracked().is_some() {
            dnd.drop_target_write.set(None);
        }
    }
}

/// Bind document mousemove handler - starts drag once moved past the threshold
pub fn bind_global_mousemove<S: DragKey, T: DragKey>(dnd: DndSignals<S, T>) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let pending = dnd.pending_read.get_untracked();
        if pending.is_none() || dnd.dragging_read.get_untracked().is_some() {
            return;
        }
        let start = dnd.start_read.get_untracked();
        if exceeds_threshold(start, (ev.client_x(), ev.client_y())) {
            dnd.dragging_write.set(pending);
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    }
    on_mousemove.forget();
}

/// Bind document mouseup handler for drop detection
///
/// `on_drop` runs only when a real drag ends over a target; a release over
/// nothing, or a plain click, just clears the state.
pub fn bind_global_mouseup<S, T, F>(dnd: DndSignals<S, T>, on_drop: F)
where
    S: DragKey,
    T: DragKey,
    F: Fn(S, T) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_read.get_untracked();
        let drop_target = dnd.drop_target_read.get_untracked();

        end_drag(&dnd);
        if let (Some(source), Some(target)) = (dragging, drop_target) {
            on_drop(source, target);
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }
    on_mouseup.forget();

    bind_global_mousemove(dnd);
}
