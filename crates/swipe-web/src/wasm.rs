#![forbid(unsafe_code)]

//! `wasm-bindgen` facade: carousels over real DOM elements.
//!
//! JS owns event listeners. After each call the page runs `flush()`, which
//! applies queued style and class writes to the attached elements and
//! returns the listener changes JS must make, as
//! `[{carousel, op: "add" | "remove", target: "track" | "window", event}]`.
//!
//! `attach` takes the page-level options object:
//!
//! ```js
//! carousels.attach(viewport, track, parentId, {
//!   snap: true,
//!   slideStrength: 5000,
//!   transitionSpeedMs: 250,
//!   animationEasing: "linear",
//!   supportMouse: false,
//!   setSizes: true,
//!   setStyles: true,
//!   onlySlideOneElementPerGesture: true,
//!   afterSwipeCallback() { console.log(this.index); },
//! });
//! ```
//!
//! `afterSwipeCallback` runs as a microtask after the `tick` that finished
//! the move, with `{carousel, index, position, slideCount, viewportWidth}`
//! as `this`, so it may call back into the instance.

use core::time::Duration;

use js_sys::{Array, Function, Object, Reflect};
use swipe_core::{
    CarouselConfig, CarouselId, CarouselSnapshot, CompletionOutcome, Easing, GestureCarousel,
    GestureClock, InputCapabilities, PointerSample, PointerSource,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::{CarouselGroup, DeterministicClock, DomCommand, DomTarget, HostEvent, WebSurface};

struct Attached {
    id: CarouselId,
    viewport: HtmlElement,
    track: HtmlElement,
}

fn viewport_width(viewport: &HtmlElement) -> f64 {
    f64::from(viewport.offset_width())
}

fn slide_ids(track: &HtmlElement) -> Vec<String> {
    let children = track.children();
    (0..children.length())
        .map(|idx| match children.item(idx) {
            Some(slide) if !slide.id().is_empty() => slide.id(),
            _ => format!("#{idx}"),
        })
        .collect()
}

fn slide_elements(track: &HtmlElement) -> Vec<HtmlElement> {
    let children = track.children();
    (0..children.length())
        .filter_map(|idx| children.item(idx))
        .filter_map(|slide: Element| slide.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(_err) = element.style().set_property(property, value) {
        #[cfg(feature = "tracing")]
        warn!(property, value, "style write rejected");
    }
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn get_field(obj: &JsValue, key: &str) -> Result<Option<JsValue>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    Ok(Some(v))
}

fn get_bool(obj: &JsValue, key: &str) -> Result<Option<bool>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            v.as_bool()
                .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a boolean")))
        })
        .transpose()
}

fn get_f64(obj: &JsValue, key: &str) -> Result<Option<f64>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a number")))
        })
        .transpose()
}

fn get_string_opt(obj: &JsValue, key: &str) -> Result<Option<String>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            v.as_string()
                .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a string")))
        })
        .transpose()
}

fn get_function(obj: &JsValue, key: &str) -> Result<Option<Function>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            v.dyn_into::<Function>()
                .map_err(|_| JsValue::from_str(&format!("field {key} must be a function")))
        })
        .transpose()
}

struct AttachOptions {
    config: CarouselConfig,
    after_swipe: Option<Function>,
}

fn parse_options(options: &JsValue) -> Result<AttachOptions, JsValue> {
    let mut config = CarouselConfig::default();
    if options.is_null() || options.is_undefined() {
        return Ok(AttachOptions {
            config,
            after_swipe: None,
        });
    }
    if let Some(snap) = get_bool(options, "snap")? {
        config = config.with_snap(snap);
    }
    if let Some(strength) = get_f64(options, "slideStrength")? {
        config = config.with_slide_strength(strength);
    }
    if let Some(ms) = get_f64(options, "transitionSpeedMs")? {
        if !ms.is_finite() || ms < 0.0 {
            return Err(JsValue::from_str(&format!(
                "transitionSpeedMs must be a non-negative number, got {ms}"
            )));
        }
        config = config.with_transition(Duration::from_secs_f64(ms / 1000.0));
    }
    if let Some(name) = get_string_opt(options, "animationEasing")? {
        let easing = Easing::from_css(&name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown easing: {name}")))?;
        config = config.with_easing(easing);
    }
    if let Some(support) = get_bool(options, "supportMouse")? {
        config = config.with_mouse_support(support);
    }
    let set_sizes = get_bool(options, "setSizes")?.unwrap_or(config.set_sizes);
    let set_styles = get_bool(options, "setStyles")?.unwrap_or(config.set_styles);
    config = config.with_managed_layout(set_sizes, set_styles);
    if let Some(one) = get_bool(options, "onlySlideOneElementPerGesture")? {
        config = config.with_one_slide_per_gesture(one);
    }
    Ok(AttachOptions {
        config,
        after_swipe: get_function(options, "afterSwipeCallback")?,
    })
}

fn snapshot_object(snapshot: &CarouselSnapshot) -> Object {
    let obj = Object::new();
    set_js(&obj, "carousel", JsValue::from(snapshot.id.get()));
    set_js(&obj, "index", JsValue::from(snapshot.index as f64));
    set_js(&obj, "position", JsValue::from(snapshot.position));
    set_js(&obj, "slideCount", JsValue::from(snapshot.slide_count as f64));
    set_js(&obj, "viewportWidth", JsValue::from(snapshot.viewport_width));
    obj
}

/// Queue `callback` as a microtask with the snapshot as `this`. Falls back to
/// a direct call where `queueMicrotask` is missing.
fn notify_after_swipe(callback: &Function, snapshot: &CarouselSnapshot) {
    let receiver: JsValue = snapshot_object(snapshot).into();
    let bound = callback.bind(&receiver);
    let queue = Reflect::get(&js_sys::global(), &JsValue::from_str("queueMicrotask"))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok());
    let result = match queue {
        Some(queue) => queue.call1(&JsValue::NULL, &bound),
        None => bound.call0(&JsValue::NULL),
    };
    if let Err(_err) = result {
        #[cfg(feature = "tracing")]
        warn!(carousel = %snapshot.id, "afterSwipeCallback failed");
    }
}

fn listener_entry(carousel: CarouselId, op: &str, target: DomTarget, event: &str) -> JsValue {
    let obj = Object::new();
    let target = match target {
        DomTarget::Window => "window",
        _ => "track",
    };
    set_js(&obj, "carousel", JsValue::from(carousel.get()));
    set_js(&obj, "op", JsValue::from_str(op));
    set_js(&obj, "target", JsValue::from_str(target));
    set_js(&obj, "event", JsValue::from_str(event));
    obj.into()
}

/// Every swipe carousel on one page.
#[wasm_bindgen]
pub struct SwipeCarousels {
    group: CarouselGroup,
    clock: DeterministicClock,
    attached: Vec<Attached>,
}

#[wasm_bindgen]
impl SwipeCarousels {
    /// `touch`/`mouse` are the input capabilities the page detected.
    #[wasm_bindgen(constructor)]
    pub fn new(touch: bool, mouse: bool) -> Self {
        Self {
            group: CarouselGroup::new(InputCapabilities::detect(touch, mouse)),
            clock: DeterministicClock::new(),
            attached: Vec::new(),
        }
    }

    /// Attach a carousel. `track` is the translated element whose children
    /// are the slides; `viewport` clips it. `options` may be `undefined`.
    /// Returns the carousel id.
    pub fn attach(
        &mut self,
        viewport: HtmlElement,
        track: HtmlElement,
        parent: Option<u32>,
        options: JsValue,
    ) -> Result<u32, JsValue> {
        let AttachOptions {
            config,
            after_swipe,
        } = parse_options(&options)?;
        let surface = WebSurface::new(viewport_width(&viewport), slide_ids(&track));
        let id = self
            .group
            .add(surface, config, parent.map(CarouselId::from_raw))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let (Some(callback), Some(handle)) = (after_swipe, self.group.get(id)) {
            handle
                .borrow_mut()
                .set_after_swipe(move |snapshot| notify_after_swipe(&callback, snapshot));
        }
        self.attached.push(Attached {
            id,
            viewport,
            track,
        });
        Ok(id.get())
    }

    /// Unload a carousel. Returns the listener removals for JS.
    pub fn detach(&mut self, carousel: u32) -> Result<JsValue, JsValue> {
        let id = CarouselId::from_raw(carousel);
        let handle = self
            .group
            .get(id)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("unknown carousel: {id}")))?;
        handle.borrow_mut().unload();
        let listeners = self.flush_one(id);
        self.group
            .remove(id)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.attached.retain(|attached| attached.id != id);
        Ok(listeners.into())
    }

    /// `touchstart`/`mousedown` on a track. Returns whether to call
    /// `preventDefault()`.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        carousel: u32,
        mouse: bool,
        x: f64,
        y: f64,
        t_ms: f64,
    ) -> Result<bool, JsValue> {
        self.clock.set_millis(t_ms);
        let source = if mouse {
            PointerSource::Mouse
        } else {
            PointerSource::Touch
        };
        self.route(HostEvent::PointerDown {
            target: CarouselId::from_raw(carousel),
            source,
            sample: PointerSample::new(x, y),
            now: self.clock.now_mono(),
        })
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(
        &mut self,
        x: f64,
        y: f64,
        touches: u8,
        t_ms: f64,
    ) -> Result<bool, JsValue> {
        self.clock.set_millis(t_ms);
        self.route(HostEvent::PointerMove {
            sample: PointerSample::new(x, y).with_touches(touches),
            now: self.clock.now_mono(),
        })
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, t_ms: f64) -> Result<bool, JsValue> {
        self.clock.set_millis(t_ms);
        self.route(HostEvent::PointerUp {
            now: self.clock.now_mono(),
        })
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self, t_ms: f64) -> Result<bool, JsValue> {
        self.clock.set_millis(t_ms);
        self.route(HostEvent::PointerCancel {
            now: self.clock.now_mono(),
        })
    }

    /// Re-measure every attached carousel (`resize`/`orientationchange`).
    pub fn resize(&mut self) -> Result<(), JsValue> {
        for attached in &self.attached {
            if let Some(handle) = self.group.get(attached.id) {
                let mut carousel = handle.borrow_mut();
                let surface = carousel.surface_mut();
                surface.set_viewport_width(viewport_width(&attached.viewport));
                surface.set_slides(slide_ids(&attached.track));
            }
        }
        self.route(HostEvent::Resize).map(|_| ())
    }

    /// Animation-frame tick. Returns how many moves completed.
    pub fn tick(&mut self, t_ms: f64) -> Result<u32, JsValue> {
        self.clock.set_millis(t_ms);
        let dispatch = self
            .group
            .dispatch(HostEvent::Tick {
                now: self.clock.now_mono(),
            })
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let completed = dispatch
            .retired
            .iter()
            .filter(|(_, outcome)| *outcome == CompletionOutcome::Completed)
            .count();
        Ok(u32::try_from(completed).unwrap_or(u32::MAX))
    }

    #[wasm_bindgen(js_name = gotoIndex)]
    pub fn goto_index(&mut self, carousel: u32, index: u32, animate: bool) -> bool {
        self.with_carousel(carousel, |c| c.goto_index(index as usize, animate).is_some())
    }

    /// Move the track to `x` pixels; the index follows only on an exact
    /// slide boundary.
    #[wasm_bindgen(js_name = gotoPosition)]
    pub fn goto_position(&mut self, carousel: u32, x: f64, animate: bool) -> bool {
        self.with_carousel(carousel, |c| c.goto_position(x, animate).is_some())
    }

    #[wasm_bindgen(js_name = gotoElement)]
    pub fn goto_element(&mut self, carousel: u32, slide_id: &str) -> bool {
        self.with_carousel(carousel, |c| c.goto_element(slide_id).is_some())
    }

    pub fn next(&mut self, carousel: u32) -> bool {
        self.with_carousel(carousel, |c| c.next().is_some())
    }

    pub fn previous(&mut self, carousel: u32) -> bool {
        self.with_carousel(carousel, |c| c.previous().is_some())
    }

    pub fn reset(&mut self, carousel: u32) -> bool {
        self.with_carousel(carousel, |c| c.reset().is_some())
    }

    /// Sync the committed index without moving the track.
    #[wasm_bindgen(js_name = setIndex)]
    pub fn set_index(&mut self, carousel: u32, index: u32) -> bool {
        self.with_carousel(carousel, |c| {
            c.set_index(index as usize);
            true
        })
    }

    #[wasm_bindgen(js_name = getIndex)]
    pub fn index(&self, carousel: u32) -> Option<u32> {
        self.group
            .get(CarouselId::from_raw(carousel))
            .map(|handle| u32::try_from(handle.borrow().index()).unwrap_or(u32::MAX))
    }

    /// Apply queued DOM writes; returns the listener changes for JS.
    pub fn flush(&mut self) -> JsValue {
        let listeners = Array::new();
        let ids: Vec<CarouselId> = self.attached.iter().map(|a| a.id).collect();
        for id in ids {
            for entry in self.flush_one(id).iter() {
                listeners.push(&entry);
            }
        }
        listeners.into()
    }
}

impl SwipeCarousels {
    fn route(&mut self, event: HostEvent) -> Result<bool, JsValue> {
        self.group
            .dispatch(event)
            .map(|dispatch| dispatch.prevent_default)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn with_carousel(
        &mut self,
        carousel: u32,
        f: impl FnOnce(&mut GestureCarousel<WebSurface>) -> bool,
    ) -> bool {
        match self.group.get(CarouselId::from_raw(carousel)) {
            Some(handle) => f(&mut handle.borrow_mut()),
            None => false,
        }
    }

    fn flush_one(&self, id: CarouselId) -> Array {
        let listeners = Array::new();
        let Some(attached) = self.attached.iter().find(|a| a.id == id) else {
            return listeners;
        };
        let Ok(commands) = self.group.drain_commands(id) else {
            return listeners;
        };
        let slides = slide_elements(&attached.track);
        for command in commands {
            match command {
                DomCommand::SetStyle {
                    target,
                    property,
                    value,
                } => match target {
                    DomTarget::Viewport => set_style(&attached.viewport, &property, &value),
                    DomTarget::Track => set_style(&attached.track, &property, &value),
                    DomTarget::Slides => {
                        for slide in &slides {
                            set_style(slide, &property, &value);
                        }
                    }
                    DomTarget::Window => {}
                },
                DomCommand::AddClass { class, .. } => {
                    let _ = attached.track.class_list().add_1(class);
                }
                DomCommand::RemoveClass { class, .. } => {
                    let _ = attached.track.class_list().remove_1(class);
                }
                DomCommand::AddListener { target, event } => {
                    listeners.push(&listener_entry(id, "add", target, event));
                }
                DomCommand::RemoveListener { target, event } => {
                    listeners.push(&listener_entry(id, "remove", target, event));
                }
            }
        }
        listeners
    }
}
