use std::collections::VecDeque;

use glam::Vec2;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::Surface;
use crate::error::UiError;
use crate::style::{ShapeTheming, StateColors};
use crate::transition::StateTransition;
use crate::view::Rect;

/// Seconds of quiet after the last size change before the expensive full
/// surface rebuild is allowed to run. Keeps drag-resizing cheap.
pub const TIME_UNTIL_FULL_REBUILD_AFTER_CHANGING_SIZE: f32 = 0.35;

#[derive(Clone, Debug)]
struct ShapeStateCache {
    surface: Surface,
    fresh: bool,
}

/// Cached per-state rendering unit backing an interactive element.
///
/// One surface exists per visual state. States pending regeneration sit in
/// an ordered queue that drains one state per `update` call, and a size
/// change defers all regeneration behind a debounce countdown.
#[derive(Clone, Debug)]
pub struct DrawableShape {
    theming: ShapeTheming,
    containing_rect: Rect,
    states: FxHashMap<SmolStr, ShapeStateCache>,
    state_order: Vec<SmolStr>,
    active_state: SmolStr,
    transition: Option<StateTransition>,
    blended: Option<Surface>,
    redraw_queue: VecDeque<SmolStr>,
    should_trigger_full_rebuild: bool,
    full_rebuild_countdown: f32,
    full_rebuild_delay: f32,
}

impl DrawableShape {
    /// Builds the cache set for `states` (the `normal` state is always
    /// included). The `normal` surface is generated eagerly so the shape is
    /// drawable immediately; every other state is queued.
    pub fn new(
        containing_rect: Rect,
        theming: ShapeTheming,
        states: &[&str],
    ) -> Result<Self, UiError> {
        if !theming.has_state("normal") {
            return Err(UiError::MissingNormalState);
        }

        let mut state_order = vec![SmolStr::new_inline("normal")];
        for name in states {
            if !state_order.iter().any(|known| known == name) {
                state_order.push(SmolStr::new(*name));
            }
        }

        let mut caches = FxHashMap::default();
        for name in &state_order {
            caches.insert(
                name.clone(),
                ShapeStateCache {
                    surface: Surface::new(0, 0),
                    fresh: false,
                },
            );
        }

        let mut shape = Self {
            theming,
            containing_rect,
            states: caches,
            state_order,
            active_state: SmolStr::new_inline("normal"),
            transition: None,
            blended: None,
            redraw_queue: VecDeque::new(),
            should_trigger_full_rebuild: false,
            full_rebuild_countdown: 0.0,
            full_rebuild_delay: TIME_UNTIL_FULL_REBUILD_AFTER_CHANGING_SIZE,
        };
        shape.redraw_state("normal");
        for name in shape.state_order.clone() {
            if name != "normal" {
                shape.enqueue(name);
            }
        }
        Ok(shape)
    }

    pub fn rect(&self) -> Rect {
        self.containing_rect
    }

    pub fn active_state(&self) -> &str {
        &self.active_state
    }

    pub fn redraw_queue_len(&self) -> usize {
        self.redraw_queue.len()
    }

    pub fn has_fresh_surface(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(|cache| cache.fresh)
    }

    pub fn transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn set_full_rebuild_delay(&mut self, seconds: f32) {
        self.full_rebuild_delay = seconds.max(0.0);
    }

    /// Switches the active visual state. Unknown names fall back to
    /// `normal`. When the theming configures a duration for this state
    /// pair, a blended transition starts instead of an instant switch.
    pub fn set_active_state(&mut self, name: &str) {
        let name = if self.states.contains_key(name) {
            name
        } else {
            "normal"
        };
        if self.active_state == name {
            return;
        }
        let previous = std::mem::replace(&mut self.active_state, SmolStr::new(name));
        match self.theming.transition_duration(&previous, name) {
            Some(duration) => {
                self.transition = Some(StateTransition::new(
                    previous,
                    self.active_state.clone(),
                    duration,
                ));
            }
            None => {
                self.transition = None;
                self.blended = None;
            }
        }
    }

    /// Regenerates the surface for one state right now and drops it from the
    /// redraw queue. Unknown state names are ignored.
    pub fn redraw_state(&mut self, name: &str) {
        if !self.states.contains_key(name) {
            return;
        }
        let colors = self.theming.state_colors_or_normal(name);
        let surface = rasterize(self.containing_rect.size(), &self.theming, colors);
        if let Some(cache) = self.states.get_mut(name) {
            cache.surface = surface;
            cache.fresh = true;
        }
        self.redraw_queue.retain(|queued| queued != name);
    }

    /// Queues every known state for regeneration, active state first.
    pub fn redraw_all_states(&mut self) {
        self.redraw_queue.clear();
        let active = self.active_state.clone();
        self.enqueue(active);
        for name in self.state_order.clone() {
            if name != self.active_state {
                self.enqueue(name);
            }
        }
    }

    /// Flags the deferred rebuild and restarts the debounce countdown.
    /// Called whenever the shape's geometry changes.
    pub fn full_rebuild_on_size_change(&mut self) {
        self.should_trigger_full_rebuild = true;
        self.full_rebuild_countdown = self.full_rebuild_delay;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.containing_rect.set_position(position);
    }

    pub fn set_dimensions(&mut self, size: Vec2) {
        if self.containing_rect.size() == size.max(Vec2::ZERO) {
            return;
        }
        self.containing_rect.set_size(size);
        self.full_rebuild_on_size_change();
    }

    /// Per-frame work: runs the debounced rebuild once quiet, otherwise
    /// drains one queued state, then advances any in-flight state blend.
    pub fn update(&mut self, time_delta: f32) {
        if self.full_rebuild_countdown > 0.0 {
            self.full_rebuild_countdown -= time_delta;
        }
        if self.full_rebuild_countdown <= 0.0 {
            if self.should_trigger_full_rebuild {
                self.rebuild();
            } else if let Some(name) = self.redraw_queue.pop_front() {
                self.redraw_state(&name);
            }
        }

        if let Some(mut transition) = self.transition.take() {
            transition.update(time_delta);
            if transition.finished() {
                self.blended = None;
            } else {
                let mixed = Surface::blended(
                    self.get_surface(transition.start_state()),
                    self.get_surface(transition.target_state()),
                    transition.progress(),
                );
                self.blended = Some(mixed);
                self.transition = Some(transition);
            }
        }
    }

    /// The cached surface for `name`. Stale or unknown states hand out the
    /// shared empty surface; callers must tolerate a zero-size result.
    pub fn get_surface(&self, name: &str) -> &Surface {
        self.states
            .get(name)
            .filter(|cache| cache.fresh)
            .map(|cache| &cache.surface)
            .unwrap_or_else(|| Surface::shared_empty())
    }

    /// What the draw pass blits this frame: the in-flight blend when one
    /// exists, the active state's surface otherwise.
    pub fn current_surface(&self) -> &Surface {
        self.blended
            .as_ref()
            .unwrap_or_else(|| self.get_surface(&self.active_state))
    }

    fn enqueue(&mut self, name: SmolStr) {
        if !self.redraw_queue.contains(&name) {
            self.redraw_queue.push_back(name);
        }
    }

    fn rebuild(&mut self) {
        debug!(size = ?self.containing_rect.size(), "full shape rebuild");
        self.should_trigger_full_rebuild = false;
        self.blended = None;
        for cache in self.states.values_mut() {
            cache.fresh = false;
        }
        self.redraw_queue.clear();
        let active = self.active_state.clone();
        self.redraw_state(&active);
        for name in self.state_order.clone() {
            if name != self.active_state {
                self.enqueue(name);
            }
        }
    }
}

/// Software rasterization of one state: an optional translucent shadow band
/// around a rounded body of border + fill.
fn rasterize(size: Vec2, theming: &ShapeTheming, colors: StateColors) -> Surface {
    let width = size.x.round().max(0.0) as u32;
    let height = size.y.round().max(0.0) as u32;
    if width == 0 || height == 0 {
        return Surface::new(0, 0);
    }

    let mut surface = Surface::new(width, height);
    let w = width as f32;
    let h = height as f32;
    let shadow = theming.shadow_width as f32;
    let border = theming.border_width as f32;
    let body_left = shadow;
    let body_top = shadow;
    let body_right = w - shadow;
    let body_bottom = h - shadow;
    let body_width = (body_right - body_left).max(0.0);
    let body_height = (body_bottom - body_top).max(0.0);
    let radius = theming
        .corner_radius
        .clamp(0.0, body_width.min(body_height) * 0.5);

    for y in 0..height {
        for x in 0..width {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            // signed distance inwards from the body's rounded outline
            let mut dist = (px - body_left)
                .min(body_right - px)
                .min(py - body_top)
                .min(body_bottom - py);
            if radius > 0.0 {
                let cx = px.clamp(body_left + radius, body_right - radius);
                let cy = py.clamp(body_top + radius, body_bottom - radius);
                if cx != px || cy != py {
                    let corner = Vec2::new(px - cx, py - cy).length();
                    dist = dist.min(radius - corner);
                }
            }

            let pixel = if dist >= border {
                colors.fill.to_rgba()
            } else if dist >= 0.0 {
                colors.border.to_rgba()
            } else if shadow > 0.0 && dist > -shadow {
                let strength = 1.0 + dist / shadow;
                image::Rgba([0, 0, 0, (strength * 96.0) as u8])
            } else {
                continue;
            };
            surface.put_pixel(x, y, pixel);
        }
    }
    surface
}
