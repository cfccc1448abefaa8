use glam::Vec2;
use smol_str::SmolStr;
use tracing::debug;

use super::{MouseButton, UiEvent};
use crate::error::UiError;
use crate::shape::{DrawableShape, Surface};
use crate::style::{BuiltinTheme, ThemeSource};
use crate::view::{ElementBuilder, ElementId, ElementKind, ElementTree, Rect, WindowSpec, WindowStack};

pub const DEFAULT_DOUBLE_CLICK_TIME: f32 = 0.5;

struct LastClick {
    at: f64,
    button: MouseButton,
}

/// Owns the whole UI session: the element tree, the window stack, the theme
/// handle, and the pointer state, and drives the per-frame
/// update/draw/event-dispatch loop across them.
///
/// A root window spanning the given resolution is created up front at layer
/// 0; its content container is where free-standing elements go.
pub struct UiManager {
    tree: ElementTree,
    stack: WindowStack,
    theme: Box<dyn ThemeSource>,
    root_window: ElementId,
    root_container: ElementId,
    resolution: Vec2,
    mouse_position: Vec2,
    clock: f64,
    double_click_time: f32,
    last_click: Option<LastClick>,
    last_click_was_double: bool,
    pressed: Option<ElementId>,
    wheel_target: Option<ElementId>,
}

impl UiManager {
    pub fn new(resolution: Vec2) -> Self {
        Self::with_theme(resolution, Box::new(BuiltinTheme::default()))
    }

    pub fn with_theme(resolution: Vec2, theme: Box<dyn ThemeSource>) -> Self {
        let resolution = resolution.max(Vec2::ZERO);
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let spec = WindowSpec::new(Rect::new(Vec2::ZERO, resolution)).class_id("root_window");
        let root_window = tree
            .create_window(&spec, None, 0.0)
            .expect("a zero-inset root window has a non-negative content area");
        stack.add_new_window(&mut tree, root_window);
        let root_container = tree
            .window_container(root_window)
            .expect("a window always owns its content container");
        debug!(?resolution, "ui session created");
        Self {
            tree,
            stack,
            theme,
            root_window,
            root_container,
            resolution,
            mouse_position: Vec2::ZERO,
            clock: 0.0,
            double_click_time: DEFAULT_DOUBLE_CLICK_TIME,
            last_click: None,
            last_click_was_double: false,
            pressed: None,
            wheel_target: None,
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn window_stack(&self) -> &WindowStack {
        &self.stack
    }

    pub fn root_container(&self) -> ElementId {
        self.root_container
    }

    pub fn root_window(&self) -> ElementId {
        self.root_window
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Feeds the pointer position directly, already scaled to UI
    /// coordinates if the backend renders at a different native resolution.
    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub fn set_double_click_time(&mut self, seconds: f32) {
        self.double_click_time = seconds.max(0.0);
    }

    pub fn last_click_was_double(&self) -> bool {
        self.last_click_was_double
    }

    pub fn pressed_element(&self) -> Option<ElementId> {
        self.pressed
    }

    pub fn wheel_target(&self) -> Option<ElementId> {
        self.wheel_target
    }

    /// Creates a themed interactive element inside `container`, with cached
    /// surfaces for `states` (plus `normal`).
    pub fn create_element(
        &mut self,
        builder: ElementBuilder,
        container: ElementId,
        states: &[&str],
    ) -> Result<ElementId, UiError> {
        let mut class_chain = vec![builder.class().clone()];
        if let Some(node) = self.tree.get(container) {
            class_chain.extend(node.core().class_chain.iter().cloned());
        }
        let theming = self.theme.shape_theming(&class_chain);
        let shape = DrawableShape::new(builder.rect(), theming, states)?;
        Ok(self
            .tree
            .spawn(builder, ElementKind::Plain, Some(shape), Some(container)))
    }

    /// Creates an undecorated layout container inside `container`.
    pub fn create_container(&mut self, builder: ElementBuilder, container: ElementId) -> ElementId {
        self.tree.create_container(builder, Some(container))
    }

    /// Creates a window, frames it with its themed shape, and registers it
    /// in the window stack.
    pub fn create_window(&mut self, spec: WindowSpec) -> Result<ElementId, UiError> {
        let class_chain = vec![spec.class_id.clone(), SmolStr::new_inline("window")];
        let theming = self.theme.shape_theming(&class_chain);
        let content_inset = theming.frame_inset();
        let shape = DrawableShape::new(spec.rect, theming, &[])?;
        let window = self.tree.create_window(&spec, Some(shape), content_inset)?;
        self.stack.add_new_window(&mut self.tree, window);
        Ok(window)
    }

    /// Destroys an element (windows leave the stack first and re-pack the
    /// layers above them). The root window and its container are never
    /// killable through this entry point.
    pub fn kill_element(&mut self, id: ElementId) {
        if id == self.root_window || id == self.root_container {
            return;
        }
        if self.tree.get(id).is_some_and(|node| node.is_window()) {
            self.stack.remove_window(&mut self.tree, id);
        }
        self.tree.kill(id);
    }

    /// Per-frame work: deferred window restacks, the window resize
    /// machines, the highest-to-lowest hover pass, then shape updates.
    pub fn update(&mut self, time_delta: f32) {
        self.clock += time_delta as f64;
        if self.tree.take_layers_dirty() {
            self.stack.restack(&mut self.tree);
        }

        let windows = self.stack.bottom_to_top();
        let bounds = self
            .tree
            .absolute_rect(self.root_window)
            .unwrap_or(Rect::new(Vec2::ZERO, self.resolution));
        for (index, window) in windows.iter().copied().enumerate() {
            if self.tree.is_window_resizing(window) {
                self.tree
                    .apply_window_resize(window, self.mouse_position, bounds);
            } else {
                let obscured = windows[index + 1..].iter().any(|above| {
                    self.tree.is_visible(*above)
                        && self
                            .tree
                            .absolute_rect(*above)
                            .is_some_and(|rect| rect.contains(self.mouse_position))
                });
                self.tree
                    .update_window_edge_hover(window, self.mouse_position, obscured);
            }
        }

        // hover: highest layer first, one winner per frame
        let blocking = self.top_blocking_window();
        let mut hovered_higher = false;
        for id in self.tree.descending_ids() {
            let blocked = blocking.is_some_and(|window| !self.is_in_window_subtree(id, window));
            if self.tree.check_hover(
                id,
                time_delta,
                self.mouse_position,
                hovered_higher || blocked,
            ) {
                hovered_higher = true;
            }
        }

        for id in self.tree.ascending_ids() {
            self.tree.update_shape(id, time_delta);
        }
    }

    /// Routes one input event. Returns whether the event was consumed by
    /// the UI. Window focus re-sorting runs in a pre-pass before normal
    /// dispatch, so a single click can both bring a window forward and
    /// reach the widget beneath the pointer.
    pub fn process_event(&mut self, event: &UiEvent) -> bool {
        self.last_click_was_double = false;
        match *event {
            UiEvent::PointerMoved { position } => {
                self.mouse_position = position;
                false
            }
            UiEvent::PointerDown { position, button } => self.pointer_down(position, button),
            UiEvent::PointerUp { position, .. } => self.pointer_up(position),
            UiEvent::Wheel { position, .. } => self.wheel(position),
            UiEvent::KeyDown { .. } | UiEvent::KeyUp { .. } => false,
        }
    }

    /// Blits every visible element's current surface, lowest layer first.
    pub fn draw(&self, target: &mut Surface) {
        for id in self.tree.ascending_ids() {
            let Some(node) = self.tree.get(id) else { continue };
            if !node.core().visible {
                continue;
            }
            if let Some(shape) = node.shape() {
                let surface = shape.current_surface();
                if !surface.is_empty() {
                    target.blit(surface, node.core().absolute_rect.position());
                }
            }
        }
    }

    fn pointer_down(&mut self, position: Vec2, button: MouseButton) -> bool {
        self.mouse_position = position;
        if button == MouseButton::Left {
            if let Some(last) = &self.last_click {
                self.last_click_was_double = last.button == button
                    && (self.clock - last.at) as f32 <= self.double_click_time;
            }
            self.last_click = Some(LastClick {
                at: self.clock,
                button,
            });
        }

        // focus pre-pass: the frontmost window claiming the click comes
        // forward before anything underneath sees the event
        for window in self.stack.front_to_back() {
            if window == self.root_window {
                continue;
            }
            if self.tree.check_clicked_inside_or_blocking(window, position) {
                if !self.stack.is_window_at_top(window) {
                    self.stack.move_window_to_front(&mut self.tree, window);
                }
                break;
            }
        }

        // a blocking window absorbs clicks landing outside it entirely
        if let Some(blocking) = self.top_blocking_window()
            && !self
                .tree
                .absolute_rect(blocking)
                .is_some_and(|rect| rect.contains(position))
        {
            return true;
        }

        // an edge grab on a resizable window wins over regular dispatch
        for window in self.stack.front_to_back() {
            if self.tree.start_window_resize(window, position) {
                return true;
            }
        }

        // descending dispatch, first consumer wins
        let blocking = self.top_blocking_window();
        for id in self.tree.descending_ids() {
            if blocking.is_some_and(|window| !self.is_in_window_subtree(id, window)) {
                continue;
            }
            let Some(node) = self.tree.get(id) else { continue };
            let consumes = match node.kind() {
                ElementKind::Plain => true,
                ElementKind::Window(_) => id != self.root_window,
                ElementKind::Container(_) => false,
            };
            if consumes
                && node.core().visible
                && node.core().enabled
                && node.core().absolute_rect.contains(position)
            {
                self.pressed = Some(id);
                return true;
            }
        }
        false
    }

    fn pointer_up(&mut self, position: Vec2) -> bool {
        self.mouse_position = position;
        self.pressed = None;
        let mut consumed = false;
        for window in self.stack.bottom_to_top() {
            if self.tree.finish_window_resize(window) {
                consumed = true;
            }
        }
        consumed
    }

    fn wheel(&mut self, position: Vec2) -> bool {
        for id in self.tree.descending_ids() {
            let Some(node) = self.tree.get(id) else { continue };
            if node.is_container()
                && self.tree.is_hovered(id)
                && node.core().absolute_rect.contains(position)
            {
                self.wheel_target = Some(id);
                return true;
            }
        }
        self.wheel_target = None;
        false
    }

    fn top_blocking_window(&self) -> Option<ElementId> {
        self.stack
            .front_to_back()
            .into_iter()
            .find(|window| self.tree.is_blocking_window(*window))
    }

    fn is_in_window_subtree(&self, id: ElementId, window: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == window {
                return true;
            }
            current = self.tree.get(node_id).and_then(|node| node.core().parent());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> UiManager {
        UiManager::new(Vec2::new(800.0, 600.0))
    }

    fn window_at(manager: &mut UiManager, x: f32, y: f32) -> ElementId {
        manager
            .create_window(WindowSpec::new(Rect::from_components(x, y, 200.0, 150.0)))
            .expect("window rect is valid")
    }

    fn hovered_count(manager: &UiManager) -> usize {
        manager
            .tree()
            .ascending_ids()
            .into_iter()
            .filter(|id| manager.tree().is_hovered(*id))
            .count()
    }

    #[test]
    fn the_root_window_opens_the_stack_at_layer_zero() {
        let manager = manager();
        assert_eq!(
            manager.window_stack().normal_windows().first(),
            Some(&manager.root_window())
        );
        assert_eq!(manager.tree().layer(manager.root_window()), Some(0));
        assert_eq!(manager.tree().layer(manager.root_container()), Some(1));
    }

    #[test]
    fn clicking_a_rear_window_brings_it_forward_and_still_dispatches() {
        let mut manager = manager();
        let rear = window_at(&mut manager, 100.0, 100.0);
        let front = window_at(&mut manager, 150.0, 150.0);
        let widget = manager
            .create_element(
                ElementBuilder::new(Rect::from_components(10.0, 10.0, 50.0, 50.0)),
                rear,
                &["hovered"],
            )
            .expect("default theming is valid");

        // inside `rear` and its widget, outside `front`
        let click = Vec2::new(120.0, 120.0);
        let consumed = manager.process_event(&UiEvent::PointerDown {
            position: click,
            button: MouseButton::Left,
        });

        assert!(consumed);
        assert!(manager.window_stack().is_window_at_top(rear));
        assert!(!manager.window_stack().is_window_at_top(front));
        assert_eq!(manager.pressed_element(), Some(widget));
        let rear_layer = manager.tree().layer(rear).expect("rear is alive");
        let front_top = manager.tree().top_layer(front).expect("front is alive");
        assert!(rear_layer > front_top);
    }

    #[test]
    fn blocking_window_absorbs_clicks_landing_outside_it() {
        let mut manager = manager();
        let widget = manager
            .create_element(
                ElementBuilder::new(Rect::from_components(5.0, 5.0, 20.0, 20.0)),
                manager.root_container(),
                &[],
            )
            .expect("default theming is valid");
        manager
            .create_window(
                WindowSpec::new(Rect::from_components(300.0, 300.0, 120.0, 120.0)).blocking(),
            )
            .expect("window rect is valid");

        let consumed = manager.process_event(&UiEvent::PointerDown {
            position: Vec2::new(10.0, 10.0),
            button: MouseButton::Left,
        });

        assert!(consumed);
        assert_eq!(manager.pressed_element(), None);
        let _ = widget;
    }

    #[test]
    fn clicks_inside_a_blocking_window_still_reach_its_widgets() {
        let mut manager = manager();
        let modal = manager
            .create_window(
                WindowSpec::new(Rect::from_components(300.0, 300.0, 120.0, 120.0)).blocking(),
            )
            .expect("window rect is valid");
        let widget = manager
            .create_element(
                ElementBuilder::new(Rect::from_components(10.0, 10.0, 40.0, 40.0)),
                modal,
                &[],
            )
            .expect("default theming is valid");

        let consumed = manager.process_event(&UiEvent::PointerDown {
            position: Vec2::new(320.0, 320.0),
            button: MouseButton::Left,
        });

        assert!(consumed);
        assert_eq!(manager.pressed_element(), Some(widget));
    }

    #[test]
    fn hover_has_exactly_one_winner_per_frame() {
        let mut manager = manager();
        let root = manager.root_container();
        let low = manager
            .create_element(
                ElementBuilder::new(Rect::from_components(0.0, 0.0, 60.0, 60.0))
                    .starting_height(1),
                root,
                &["hovered"],
            )
            .expect("default theming is valid");
        let high = manager
            .create_element(
                ElementBuilder::new(Rect::from_components(0.0, 0.0, 60.0, 60.0))
                    .starting_height(2),
                root,
                &["hovered"],
            )
            .expect("default theming is valid");

        manager.set_mouse_position(Vec2::new(30.0, 30.0));
        manager.update(0.016);

        assert!(manager.tree().is_hovered(high));
        assert!(!manager.tree().is_hovered(low));
        assert_eq!(hovered_count(&manager), 1);
    }

    #[test]
    fn a_blocking_window_suppresses_hover_everywhere_else() {
        let mut manager = manager();
        let root = manager.root_container();
        manager
            .create_element(
                ElementBuilder::new(Rect::from_components(0.0, 0.0, 60.0, 60.0)),
                root,
                &["hovered"],
            )
            .expect("default theming is valid");
        manager
            .create_window(
                WindowSpec::new(Rect::from_components(300.0, 300.0, 120.0, 120.0)).blocking(),
            )
            .expect("window rect is valid");

        manager.set_mouse_position(Vec2::new(30.0, 30.0));
        manager.update(0.016);
        assert_eq!(hovered_count(&manager), 0);

        // inside the modal, its own subtree hovers normally
        manager.set_mouse_position(Vec2::new(350.0, 350.0));
        manager.update(0.016);
        assert_eq!(hovered_count(&manager), 1);
    }

    #[test]
    fn rapid_second_click_is_flagged_as_a_double_click() {
        let mut manager = manager();
        let click = UiEvent::PointerDown {
            position: Vec2::new(10.0, 10.0),
            button: MouseButton::Left,
        };

        manager.process_event(&click);
        assert!(!manager.last_click_was_double());

        manager.update(0.1);
        manager.process_event(&click);
        assert!(manager.last_click_was_double());

        manager.update(2.0);
        manager.process_event(&click);
        assert!(!manager.last_click_was_double());
    }

    #[test]
    fn draw_blits_elements_at_their_absolute_position() {
        let mut manager = manager();
        manager
            .create_element(
                ElementBuilder::new(Rect::from_components(10.0, 10.0, 50.0, 50.0)),
                manager.root_container(),
                &[],
            )
            .expect("default theming is valid");
        manager.update(0.016);

        let mut target = Surface::new(800, 600);
        manager.draw(&mut target);

        // interior pixel carries the default normal fill
        assert_eq!(target.pixel(35, 35), image::Rgba([77, 77, 77, 255]));
        // outside every element nothing was written
        assert_eq!(target.pixel(5, 5), image::Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn hidden_elements_are_skipped_by_hover_and_draw() {
        let mut manager = manager();
        let widget = manager
            .create_element(
                ElementBuilder::new(Rect::from_components(10.0, 10.0, 50.0, 50.0)),
                manager.root_container(),
                &["hovered"],
            )
            .expect("default theming is valid");
        manager.set_mouse_position(Vec2::new(30.0, 30.0));
        manager.update(0.016);
        assert!(manager.tree().is_hovered(widget));

        manager.tree_mut().hide(widget);
        manager.update(0.016);
        assert!(!manager.tree().is_hovered(widget));

        let mut target = Surface::new(800, 600);
        manager.draw(&mut target);
        assert_eq!(target.pixel(35, 35), image::Rgba([0, 0, 0, 0]));

        manager.tree_mut().show(widget);
        manager.update(0.016);
        assert!(manager.tree().is_hovered(widget));
    }

    #[test]
    fn killing_a_window_removes_it_from_the_stack_and_repacks() {
        let mut manager = manager();
        let first = window_at(&mut manager, 100.0, 100.0);
        let second = window_at(&mut manager, 150.0, 150.0);

        manager.kill_element(first);

        assert!(!manager.tree().contains(first));
        assert!(!manager.window_stack().contains(first));
        let root_top = manager
            .tree()
            .top_layer(manager.root_window())
            .expect("root window is alive");
        assert_eq!(manager.tree().layer(second), Some(root_top + 1));
    }

    #[test]
    fn the_root_window_is_not_killable() {
        let mut manager = manager();
        manager.kill_element(manager.root_window());
        manager.kill_element(manager.root_container());
        assert!(manager.tree().contains(manager.root_window()));
        assert!(manager.tree().contains(manager.root_container()));
    }

    #[test]
    fn wheel_events_route_to_the_hovered_container() {
        let mut manager = manager();
        let scroll_area = manager.create_container(
            ElementBuilder::new(Rect::from_components(10.0, 10.0, 100.0, 100.0)),
            manager.root_container(),
        );

        manager.set_mouse_position(Vec2::new(50.0, 50.0));
        manager.update(0.016);
        let consumed = manager.process_event(&UiEvent::Wheel {
            position: Vec2::new(50.0, 50.0),
            delta: -1.0,
        });

        assert!(consumed);
        assert_eq!(manager.wheel_target(), Some(scroll_area));
    }

    #[test]
    fn a_windows_thickness_growth_restacks_on_the_next_update() {
        let mut manager = manager();
        let first = window_at(&mut manager, 100.0, 100.0);
        let second = window_at(&mut manager, 150.0, 150.0);

        manager
            .create_element(
                ElementBuilder::new(Rect::from_components(0.0, 0.0, 20.0, 20.0))
                    .starting_height(5),
                first,
                &[],
            )
            .expect("default theming is valid");
        manager.update(0.016);

        let first_top = manager.tree().top_layer(first).expect("first is alive");
        assert_eq!(manager.tree().layer(second), Some(first_top + 1));
    }

    #[test]
    fn releasing_the_pointer_ends_a_window_resize() {
        let mut manager = manager();
        let window = manager
            .create_window(
                WindowSpec::new(Rect::from_components(100.0, 100.0, 200.0, 150.0))
                    .resizable(Vec2::new(100.0, 100.0)),
            )
            .expect("window rect is valid");

        let grab = Vec2::new(300.0, 150.0);
        manager.set_mouse_position(grab);
        manager.update(0.016);
        assert!(manager.process_event(&UiEvent::PointerDown {
            position: grab,
            button: MouseButton::Left,
        }));
        assert!(manager.tree().is_window_resizing(window));

        manager.set_mouse_position(grab + Vec2::new(40.0, 0.0));
        manager.update(0.016);
        let rect = manager
            .tree()
            .absolute_rect(window)
            .expect("window is alive");
        assert_eq!(rect.width(), 240.0);

        assert!(manager.process_event(&UiEvent::PointerUp {
            position: grab + Vec2::new(40.0, 0.0),
            button: MouseButton::Left,
        }));
        assert!(!manager.tree().is_window_resizing(window));
    }
}
