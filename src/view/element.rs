use glam::Vec2;
use smol_str::SmolStr;
use tracing::debug;

use super::{
    Anchors, ContainerState, ElementId, ElementKind, ElementNode, ElementTree, HorizontalAnchor,
    Rect, VerticalAnchor,
};
use crate::shape::DrawableShape;

/// Per-element state shared by every kind of node: geometry, layering,
/// theming identifiers, and interaction flags.
#[derive(Clone, Debug)]
pub struct ElementCore {
    /// Position and size relative to the owning container's origin.
    pub relative_rect: Rect,
    /// Screen-space rect; kept equal to the container's absolute origin
    /// plus `relative_rect` (as reinterpreted by the anchors) after every
    /// propagation pass.
    pub absolute_rect: Rect,
    /// Current draw/input layer. Higher layers draw later and win input.
    pub layer: i32,
    /// Fixed offset above the owning container's base layer, assigned at
    /// construction and reused whenever the container's base layer shifts.
    pub starting_height: i32,
    /// Extra layers this node's subtree consumes above `layer`.
    pub layer_thickness: i32,
    pub visible: bool,
    pub enabled: bool,
    pub hovered: bool,
    pub anchors: Anchors,
    /// Theme-lookup identifiers, most specific first.
    pub class_chain: Vec<SmolStr>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) right_margin: Option<f32>,
    pub(crate) bottom_margin: Option<f32>,
    pub(crate) group_seq: u64,
}

impl ElementCore {
    pub(crate) fn new(builder: &ElementBuilder, class_chain: Vec<SmolStr>) -> Self {
        Self {
            relative_rect: builder.relative_rect,
            absolute_rect: builder.relative_rect,
            layer: 0,
            starting_height: builder.starting_height.max(0),
            layer_thickness: 0,
            visible: builder.visible,
            enabled: builder.enabled,
            hovered: false,
            anchors: builder.anchors,
            class_chain,
            parent: None,
            right_margin: None,
            bottom_margin: None,
            group_seq: 0,
        }
    }

    pub fn top_layer(&self) -> i32 {
        self.layer + self.layer_thickness
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

#[derive(Clone, Debug)]
pub struct ElementBuilder {
    pub(crate) relative_rect: Rect,
    pub(crate) starting_height: i32,
    pub(crate) anchors: Anchors,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) class_id: SmolStr,
}

impl ElementBuilder {
    pub fn new(relative_rect: Rect) -> Self {
        Self {
            relative_rect,
            starting_height: 1,
            anchors: Anchors::default(),
            visible: true,
            enabled: true,
            class_id: SmolStr::new_inline("element"),
        }
    }

    pub fn starting_height(mut self, starting_height: i32) -> Self {
        self.starting_height = starting_height.max(0);
        self
    }

    pub fn anchors(mut self, anchors: Anchors) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn class_id(mut self, class_id: impl Into<SmolStr>) -> Self {
        self.class_id = class_id.into();
        self
    }

    pub fn rect(&self) -> Rect {
        self.relative_rect
    }

    pub fn class(&self) -> &SmolStr {
        &self.class_id
    }
}

struct AnchoredRect {
    abs: Rect,
    right_margin: Option<f32>,
    bottom_margin: Option<f32>,
}

impl ElementTree {
    pub fn create_element(
        &mut self,
        builder: ElementBuilder,
        container: Option<ElementId>,
    ) -> ElementId {
        self.spawn(builder, ElementKind::Plain, None, container)
    }

    pub fn create_container(
        &mut self,
        builder: ElementBuilder,
        container: Option<ElementId>,
    ) -> ElementId {
        self.spawn(
            builder,
            ElementKind::Container(ContainerState::default()),
            None,
            container,
        )
    }

    pub(crate) fn spawn(
        &mut self,
        builder: ElementBuilder,
        kind: ElementKind,
        shape: Option<DrawableShape>,
        container: Option<ElementId>,
    ) -> ElementId {
        let mut class_chain = vec![builder.class_id.clone()];
        if let Some(container_id) = container
            && let Some(container_node) = self.get(container_id)
        {
            class_chain.extend(container_node.core.class_chain.iter().cloned());
        }
        let core = ElementCore::new(&builder, class_chain);
        let id = self.insert(ElementNode { core, kind, shape });
        match container {
            Some(container_id) => self.add_element(container_id, id),
            None => self.refresh_absolute_rect(id, true),
        }
        id
    }

    /// Moves the element within its container. Anchored edges opposite the
    /// move are re-margined so later container growth keeps the new layout.
    pub fn set_relative_position(&mut self, id: ElementId, position: Vec2) {
        let Some(node) = self.get_mut(id) else { return };
        node.core.relative_rect.set_position(position);
        self.refresh_absolute_rect(id, true);
        for child in self.children_of(id) {
            self.update_containing_rect_position(child);
        }
    }

    /// Moves the element to an absolute screen position by converting it to
    /// container-relative coordinates first.
    pub fn set_position(&mut self, id: ElementId, position: Vec2) {
        let Some(node) = self.get(id) else { return };
        let parent_abs = node
            .core
            .parent
            .and_then(|parent| self.get(parent))
            .map(|parent| parent.core.absolute_rect);
        let relative = match parent_abs {
            None => position,
            Some(parent_abs) => {
                let anchors = node.core.anchors;
                let left_ref = self.horizontal_ref(parent_abs, anchors.left_target, anchors.left);
                let top_ref = self.vertical_ref(parent_abs, anchors.top_target, anchors.top);
                Vec2::new(position.x - left_ref, position.y - top_ref)
            }
        };
        self.set_relative_position(id, relative);
    }

    /// Resizes the element. With `clamp_to_container` the size is limited
    /// to the space remaining inside the owning container from the
    /// element's current position.
    ///
    /// A pure resize deliberately leaves the container's layer thickness
    /// untouched; only layer changes retrigger that recalculation.
    pub fn set_dimensions(&mut self, id: ElementId, size: Vec2, clamp_to_container: bool) {
        let Some(node) = self.get(id) else { return };
        let mut size = size.max(Vec2::ZERO);
        if clamp_to_container
            && let Some(parent) = node.core.parent.and_then(|parent| self.get(parent))
        {
            let parent_abs = parent.core.absolute_rect;
            let abs = node.core.absolute_rect;
            size.x = size.x.min((parent_abs.right() - abs.left()).max(0.0));
            size.y = size.y.min((parent_abs.bottom() - abs.top()).max(0.0));
        }
        if self
            .get(id)
            .is_some_and(|node| node.core.relative_rect.size() == size)
        {
            return;
        }
        if let Some(node) = self.get_mut(id) {
            node.core.relative_rect.set_size(size);
        }
        self.refresh_absolute_rect(id, true);
        for child in self.children_of(id) {
            self.update_containing_rect_position(child);
        }
    }

    /// Re-derives the absolute rect from the container's current origin and
    /// recurses into any owned children. Containers must call this on each
    /// child immediately after their own position changes.
    pub fn update_containing_rect_position(&mut self, id: ElementId) {
        self.refresh_absolute_rect(id, false);
        for child in self.children_of(id) {
            self.update_containing_rect_position(child);
        }
    }

    /// Moves the element to a new layer and resorts the draw/input group.
    /// Containers cascade the shift to every descendant, preserving each
    /// child's starting-height offset; the owning container then refreshes
    /// its layer thickness.
    pub fn change_layer(&mut self, id: ElementId, new_layer: i32) {
        let Some(node) = self.get(id) else { return };
        if node.core.layer == new_layer {
            return;
        }
        self.relayer(id, new_layer);
        if let Some(parent) = self.get(id).and_then(|node| node.core.parent) {
            self.recalculate_layer_thickness(parent);
        }
    }

    pub(crate) fn relayer(&mut self, id: ElementId, new_layer: i32) {
        self.relayer_no_sort(id, new_layer);
        self.resort();
    }

    fn relayer_no_sort(&mut self, id: ElementId, new_layer: i32) {
        let Some(node) = self.get_mut(id) else { return };
        node.core.layer = new_layer;
        for child in self.children_of(id) {
            let offset = self
                .get(child)
                .map(|node| node.core.starting_height)
                .unwrap_or(0);
            self.relayer_no_sort(child, new_layer + offset);
        }
    }

    /// Destroys the element and its whole subtree: children first, then the
    /// node itself leaves its container, the draw/input group, and the
    /// arena. Killing an already-dead element is a no-op.
    pub fn kill(&mut self, id: ElementId) {
        if !self.contains(id) {
            return;
        }
        for child in self.children_of(id) {
            self.kill(child);
        }
        let parent = self.get(id).and_then(|node| node.core.parent);
        if let Some(parent_id) = parent
            && let Some(parent_node) = self.get_mut(parent_id)
            && let ElementKind::Container(state) = &mut parent_node.kind
        {
            state.children.retain(|child| *child != id);
        }
        self.remove_node(id);
        if let Some(parent_id) = parent {
            self.recalculate_layer_thickness(parent_id);
        }
        debug!(?id, "element killed");
    }

    /// One step of the per-frame hover pass. Returns whether this element
    /// holds the hover now; `hovered_higher_element` carries the result of
    /// the elements already visited above it, so at most one element in a
    /// descending walk ever reports true.
    pub fn check_hover(
        &mut self,
        id: ElementId,
        _time_delta: f32,
        mouse_position: Vec2,
        hovered_higher_element: bool,
    ) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };
        let can_hover = node.core.visible && node.core.enabled;
        let inside = node.core.absolute_rect.contains(mouse_position);
        let mut hovered = false;
        if can_hover && inside && !hovered_higher_element {
            node.core.hovered = true;
            hovered = true;
        } else if node.core.hovered {
            node.core.hovered = false;
        }
        self.refresh_shape_state(id);
        hovered
    }

    pub fn show(&mut self, id: ElementId) {
        self.set_visible(id, true);
    }

    pub fn hide(&mut self, id: ElementId) {
        self.set_visible(id, false);
    }

    fn set_visible(&mut self, id: ElementId, visible: bool) {
        let Some(node) = self.get_mut(id) else { return };
        node.core.visible = visible;
        if !visible {
            node.core.hovered = false;
        }
        self.refresh_shape_state(id);
        for child in self.children_of(id) {
            self.set_visible(child, visible);
        }
    }

    pub fn enable(&mut self, id: ElementId) {
        self.set_enabled(id, true);
    }

    pub fn disable(&mut self, id: ElementId) {
        self.set_enabled(id, false);
    }

    fn set_enabled(&mut self, id: ElementId, enabled: bool) {
        let Some(node) = self.get_mut(id) else { return };
        node.core.enabled = enabled;
        if !enabled {
            node.core.hovered = false;
        }
        self.refresh_shape_state(id);
        for child in self.children_of(id) {
            self.set_enabled(child, enabled);
        }
    }

    pub(crate) fn refresh_shape_state(&mut self, id: ElementId) {
        let Some(node) = self.get_mut(id) else { return };
        let state = if !node.core.enabled {
            "disabled"
        } else if node.core.hovered {
            "hovered"
        } else {
            "normal"
        };
        if let Some(shape) = &mut node.shape {
            shape.set_active_state(state);
        }
    }

    /// Recomputes the element's absolute rect from its anchors, storing the
    /// preserved margins for right/bottom-bound edges. The shape follows
    /// the rect; a resulting size change engages its rebuild debounce.
    pub(crate) fn refresh_absolute_rect(&mut self, id: ElementId, recalculate_margins: bool) {
        let Some(anchored) = self.compute_anchored_rect(id, recalculate_margins) else {
            return;
        };
        let Some(node) = self.get_mut(id) else { return };
        node.core.absolute_rect = anchored.abs;
        node.core.right_margin = anchored.right_margin;
        node.core.bottom_margin = anchored.bottom_margin;
        node.core.relative_rect.set_size(anchored.abs.size());
        if let Some(shape) = &mut node.shape {
            shape.set_position(anchored.abs.position());
            shape.set_dimensions(anchored.abs.size());
        }
    }

    fn compute_anchored_rect(
        &self,
        id: ElementId,
        recalculate_margins: bool,
    ) -> Option<AnchoredRect> {
        let node = self.get(id)?;
        let core = &node.core;
        let rel = core.relative_rect;
        let Some(parent_abs) = core
            .parent
            .and_then(|parent| self.get(parent))
            .map(|parent| parent.core.absolute_rect)
        else {
            // parentless nodes live directly in screen space
            return Some(AnchoredRect {
                abs: rel,
                right_margin: None,
                bottom_margin: None,
            });
        };

        let anchors = core.anchors;
        let left_ref = self.horizontal_ref(parent_abs, anchors.left_target, anchors.left);
        let right_ref = self.horizontal_ref(parent_abs, anchors.right_target, anchors.right);
        let top_ref = self.vertical_ref(parent_abs, anchors.top_target, anchors.top);
        let bottom_ref = self.vertical_ref(parent_abs, anchors.bottom_target, anchors.bottom);

        let new_left = left_ref + rel.left();
        let new_top = top_ref + rel.top();

        let (new_right, right_margin) = match anchors.right {
            HorizontalAnchor::Left => (new_left + rel.width(), None),
            HorizontalAnchor::Right => {
                let margin = match (core.right_margin, recalculate_margins) {
                    (Some(margin), false) => margin,
                    _ => right_ref - (new_left + rel.width()),
                };
                (right_ref - margin, Some(margin))
            }
        };
        let (new_bottom, bottom_margin) = match anchors.bottom {
            VerticalAnchor::Top => (new_top + rel.height(), None),
            VerticalAnchor::Bottom => {
                let margin = match (core.bottom_margin, recalculate_margins) {
                    (Some(margin), false) => margin,
                    _ => bottom_ref - (new_top + rel.height()),
                };
                (bottom_ref - margin, Some(margin))
            }
        };

        Some(AnchoredRect {
            abs: Rect::from_components(
                new_left,
                new_top,
                (new_right - new_left).max(0.0),
                (new_bottom - new_top).max(0.0),
            ),
            right_margin,
            bottom_margin,
        })
    }

    pub(crate) fn horizontal_ref(
        &self,
        parent_abs: Rect,
        target: Option<ElementId>,
        edge: HorizontalAnchor,
    ) -> f32 {
        if let Some(target_id) = target
            && let Some(target_node) = self.get(target_id)
        {
            // sibling targets bind to their adjacent side
            return match edge {
                HorizontalAnchor::Left => target_node.core.absolute_rect.right(),
                HorizontalAnchor::Right => target_node.core.absolute_rect.left(),
            };
        }
        match edge {
            HorizontalAnchor::Left => parent_abs.left(),
            HorizontalAnchor::Right => parent_abs.right(),
        }
    }

    pub(crate) fn vertical_ref(
        &self,
        parent_abs: Rect,
        target: Option<ElementId>,
        edge: VerticalAnchor,
    ) -> f32 {
        if let Some(target_id) = target
            && let Some(target_node) = self.get(target_id)
        {
            return match edge {
                VerticalAnchor::Top => target_node.core.absolute_rect.bottom(),
                VerticalAnchor::Bottom => target_node.core.absolute_rect.top(),
            };
        }
        match edge {
            VerticalAnchor::Top => parent_abs.top(),
            VerticalAnchor::Bottom => parent_abs.bottom(),
        }
    }
}
