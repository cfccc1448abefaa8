use glam::Vec2;
use slotmap::{SlotMap, new_key_type};

use super::{ContainerState, ElementCore, Rect, WindowState};
use crate::shape::DrawableShape;

new_key_type! {
    /// Stable, non-owning handle to an element. A stale id resolves to
    /// nothing; every operation on one is a safe no-op.
    pub struct ElementId;
}

#[derive(Clone, Debug)]
pub enum ElementKind {
    Plain,
    Container(ContainerState),
    Window(WindowState),
}

#[derive(Clone, Debug)]
pub struct ElementNode {
    pub(crate) core: ElementCore,
    pub(crate) kind: ElementKind,
    pub(crate) shape: Option<DrawableShape>,
}

impl ElementNode {
    pub fn core(&self) -> &ElementCore {
        &self.core
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn shape(&self) -> Option<&DrawableShape> {
        self.shape.as_ref()
    }

    pub fn top_layer(&self) -> i32 {
        self.core.layer + self.core.layer_thickness
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Container(_))
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, ElementKind::Window(_))
    }

    pub(crate) fn container_state(&self) -> Option<&ContainerState> {
        match &self.kind {
            ElementKind::Container(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn window_state(&self) -> Option<&WindowState> {
        match &self.kind {
            ElementKind::Window(state) => Some(state),
            _ => None,
        }
    }
}

/// The element arena plus the single layer-ordered draw/input group.
///
/// Draw order and input priority both come from the group's ordering:
/// ascending layer for drawing, descending for hit tests, with insertion
/// order breaking ties within a layer. Any layer change resorts the group
/// immediately; its order is never observed in a partially updated state.
pub struct ElementTree {
    nodes: SlotMap<ElementId, ElementNode>,
    order: Vec<ElementId>,
    next_group_seq: u64,
    layers_dirty: bool,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            next_group_seq: 0,
            layers_dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn insert(&mut self, mut node: ElementNode) -> ElementId {
        node.core.group_seq = self.next_group_seq;
        self.next_group_seq += 1;
        let id = self.nodes.insert(node);
        self.order.push(id);
        self.resort();
        id
    }

    pub(crate) fn remove_node(&mut self, id: ElementId) -> Option<ElementNode> {
        self.order.retain(|ordered| *ordered != id);
        self.nodes.remove(id)
    }

    pub(crate) fn resort(&mut self) {
        let nodes = &self.nodes;
        self.order.sort_by_key(|id| {
            nodes
                .get(*id)
                .map(|node| (node.core.layer, node.core.group_seq))
                .unwrap_or((i32::MAX, u64::MAX))
        });
    }

    /// Group order, lowest layer first (draw order).
    pub fn ascending_ids(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    /// Group order, highest layer first (input priority order).
    pub fn descending_ids(&self) -> Vec<ElementId> {
        let mut ids = self.order.clone();
        ids.reverse();
        ids
    }

    /// Owned children in z-tiebreak order. Windows expose their single
    /// content container here.
    pub fn children_of(&self, id: ElementId) -> Vec<ElementId> {
        match self.get(id).map(|node| &node.kind) {
            Some(ElementKind::Container(state)) => state.children.clone(),
            Some(ElementKind::Window(state)) if self.contains(state.container) => {
                vec![state.container]
            }
            _ => Vec::new(),
        }
    }

    pub fn window_container(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)
            .and_then(|node| node.window_state())
            .map(|state| state.container)
            .filter(|container| self.contains(*container))
    }

    pub(crate) fn mark_layers_dirty(&mut self) {
        self.layers_dirty = true;
    }

    /// True once any window's layer footprint changed since the last call;
    /// the caller is expected to restack the window stack in response.
    pub fn take_layers_dirty(&mut self) -> bool {
        std::mem::take(&mut self.layers_dirty)
    }

    pub(crate) fn update_shape(&mut self, id: ElementId, time_delta: f32) {
        if let Some(node) = self.get_mut(id)
            && let Some(shape) = &mut node.shape
        {
            shape.update(time_delta);
        }
    }

    pub fn layer(&self, id: ElementId) -> Option<i32> {
        self.get(id).map(|node| node.core.layer)
    }

    pub fn top_layer(&self, id: ElementId) -> Option<i32> {
        self.get(id).map(ElementNode::top_layer)
    }

    pub fn layer_thickness(&self, id: ElementId) -> Option<i32> {
        self.get(id).map(|node| node.core.layer_thickness)
    }

    pub fn absolute_rect(&self, id: ElementId) -> Option<Rect> {
        self.get(id).map(|node| node.core.absolute_rect)
    }

    pub fn relative_rect(&self, id: ElementId) -> Option<Rect> {
        self.get(id).map(|node| node.core.relative_rect)
    }

    pub fn absolute_position(&self, id: ElementId) -> Option<Vec2> {
        self.absolute_rect(id).map(|rect| rect.position())
    }

    pub fn is_hovered(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|node| node.core.hovered)
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|node| node.core.visible)
    }

    pub fn is_enabled(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|node| node.core.enabled)
    }
}
