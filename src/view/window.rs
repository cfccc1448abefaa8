use bitflags::bitflags;
use glam::Vec2;
use smol_str::SmolStr;

use super::{
    Anchors, ContainerState, ElementBuilder, ElementCore, ElementId, ElementKind, ElementNode,
    ElementTree, Rect,
};
use crate::error::UiError;
use crate::shape::DrawableShape;

/// Pixels beyond the content area still counted by the resize hit test.
const RESIZE_HIT_MARGIN: f32 = 4.0;
/// Proximity to an edge, in pixels, that raises that edge's hover flag.
const RESIZE_EDGE_PROXIMITY: f32 = 6.0;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EdgeFlags: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ResizeDrag {
    pub start_rect: Rect,
    pub start_pointer: Vec2,
    pub edges: EdgeFlags,
}

/// Window-specific state. The window owns exactly one content container;
/// everything placed "in the window" lives in that container.
#[derive(Clone, Debug)]
pub struct WindowState {
    pub(crate) container: ElementId,
    pub blocking: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    pub minimum_dimensions: Vec2,
    pub(crate) edge_hover: EdgeFlags,
    pub(crate) resizing: Option<ResizeDrag>,
}

impl WindowState {
    fn new(spec: &WindowSpec) -> Self {
        Self {
            container: ElementId::default(),
            blocking: spec.blocking,
            always_on_top: spec.always_on_top,
            resizable: spec.resizable,
            minimum_dimensions: spec.minimum_dimensions.max(Vec2::ZERO),
            edge_hover: EdgeFlags::empty(),
            resizing: None,
        }
    }

    pub fn edge_hover(&self) -> EdgeFlags {
        self.edge_hover
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct WindowSpec {
    pub rect: Rect,
    pub blocking: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    pub minimum_dimensions: Vec2,
    pub class_id: SmolStr,
}

impl WindowSpec {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            blocking: false,
            always_on_top: false,
            resizable: false,
            minimum_dimensions: Vec2::new(100.0, 100.0),
            class_id: SmolStr::new_inline("window"),
        }
    }

    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    pub fn always_on_top(mut self) -> Self {
        self.always_on_top = true;
        self
    }

    pub fn resizable(mut self, minimum_dimensions: Vec2) -> Self {
        self.resizable = true;
        self.minimum_dimensions = minimum_dimensions;
        self
    }

    pub fn class_id(mut self, class_id: impl Into<SmolStr>) -> Self {
        self.class_id = class_id.into();
        self
    }
}

impl ElementTree {
    /// Builds a window node and its content container. The container is
    /// inset by `content_inset` on every side and stretch-anchored, so it
    /// follows the window through moves and resizes.
    ///
    /// A rect whose content area would come out negative is rejected: the
    /// widget layer above is expected to warn and clamp, but impossible
    /// rect math never silently produces a corrupt window.
    pub fn create_window(
        &mut self,
        spec: &WindowSpec,
        shape: Option<DrawableShape>,
        content_inset: f32,
    ) -> Result<ElementId, UiError> {
        let content_size = spec.rect.size() - Vec2::splat(2.0 * content_inset);
        if content_size.x < 0.0 || content_size.y < 0.0 {
            return Err(UiError::DegenerateWindowRect {
                width: content_size.x,
                height: content_size.y,
            });
        }

        let window_builder = ElementBuilder::new(spec.rect).class_id(spec.class_id.clone());
        let window_id = self.insert(ElementNode {
            core: ElementCore::new(&window_builder, vec![spec.class_id.clone()]),
            kind: ElementKind::Window(WindowState::new(spec)),
            shape,
        });

        let container_builder =
            ElementBuilder::new(Rect::new(Vec2::splat(content_inset), content_size))
                .anchors(Anchors::stretch())
                .starting_height(1)
                .class_id("container");
        let container_chain = vec![SmolStr::new_inline("container"), spec.class_id.clone()];
        let container_id = self.insert(ElementNode {
            core: ElementCore::new(&container_builder, container_chain),
            kind: ElementKind::Container(ContainerState::default()),
            shape: None,
        });

        if let Some(node) = self.get_mut(container_id) {
            node.core.parent = Some(window_id);
        }
        if let Some(node) = self.get_mut(window_id)
            && let ElementKind::Window(state) = &mut node.kind
        {
            state.container = container_id;
        }
        let window_layer = self.get(window_id).map(|node| node.core.layer).unwrap_or(0);
        self.relayer(container_id, window_layer + 1);
        self.refresh_absolute_rect(container_id, true);
        self.recalculate_layer_thickness(window_id);
        Ok(window_id)
    }

    /// The focus pre-pass test: does a click at `position` mean this window
    /// should come forward (and the click be treated as window-sorting
    /// input)? True when the click is inside the window, or unconditionally
    /// for blocking windows.
    pub fn check_clicked_inside_or_blocking(&self, id: ElementId, position: Vec2) -> bool {
        self.get(id).is_some_and(|node| match &node.kind {
            ElementKind::Window(state) => {
                node.core.visible
                    && (state.blocking || node.core.absolute_rect.contains(position))
            }
            _ => false,
        })
    }

    /// Per-frame edge proximity pass for a resizable window that is neither
    /// obscured by a higher hover nor already resizing. The hit band is the
    /// content container's rect grown by a few pixels on every side.
    pub fn update_window_edge_hover(&mut self, id: ElementId, pointer: Vec2, obscured: bool) {
        let Some(node) = self.get(id) else { return };
        let ElementKind::Window(state) = &node.kind else {
            return;
        };
        if !state.resizable || state.resizing.is_some() {
            return;
        }
        let container_rect = self
            .get(state.container)
            .map(|container| container.core.absolute_rect)
            .unwrap_or(node.core.absolute_rect);

        let mut flags = EdgeFlags::empty();
        if !obscured {
            let hit = container_rect.inflated(RESIZE_HIT_MARGIN);
            if hit.contains(pointer) {
                if pointer.x <= hit.left() + RESIZE_EDGE_PROXIMITY {
                    flags |= EdgeFlags::LEFT;
                }
                if pointer.x >= hit.right() - RESIZE_EDGE_PROXIMITY {
                    flags |= EdgeFlags::RIGHT;
                }
                if pointer.y <= hit.top() + RESIZE_EDGE_PROXIMITY {
                    flags |= EdgeFlags::TOP;
                }
                if pointer.y >= hit.bottom() - RESIZE_EDGE_PROXIMITY {
                    flags |= EdgeFlags::BOTTOM;
                }
            }
        }
        if let Some(node) = self.get_mut(id)
            && let ElementKind::Window(state) = &mut node.kind
        {
            state.edge_hover = flags;
        }
    }

    /// Enters resizing mode if any edge flag is raised, recording the
    /// window's rect and the pointer position at grab time.
    pub fn start_window_resize(&mut self, id: ElementId, pointer: Vec2) -> bool {
        let Some(node) = self.get(id) else { return false };
        let ElementKind::Window(state) = &node.kind else {
            return false;
        };
        if !state.resizable || state.resizing.is_some() || state.edge_hover.is_empty() {
            return false;
        }
        let drag = ResizeDrag {
            start_rect: node.core.absolute_rect,
            start_pointer: pointer,
            edges: state.edge_hover,
        };
        if let Some(node) = self.get_mut(id)
            && let ElementKind::Window(state) = &mut node.kind
        {
            state.resizing = Some(drag);
        }
        true
    }

    /// Leaves resizing mode. Returns whether a resize was in progress.
    pub fn finish_window_resize(&mut self, id: ElementId) -> bool {
        if let Some(node) = self.get_mut(id)
            && let ElementKind::Window(state) = &mut node.kind
            && state.resizing.is_some()
        {
            state.resizing = None;
            return true;
        }
        false
    }

    /// Applies the in-progress drag: the pointer delta moves whichever
    /// edges were grabbed, clamped to the window's minimum dimensions and
    /// to `bounds`. The content container and all descendants follow.
    pub fn apply_window_resize(&mut self, id: ElementId, pointer: Vec2, bounds: Rect) {
        let Some(node) = self.get(id) else { return };
        let ElementKind::Window(state) = &node.kind else {
            return;
        };
        let Some(drag) = state.resizing else { return };
        let minimum = state.minimum_dimensions;
        let delta = pointer - drag.start_pointer;
        let start = drag.start_rect;

        let mut left = start.left();
        let mut right = start.right();
        let mut top = start.top();
        let mut bottom = start.bottom();
        if drag.edges.contains(EdgeFlags::LEFT) {
            left = (start.left() + delta.x)
                .min(right - minimum.x)
                .max(bounds.left());
        }
        if drag.edges.contains(EdgeFlags::RIGHT) {
            right = (start.right() + delta.x)
                .max(left + minimum.x)
                .min(bounds.right());
        }
        if drag.edges.contains(EdgeFlags::TOP) {
            top = (start.top() + delta.y)
                .min(bottom - minimum.y)
                .max(bounds.top());
        }
        if drag.edges.contains(EdgeFlags::BOTTOM) {
            bottom = (start.bottom() + delta.y)
                .max(top + minimum.y)
                .min(bounds.bottom());
        }

        self.set_position(id, Vec2::new(left, top));
        self.set_dimensions(id, Vec2::new(right - left, bottom - top), false);
    }

    pub fn window_edge_hover(&self, id: ElementId) -> EdgeFlags {
        self.get(id)
            .and_then(ElementNode::window_state)
            .map(|state| state.edge_hover)
            .unwrap_or(EdgeFlags::empty())
    }

    pub fn is_window_resizing(&self, id: ElementId) -> bool {
        self.get(id)
            .and_then(ElementNode::window_state)
            .is_some_and(WindowState::is_resizing)
    }

    pub fn is_blocking_window(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|node| {
            node.core.visible
                && node
                    .window_state()
                    .is_some_and(|state| state.blocking)
        })
    }

    pub(crate) fn is_always_on_top(&self, id: ElementId) -> bool {
        self.get(id)
            .and_then(ElementNode::window_state)
            .is_some_and(|state| state.always_on_top)
    }
}
