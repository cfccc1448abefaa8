use super::{ElementId, ElementKind, ElementTree};

/// Ordered child collection of a container element. Insertion order is the
/// z-order tiebreak among children sharing a layer.
#[derive(Clone, Debug, Default)]
pub struct ContainerState {
    pub(crate) children: Vec<ElementId>,
}

impl ContainerState {
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

impl ElementTree {
    /// Appends `element` to the container's children, assigning it
    /// `container.layer + element.starting_height` and refreshing the
    /// container's layer thickness. Reparents automatically if the element
    /// was owned elsewhere. Windows delegate to their content container.
    pub fn add_element(&mut self, container: ElementId, element: ElementId) {
        if container == element || !self.contains(element) {
            return;
        }
        let Some(target) = self.resolve_container(container) else {
            return;
        };
        if target == element {
            return;
        }
        self.detach(element);

        let base_layer = self.get(target).map(|node| node.core.layer).unwrap_or(0);
        let starting_height = self
            .get(element)
            .map(|node| node.core.starting_height)
            .unwrap_or(0);
        if let Some(node) = self.get_mut(target)
            && let ElementKind::Container(state) = &mut node.kind
        {
            state.children.push(element);
        }
        if let Some(node) = self.get_mut(element) {
            node.core.parent = Some(target);
        }
        self.relayer(element, base_layer + starting_height);
        self.refresh_absolute_rect(element, true);
        for child in self.children_of(element) {
            self.update_containing_rect_position(child);
        }
        self.recalculate_layer_thickness(target);
    }

    /// Removes `element` from the container if present; absent elements are
    /// a tolerated no-op.
    pub fn remove_element(&mut self, container: ElementId, element: ElementId) {
        let Some(target) = self.resolve_container(container) else {
            return;
        };
        let removed = match self.get_mut(target).map(|node| &mut node.kind) {
            Some(ElementKind::Container(state)) => {
                let before = state.children.len();
                state.children.retain(|child| *child != element);
                state.children.len() != before
            }
            _ => false,
        };
        if !removed {
            return;
        }
        if let Some(node) = self.get_mut(element) {
            node.core.parent = None;
        }
        self.recalculate_layer_thickness(target);
    }

    /// Re-derives how many layers this node's subtree consumes above its
    /// own. A change propagates to the owning node, since a nested
    /// thickness change can alter the layer range the window stack must
    /// reserve; a window whose footprint changed flags the tree for a
    /// restack.
    pub fn recalculate_layer_thickness(&mut self, id: ElementId) {
        let Some(node) = self.get(id) else { return };
        if matches!(node.kind, ElementKind::Plain) {
            return;
        }
        let base = node.core.layer;
        let mut max_top = base;
        for child in self.children_of(id) {
            if let Some(child_node) = self.get(child) {
                max_top = max_top.max(child_node.top_layer());
            }
        }
        let thickness = (max_top - base).max(0);

        let Some(node) = self.get_mut(id) else { return };
        if node.core.layer_thickness == thickness {
            return;
        }
        node.core.layer_thickness = thickness;
        let parent = node.core.parent;
        let is_window = matches!(node.kind, ElementKind::Window(_));
        match parent {
            Some(parent_id) => self.recalculate_layer_thickness(parent_id),
            None if is_window => self.mark_layers_dirty(),
            None => {}
        }
    }

    /// Same contract as [`ElementTree::change_layer`]; the cascade re-layers
    /// every child from its fixed starting height, which is what lets
    /// "bring to front" re-stack an entire subtree atomically.
    pub fn change_container_layer(&mut self, id: ElementId, new_layer: i32) {
        self.change_layer(id, new_layer);
    }

    /// Kills every child. Each child reaches `kill` exactly once.
    pub fn clear_container(&mut self, id: ElementId) {
        if let Some(content) = self.window_container(id) {
            self.clear_container(content);
            return;
        }
        loop {
            let next = match self.get(id).map(|node| &node.kind) {
                Some(ElementKind::Container(state)) => state.children.last().copied(),
                _ => None,
            };
            let Some(child) = next else { break };
            self.kill(child);
        }
    }

    /// The container that actually holds children for `id`: itself for
    /// containers, the content container for windows.
    pub(crate) fn resolve_container(&self, id: ElementId) -> Option<ElementId> {
        match self.get(id).map(|node| &node.kind) {
            Some(ElementKind::Container(_)) => Some(id),
            Some(ElementKind::Window(state)) if self.contains(state.container) => {
                Some(state.container)
            }
            _ => None,
        }
    }

    pub(crate) fn detach(&mut self, element: ElementId) {
        let Some(parent) = self.get(element).and_then(|node| node.core.parent) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent)
            && let ElementKind::Container(state) = &mut parent_node.kind
        {
            state.children.retain(|child| *child != element);
        }
        if let Some(node) = self.get_mut(element) {
            node.core.parent = None;
        }
        self.recalculate_layer_thickness(parent);
    }
}
