use tracing::debug;

use super::{ElementId, ElementTree};

/// Z-ordered window collection: a normal stack with an always-on-top
/// sub-stack placed above it.
///
/// Every window occupies a layer range strictly above the topmost layer of
/// the window beneath it, so ranges never overlap. Removal re-packs the
/// survivors so no gap remains where the window was. The most recently
/// focused window sits last in its stack.
#[derive(Clone, Debug, Default)]
pub struct WindowStack {
    normal: Vec<ElementId>,
    top: Vec<ElementId>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.top.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.top.is_empty()
    }

    pub fn contains(&self, window: ElementId) -> bool {
        self.normal.contains(&window) || self.top.contains(&window)
    }

    pub fn normal_windows(&self) -> &[ElementId] {
        &self.normal
    }

    pub fn top_windows(&self) -> &[ElementId] {
        &self.top
    }

    /// All windows, lowest layer range first.
    pub fn bottom_to_top(&self) -> Vec<ElementId> {
        self.normal.iter().chain(self.top.iter()).copied().collect()
    }

    /// All windows, highest layer range first.
    pub fn front_to_back(&self) -> Vec<ElementId> {
        let mut windows = self.bottom_to_top();
        windows.reverse();
        windows
    }

    /// Registers a window and assigns its layer range above the current top
    /// of its stack (layer 0 for the first window). Inserting a normal
    /// window beneath an existing always-on-top sub-stack shifts that
    /// sub-stack upward, preserving its relative order.
    pub fn add_new_window(&mut self, tree: &mut ElementTree, window: ElementId) {
        if !tree.contains(window) || self.contains(window) {
            return;
        }
        if tree.is_always_on_top(window) {
            let base = self
                .top
                .last()
                .or(self.normal.last())
                .and_then(|top| tree.top_layer(*top))
                .map(|top| top + 1)
                .unwrap_or(0);
            self.top.push(window);
            tree.relayer(window, base);
        } else {
            let base = self
                .normal
                .last()
                .and_then(|top| tree.top_layer(*top))
                .map(|top| top + 1)
                .unwrap_or(0);
            self.normal.push(window);
            tree.relayer(window, base);
            self.shift_top_stack_above_normal(tree);
        }
        debug!(?window, "window added to stack");
    }

    /// Removes a window, re-packing the layer ranges of everything that sat
    /// above it so no gap remains. Unknown windows are a tolerated no-op.
    pub fn remove_window(&mut self, tree: &mut ElementTree, window: ElementId) {
        let before = self.len();
        self.normal.retain(|id| *id != window);
        self.top.retain(|id| *id != window);
        if self.len() == before {
            return;
        }
        self.restack(tree);
    }

    /// Moves a window to the front of its own stack: it receives a fresh
    /// layer range strictly above the previous front's topmost layer, and
    /// every other window keeps both its relative order and its layers.
    /// Already-front windows degenerate to a no-op.
    pub fn move_window_to_front(&mut self, tree: &mut ElementTree, window: ElementId) {
        let in_top = self.top.contains(&window);
        let stack = if in_top {
            &mut self.top
        } else if self.normal.contains(&window) {
            &mut self.normal
        } else {
            return;
        };
        if stack.last() == Some(&window) {
            return;
        }
        let base = stack
            .last()
            .and_then(|front| tree.top_layer(*front))
            .map(|top| top + 1)
            .unwrap_or(0);
        stack.retain(|id| *id != window);
        stack.push(window);
        tree.relayer(window, base);
        if !in_top {
            self.shift_top_stack_above_normal(tree);
        }
        debug!(?window, "window moved to front");
    }

    /// Keeps the always-on-top sub-stack contiguously above the normal
    /// stack's current top.
    fn shift_top_stack_above_normal(&mut self, tree: &mut ElementTree) {
        let mut previous_top = self
            .normal
            .last()
            .and_then(|top| tree.top_layer(*top))
            .unwrap_or(-1);
        for window in self.top.clone() {
            let layer = previous_top + 1;
            if tree.layer(window) != Some(layer) {
                tree.relayer(window, layer);
            }
            previous_top = tree.top_layer(window).unwrap_or(layer);
        }
    }

    /// True iff the window is frontmost within its own stack (normal or
    /// always-on-top, whichever it belongs to).
    pub fn is_window_at_top(&self, window: ElementId) -> bool {
        self.normal.last() == Some(&window) || self.top.last() == Some(&window)
    }

    /// True iff the window is frontmost within the always-on-top sub-stack.
    /// Distinct from [`WindowStack::is_window_at_top`]: a normal-stack
    /// window is never at the top of top.
    pub fn is_window_at_top_of_top(&self, window: ElementId) -> bool {
        self.top.last() == Some(&window)
    }

    /// Re-packs every window's layer range contiguously from layer 0,
    /// normal stack first, always-on-top sub-stack above it. Dead windows
    /// are pruned along the way.
    pub fn restack(&mut self, tree: &mut ElementTree) {
        self.normal.retain(|id| tree.contains(*id));
        self.top.retain(|id| tree.contains(*id));

        let mut next_layer = 0;
        for window in self.bottom_to_top() {
            if tree.layer(window) != Some(next_layer) {
                tree.relayer(window, next_layer);
            }
            next_layer = tree.top_layer(window).unwrap_or(next_layer) + 1;
        }
        debug!(
            normal = self.normal.len(),
            top = self.top.len(),
            "window stack restacked"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ElementBuilder, Rect, WindowSpec};

    fn window(tree: &mut ElementTree, stack: &mut WindowStack, spec: WindowSpec) -> ElementId {
        let id = tree
            .create_window(&spec, None, 0.0)
            .expect("window specs in these tests are valid");
        stack.add_new_window(tree, id);
        id
    }

    fn plain_window(tree: &mut ElementTree, stack: &mut WindowStack) -> ElementId {
        window(
            tree,
            stack,
            WindowSpec::new(Rect::from_components(0.0, 0.0, 100.0, 100.0)),
        )
    }

    /// Grows a window's layer footprint to `1 + extra` by parking elements
    /// at increasing starting heights inside its content container.
    fn grow_thickness(tree: &mut ElementTree, window: ElementId, extra: i32) {
        let container = tree
            .window_container(window)
            .expect("window owns a content container");
        for height in 1..=extra {
            let builder = ElementBuilder::new(Rect::from_components(0.0, 0.0, 10.0, 10.0))
                .starting_height(height);
            tree.create_element(builder, Some(container));
        }
    }

    #[test]
    fn first_window_lands_on_layer_zero() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let first = plain_window(&mut tree, &mut stack);
        assert_eq!(tree.layer(first), Some(0));
        assert!(stack.is_window_at_top(first));
    }

    #[test]
    fn layer_ranges_stack_contiguously_above_each_other() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();

        let first = plain_window(&mut tree, &mut stack);
        grow_thickness(&mut tree, first, 1); // container at +1, one element above it
        assert_eq!(tree.layer(first), Some(0));
        assert_eq!(tree.top_layer(first), Some(2));

        let second = plain_window(&mut tree, &mut stack);
        assert_eq!(tree.layer(second), Some(3));
        assert_eq!(tree.top_layer(second), Some(4));
    }

    #[test]
    fn adjacent_layer_ranges_never_overlap() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let windows: Vec<_> = (0..4).map(|_| plain_window(&mut tree, &mut stack)).collect();
        grow_thickness(&mut tree, windows[1], 3);
        stack.restack(&mut tree);
        stack.move_window_to_front(&mut tree, windows[0]);
        stack.remove_window(&mut tree, windows[2]);

        let ordered = stack.bottom_to_top();
        for pair in ordered.windows(2) {
            let below_top = tree.top_layer(pair[0]).expect("window is alive");
            let above = tree.layer(pair[1]).expect("window is alive");
            assert!(
                above > below_top,
                "window above starts at {above}, below tops out at {below_top}"
            );
        }
    }

    #[test]
    fn move_to_front_preserves_relative_order_of_the_rest() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let w1 = plain_window(&mut tree, &mut stack);
        let w2 = plain_window(&mut tree, &mut stack);
        let w3 = plain_window(&mut tree, &mut stack);
        let w3_old_top = tree.top_layer(w3).expect("w3 is alive");

        stack.move_window_to_front(&mut tree, w1);

        assert_eq!(stack.normal_windows(), &[w2, w3, w1]);
        assert!(stack.is_window_at_top(w1));
        let w1_layer = tree.layer(w1).expect("w1 is alive");
        assert!(w1_layer > w3_old_top);
        assert!(tree.layer(w2) < tree.layer(w3));
    }

    #[test]
    fn move_to_front_of_front_window_is_a_no_op() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let w1 = plain_window(&mut tree, &mut stack);
        let w2 = plain_window(&mut tree, &mut stack);
        let layers_before = (tree.layer(w1), tree.layer(w2));

        stack.move_window_to_front(&mut tree, w2);
        assert_eq!(stack.normal_windows(), &[w1, w2]);
        assert_eq!((tree.layer(w1), tree.layer(w2)), layers_before);
    }

    #[test]
    fn removal_repacks_layers_without_gaps() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let w1 = plain_window(&mut tree, &mut stack);
        let w2 = plain_window(&mut tree, &mut stack);
        let w3 = plain_window(&mut tree, &mut stack);
        let w1_top = tree.top_layer(w1).expect("w1 is alive");

        stack.remove_window(&mut tree, w2);

        assert_eq!(stack.normal_windows(), &[w1, w3]);
        assert_eq!(tree.layer(w3), Some(w1_top + 1));
    }

    #[test]
    fn always_on_top_windows_stay_above_normal_insertions() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let normal_1 = plain_window(&mut tree, &mut stack);
        let pinned = window(
            &mut tree,
            &mut stack,
            WindowSpec::new(Rect::from_components(0.0, 0.0, 50.0, 50.0)).always_on_top(),
        );
        let pinned_layer_before = tree.layer(pinned).expect("pinned window is alive");

        // a later normal window slots underneath and pushes the pinned one up
        let normal_2 = plain_window(&mut tree, &mut stack);

        assert_eq!(stack.normal_windows(), &[normal_1, normal_2]);
        assert_eq!(stack.top_windows(), &[pinned]);
        let pinned_layer = tree.layer(pinned).expect("pinned window is alive");
        assert!(pinned_layer > tree.top_layer(normal_2).expect("normal_2 is alive"));
        assert!(pinned_layer > pinned_layer_before);
    }

    #[test]
    fn the_two_notions_of_front_stay_distinct() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let normal = plain_window(&mut tree, &mut stack);
        let pinned = window(
            &mut tree,
            &mut stack,
            WindowSpec::new(Rect::from_components(0.0, 0.0, 50.0, 50.0)).always_on_top(),
        );

        assert!(stack.is_window_at_top(normal));
        assert!(stack.is_window_at_top(pinned));
        assert!(stack.is_window_at_top_of_top(pinned));
        assert!(!stack.is_window_at_top_of_top(normal));
    }

    #[test]
    fn removing_an_unknown_window_is_tolerated() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let w1 = plain_window(&mut tree, &mut stack);
        let stranger = tree.create_element(
            ElementBuilder::new(Rect::from_components(0.0, 0.0, 5.0, 5.0)),
            None,
        );

        stack.remove_window(&mut tree, stranger);
        assert_eq!(stack.normal_windows(), &[w1]);
    }

    #[test]
    fn restack_prunes_windows_killed_behind_its_back() {
        let mut tree = ElementTree::new();
        let mut stack = WindowStack::new();
        let w1 = plain_window(&mut tree, &mut stack);
        let w2 = plain_window(&mut tree, &mut stack);
        tree.kill(w1);

        stack.restack(&mut tree);
        assert_eq!(stack.normal_windows(), &[w2]);
        assert_eq!(tree.layer(w2), Some(0));
    }
}
