use super::ElementId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAnchor {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAnchor {
    #[default]
    Top,
    Bottom,
}

/// Per-edge bindings controlling how an element's rect is reinterpreted when
/// its container moves or resizes.
///
/// Each edge binds to the matching edge of the container, or to a sibling
/// element when a target id is set (sibling bindings use the target's
/// adjacent side, so a left binding tracks the target's right edge). A dead
/// target falls back to the container; nothing ever dangles.
///
/// The defaults pin everything to left/top: fixed position, fixed size.
/// Binding `right` to [`HorizontalAnchor::Right`] preserves the element's
/// right margin instead, and binding both sides to opposite edges stretches
/// the element with its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Anchors {
    pub left: HorizontalAnchor,
    pub right: HorizontalAnchor,
    pub top: VerticalAnchor,
    pub bottom: VerticalAnchor,
    pub left_target: Option<ElementId>,
    pub right_target: Option<ElementId>,
    pub top_target: Option<ElementId>,
    pub bottom_target: Option<ElementId>,
}

impl Anchors {
    pub fn top_left() -> Self {
        Self::default()
    }

    pub fn bottom_right() -> Self {
        Self {
            left: HorizontalAnchor::Right,
            right: HorizontalAnchor::Right,
            top: VerticalAnchor::Bottom,
            bottom: VerticalAnchor::Bottom,
            ..Self::default()
        }
    }

    /// All four edges follow their own side of the container.
    pub fn stretch() -> Self {
        Self {
            left: HorizontalAnchor::Left,
            right: HorizontalAnchor::Right,
            top: VerticalAnchor::Top,
            bottom: VerticalAnchor::Bottom,
            ..Self::default()
        }
    }

    /// Left/top position with a preserved right margin.
    pub fn right_margin() -> Self {
        Self {
            right: HorizontalAnchor::Right,
            ..Self::default()
        }
    }
}
