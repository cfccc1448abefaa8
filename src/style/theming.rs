use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::Color;

/// Fill and border colors for one visual state of a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateColors {
    pub fill: Color,
    pub border: Color,
}

/// The resolved theming parameters a drawable shape renders from.
///
/// This is the whole of what the core consumes from the theming layer: it
/// never sees theme files, only this opaque parameter block.
#[derive(Clone, Debug)]
pub struct ShapeTheming {
    state_colors: FxHashMap<SmolStr, StateColors>,
    transition_durations: FxHashMap<(SmolStr, SmolStr), f32>,
    pub border_width: u32,
    pub shadow_width: u32,
    pub corner_radius: f32,
}

impl ShapeTheming {
    /// A parameter block with no states at all. Useful as a starting point
    /// for programmatic themes, but a shape built from it is rejected until
    /// a `normal` state is inserted.
    pub fn new() -> Self {
        Self {
            state_colors: FxHashMap::default(),
            transition_durations: FxHashMap::default(),
            border_width: 1,
            shadow_width: 0,
            corner_radius: 0.0,
        }
    }

    pub fn with_normal(normal: StateColors) -> Self {
        let mut theming = Self::new();
        theming.insert_state(SmolStr::new_inline("normal"), normal);
        theming
    }

    pub fn insert_state(&mut self, name: impl Into<SmolStr>, colors: StateColors) -> &mut Self {
        self.state_colors.insert(name.into(), colors);
        self
    }

    pub fn set_transition(
        &mut self,
        from: impl Into<SmolStr>,
        to: impl Into<SmolStr>,
        seconds: f32,
    ) -> &mut Self {
        self.transition_durations
            .insert((from.into(), to.into()), seconds.max(0.0));
        self
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.state_colors.contains_key(name)
    }

    pub fn state_colors(&self, name: &str) -> Option<&StateColors> {
        self.state_colors.get(name)
    }

    /// Colors for `name`, falling back to the `normal` state for states that
    /// exist on the shape but carry no colors of their own.
    pub fn state_colors_or_normal(&self, name: &str) -> StateColors {
        self.state_colors
            .get(name)
            .or_else(|| self.state_colors.get("normal"))
            .copied()
            .unwrap_or(StateColors {
                fill: Color::TRANSPARENT,
                border: Color::TRANSPARENT,
            })
    }

    pub fn transition_duration(&self, from: &str, to: &str) -> Option<f32> {
        self.transition_durations
            .get(&(SmolStr::new(from), SmolStr::new(to)))
            .copied()
    }

    /// Pixels of frame consumed on each side of a shape by its border and
    /// shadow bands together.
    pub fn frame_inset(&self) -> f32 {
        (self.border_width + self.shadow_width) as f32
    }
}

impl Default for ShapeTheming {
    fn default() -> Self {
        let mut theming = ShapeTheming::with_normal(StateColors {
            fill: Color::rgb(77, 77, 77),
            border: Color::rgb(128, 128, 128),
        });
        theming.insert_state(
            "hovered",
            StateColors {
                fill: Color::rgb(99, 99, 99),
                border: Color::rgb(160, 160, 160),
            },
        );
        theming.insert_state(
            "disabled",
            StateColors {
                fill: Color::rgb(40, 40, 40),
                border: Color::rgb(64, 64, 64),
            },
        );
        theming.insert_state(
            "selected",
            StateColors {
                fill: Color::rgb(54, 88, 128),
                border: Color::rgb(160, 160, 160),
            },
        );
        theming
    }
}

/// Resolves an element's theme-lookup chain (most specific identifier first)
/// to the parameters its shape renders from.
pub trait ThemeSource {
    fn shape_theming(&self, class_chain: &[SmolStr]) -> ShapeTheming;
}

/// Programmatic theme: a base parameter block plus per-class overrides.
#[derive(Clone, Debug, Default)]
pub struct BuiltinTheme {
    base: ShapeTheming,
    by_class: FxHashMap<SmolStr, ShapeTheming>,
}

impl BuiltinTheme {
    pub fn new(base: ShapeTheming) -> Self {
        Self {
            base,
            by_class: FxHashMap::default(),
        }
    }

    pub fn insert_class(&mut self, class_id: impl Into<SmolStr>, theming: ShapeTheming) {
        self.by_class.insert(class_id.into(), theming);
    }
}

impl ThemeSource for BuiltinTheme {
    fn shape_theming(&self, class_chain: &[SmolStr]) -> ShapeTheming {
        class_chain
            .iter()
            .find_map(|id| self.by_class.get(id))
            .unwrap_or(&self.base)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_specific_class_wins_lookup() {
        let mut theme = BuiltinTheme::default();
        let mut special = ShapeTheming::default();
        special.border_width = 7;
        theme.insert_class("close_button", special);

        let chain = [
            SmolStr::new("close_button"),
            SmolStr::new("button"),
            SmolStr::new("window"),
        ];
        assert_eq!(theme.shape_theming(&chain).border_width, 7);

        let generic = [SmolStr::new("button")];
        assert_eq!(theme.shape_theming(&generic).border_width, 1);
    }

    #[test]
    fn missing_state_falls_back_to_normal() {
        let theming = ShapeTheming::default();
        let normal = theming.state_colors_or_normal("normal");
        assert_eq!(theming.state_colors_or_normal("no_such_state"), normal);
    }

    #[test]
    fn transition_durations_are_directional() {
        let mut theming = ShapeTheming::default();
        theming.set_transition("normal", "hovered", 0.4);
        assert_eq!(theming.transition_duration("normal", "hovered"), Some(0.4));
        assert_eq!(theming.transition_duration("hovered", "normal"), None);
    }
}
