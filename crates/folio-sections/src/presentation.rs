#![forbid(unsafe_code)]

//! Mapping from reveal state to entrance transition parameters.
//!
//! An [`Entrance`] describes a hidden and a shown [`Pose`] plus timing. A
//! section resolves it against its reveal state (and, for lists, the item's
//! position) into a [`TransitionStyle`] the rendering layer applies as an
//! inline style.

/// Visual state at one end of an entrance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    pub translate_x_px: f32,
    pub translate_y_px: f32,
}

impl Pose {
    /// Fully visible, in place.
    pub const SHOWN: Self = Self {
        opacity: 1.0,
        translate_x_px: 0.0,
        translate_y_px: 0.0,
    };

    /// Transparent and offset.
    #[must_use]
    pub const fn hidden_at(translate_x_px: f32, translate_y_px: f32) -> Self {
        Self {
            opacity: 0.0,
            translate_x_px,
            translate_y_px,
        }
    }
}

/// Per-item delay for list entrances: item `i` waits `i * step_ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stagger {
    pub step_ms: u32,
}

impl Stagger {
    pub const NONE: Self = Self { step_ms: 0 };
    pub const LIST: Self = Self { step_ms: 100 };

    #[must_use]
    pub fn delay_for(self, index: usize) -> u32 {
        u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.step_ms)
    }
}

/// One-shot entrance animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrance {
    pub hidden: Pose,
    pub shown: Pose,
    pub duration_ms: u32,
    pub delay_ms: u32,
}

impl Entrance {
    /// Rise into place from `distance_px` below.
    #[must_use]
    pub const fn slide_up(distance_px: f32, duration_ms: u32) -> Self {
        Self {
            hidden: Pose::hidden_at(0.0, distance_px),
            shown: Pose::SHOWN,
            duration_ms,
            delay_ms: 0,
        }
    }

    /// Slide in from `distance_px` to the left.
    #[must_use]
    pub const fn slide_from_left(distance_px: f32, duration_ms: u32) -> Self {
        Self {
            hidden: Pose::hidden_at(0.0 - distance_px, 0.0),
            shown: Pose::SHOWN,
            duration_ms,
            delay_ms: 0,
        }
    }

    /// Slide in from `distance_px` to the right.
    #[must_use]
    pub const fn slide_from_right(distance_px: f32, duration_ms: u32) -> Self {
        Self {
            hidden: Pose::hidden_at(distance_px, 0.0),
            shown: Pose::SHOWN,
            duration_ms,
            delay_ms: 0,
        }
    }

    #[must_use]
    pub const fn delayed(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn resolve(&self, revealed: bool) -> TransitionStyle {
        self.resolve_staggered(revealed, 0, Stagger::NONE)
    }

    /// Resolve for item `index` of a list.
    #[must_use]
    pub fn resolve_staggered(&self, revealed: bool, index: usize, stagger: Stagger) -> TransitionStyle {
        let pose = if revealed { self.shown } else { self.hidden };
        TransitionStyle {
            opacity: pose.opacity,
            translate_x_px: pose.translate_x_px,
            translate_y_px: pose.translate_y_px,
            duration_ms: self.duration_ms,
            delay_ms: self.delay_ms.saturating_add(stagger.delay_for(index)),
        }
    }
}

/// Resolved transition parameters for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStyle {
    pub opacity: f32,
    pub translate_x_px: f32,
    pub translate_y_px: f32,
    pub duration_ms: u32,
    pub delay_ms: u32,
}

impl TransitionStyle {
    /// Inline CSS declarations.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "opacity:{};transform:translate({}px,{}px);transition:all {}ms ease",
            self.opacity, self.translate_x_px, self.translate_y_px, self.duration_ms
        );
        if self.delay_ms > 0 {
            css.push_str(&format!(";transition-delay:{}ms", self.delay_ms));
        }
        css
    }
}

/// Width of a progress bar that fills on reveal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    pub width_percent: f32,
    pub duration_ms: u32,
}

impl BarStyle {
    #[must_use]
    pub fn resolve(revealed: bool, level_percent: u8, duration_ms: u32) -> Self {
        let width_percent = if revealed {
            f32::from(level_percent.min(100))
        } else {
            0.0
        };
        Self {
            width_percent,
            duration_ms,
        }
    }

    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "width:{}%;transition:width {}ms ease",
            self.width_percent, self.duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slide_up_resolves_both_ends() {
        let entrance = Entrance::slide_up(40.0, 700);
        let hidden = entrance.resolve(false);
        assert_eq!(hidden.opacity, 0.0);
        assert_eq!(hidden.translate_y_px, 40.0);

        let shown = entrance.resolve(true);
        assert_eq!(shown.opacity, 1.0);
        assert_eq!(shown.translate_y_px, 0.0);
        assert_eq!(shown.duration_ms, 700);
    }

    #[test]
    fn side_entrances() {
        assert_eq!(
            Entrance::slide_from_left(20.0, 1000).hidden,
            Pose::hidden_at(-20.0, 0.0)
        );
        assert_eq!(
            Entrance::slide_from_right(20.0, 1000).hidden,
            Pose::hidden_at(20.0, 0.0)
        );
    }

    #[test]
    fn stagger_adds_to_base_delay() {
        let entrance = Entrance::slide_up(40.0, 700).delayed(50);
        let style = entrance.resolve_staggered(false, 3, Stagger::LIST);
        assert_eq!(style.delay_ms, 350);
        assert_eq!(Stagger::LIST.delay_for(usize::MAX), u32::MAX);
        assert_eq!(Stagger::NONE.delay_for(7), 0);
    }

    #[test]
    fn css_output() {
        let entrance = Entrance::slide_from_left(20.0, 1000);
        assert_eq!(
            entrance.resolve(false).to_css(),
            "opacity:0;transform:translate(-20px,0px);transition:all 1000ms ease"
        );
        assert_eq!(
            entrance.delayed(300).resolve(true).to_css(),
            "opacity:1;transform:translate(0px,0px);transition:all 1000ms ease;transition-delay:300ms"
        );
    }

    #[test]
    fn bar_fills_on_reveal() {
        assert_eq!(BarStyle::resolve(false, 75, 1000).width_percent, 0.0);
        assert_eq!(BarStyle::resolve(true, 75, 1000).width_percent, 75.0);
        assert_eq!(BarStyle::resolve(true, 200, 1000).width_percent, 100.0);
        assert_eq!(
            BarStyle::resolve(true, 60, 1000).to_css(),
            "width:60%;transition:width 1000ms ease"
        );
    }
}
