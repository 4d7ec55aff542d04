#![forbid(unsafe_code)]

//! Carousel configuration.
//!
//! [`CarouselConfig`] carries every tunable of a carousel: snapping, flick
//! sensitivity, transition timing, input support, layout management, and
//! edge behavior. Construct it with [`Default`] and refine it with the
//! `with_*` builders, then hand it to
//! [`GestureCarousel::new`](crate::carousel::GestureCarousel::new), which
//! calls [`CarouselConfig::validate`].

use std::time::Duration;

/// Default flick-sensitivity scalar.
pub const DEFAULT_SLIDE_STRENGTH: f64 = 5000.0;
/// Default divisor scale applied to elapsed milliseconds on release.
pub const DEFAULT_VELOCITY_SCALE: f64 = 25.0;
/// Default transition duration for committed moves.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(250);
/// Default damping factor used when dragging past an edge.
pub const DEFAULT_EDGE_DAMPING: f64 = 0.3;

/// Timing function for the track transition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Easing {
    #[default]
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// CSS timing-function text.
    #[must_use]
    pub fn css(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::Ease => "ease".to_string(),
            Self::EaseIn => "ease-in".to_string(),
            Self::EaseOut => "ease-out".to_string(),
            Self::EaseInOut => "ease-in-out".to_string(),
            Self::CubicBezier(x1, y1, x2, y2) => format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"),
        }
    }

    /// Parse a CSS timing-function keyword or `cubic-bezier(...)` expression.
    #[must_use]
    pub fn from_css(text: &str) -> Option<Self> {
        match text.trim() {
            "linear" => Some(Self::Linear),
            "ease" => Some(Self::Ease),
            "ease-in" => Some(Self::EaseIn),
            "ease-out" => Some(Self::EaseOut),
            "ease-in-out" => Some(Self::EaseInOut),
            other => {
                let inner = other
                    .strip_prefix("cubic-bezier(")?
                    .strip_suffix(')')?;
                let mut parts = inner.split(',').map(|part| part.trim().parse::<f64>());
                let x1 = parts.next()?.ok()?;
                let y1 = parts.next()?.ok()?;
                let x2 = parts.next()?.ok()?;
                let y2 = parts.next()?.ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some(Self::CubicBezier(x1, y1, x2, y2))
            }
        }
    }
}

/// What happens to a drag that pushes past the first or last slide when no
/// parent carousel takes it over.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeResistance {
    /// The track does not move past the edge.
    Rigid,
    /// The track follows the pointer with diminishing returns.
    ///
    /// `factor` is in `0.0..=1.0`; `0.0` behaves like [`EdgeResistance::Rigid`].
    Damped { factor: f64 },
}

impl Default for EdgeResistance {
    fn default() -> Self {
        Self::Damped {
            factor: DEFAULT_EDGE_DAMPING,
        }
    }
}

/// Invalid configuration detected by [`CarouselConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `slide_strength` is negative or not finite.
    InvalidSlideStrength(f64),
    /// `velocity_scale` is zero, negative, or not finite.
    InvalidVelocityScale(f64),
    /// Edge damping factor outside `0.0..=1.0`.
    InvalidEdgeDamping(f64),
    /// A cubic-bezier control point is not finite, or an x coordinate is
    /// outside `0.0..=1.0`.
    InvalidEasing(Easing),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSlideStrength(v) => {
                write!(f, "slide strength must be finite and non-negative, got {v}")
            }
            Self::InvalidVelocityScale(v) => {
                write!(f, "velocity scale must be finite and positive, got {v}")
            }
            Self::InvalidEdgeDamping(v) => {
                write!(f, "edge damping factor must be within 0.0..=1.0, got {v}")
            }
            Self::InvalidEasing(easing) => write!(f, "invalid easing: {}", easing.css()),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunables for one carousel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CarouselConfig {
    /// Commit to the closest slide boundary on release (default: true).
    pub snap: bool,
    /// Flick-sensitivity scalar for the release adjustment (default: 5000).
    pub slide_strength: f64,
    /// Scale applied to the elapsed milliseconds in the release adjustment
    /// (default: 25).
    pub velocity_scale: f64,
    /// Duration of committed moves (default: 250ms).
    pub transition: Duration,
    /// Timing function of committed moves (default: linear).
    pub easing: Easing,
    /// Bind mouse-down when the host has no touch capability (default: false).
    pub support_mouse: bool,
    /// Size the track and slides to the viewport (default: true).
    pub set_sizes: bool,
    /// Apply the base viewport/track/slide styles (default: true).
    pub set_styles: bool,
    /// Never move more than one slide per gesture (default: false).
    pub only_one_slide_per_gesture: bool,
    /// Forward edge drags to a linked parent carousel (default: true).
    pub delegate_to_parent: bool,
    /// Edge behavior when no parent takes the drag.
    pub edge_resistance: EdgeResistance,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            snap: true,
            slide_strength: DEFAULT_SLIDE_STRENGTH,
            velocity_scale: DEFAULT_VELOCITY_SCALE,
            transition: DEFAULT_TRANSITION,
            easing: Easing::Linear,
            support_mouse: false,
            set_sizes: true,
            set_styles: true,
            only_one_slide_per_gesture: false,
            delegate_to_parent: true,
            edge_resistance: EdgeResistance::default(),
        }
    }
}

impl CarouselConfig {
    #[must_use]
    pub fn with_snap(mut self, snap: bool) -> Self {
        self.snap = snap;
        self
    }

    #[must_use]
    pub fn with_slide_strength(mut self, strength: f64) -> Self {
        self.slide_strength = strength;
        self
    }

    #[must_use]
    pub fn with_velocity_scale(mut self, scale: f64) -> Self {
        self.velocity_scale = scale;
        self
    }

    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn with_mouse_support(mut self, support_mouse: bool) -> Self {
        self.support_mouse = support_mouse;
        self
    }

    #[must_use]
    pub fn with_managed_layout(mut self, set_sizes: bool, set_styles: bool) -> Self {
        self.set_sizes = set_sizes;
        self.set_styles = set_styles;
        self
    }

    #[must_use]
    pub fn with_one_slide_per_gesture(mut self, only_one: bool) -> Self {
        self.only_one_slide_per_gesture = only_one;
        self
    }

    #[must_use]
    pub fn with_parent_delegation(mut self, delegate: bool) -> Self {
        self.delegate_to_parent = delegate;
        self
    }

    #[must_use]
    pub fn with_edge_resistance(mut self, resistance: EdgeResistance) -> Self {
        self.edge_resistance = resistance;
        self
    }

    /// Check numeric fields for values the release math cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.slide_strength.is_finite() || self.slide_strength < 0.0 {
            return Err(ConfigError::InvalidSlideStrength(self.slide_strength));
        }
        if !self.velocity_scale.is_finite() || self.velocity_scale <= 0.0 {
            return Err(ConfigError::InvalidVelocityScale(self.velocity_scale));
        }
        if let EdgeResistance::Damped { factor } = self.edge_resistance
            && !(0.0..=1.0).contains(&factor)
        {
            return Err(ConfigError::InvalidEdgeDamping(factor));
        }
        if let Easing::CubicBezier(x1, y1, x2, y2) = self.easing {
            let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
            if !finite || !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                return Err(ConfigError::InvalidEasing(self.easing));
            }
        }
        Ok(())
    }
}
