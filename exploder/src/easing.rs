use serde::Deserialize;

/// Transition curves. Every variant is monotonic on `[0, 1]` and maps 1 to exactly 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Cubic ease-in.
    EaseIn,
    /// Cubic ease-out.
    EaseOut,
    /// Cubic ease-in-out.
    EaseInOut,
    #[default]
    EaseOutQuart,
}

impl Easing {
    /// Map linear progress `t` to eased progress. `t` is clamped to `[0, 1]`;
    /// non-finite input counts as finished.
    pub fn apply(self, t: f32) -> f32 {
        if !t.is_finite() || t >= 1.0 {
            return 1.0;
        }
        if t <= 0.0 {
            return 0.0;
        }

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseOutQuart,
    ];

    #[test]
    fn curves_hit_endpoints_exactly() {
        for e in ALL {
            assert_eq!(e.apply(0.0), 0.0, "{e:?}");
            assert_eq!(e.apply(1.0), 1.0, "{e:?}");
            assert_eq!(e.apply(7.5), 1.0, "{e:?}");
            assert_eq!(e.apply(-1.0), 0.0, "{e:?}");
            assert_eq!(e.apply(f32::NAN), 1.0, "{e:?}");
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for e in ALL {
            let mut prev = 0.0;
            for i in 1..=200 {
                let v = e.apply(i as f32 / 200.0);
                assert!(v >= prev, "{e:?} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn in_out_is_symmetric_around_half() {
        let e = Easing::EaseInOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1.0e-6);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1.0e-5);
    }
}
