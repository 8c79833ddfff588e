use super::FieldState;
use crate::config::{Decay, Propagation};
use crate::kernel::{Kernel, CENTER};
use crate::source::BaseInfluence;
use crate::topology::Layout;

/// Stronger signal wins: the base value replaces the pending value only when
/// its magnitude exceeds the stored one. Base values are first brought into
/// the clamp range; NaN injects nothing.
pub(crate) fn inject<S: ?Sized, F: BaseInfluence<S>>(
    state: &mut FieldState,
    source: &F,
    snapshot: &S,
    clamp_limit: f64,
) {
    let FieldState {
        layout,
        values,
        pending,
        ..
    } = state;
    for ((&cell, &current), slot) in layout
        .cells()
        .iter()
        .zip(values.iter())
        .zip(pending.iter_mut())
    {
        let base = sanitize_base(source.base_influence(cell, snapshot), clamp_limit);
        *slot = override_by_magnitude(current, base);
    }
}

pub(crate) fn sanitize_base(base: f64, clamp_limit: f64) -> f64 {
    if base.is_nan() {
        0.0
    } else {
        base.clamp(-clamp_limit, clamp_limit)
    }
}

pub(crate) fn override_by_magnitude(current: f64, base: f64) -> f64 {
    if current.abs() < base.abs() {
        base
    } else {
        current
    }
}

/// Fill `provisional` from `pending`. Reads never observe writes of the same
/// tick.
pub(crate) fn propagate(state: &mut FieldState, propagation: &Propagation) {
    let FieldState {
        layout,
        pending,
        provisional,
        ..
    } = state;
    match propagation {
        Propagation::Kernel { kernel, decay } => {
            for (slot, out) in provisional.iter_mut().enumerate() {
                *out = convolve(layout, pending, slot, kernel, decay);
            }
        }
        Propagation::DecayedDominance { decay } => {
            for (slot, out) in provisional.iter_mut().enumerate() {
                *out = dominant_neighbor(layout, pending, slot, decay);
            }
        }
    }
}

/// Out-of-bounds and unregistered neighbors contribute nothing and the
/// kernel is not renormalized, so edge cells receive less mass.
fn convolve(layout: &Layout, pending: &[f64], slot: usize, kernel: &Kernel, decay: &Decay) -> f64 {
    layout
        .kernel_neighbors(slot)
        .iter()
        .enumerate()
        .filter_map(|(i, neighbor)| neighbor.map(|n| (i, n)))
        .map(|(i, n)| {
            let contribution = pending[n] * kernel.weight(i);
            if i == CENTER {
                contribution
            } else {
                decay.apply(contribution)
            }
        })
        .sum()
}

/// Pick the decayed orthogonal neighbor with the largest magnitude; ties go
/// to the maximum. Isolated cells get 0.
fn dominant_neighbor(layout: &Layout, pending: &[f64], slot: usize, decay: &Decay) -> f64 {
    let mut decayed = layout
        .orthogonal_neighbors(slot)
        .into_iter()
        .flatten()
        .map(|n| decay.apply(pending[n]));
    let Some(first) = decayed.next() else {
        return 0.0;
    };
    let (min, max) = decayed.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.abs() > max.abs() {
        min
    } else {
        max
    }
}

/// `values = values * momentum + provisional * (1 - momentum)`, clamped.
pub(crate) fn smooth(state: &mut FieldState, momentum: f64, clamp_limit: f64) {
    for (value, &provisional) in state.values.iter_mut().zip(state.provisional.iter()) {
        let blended = *value * momentum + provisional * (1.0 - momentum);
        *value = blended.clamp(-clamp_limit, clamp_limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKey;

    fn state_with(width: u32, height: u32, pending: &[f64]) -> FieldState {
        let keys = (0..height).flat_map(|y| (0..width).map(move |x| CellKey::from_xy(x, y)));
        let layout = Layout::new(width, height, keys);
        let n = layout.len();
        FieldState {
            layout,
            values: vec![0.0; n],
            pending: pending.to_vec(),
            provisional: vec![0.0; n],
        }
    }

    #[test]
    fn override_keeps_stronger_signal() {
        assert_eq!(override_by_magnitude(0.1, 0.5), 0.5);
        assert_eq!(override_by_magnitude(0.5, 0.1), 0.5);
        assert_eq!(override_by_magnitude(0.3, -0.7), -0.7);
        assert_eq!(override_by_magnitude(-0.4, 0.4), -0.4);
    }

    #[test]
    fn base_values_are_brought_into_range() {
        assert_eq!(sanitize_base(f64::INFINITY, 1.0), 1.0);
        assert_eq!(sanitize_base(f64::NEG_INFINITY, 0.5), -0.5);
        assert_eq!(sanitize_base(f64::NAN, 1.0), 0.0);
        assert_eq!(sanitize_base(-0.3, 1.0), -0.3);
    }

    #[test]
    fn dominance_prefers_larger_magnitude() {
        // 3x1 row: center sees -0.8 on the left and 0.5 on the right.
        let mut state = state_with(3, 1, &[-0.8, 0.0, 0.5]);
        propagate(
            &mut state,
            &Propagation::DecayedDominance { decay: Decay::None },
        );
        assert_eq!(state.provisional[1], -0.8);
    }

    #[test]
    fn dominance_tie_favors_maximum() {
        let mut state = state_with(3, 1, &[-0.5, 0.0, 0.5]);
        propagate(
            &mut state,
            &Propagation::DecayedDominance { decay: Decay::None },
        );
        assert_eq!(state.provisional[1], 0.5);
    }

    #[test]
    fn dominance_applies_decay() {
        let mut state = state_with(2, 1, &[1.0, 0.0]);
        propagate(
            &mut state,
            &Propagation::DecayedDominance {
                decay: Decay::Linear { strength: 0.25 },
            },
        );
        assert_eq!(state.provisional[1], 0.25);
    }

    #[test]
    fn convolution_spreads_center_mass() {
        let mut pending = vec![0.0; 9];
        pending[4] = 1.0;
        let mut state = state_with(3, 3, &pending);
        let kernel = Kernel::default();
        propagate(
            &mut state,
            &Propagation::Kernel {
                kernel,
                decay: Decay::None,
            },
        );
        let total: f64 = state.provisional.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(state.provisional[4], kernel.weight(CENTER));
    }

    #[test]
    fn kernel_decay_skips_center() {
        let mut pending = vec![0.0; 9];
        pending[4] = 1.0;
        let mut state = state_with(3, 3, &pending);
        propagate(
            &mut state,
            &Propagation::Kernel {
                kernel: Kernel::default(),
                decay: Decay::Linear { strength: 0.0 },
            },
        );
        assert_eq!(state.provisional[4], 0.25);
        assert!(state
            .provisional
            .iter()
            .enumerate()
            .all(|(i, &v)| i == 4 || v == 0.0));
    }

    #[test]
    fn smoothing_blends_and_clamps() {
        let mut state = state_with(2, 1, &[0.0, 0.0]);
        state.values = vec![0.4, 0.9];
        state.provisional = vec![0.0, 3.0];
        smooth(&mut state, 0.5, 1.0);
        assert!((state.values[0] - 0.2).abs() < 1e-12);
        assert_eq!(state.values[1], 1.0);
    }
}
