//! Conversion from user space to device units.
//!
//! User space measures in points (1/72") with y growing down the page. The
//! device is driven in twips (1/20 of a point) with y growing upward, so every
//! odd-indexed component (the vertical one of each x/y pair) is negated.

/// Device units per point.
pub const SCALE: i32 = 20;

/// Converts a user-space tuple (a point, a box, or any run of x/y pairs)
/// into device units.
///
/// Each component is multiplied by [`SCALE`] and truncated toward zero;
/// odd-indexed components are negated.
pub fn to_device<const N: usize>(coords: [f32; N]) -> [i32; N] {
    let mut out = [0; N];
    for (index, (slot, value)) in out.iter_mut().zip(coords).enumerate() {
        *slot = scale_component(index, value);
    }
    out
}

/// Slice form of [`to_device`] for tuples whose length is only known at runtime.
pub fn to_device_units(coords: &[f32]) -> Vec<i32> {
    coords
        .iter()
        .enumerate()
        .map(|(index, value)| scale_component(index, *value))
        .collect()
}

/// Scales a length (pen width, font height) without any axis inversion.
pub fn scale_length(points: f32) -> i32 {
    (points * SCALE as f32) as i32
}

fn scale_component(index: usize, value: f32) -> i32 {
    let value = if index % 2 == 1 { -value } else { value };
    (value * SCALE as f32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn point_is_scaled_and_flipped() {
        assert_eq!(to_device([72.0, 144.0]), [1440, -2880]);
    }

    #[test]
    fn box_flips_both_vertical_components() {
        assert_eq!(
            to_device([72.0, 72.0, 432.0, 216.0]),
            [1440, -1440, 8640, -4320]
        );
    }

    #[test]
    fn fractional_points_truncate_toward_zero() {
        assert_eq!(to_device([0.01, 0.01]), [0, 0]);
        assert_eq!(to_device([1.5, 1.5]), [30, -30]);
    }

    #[test]
    fn length_is_never_flipped() {
        assert_eq!(scale_length(1.0), SCALE);
        assert_eq!(scale_length(32.0), 640);
    }

    proptest! {
        #[test]
        fn odd_components_are_negated(coords in prop::collection::vec(-5000i32..5000, 0..12)) {
            let input: Vec<f32> = coords.iter().map(|v| *v as f32).collect();
            let output = to_device_units(&input);
            prop_assert_eq!(output.len(), coords.len());
            for (index, (raw, scaled)) in coords.iter().zip(&output).enumerate() {
                let expected = if index % 2 == 1 { -raw * SCALE } else { raw * SCALE };
                prop_assert_eq!(*scaled, expected);
            }
        }
    }
}
