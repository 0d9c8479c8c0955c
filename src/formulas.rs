//! One-rep-max estimation formulas for streetlifting movements.
//!
//! Every formula maps an observed set (added weight, bodyweight, reps) to an
//! estimated single-rep maximum. Degenerate inputs never error: results are
//! floored at zero and non-finite values collapse to zero.

use crate::domain::ExerciseFamily;

/// Signature shared by all family formulas: `(weight_kg, bodyweight_kg, reps) -> 1RM`.
pub type Formula = fn(f64, f64, u32) -> f64;

/// Linear rep-decay coefficient.
const LINEAR_COEFFICIENT: f64 = 0.0333;

/// Muscle-up closed form constants.
mod muscle_up {
    pub const BODYWEIGHT_FACTOR: f64 = 24.0;
    pub const LINEAR: f64 = 294.0;
    pub const OFFSET: f64 = 21600.0;
    pub const SHIFT: f64 = 147.0;
}

/// Returns the formula for an exercise family.
///
/// This is the only place families are mapped to formulas; adding a family
/// means adding one arm here.
pub fn formula_for(family: ExerciseFamily) -> Formula {
    match family {
        ExerciseFamily::PullUp | ExerciseFamily::Dip => calculate_pull_up_or_dip_1rm,
        ExerciseFamily::MuscleUp => calculate_muscle_up_1rm,
        ExerciseFamily::Squat => calculate_squat_1rm,
    }
}

/// Estimates the 1RM for a family.
///
/// For bodyweight families the result is expressed as added weight; for
/// squats it is total bar weight.
///
/// # Arguments
/// * `family` - Exercise family selecting the formula
/// * `weight_kg` - Added weight (total bar weight for squats)
/// * `bodyweight_kg` - Athlete's bodyweight
/// * `reps` - Repetitions performed
///
/// # Returns
/// Estimated 1RM in kilograms, never negative
pub fn compute_one_rep_max(
    family: ExerciseFamily,
    weight_kg: f64,
    bodyweight_kg: f64,
    reps: u32,
) -> f64 {
    formula_for(family)(weight_kg, bodyweight_kg, reps)
}

/// Linear rep-decay factor: `1 + 0.0333 × reps`.
fn linear_factor(reps: f64) -> f64 {
    1.0 + LINEAR_COEFFICIENT * reps
}

/// Harmonic rep-decay factor: `36 / (37 − reps)`. Diverges at 37 reps.
fn harmonic_factor(reps: f64) -> f64 {
    36.0 / (37.0 - reps)
}

/// Power-law rep-decay factor: `reps^0.1`.
fn power_factor(reps: f64) -> f64 {
    reps.powf(0.1)
}

/// Floors an estimate at zero, mapping NaN and infinities to zero.
fn floor_estimate(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Pull-up and dip 1RM as added-weight equivalent.
///
/// Formula:
/// ```text
/// 1RM = (added + bw) × (linear + harmonic + power) / 3 − bw
/// ```
pub fn calculate_pull_up_or_dip_1rm(added_weight_kg: f64, bodyweight_kg: f64, reps: u32) -> f64 {
    let r = reps as f64;
    let total = added_weight_kg + bodyweight_kg;
    let factor = (linear_factor(r) + harmonic_factor(r) + power_factor(r)) / 3.0;

    floor_estimate(total * factor - bodyweight_kg)
}

/// Muscle-up 1RM as added-weight equivalent.
///
/// Formula (`peso` is the added weight alone):
/// ```text
/// 1RM = 0.5 × (−√(peso² − 294·peso − 24·bw·√(reps^1.5 − 1) + 21600) + peso + 147)
/// ```
///
/// When the outer radicand is negative the closed form has no real
/// solution and the harmonic fallback is used instead. The fallback sits
/// below the closed form at the seam, so the estimate is not monotone in
/// weight there.
pub fn calculate_muscle_up_1rm(added_weight_kg: f64, bodyweight_kg: f64, reps: u32) -> f64 {
    let r = reps as f64;
    let rep_term = r.powf(1.5) - 1.0;

    // Only reps == 0 lands here
    if rep_term < 0.0 {
        return calculate_muscle_up_1rm(added_weight_kg, bodyweight_kg, 1);
    }

    let peso = added_weight_kg;
    let radicand = peso * peso - muscle_up::LINEAR * peso
        - muscle_up::BODYWEIGHT_FACTOR * bodyweight_kg * rep_term.sqrt()
        + muscle_up::OFFSET;

    if radicand < 0.0 {
        return muscle_up_fallback(added_weight_kg, bodyweight_kg, reps);
    }

    floor_estimate(0.5 * (-radicand.sqrt() + peso + muscle_up::SHIFT))
}

/// Fallback for muscle-ups outside the closed form's real domain.
fn muscle_up_fallback(added_weight_kg: f64, bodyweight_kg: f64, reps: u32) -> f64 {
    let total = added_weight_kg + bodyweight_kg;
    floor_estimate(total * harmonic_factor(reps as f64) - bodyweight_kg)
}

/// Squat 1RM from total bar weight. Bodyweight is not part of the load.
///
/// Formula:
/// ```text
/// 1RM = bar × (linear + harmonic) / 2
/// ```
pub fn calculate_squat_1rm(bar_weight_kg: f64, _bodyweight_kg: f64, reps: u32) -> f64 {
    let r = reps as f64;
    let factor = (linear_factor(r) + harmonic_factor(r)) / 2.0;

    floor_estimate(bar_weight_kg * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to check floating point equality with tolerance
    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_pull_up_five_reps() {
        // 70kg bodyweight + 20kg added, 5 reps
        // linear: 1 + 0.0333 × 5 = 1.1665
        // harmonic: 36 / 32 = 1.125
        // power: 5^0.1 = 1.17462
        // (90 × 3.46612 / 3) − 70 ≈ 33.98
        let one_rm = compute_one_rep_max(ExerciseFamily::PullUp, 20.0, 70.0, 5);
        assert!(approx_eq(one_rm, 33.98, 0.1));
    }

    #[test]
    fn test_dip_matches_pull_up() {
        let pull = compute_one_rep_max(ExerciseFamily::PullUp, 35.0, 80.0, 8);
        let dip = compute_one_rep_max(ExerciseFamily::Dip, 35.0, 80.0, 8);
        assert_eq!(pull, dip);
    }

    #[test]
    fn test_pull_up_floored_at_zero() {
        // Bodyweight only with zero reps gives a negative raw estimate
        assert_eq!(calculate_pull_up_or_dip_1rm(0.0, 70.0, 0), 0.0);
    }

    #[test]
    fn test_pull_up_single_rep_close_to_weight() {
        // At one rep the blend is (1.0333 + 1 + 1) / 3 ≈ 1.0111
        let one_rm = calculate_pull_up_or_dip_1rm(40.0, 75.0, 1);
        assert!(approx_eq(one_rm, 41.28, 0.1));
    }

    #[test]
    fn test_harmonic_divergence_is_masked() {
        assert_eq!(calculate_pull_up_or_dip_1rm(10.0, 70.0, 37), 0.0);
        assert_eq!(calculate_squat_1rm(100.0, 70.0, 37), 0.0);
        assert_eq!(calculate_squat_1rm(100.0, 70.0, 45), 0.0);
    }

    #[test]
    fn test_muscle_up_closed_form() {
        // bw 70, 10kg added, 3 reps
        // rep term: 3^1.5 − 1 = 4.196, sqrt = 2.0485
        // radicand: 100 − 2940 − 24 × 70 × 2.0485 + 21600 = 15318.5
        // 0.5 × (−123.77 + 10 + 147) = 16.62
        let one_rm = compute_one_rep_max(ExerciseFamily::MuscleUp, 10.0, 70.0, 3);
        assert!(approx_eq(one_rm, 16.62, 0.1));
    }

    #[test]
    fn test_muscle_up_single_rep_bodyweight_is_near_zero() {
        let one_rm = calculate_muscle_up_1rm(0.0, 70.0, 1);
        assert!(one_rm >= 0.0 && one_rm < 0.1);
    }

    #[test]
    fn test_muscle_up_degenerate_uses_fallback() {
        // bw 100, 60kg added, 10 reps: radicand is negative
        // fallback: 160 × 36 / 27 − 100 = 113.33
        let one_rm = calculate_muscle_up_1rm(60.0, 100.0, 10);
        assert!(one_rm.is_finite());
        assert!(approx_eq(one_rm, 113.33, 0.01));
    }

    #[test]
    fn test_muscle_up_drops_across_fallback_seam() {
        // bw 100, 10 reps: radicand is +165.9 at 31kg and −65.1 at 32kg
        // closed form at 31kg: 0.5 × (−12.88 + 31 + 147) = 82.56
        // fallback at 32kg: 132 × 36 / 27 − 100 = 76.0
        let before = compute_one_rep_max(ExerciseFamily::MuscleUp, 31.0, 100.0, 10);
        let after = compute_one_rep_max(ExerciseFamily::MuscleUp, 32.0, 100.0, 10);
        assert!(approx_eq(before, 82.56, 0.05));
        assert!(approx_eq(after, 76.0, 0.01));
        assert!(after < before);
    }

    #[test]
    fn test_muscle_up_zero_reps_treated_as_one() {
        assert_eq!(
            calculate_muscle_up_1rm(15.0, 70.0, 0),
            calculate_muscle_up_1rm(15.0, 70.0, 1)
        );
    }

    #[test]
    fn test_squat_ignores_bodyweight() {
        // 100kg × 5: (1.1665 + 1.125) / 2 × 100 = 114.58
        let light = compute_one_rep_max(ExerciseFamily::Squat, 100.0, 60.0, 5);
        let heavy = compute_one_rep_max(ExerciseFamily::Squat, 100.0, 110.0, 5);
        assert_eq!(light, heavy);
        assert!(approx_eq(light, 114.58, 0.01));
    }

    #[test]
    fn test_never_negative() {
        for family in ExerciseFamily::all() {
            for reps in 0..=50 {
                let value = compute_one_rep_max(*family, 0.0, 90.0, reps);
                assert!(value >= 0.0 && value.is_finite(), "{family} at {reps} reps");
            }
        }
    }
}
