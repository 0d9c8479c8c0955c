use chrono::{Duration, NaiveDate};
use liftmax::equivalence::{SolverConfig, build_equivalence_table, find_max_weight_for_reps};
use liftmax::records::rank_records;
use liftmax::{ExerciseFamily, PersonalRecord, compute_one_rep_max};
use proptest::prelude::*;

fn any_family() -> impl Strategy<Value = ExerciseFamily> {
    prop::sample::select(ExerciseFamily::all().to_vec())
}

/// Families whose estimate rises with weight everywhere. MuscleUp drops where
/// its closed form hands over to the fallback and is covered separately.
fn linear_family() -> impl Strategy<Value = ExerciseFamily> {
    prop::sample::select(vec![
        ExerciseFamily::PullUp,
        ExerciseFamily::Dip,
        ExerciseFamily::Squat,
    ])
}

/// Radicand of the muscle-up closed form; negative means fallback territory.
fn muscle_up_radicand(added: f64, bodyweight: f64, reps: u32) -> f64 {
    let rep_term = (reps as f64).powf(1.5) - 1.0;
    added * added - 294.0 * added - 24.0 * bodyweight * rep_term.sqrt() + 21600.0
}

proptest! {
    #[test]
    fn one_rm_non_decreasing_in_weight(
        family in linear_family(),
        bodyweight in 45.0f64..150.0,
        reps in 1u32..=20,
        weight in 0.0f64..200.0,
        delta in 0.0f64..50.0,
    ) {
        let lower = compute_one_rep_max(family, weight, bodyweight, reps);
        let upper = compute_one_rep_max(family, weight + delta, bodyweight, reps);
        prop_assert!(upper >= lower, "{} {} -> {}", family, lower, upper);
    }

    #[test]
    fn muscle_up_closed_form_non_decreasing_in_weight(
        bodyweight in 45.0f64..110.0,
        reps in 1u32..=20,
        weight in 0.0f64..60.0,
        delta in 0.0f64..10.0,
    ) {
        let heavier = (weight + delta).min(60.0);
        prop_assume!(muscle_up_radicand(heavier, bodyweight, reps) >= 0.0);

        let lower = compute_one_rep_max(ExerciseFamily::MuscleUp, weight, bodyweight, reps);
        let upper = compute_one_rep_max(ExerciseFamily::MuscleUp, heavier, bodyweight, reps);
        prop_assert!(upper >= lower);
    }

    #[test]
    fn table_non_increasing_in_reps(
        family in linear_family(),
        bodyweight in 45.0f64..120.0,
        added in 20.0f64..100.0,
        reps in 1u32..=10,
    ) {
        let one_rm = compute_one_rep_max(family, added, bodyweight, reps);
        let table = build_equivalence_table(family, one_rm, bodyweight, reps, added);

        for pair in table.windows(2) {
            prop_assert!(
                pair[1].max_weight_kg <= pair[0].max_weight_kg,
                "{:?} then {:?}", pair[0], pair[1]
            );
        }
    }

    #[test]
    fn muscle_up_table_non_increasing_in_closed_form(
        bodyweight in 50.0f64..80.0,
        added in 0.0f64..15.0,
        reps in 1u32..=5,
    ) {
        let one_rm = compute_one_rep_max(ExerciseFamily::MuscleUp, added, bodyweight, reps);
        // Every bisection midpoint for rows 1..=10 stays below this ceiling
        let ceiling = one_rm * SolverConfig::default().search_ceiling_factor;
        prop_assume!(ceiling <= 147.0);
        prop_assume!(muscle_up_radicand(ceiling, bodyweight, 10) >= 0.0);

        let table =
            build_equivalence_table(ExerciseFamily::MuscleUp, one_rm, bodyweight, reps, added);
        for pair in table.windows(2) {
            prop_assert!(
                pair[1].max_weight_kg <= pair[0].max_weight_kg,
                "{:?} then {:?}", pair[0], pair[1]
            );
        }
    }

    #[test]
    fn table_contains_logged_set(
        family in any_family(),
        bodyweight in 45.0f64..150.0,
        added in 0.0f64..60.0,
        reps in 1u32..=10,
    ) {
        let one_rm = compute_one_rep_max(family, added, bodyweight, reps);
        let table = build_equivalence_table(family, one_rm, bodyweight, reps, added);

        prop_assert_eq!(table.len(), 10);
        let row = table.iter().find(|p| p.reps == reps);
        prop_assert!(row.is_some());
        prop_assert!((row.unwrap().max_weight_kg - added).abs() <= 0.05 + 1e-9);
    }

    #[test]
    fn bisection_meets_a_tolerance(
        family in any_family(),
        bodyweight in 45.0f64..150.0,
        target in 0.0f64..300.0,
        reps in 1u32..=20,
    ) {
        let config = SolverConfig::default();
        let outcome = find_max_weight_for_reps(family, reps, target, bodyweight, &config);

        prop_assert!(outcome.weight_kg >= 0.0);
        prop_assert!(outcome.iterations <= config.max_iterations);
        prop_assert!(
            (outcome.computed_one_rm_kg - target).abs() < config.one_rm_tolerance
                || outcome.bracket_width_kg < config.bracket_tolerance
        );
    }

    #[test]
    fn ranking_has_single_leader(
        entries in prop::collection::vec((0.0f64..500.0, 0i64..365), 1..30),
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<PersonalRecord> = entries
            .iter()
            .enumerate()
            .map(|(i, &(one_rm, offset))| PersonalRecord {
                id: i as u64,
                family: ExerciseFamily::Dip,
                weight_kg: one_rm,
                reps: 1,
                date: start + Duration::days(offset),
                calculated_1rm_kg: one_rm,
                notes: None,
            })
            .collect();

        let ranked = rank_records(records);

        prop_assert_eq!(ranked.len(), entries.len());
        prop_assert_eq!(ranked.iter().filter(|r| r.percentage_of_best == 100).count(), 1);
        prop_assert!(ranked.iter().all(|r| r.percentage_of_best <= 100));
        prop_assert_eq!(ranked[0].percentage_of_best, 100);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].record.calculated_1rm_kg >= pair[1].record.calculated_1rm_kg);
        }
    }
}
