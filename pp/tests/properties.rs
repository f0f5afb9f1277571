//! Property tests for the scheduler and conflict detector

use chrono::NaiveDate;
use pawpal::domain::{Owner, Pet, Task, TimeOfDay, TimeSlot};
use pawpal::scheduler::{Scheduler, Strategy as PlanStrategy, detect_conflicts};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct TaskShape {
    duration: u32,
    priority: u8,
    preferred: Option<u32>,
    flexible: bool,
    category: usize,
}

const CATEGORIES: [&str; 3] = ["feeding", "exercise", "grooming"];

fn arb_task() -> impl Strategy<Value = TaskShape> {
    (
        1u32..=90,
        0u8..=10,
        prop::option::of(360u32..1260),
        any::<bool>(),
        0usize..CATEGORIES.len(),
    )
        .prop_map(|(duration, priority, preferred, flexible, category)| TaskShape {
            duration,
            priority,
            // Inflexible tasks always carry a preferred time
            flexible: flexible || preferred.is_none(),
            preferred,
            category,
        })
}

fn arb_strategy() -> impl Strategy<Value = PlanStrategy> {
    prop_oneof![Just(PlanStrategy::PriorityFirst), Just(PlanStrategy::TimeBlockOptimized)]
}

fn build_owner(available: i32, pets: &[Vec<TaskShape>]) -> Owner {
    let mut owner = Owner::new("Prop", available);
    for (p, shapes) in pets.iter().enumerate() {
        let mut pet = Pet::new(format!("pet {}", p), "dog", 3);
        for (i, shape) in shapes.iter().enumerate() {
            let mut task = Task::new(format!("task {}-{}", p, i), shape.duration, shape.priority)
                .with_category(CATEGORIES[shape.category]);
            if let Some(minutes) = shape.preferred {
                let time = TimeOfDay::from_minutes(minutes);
                task = if shape.flexible { task.preferred_at(time) } else { task.fixed_at(time) };
            }
            pet.add_task(task);
        }
        owner.add_pet(pet);
    }
    owner
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Placed tasks of the same pet never overlap, and the plan stays within
    /// the owner's budget
    #[test]
    fn prop_plan_is_conflict_free_per_pet(
        available in 0i32..600,
        pets in prop::collection::vec(prop::collection::vec(arb_task(), 0..8), 1..4),
        strategy in arb_strategy()
    ) {
        let owner = build_owner(available, &pets);
        let outcome = Scheduler::new(day()).generate_schedule(&owner, strategy).unwrap();

        for (i, a) in outcome.plan.entries.iter().enumerate() {
            for b in &outcome.plan.entries[i + 1..] {
                if a.pet_name == b.pet_name {
                    prop_assert!(!a.slot.overlaps(&b.slot));
                }
            }
        }
        prop_assert!(i64::from(outcome.plan.total_minutes()) <= i64::from(available));

        let task_count: usize = pets.iter().map(Vec::len).sum();
        prop_assert_eq!(outcome.plan.len() + outcome.unscheduled.len(), task_count);
    }

    /// Identical inputs give identical plans and explanations
    #[test]
    fn prop_scheduling_is_deterministic(
        available in 0i32..600,
        pets in prop::collection::vec(prop::collection::vec(arb_task(), 0..8), 1..4),
        strategy in arb_strategy()
    ) {
        let owner = build_owner(available, &pets);
        let mut first = Scheduler::new(day());
        let mut second = Scheduler::new(day());

        prop_assert_eq!(
            first.generate_schedule(&owner, strategy).unwrap(),
            second.generate_schedule(&owner, strategy).unwrap()
        );
        prop_assert_eq!(first.explain_schedule(), second.explain_schedule());
    }

    /// Rescheduling twice without changes gives the same plan
    #[test]
    fn prop_reschedule_is_idempotent(
        available in 0i32..600,
        pets in prop::collection::vec(prop::collection::vec(arb_task(), 0..8), 1..4),
        strategy in arb_strategy()
    ) {
        let owner = build_owner(available, &pets);
        let mut scheduler = Scheduler::new(day());
        scheduler.generate_schedule(&owner, strategy).unwrap();

        let once = scheduler.reschedule(&owner).unwrap();
        let twice = scheduler.reschedule(&owner).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Untimed flexible tasks that fit the budget and the day are all placed
    #[test]
    fn prop_everything_fits_when_budget_allows(
        pets in prop::collection::vec(
            prop::collection::vec(arb_task().prop_map(|shape| TaskShape {
                flexible: true,
                preferred: None,
                ..shape
            }), 0..6),
            1..3
        ),
        strategy in arb_strategy()
    ) {
        let requested: u32 = pets.iter().flatten().map(|shape| shape.duration).sum();
        prop_assume!(requested <= 16 * 60);

        let owner = build_owner(requested as i32, &pets);
        let outcome = Scheduler::new(day()).generate_schedule(&owner, strategy).unwrap();
        prop_assert!(outcome.unscheduled.is_empty());
        prop_assert_eq!(outcome.plan.total_minutes(), requested);
    }

    /// The sweep finds exactly the pairs a brute-force check finds
    #[test]
    fn prop_detector_matches_pairwise_check(
        shapes in prop::collection::vec(arb_task(), 0..12)
    ) {
        let owner = build_owner(600, &[shapes]);
        let tasks: Vec<&Task> = owner.tasks().map(|(_, task)| task).collect();
        let slots: Vec<Option<TimeSlot>> = tasks.iter().map(|task| task.preferred_slot()).collect();

        let mut expected = 0;
        for i in 0..slots.len() {
            for j in i + 1..slots.len() {
                if let (Some(a), Some(b)) = (slots[i], slots[j]) && a.overlaps(&b) {
                    expected += 1;
                }
            }
        }

        let report = detect_conflicts(tasks.iter().copied(), Task::preferred_slot);
        prop_assert_eq!(report.len(), expected);
        prop_assert!(report.cross_pet.is_empty());
    }
}
