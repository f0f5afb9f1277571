//! Scheduler implementation

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

use crate::domain::{Frequency, Owner, Priority, Task, TaskId, TimeOfDay, TimeSlot};
use crate::error::PlanError;

use super::config::Strategy;
use super::conflict::{Conflict, detect_conflicts};
use super::plan::{DailyPlan, PlacementRule, PlanEntry, ScheduleOutcome, Unscheduled, UnscheduledReason};

/// A task admitted to the working set of one run
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    /// Position in the owner's task graph (pet order, then insertion order)
    index: usize,
    /// Position in the strategy's processing order
    order: usize,
    task: &'a Task,
    pet_name: &'a str,
}

/// A tentative placement
#[derive(Debug, Clone, Copy)]
struct Placement<'a> {
    candidate: Candidate<'a>,
    slot: TimeSlot,
    rule: PlacementRule,
}

/// How one conflict gets resolved
#[derive(Debug, Clone, Copy)]
enum Resolution {
    /// Remove an inflexible task that lost against a higher-priority fixed task
    Drop(usize),
    /// Move a pinned inflexible task back to its preferred time
    Unpin(usize),
    /// Re-place a flexible task in the next open window
    Shift(usize),
}

/// Remembered state of the last run, for explanations and rescheduling
#[derive(Debug, Clone)]
struct LastRun {
    strategy: Strategy,
    outcome: ScheduleOutcome,
    trace: Vec<String>,
}

/// The Scheduler turns an owner's task graph into a daily plan.
///
/// Runs are pure over the borrowed owner; the scheduler only remembers the
/// last outcome so it can explain it and reschedule with fixed placements
/// preserved.
#[derive(Debug, Clone)]
pub struct Scheduler {
    date: NaiveDate,
    last: Option<LastRun>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::for_today()
    }
}

impl Scheduler {
    /// Create a scheduler planning the given date
    pub fn new(date: NaiveDate) -> Self {
        debug!(%date, "Scheduler::new: called");
        Self { date, last: None }
    }

    /// Create a scheduler planning today's local date
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Outcome of the last run, if any
    pub fn last_outcome(&self) -> Option<&ScheduleOutcome> {
        self.last.as_ref().map(|run| &run.outcome)
    }

    /// Plan with the owner's preferred strategy
    pub fn generate(&mut self, owner: &Owner) -> Result<ScheduleOutcome, PlanError> {
        self.generate_schedule(owner, owner.preferences.strategy)
    }

    /// Plan the owner's day with the given strategy
    pub fn generate_schedule(&mut self, owner: &Owner, strategy: Strategy) -> Result<ScheduleOutcome, PlanError> {
        debug!(owner = %owner.name, %strategy, "Scheduler::generate_schedule: called");
        self.run(owner, strategy, HashMap::new())
    }

    /// Re-plan after the task graph changed, keeping inflexible tasks at
    /// their previous start unless that start is now in conflict
    pub fn reschedule(&mut self, owner: &Owner) -> Result<ScheduleOutcome, PlanError> {
        debug!(owner = %owner.name, "Scheduler::reschedule: called");
        let (strategy, pins) = match &self.last {
            Some(run) => {
                let pins = run
                    .outcome
                    .plan
                    .entries
                    .iter()
                    .filter(|entry| !entry.task.is_flexible)
                    .map(|entry| (entry.task.id.clone(), entry.slot.start))
                    .collect();
                (run.strategy, pins)
            }
            None => {
                debug!("Scheduler::reschedule: no previous run, planning fresh");
                (owner.preferences.strategy, HashMap::new())
            }
        };
        self.run(owner, strategy, pins)
    }

    /// Human-readable trace of the last run, one line per decision
    pub fn explain_schedule(&self) -> Vec<String> {
        self.last.as_ref().map(|run| run.trace.clone()).unwrap_or_default()
    }

    fn run(
        &mut self,
        owner: &Owner,
        strategy: Strategy,
        pins: HashMap<TaskId, TimeOfDay>,
    ) -> Result<ScheduleOutcome, PlanError> {
        owner.validate()?;
        let window = owner.preferences.window()?;

        let candidates = order_candidates(working_set(owner, self.date), strategy);
        let requested: i64 = candidates.iter().map(|c| i64::from(c.task.duration)).sum();
        let available = i64::from(owner.available_time);

        let mut trace = vec![format!(
            "Plan for {} on {} using {}: {} tasks requesting {}m of {}m available between {} and {}",
            owner.name,
            self.date,
            strategy,
            candidates.len(),
            requested,
            available,
            window.start,
            window.end
        )];
        if requested <= available {
            debug!(requested, available, "Scheduler::run: all tasks fit the budget");
            trace.push("All tasks fit within the available time".to_string());
        } else {
            debug!(requested, available, "Scheduler::run: over budget, strategy decides");
            trace.push(format!(
                "Requested time exceeds available time by {}m; lower-ranked tasks may be left out",
                requested - available
            ));
        }

        let requested_tasks = candidates.len();
        let mut planning = PlanningRun::new(strategy, window, available, pins);
        for candidate in candidates {
            planning.admit(candidate);
        }
        planning.resolve_conflicts();
        // Minutes refunded by dropped tasks go to the tasks turned away earlier
        for _ in 0..requested_tasks {
            if !planning.readmit_turned_away() {
                break;
            }
            planning.resolve_conflicts();
        }

        let outcome = planning.finish(self.date, &mut trace);
        info!(
            owner = %owner.name,
            %strategy,
            placed = outcome.plan.len(),
            unscheduled = outcome.unscheduled.len(),
            "Schedule generated"
        );

        self.last = Some(LastRun {
            strategy,
            outcome: outcome.clone(),
            trace,
        });
        Ok(outcome)
    }
}

/// Whether a task belongs on the plan for `date`
fn is_due(task: &Task, date: NaiveDate) -> bool {
    if task.completion_status && task.frequency == Frequency::Once {
        return false;
    }
    match task.due_date {
        None => true,
        Some(due) => match due.cmp(&date) {
            Ordering::Greater => false,
            // Overdue pending occurrences carry over, finished ones are history
            Ordering::Less => !task.completion_status,
            Ordering::Equal => true,
        },
    }
}

fn working_set(owner: &Owner, date: NaiveDate) -> Vec<Candidate<'_>> {
    // Completed occurrences that already have a successor are history
    let superseded: HashSet<&TaskId> = owner
        .tasks()
        .filter_map(|(_, task)| task.recurs_from.as_ref())
        .collect();
    owner
        .tasks()
        .enumerate()
        .filter(|(_, (_, task))| !(task.completion_status && superseded.contains(&task.id)))
        .filter(|(_, (_, task))| is_due(task, date))
        .map(|(index, (pet, task))| Candidate {
            index,
            order: 0,
            task,
            pet_name: pet.name.as_str(),
        })
        .collect()
}

/// Priority descending, shorter first, then by name, then input order
fn by_priority(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.task
        .priority
        .cmp(&a.task.priority)
        .then_with(|| a.task.duration.cmp(&b.task.duration))
        .then_with(|| a.task.description.cmp(&b.task.description))
        .then_with(|| a.index.cmp(&b.index))
}

fn order_candidates(mut candidates: Vec<Candidate<'_>>, strategy: Strategy) -> Vec<Candidate<'_>> {
    match strategy {
        Strategy::PriorityFirst => candidates.sort_by(by_priority),
        Strategy::TimeBlockOptimized => {
            let mut block_priority: HashMap<&str, Priority> = HashMap::new();
            for candidate in &candidates {
                let priority = candidate.task.priority;
                block_priority
                    .entry(candidate.task.category.as_str())
                    .and_modify(|best| *best = (*best).max(priority))
                    .or_insert(priority);
            }
            candidates.sort_by(|a, b| {
                let (ca, cb) = (a.task.category.as_str(), b.task.category.as_str());
                block_priority[cb]
                    .cmp(&block_priority[ca])
                    .then_with(|| ca.cmp(cb))
                    .then_with(|| by_priority(a, b))
            });
        }
    }
    for (order, candidate) in candidates.iter_mut().enumerate() {
        candidate.order = order;
    }
    candidates
}

/// Open windows inside `window` not covered by any busy slot
fn open_windows(window: TimeSlot, mut busy: Vec<TimeSlot>) -> Vec<TimeSlot> {
    busy.sort_by_key(|slot| slot.start);
    let mut gaps = Vec::new();
    let mut cursor = window.start;
    for slot in busy {
        if slot.end <= cursor {
            continue;
        }
        if let Some(gap) = TimeSlot::new(cursor, slot.start.min(window.end)) {
            gaps.push(gap);
        }
        cursor = slot.end;
        if cursor >= window.end {
            break;
        }
    }
    if let Some(gap) = TimeSlot::new(cursor, window.end) {
        gaps.push(gap);
    }
    gaps
}

/// Mutable state of one planning run
struct PlanningRun<'a> {
    strategy: Strategy,
    window: TimeSlot,
    remaining: i64,
    pins: HashMap<TaskId, TimeOfDay>,
    placed: Vec<Placement<'a>>,
    rejected: Vec<(Candidate<'a>, UnscheduledReason)>,
    events: Vec<String>,
}

impl<'a> PlanningRun<'a> {
    fn new(strategy: Strategy, window: TimeSlot, available: i64, pins: HashMap<TaskId, TimeOfDay>) -> Self {
        Self {
            strategy,
            window,
            remaining: available,
            pins,
            placed: Vec::new(),
            rejected: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Greedy placement of one task in processing order
    fn admit(&mut self, candidate: Candidate<'a>) {
        let task = candidate.task;
        debug!(task = %task.description, order = candidate.order, "PlanningRun::admit: called");

        if i64::from(task.duration) > self.remaining {
            debug!(task = %task.description, remaining = self.remaining, "PlanningRun::admit: over budget");
            self.reject(candidate, UnscheduledReason::InsufficientRemainingTime);
            return;
        }

        if task.is_flexible {
            match self.find_open_slot(&candidate, None) {
                Some((slot, rule)) => self.place(candidate, slot, rule),
                None => {
                    debug!(task = %task.description, "PlanningRun::admit: no open window");
                    self.reject(candidate, UnscheduledReason::InsufficientRemainingTime);
                }
            }
            return;
        }

        match self.fixed_slot(task) {
            Some((slot, rule)) => self.place(candidate, slot, rule),
            None => {
                debug!(task = %task.description, "PlanningRun::admit: fixed slot outside the day window");
                self.reject(candidate, UnscheduledReason::NoFitInflexibleConflict);
            }
        }
    }

    /// Slot of an inflexible task: its pin if that still fits the window,
    /// otherwise its preferred time
    fn fixed_slot(&self, task: &Task) -> Option<(TimeSlot, PlacementRule)> {
        let preferred = task.preferred_time?;
        if let Some(&pinned) = self.pins.get(&task.id)
            && pinned != preferred
            && let Some(slot) = TimeSlot::starting_at(pinned, task.duration)
            && self.window.contains(&slot)
        {
            return Some((slot, PlacementRule::PinnedFromPreviousRun));
        }
        TimeSlot::starting_at(preferred, task.duration)
            .filter(|slot| self.window.contains(slot))
            .map(|slot| (slot, PlacementRule::FixedPreferredTime))
    }

    /// Earliest (or nearest-to-preferred) open window for a flexible task,
    /// ignoring the placement at `skip`
    fn find_open_slot(&self, candidate: &Candidate<'a>, skip: Option<usize>) -> Option<(TimeSlot, PlacementRule)> {
        let task = candidate.task;
        let duration = task.duration;
        let busy = self
            .placed
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, p)| p.slot)
            .collect();
        let gaps: Vec<TimeSlot> = open_windows(self.window, busy)
            .into_iter()
            .filter(|gap| gap.duration() >= duration)
            .collect();

        if let Some(preferred) = task.preferred_time {
            return gaps
                .iter()
                .filter_map(|gap| {
                    let latest = gap.end.minutes() - duration;
                    let start = TimeOfDay::from_minutes(preferred.minutes().clamp(gap.start.minutes(), latest));
                    TimeSlot::starting_at(start, duration)
                })
                .min_by_key(|slot| (slot.start.distance(preferred), slot.start))
                .map(|slot| (slot, PlacementRule::NearPreferredTime));
        }

        if self.strategy == Strategy::TimeBlockOptimized
            && let Some(cursor) = self.block_cursor(&task.category, skip)
        {
            let after_block = gaps.iter().find_map(|gap| {
                let start = gap.start.max(cursor);
                TimeSlot::starting_at(start, duration).filter(|slot| gap.contains(slot))
            });
            if let Some(slot) = after_block {
                return Some((slot, PlacementRule::CategoryBlock));
            }
        }

        gaps.first()
            .and_then(|gap| TimeSlot::starting_at(gap.start, duration))
            .map(|slot| (slot, PlacementRule::EarliestOpenSlot))
    }

    /// End of the most recent placement in the same category
    fn block_cursor(&self, category: &str, skip: Option<usize>) -> Option<TimeOfDay> {
        self.placed
            .iter()
            .enumerate()
            .rev()
            .find(|(i, p)| Some(*i) != skip && p.candidate.task.category == category)
            .map(|(_, p)| p.slot.end)
    }

    fn place(&mut self, candidate: Candidate<'a>, slot: TimeSlot, rule: PlacementRule) {
        debug!(task = %candidate.task.description, %slot, ?rule, "PlanningRun::place: called");
        self.remaining -= i64::from(candidate.task.duration);
        self.placed.push(Placement { candidate, slot, rule });
    }

    fn reject(&mut self, candidate: Candidate<'a>, reason: UnscheduledReason) {
        debug!(task = %candidate.task.description, %reason, "PlanningRun::reject: called");
        self.rejected.push((candidate, reason));
    }

    /// Admit again, in processing order, every task rejected for lack of
    /// time or space. Returns whether any of them got placed.
    fn readmit_turned_away(&mut self) -> bool {
        let (mut retry, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.rejected)
            .into_iter()
            .partition(|(_, reason)| *reason == UnscheduledReason::InsufficientRemainingTime);
        self.rejected = kept;
        if retry.is_empty() {
            return false;
        }
        retry.sort_by_key(|(candidate, _)| candidate.order);
        debug!(count = retry.len(), remaining = self.remaining, "PlanningRun::readmit_turned_away: called");

        let before = self.placed.len();
        for (candidate, _) in retry {
            self.admit(candidate);
        }
        self.placed.len() > before
    }

    /// Remove a placement, refunding its minutes
    fn unplace(&mut self, index: usize) -> Placement<'a> {
        let placement = self.placed.remove(index);
        self.remaining += i64::from(placement.candidate.task.duration);
        placement
    }

    fn position(&self, task_id: &TaskId) -> Option<usize> {
        self.placed.iter().position(|p| &p.candidate.task.id == task_id)
    }

    /// Repeatedly detect conflicts and fix the first resolvable one.
    ///
    /// Every step either removes a placement, moves a flexible task into a
    /// window that overlaps nothing, or un-pins a task (at most once each),
    /// so the loop terminates.
    fn resolve_conflicts(&mut self) {
        debug!(placed = self.placed.len(), "PlanningRun::resolve_conflicts: called");
        loop {
            let slots: HashMap<&TaskId, TimeSlot> =
                self.placed.iter().map(|p| (&p.candidate.task.id, p.slot)).collect();
            let report = detect_conflicts(self.placed.iter().map(|p| p.candidate.task), |task| {
                slots.get(&task.id).copied()
            });
            let Some((conflict, resolution)) = report
                .iter()
                .find_map(|conflict| self.resolution_for(conflict).map(|r| (conflict.clone(), r)))
            else {
                debug!("PlanningRun::resolve_conflicts: no resolvable conflicts left");
                break;
            };
            self.apply(&conflict, resolution);
        }
    }

    fn resolution_for(&self, conflict: &Conflict) -> Option<Resolution> {
        let a = self.position(&conflict.first.task_id)?;
        let b = self.position(&conflict.second.task_id)?;
        let (pa, pb) = (&self.placed[a], &self.placed[b]);

        match (pa.candidate.task.is_flexible, pb.candidate.task.is_flexible) {
            (false, false) => {
                let same_pet = conflict.first.pet.is_some() && conflict.first.pet == conflict.second.pet;
                if !same_pet {
                    return None;
                }
                let (winner, loser) = match pa.candidate.task.priority.cmp(&pb.candidate.task.priority) {
                    Ordering::Greater => (a, b),
                    Ordering::Less => (b, a),
                    Ordering::Equal if pa.candidate.order > pb.candidate.order => (b, a),
                    Ordering::Equal => (a, b),
                };
                // A stale pin on either side is released before anything is dropped
                [winner, loser]
                    .into_iter()
                    .find(|&i| self.placed[i].rule == PlacementRule::PinnedFromPreviousRun)
                    .map(Resolution::Unpin)
                    .or(Some(Resolution::Drop(loser)))
            }
            (true, false) => Some(Resolution::Shift(a)),
            (false, true) => Some(Resolution::Shift(b)),
            (true, true) => Some(Resolution::Shift(if pa.candidate.order > pb.candidate.order {
                a
            } else {
                b
            })),
        }
    }

    fn apply(&mut self, conflict: &Conflict, resolution: Resolution) {
        let (first, second, overlap) = (&conflict.first.description, &conflict.second.description, conflict.overlap);
        match resolution {
            Resolution::Drop(index) => {
                let placement = self.unplace(index);
                debug!(task = %placement.candidate.task.description, "PlanningRun::apply: dropping lower-priority fixed task");
                self.events.push(format!(
                    "Conflict: '{}' and '{}' overlap at {}; '{}' yields to the higher-priority fixed task",
                    first, second, overlap, placement.candidate.task.description
                ));
                self.reject(
                    placement.candidate,
                    UnscheduledReason::ConflictWithHigherPriorityFixedTask,
                );
            }
            Resolution::Unpin(index) => {
                let task = self.placed[index].candidate.task;
                self.pins.remove(&task.id);
                debug!(task = %task.description, "PlanningRun::apply: un-pinning fixed task");
                match self.fixed_slot(task) {
                    Some((slot, rule)) => {
                        self.events.push(format!(
                            "Conflict: '{}' and '{}' overlap at {}; '{}' returns to its preferred time {}",
                            first, second, overlap, task.description, slot.start
                        ));
                        self.placed[index].slot = slot;
                        self.placed[index].rule = rule;
                    }
                    None => {
                        let placement = self.unplace(index);
                        self.reject(placement.candidate, UnscheduledReason::NoFitInflexibleConflict);
                    }
                }
            }
            Resolution::Shift(index) => {
                let candidate = self.placed[index].candidate;
                match self.find_open_slot(&candidate, Some(index)) {
                    Some((slot, _)) => {
                        debug!(task = %candidate.task.description, %slot, "PlanningRun::apply: shifting flexible task");
                        self.events.push(format!(
                            "Conflict: '{}' and '{}' overlap at {}; '{}' moves to {}",
                            first, second, overlap, candidate.task.description, slot
                        ));
                        self.placed[index].slot = slot;
                        self.placed[index].rule = PlacementRule::ShiftedAfterConflict;
                    }
                    None => {
                        debug!(task = %candidate.task.description, "PlanningRun::apply: no window left for flexible task");
                        self.events.push(format!(
                            "Conflict: '{}' and '{}' overlap at {}; no open window left for '{}'",
                            first, second, overlap, candidate.task.description
                        ));
                        let placement = self.unplace(index);
                        self.reject(placement.candidate, UnscheduledReason::InsufficientRemainingTime);
                    }
                }
            }
        }
    }

    /// Sort placements into the plan and render the trace
    fn finish(mut self, date: NaiveDate, trace: &mut Vec<String>) -> ScheduleOutcome {
        self.placed.sort_by(|a, b| {
            a.slot
                .start
                .cmp(&b.slot.start)
                .then_with(|| a.candidate.pet_name.cmp(b.candidate.pet_name))
                .then_with(|| a.candidate.task.description.cmp(&b.candidate.task.description))
                .then_with(|| a.candidate.order.cmp(&b.candidate.order))
        });
        self.rejected.sort_by_key(|(candidate, _)| candidate.order);

        trace.append(&mut self.events);

        let mut per_category: BTreeMap<&str, u32> = BTreeMap::new();
        for placement in &self.placed {
            let task = placement.candidate.task;
            *per_category.entry(task.category.as_str()).or_default() += task.duration;
            trace.push(format!(
                "{} {}: {} (priority {}, {}m) - {}",
                placement.slot,
                placement.candidate.pet_name,
                task.description,
                task.priority,
                task.duration,
                placement.rule.describe()
            ));
        }
        for (candidate, reason) in &self.rejected {
            trace.push(format!(
                "unscheduled {}: {} (priority {}, {}m) - {}",
                candidate.pet_name, candidate.task.description, candidate.task.priority, candidate.task.duration, reason
            ));
        }
        if !per_category.is_empty() {
            let summary: Vec<String> = per_category.iter().map(|(c, m)| format!("{} {}m", c, m)).collect();
            trace.push(format!("Time by category: {}", summary.join(", ")));
        }

        let entries = self
            .placed
            .into_iter()
            .map(|p| PlanEntry {
                slot: p.slot,
                task: p.candidate.task.clone(),
                pet_name: p.candidate.pet_name.to_string(),
                rule: p.rule,
            })
            .collect();
        let unscheduled = self
            .rejected
            .into_iter()
            .map(|(candidate, reason)| Unscheduled {
                task: candidate.task.clone(),
                pet_name: candidate.pet_name.to_string(),
                reason,
            })
            .collect();

        ScheduleOutcome {
            plan: DailyPlan {
                date,
                strategy: self.strategy,
                entries,
            },
            unscheduled,
        }
    }
}
