use super::*;
use std::sync::atomic::AtomicUsize;

fn counter_task(counter: &Arc<AtomicUsize>) -> Task {
    let counter = Arc::clone(counter);
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

// =============================================================================
// TimerHandle
// =============================================================================

#[test]
fn timer_handle_starts_active() {
    assert!(!TimerHandle::new().is_cancelled());
}

#[test]
fn timer_handle_cancel_is_shared_by_clones() {
    let handle = TimerHandle::new();
    let clone = handle.clone();
    clone.cancel();
    assert!(handle.is_cancelled());
}

#[test]
fn timer_handle_cancel_twice_is_harmless() {
    let handle = TimerHandle::new();
    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());
}

#[test]
fn cancel_hook_runs_once_across_clones() {
    let counter = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&counter);
    let handle = TimerHandle::new().with_cancel_hook(move || {
        hook_counter.fetch_add(1, Ordering::SeqCst);
    });
    let clone = handle.clone();

    clone.cancel();
    handle.cancel();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn debug_reports_cancel_state() {
    let handle = TimerHandle::new();
    handle.cancel();
    assert!(format!("{handle:?}").contains("cancelled: true"));
}

// =============================================================================
// ManualScheduler
// =============================================================================

#[test]
fn manual_scheduler_clock_starts_at_zero() {
    assert_eq!(ManualScheduler::new().now_ms(), 0);
}

#[test]
fn manual_scheduler_starting_at_sets_clock() {
    assert_eq!(ManualScheduler::starting_at(1_700_000_000_000).now_ms(), 1_700_000_000_000);
}

#[test]
fn task_does_not_run_before_deadline() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler.schedule(Duration::from_millis(100), counter_task(&counter));

    scheduler.advance(Duration::from_millis(99));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(scheduler.pending(), 1);
}

#[test]
fn task_runs_exactly_at_deadline() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler.schedule(Duration::from_millis(100), counter_task(&counter));

    scheduler.advance(Duration::from_millis(100));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn task_runs_once_even_after_further_advances() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler.schedule(Duration::from_millis(10), counter_task(&counter));

    scheduler.advance(Duration::from_millis(50));
    scheduler.advance(Duration::from_millis(50));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn cancelled_task_never_runs() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let handle = scheduler.schedule(Duration::from_millis(10), counter_task(&counter));
    handle.cancel();

    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn advance_moves_clock_to_target() {
    let scheduler = ManualScheduler::starting_at(1000);
    scheduler.advance(Duration::from_millis(250));
    assert_eq!(scheduler.now_ms(), 1250);
}

#[test]
fn tasks_run_in_deadline_order() {
    let scheduler = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for (label, delay) in [("late", 30), ("early", 10), ("middle", 20)] {
        let order = Arc::clone(&order);
        scheduler.schedule(Duration::from_millis(delay), Box::new(move || order.lock().unwrap().push(label)));
    }

    scheduler.advance(Duration::from_millis(30));
    assert_eq!(*order.lock().unwrap(), vec!["early", "middle", "late"]);
}

#[test]
fn equal_deadlines_run_in_schedule_order() {
    let scheduler = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for label in ["a", "b", "c"] {
        let order = Arc::clone(&order);
        scheduler.schedule(Duration::from_millis(5), Box::new(move || order.lock().unwrap().push(label)));
    }

    scheduler.advance(Duration::from_millis(5));
    assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn clock_reads_deadline_while_task_runs() {
    let scheduler = Arc::new(ManualScheduler::new());
    let seen = Arc::new(AtomicUsize::new(0));
    {
        let scheduler_in_task = Arc::clone(&scheduler);
        let seen = Arc::clone(&seen);
        scheduler.schedule(
            Duration::from_millis(40),
            Box::new(move || {
                let now = usize::try_from(scheduler_in_task.now_ms()).unwrap();
                seen.store(now, Ordering::SeqCst);
            }),
        );
    }

    scheduler.advance(Duration::from_millis(100));
    assert_eq!(seen.load(Ordering::SeqCst), 40);
    assert_eq!(scheduler.now_ms(), 100);
}

#[test]
fn task_scheduled_from_task_runs_within_same_window() {
    let scheduler = Arc::new(ManualScheduler::new());
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let inner_scheduler = Arc::clone(&scheduler);
        let counter = Arc::clone(&counter);
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_scheduler.schedule(Duration::from_millis(10), counter_task(&counter));
            }),
        );
    }

    scheduler.advance(Duration::from_millis(15));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    scheduler.advance(Duration::from_millis(5));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
