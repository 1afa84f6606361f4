use crate::prelude::*;

/// Emits `0, 1, 2, ...` every `period` on `scheduler`; never completes.
///
/// Unsubscribing cancels the underlying timer task; a tick that was
/// already queued when the cancellation happened is dropped before
/// delivery, so the observer sees nothing after `unsubscribe` returns.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let scheduler = TestScheduler::new();
/// let ticks = Rc::new(RefCell::new(Vec::new()));
/// let t = ticks.clone();
/// observable::interval(Duration::from_secs(1), scheduler.clone())
///   .subscribe(move |n| t.borrow_mut().push(n));
///
/// scheduler.advance(Duration::from_secs(2));
/// assert_eq!(*ticks.borrow(), vec![0, 1]);
/// ```
pub fn interval<S>(period: Duration, scheduler: S) -> IntervalObservable<S>
where
  S: Scheduler,
{
  IntervalObservable { period, scheduler }
}

#[derive(Clone)]
pub struct IntervalObservable<S> {
  period: Duration,
  scheduler: S,
}

impl<S, Err> Observable<usize, Err> for IntervalObservable<S>
where
  S: Scheduler,
  Err: 'static,
{
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<usize, Err> + 'static,
  {
    let handle = self.scheduler.schedule_repeating(self.period, move |seq| {
      if observer.is_closed() {
        false
      } else {
        observer.next(seq);
        true
      }
    });
    let subscription = Subscription::new();
    subscription.add_child(handle);
    subscription
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn emits_sequence_numbers_on_the_virtual_clock() {
    let scheduler = TestScheduler::new();
    let ticks = Rc::new(RefCell::new(Vec::new()));
    let t = ticks.clone();
    interval(Duration::from_millis(1000), scheduler.clone())
      .subscribe(move |n| t.borrow_mut().push(n));

    scheduler.advance(Duration::from_millis(500));
    assert!(ticks.borrow().is_empty());

    scheduler.advance(Duration::from_millis(3000));
    assert_eq!(*ticks.borrow(), vec![0, 1, 2]);
  }

  #[test]
  fn no_tick_is_delivered_after_unsubscribe() {
    let scheduler = TestScheduler::new();
    let ticks = Rc::new(RefCell::new(Vec::new()));
    let t = ticks.clone();
    let mut subscription = interval(Duration::from_millis(10), scheduler.clone())
      .subscribe(move |n| t.borrow_mut().push(n));

    scheduler.advance(Duration::from_millis(25));
    assert_eq!(*ticks.borrow(), vec![0, 1]);

    // The next tick is already queued; cancelling now must still win.
    subscription.unsubscribe();
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(*ticks.borrow(), vec![0, 1]);
  }

  #[test]
  fn each_subscription_gets_its_own_timer() {
    let scheduler = TestScheduler::new();
    let source = interval(Duration::from_millis(10), scheduler.clone());

    let first = Rc::new(RefCell::new(Vec::new()));
    let f = first.clone();
    source.clone().subscribe(move |n| f.borrow_mut().push(n));

    scheduler.advance(Duration::from_millis(10));

    let second = Rc::new(RefCell::new(Vec::new()));
    let s = second.clone();
    source.subscribe(move |n| s.borrow_mut().push(n));

    scheduler.advance(Duration::from_millis(10));
    assert_eq!(*first.borrow(), vec![0, 1]);
    // The late subscription restarts from zero on its own schedule.
    assert_eq!(*second.borrow(), vec![0]);
  }
}
