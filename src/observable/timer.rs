use crate::prelude::*;

/// Emits `value` once after `delay`, then completes.
///
/// The unit of delayed work: `delay_when` duration selectors and
/// `retry_when` back-off notifiers are usually built from it.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let scheduler = TestScheduler::new();
/// let got = Rc::new(RefCell::new(None));
/// let g = got.clone();
/// observable::timer("done", Duration::from_secs(5), scheduler.clone())
///   .subscribe(move |v| *g.borrow_mut() = Some(v));
///
/// scheduler.advance(Duration::from_secs(4));
/// assert_eq!(*got.borrow(), None);
/// scheduler.advance(Duration::from_secs(1));
/// assert_eq!(*got.borrow(), Some("done"));
/// ```
pub fn timer<Item, S>(
  value: Item,
  delay: Duration,
  scheduler: S,
) -> TimerObservable<Item, S>
where
  S: Scheduler,
{
  TimerObservable { value, delay, scheduler }
}

#[derive(Clone)]
pub struct TimerObservable<Item, S> {
  value: Item,
  delay: Duration,
  scheduler: S,
}

impl<Item, Err, S> Observable<Item, Err> for TimerObservable<Item, S>
where
  S: Scheduler,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let value = self.value;
    let handle = self.scheduler.schedule_once(self.delay, move || {
      if !observer.is_closed() {
        observer.next(value);
        observer.complete();
      }
    });
    let subscription = Subscription::new();
    subscription.add_child(handle);
    subscription
  }
}
