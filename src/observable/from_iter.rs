use crate::prelude::*;

/// Emits every value of `iter` in order, then completes, synchronously.
///
/// The iterable is cloned per subscriber, so each subscription walks the
/// sequence from the start. Emission stops early once the observer
/// reports itself closed.
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let sum = Rc::new(Cell::new(0));
/// let s = sum.clone();
/// observable::from_iter(1..=5).subscribe(move |v| s.set(s.get() + v));
/// assert_eq!(sum.get(), 15);
/// ```
pub fn from_iter<I>(iter: I) -> FromIterObservable<I>
where
  I: IntoIterator + Clone,
{
  FromIterObservable { iter }
}

#[derive(Clone)]
pub struct FromIterObservable<I> {
  iter: I,
}

impl<I, Err> Observable<I::Item, Err> for FromIterObservable<I>
where
  I: IntoIterator + Clone,
  I::Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<I::Item, Err> + 'static,
  {
    for value in self.iter {
      if observer.is_closed() {
        return Subscription::closed();
      }
      observer.next(value);
    }
    observer.complete();
    Subscription::closed()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn emits_the_sequence_in_order_then_completes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(RefCell::new(false));
    let s = seen.clone();
    let c = completed.clone();
    from_iter([1, 2, 3, 4, 5]).subscribe_all(
      move |v| s.borrow_mut().push(v),
      |_: &str| unreachable!(),
      move || *c.borrow_mut() = true,
    );

    assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 5]);
    assert!(*completed.borrow());
  }

  #[test]
  fn two_subscriptions_run_two_independent_producers() {
    let source = from_iter(vec![1, 2, 3]);
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));

    let f = first.clone();
    source.clone().subscribe(move |v| f.borrow_mut().push(v));
    let s = second.clone();
    source.subscribe(move |v| s.borrow_mut().push(v));

    // Not interleaved into one observer: each run starts over.
    assert_eq!(*first.borrow(), vec![1, 2, 3]);
    assert_eq!(*second.borrow(), vec![1, 2, 3]);
  }
}
