use crate::prelude::*;

pub trait Tap {
  /// Runs a side effect on each value without changing the stream.
  fn tap<Item, F>(self, f: F) -> TapOp<Self, F>
  where
    Self: Sized,
    F: FnMut(&Item),
  {
    TapOp { source: self, func: f }
  }
}

impl<S> Tap for S {}

#[derive(Clone)]
pub struct TapOp<S, F> {
  source: S,
  func: F,
}

impl<Item, Err, S, F> Observable<Item, Err> for TapOp<S, F>
where
  S: Observable<Item, Err>,
  F: FnMut(&Item) + 'static,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    self
      .source
      .actual_subscribe(TapObserver { observer, func: self.func })
  }
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value);
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn side_effect_sees_each_value_before_downstream() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let tapped = log.clone();
    let emitted = log.clone();
    from_iter(1..=2)
      .tap(move |v| tapped.borrow_mut().push(format!("tap {v}")))
      .subscribe(move |v| emitted.borrow_mut().push(format!("next {v}")));

    assert_eq!(
      *log.borrow(),
      vec!["tap 1", "next 1", "tap 2", "next 2"]
    );
  }

  #[test]
  fn values_pass_through_unchanged() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    from_iter(vec![7, 8])
      .tap(|_| {})
      .subscribe(move |v| s.borrow_mut().push(v));

    assert_eq!(*seen.borrow(), vec![7, 8]);
  }
}
