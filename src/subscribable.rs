//! Terminal subscribe helpers layered over [`Observable::actual_subscribe`].
//!
//! `subscribe` is only offered for infallible streams; a chain whose error
//! type is anything else must say what to do with errors via
//! `subscribe_err` or `subscribe_all`.

use std::convert::Infallible;

use crate::{
  observable::Observable,
  observer::ObserverAll,
  subscription::Subscription,
};

fn absurd(err: Infallible) { match err {} }

pub trait SubscribePure<Item>: Observable<Item, Infallible> {
  fn subscribe<N>(self, next: N) -> Subscription
  where
    N: FnMut(Item) + 'static,
    Item: 'static,
  {
    self.actual_subscribe(ObserverAll::new(next, absurd, || {}))
  }
}

impl<S, Item> SubscribePure<Item> for S where S: Observable<Item, Infallible> {}

pub trait SubscribeErr<Item, Err>: Observable<Item, Err> {
  fn subscribe_err<N, E>(self, next: N, error: E) -> Subscription
  where
    N: FnMut(Item) + 'static,
    E: FnMut(Err) + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.actual_subscribe(ObserverAll::new(next, error, || {}))
  }
}

impl<S, Item, Err> SubscribeErr<Item, Err> for S where S: Observable<Item, Err> {}

pub trait SubscribeAll<Item, Err>: Observable<Item, Err> {
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + 'static,
    E: FnMut(Err) + 'static,
    C: FnMut() + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.actual_subscribe(ObserverAll::new(next, error, complete))
  }
}

impl<S, Item, Err> SubscribeAll<Item, Err> for S where S: Observable<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[test]
  fn subscribe_is_available_on_infallible_chains() {
    let sum = Rc::new(Cell::new(0));
    let s = sum.clone();
    from_iter(1..=4).subscribe(move |v| s.set(s.get() + v));
    assert_eq!(sum.get(), 10);
  }

  #[test]
  fn subscribe_all_observes_the_full_lifecycle() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2) = (log.clone(), log.clone());
    from_iter(vec![1]).subscribe_all(
      move |v| l1.borrow_mut().push(format!("next {v}")),
      |_: &str| {},
      move || l2.borrow_mut().push("complete".into()),
    );
    assert_eq!(*log.borrow(), vec!["next 1", "complete"]);
  }
}
