use std::marker::PhantomData;

use crate::prelude::*;

/// Calls `error(err)` synchronously and emits nothing else.
///
/// Generic over the item type it claims to produce, so it can stand in
/// for any observable inside `merge_map`/`catch_error` branches.
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let caught = Rc::new(Cell::new(""));
/// let c = caught.clone();
/// observable::throw::<i32, _>("boom")
///   .subscribe_err(|_| unreachable!(), move |e| c.set(e));
/// assert_eq!(caught.get(), "boom");
/// ```
pub fn throw<Item, Err>(err: Err) -> ThrowObservable<Item, Err> {
  ThrowObservable { err, _marker: PhantomData }
}

pub struct ThrowObservable<Item, Err> {
  err: Err,
  _marker: PhantomData<Item>,
}

impl<Item, Err: Clone> Clone for ThrowObservable<Item, Err> {
  fn clone(&self) -> Self {
    ThrowObservable { err: self.err.clone(), _marker: PhantomData }
  }
}

impl<Item, Err> Observable<Item, Err> for ThrowObservable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    observer.error(self.err);
    Subscription::closed()
  }
}
