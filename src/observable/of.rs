use std::marker::PhantomData;

use crate::prelude::*;

/// Emits `value` to each subscriber, then completes, all synchronously
/// inside the subscribe call.
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let got = Rc::new(Cell::new(0));
/// let g = got.clone();
/// observable::of(42).subscribe(move |v| g.set(v));
/// assert_eq!(got.get(), 42);
/// ```
pub fn of<Item>(value: Item) -> OfObservable<Item> { OfObservable { value } }

#[derive(Clone)]
pub struct OfObservable<Item> {
  value: Item,
}

impl<Item, Err> Observable<Item, Err> for OfObservable<Item>
where
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    observer.next(self.value);
    observer.complete();
    Subscription::closed()
  }
}

/// Like [`of`], but the value is produced by a closure per subscriber, so
/// non-`Clone` values still get cold-subscription independence.
pub fn of_fn<Item, F>(f: F) -> OfFnObservable<F, Item>
where
  F: FnMut() -> Item,
{
  OfFnObservable { f, _marker: PhantomData }
}

pub struct OfFnObservable<F, Item> {
  f: F,
  _marker: PhantomData<Item>,
}

impl<F: Clone, Item> Clone for OfFnObservable<F, Item> {
  fn clone(&self) -> Self {
    OfFnObservable { f: self.f.clone(), _marker: PhantomData }
  }
}

impl<Item, Err, F> Observable<Item, Err> for OfFnObservable<F, Item>
where
  F: FnMut() -> Item + 'static,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(mut self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    observer.next((self.f)());
    observer.complete();
    Subscription::closed()
  }
}
