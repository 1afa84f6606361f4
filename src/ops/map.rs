use std::marker::PhantomData;

use crate::prelude::*;

pub trait Map<Item> {
  /// Calls a closure on each value and emits its return downstream.
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    Self: Sized,
    F: FnMut(Item) -> B,
  {
    MapOp { source: self, func: f, _marker: PhantomData }
  }
}

impl<S, Item> Map<Item> for S {}

pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _marker: PhantomData<Item>,
}

impl<S: Clone, F: Clone, Item> Clone for MapOp<S, F, Item> {
  fn clone(&self) -> Self {
    MapOp {
      source: self.source.clone(),
      func: self.func.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Item, B, Err, S, F> Observable<B, Err> for MapOp<S, F, Item>
where
  S: Observable<Item, Err>,
  F: FnMut(Item) -> B + 'static,
  Item: 'static,
  B: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<B, Err> + 'static,
  {
    self
      .source
      .actual_subscribe(MapObserver { observer, func: self.func })
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
