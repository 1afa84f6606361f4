use crate::prelude::*;

/// Object-safe mirror of [`Observable`], the vtable behind
/// [`BoxedObservable`].
pub trait DynObservable<Item, Err> {
  fn subscribe_boxed(
    self: Box<Self>,
    observer: Box<dyn Observer<Item, Err>>,
  ) -> Subscription;
}

impl<T, Item, Err> DynObservable<Item, Err> for T
where
  T: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn subscribe_boxed(
    self: Box<Self>,
    observer: Box<dyn Observer<Item, Err>>,
  ) -> Subscription {
    (*self).actual_subscribe(observer)
  }
}

/// Type-erased observable.
///
/// Selector closures must return one concrete type from every branch;
/// erasing with [`box_it`](crate::ops::box_it::BoxIt::box_it) lets an
/// `of(..)` arm and a `throw(..)` arm unify:
///
/// ```
/// use rivulet::prelude::*;
///
/// fn pick(fail: bool) -> BoxedObservable<i32, &'static str> {
///   if fail {
///     observable::throw("nope").box_it()
///   } else {
///     observable::of(1).box_it()
///   }
/// }
/// ```
pub struct BoxedObservable<Item, Err>(Box<dyn DynObservable<Item, Err>>);

impl<Item, Err> BoxedObservable<Item, Err> {
  pub fn new(source: impl DynObservable<Item, Err> + 'static) -> Self {
    BoxedObservable(Box::new(source))
  }
}

impl<Item, Err> Observable<Item, Err> for BoxedObservable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    self.0.subscribe_boxed(Box::new(observer))
  }
}
