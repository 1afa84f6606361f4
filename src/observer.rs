//! The consumer side of a stream.
//!
//! An [`Observer`] receives any number of `next` values followed by at
//! most one terminal event (`error` or `complete`). The runtime never
//! delivers anything after a terminal event or after the owning
//! subscription was cancelled.

/// Observer capability set: `next`, `error`, `complete`.
///
/// All methods take `&mut self`; terminal-once is enforced by the guards
/// in sources and operators, with [`is_closed`](Observer::is_closed) as
/// the early-exit signal synchronous producers poll between emissions.
pub trait Observer<Item, Err> {
  /// Receive the next value.
  fn next(&mut self, value: Item);

  /// Receive the terminal error.
  fn error(&mut self, err: Err);

  /// Receive the completion notification.
  fn complete(&mut self);

  /// `true` once this observer saw a terminal event and must not be
  /// called again.
  fn is_closed(&self) -> bool;
}

impl<Item, Err> Observer<Item, Err> for Box<dyn Observer<Item, Err>> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Closure adapter backing the `subscribe_*` helpers.
///
/// Keeps its own closed flag so a misbehaving producer can never push a
/// value past the terminal event into user code.
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
  closed: bool,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self {
    ObserverAll { next, error, complete, closed: false }
  }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  fn next(&mut self, value: Item) {
    if !self.closed {
      (self.next)(value)
    }
  }

  fn error(&mut self, err: Err) {
    if !self.closed {
      self.closed = true;
      (self.error)(err)
    }
  }

  fn complete(&mut self) {
    if !self.closed {
      self.closed = true;
      (self.complete)()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed }
}
