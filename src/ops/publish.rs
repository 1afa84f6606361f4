use crate::prelude::*;

pub trait Publish: Sized {
  /// Wraps the source in a [`Connectable`] so several observers share one
  /// execution, started by `connect`.
  fn publish<Item, Err>(self) -> Connectable<Self, Item, Err> {
    Connectable::new(self)
  }
}

impl<S> Publish for S {}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn publish_defers_the_source_until_connect() {
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let shared = create(move |emitter: &mut dyn Emitter<i32, &str>| {
      r.set(r.get() + 1);
      emitter.next(1);
      emitter.complete();
    })
    .publish::<i32, &str>();

    shared.clone().subscribe_err(|_| {}, |_| {});
    assert_eq!(runs.get(), 0);

    shared.connect();
    assert_eq!(runs.get(), 1);
  }
}
