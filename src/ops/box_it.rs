use crate::prelude::*;

pub trait BoxIt: Sized {
  /// Erases the concrete observable type so differently shaped chains can
  /// share one name.
  fn box_it<Item, Err>(self) -> BoxedObservable<Item, Err>
  where
    Self: Observable<Item, Err> + 'static,
    Item: 'static,
    Err: 'static,
  {
    BoxedObservable::new(self)
  }
}

impl<S> BoxIt for S {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn boxed_chains_with_different_shapes_share_a_type() {
    fn pick(flag: bool) -> BoxedObservable<i32, &'static str> {
      if flag {
        of(1).map(|v| v + 1).box_it()
      } else {
        from_iter(vec![5, 6]).box_it()
      }
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    pick(true).subscribe_err(move |v| s.borrow_mut().push(v), |_| {});
    let s = seen.clone();
    pick(false).subscribe_err(move |v| s.borrow_mut().push(v), |_| {});

    assert_eq!(*seen.borrow(), vec![2, 5, 6]);
  }
}
