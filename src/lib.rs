//! Rivulet is a small push-based reactive stream library for
//! single-threaded use.
//!
//! An [`Observable`] describes a producer; nothing runs until an
//! [`Observer`] subscribes, and every subscription runs the producer
//! fresh. Operators compose by wrapping observables, subjects multicast,
//! and [`Connectable`] shares one execution among many observers.
//! Time-based sources take a [`Scheduler`], so tests drive them with a
//! virtual clock instead of sleeping.
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use rivulet::prelude::*;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let s = seen.clone();
//! from_iter(1..=3)
//!   .map(|v| v * 2)
//!   .subscribe(move |v| s.borrow_mut().push(v));
//! assert_eq!(*seen.borrow(), vec![2, 4, 6]);
//! ```
//!
//! Fallible chains carry a typed error channel. `subscribe` is reserved
//! for infallible streams; everything else chooses an error handler:
//!
//! ```
//! use rivulet::prelude::*;
//!
//! throw::<i32, _>("boom")
//!   .retry(2)
//!   .subscribe_err(|_| {}, |err| println!("failed with {err}"));
//! ```

pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscribable;
pub mod subscription;

pub use prelude::*;
