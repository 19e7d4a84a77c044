// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A join event that releases its listeners once a fixed number of
//! arrivals have been recorded.
//!
//! This is the synchronisation point between a set of fanned-out tasks and
//! the task that must only continue once all of them have finished, for
//! example the per-iteration stage tasks of a pipeline and the iteration
//! driver.
//!
//! # Example
//!
//! ```rust
//! use roundhouse_engine::engine::Engine;
//! use roundhouse_engine::events::barrier::Barrier;
//! use roundhouse_engine::traits::Event;
//!
//! let mut engine = Engine::default();
//! let barrier = Barrier::new(2);
//! for _ in 0..2 {
//!     let barrier = barrier.clone();
//!     engine.spawn(async move { barrier.arrive() });
//! }
//! let joined = barrier.clone();
//! engine.spawn(async move {
//!     joined.listen().await;
//!     Ok(())
//! });
//! engine.run().unwrap();
//! assert!(barrier.is_released());
//! ```

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures::Future;
use futures::future::FusedFuture;

use crate::run_error;
use crate::traits::{BoxFuture, Event};
use crate::types::RunResult;

struct BarrierState {
    expected: usize,
    arrived: RefCell<usize>,
    listen_waiting: RefCell<Vec<Waker>>,
}

/// A fixed-count join event.
#[derive(Clone)]
pub struct Barrier {
    state: Rc<BarrierState>,
}

impl Barrier {
    /// Create a barrier that releases after `expected` arrivals.
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            state: Rc::new(BarrierState {
                expected,
                arrived: RefCell::new(0),
                listen_waiting: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Record one arrival, waking all listeners on the last one.
    pub fn arrive(&self) -> RunResult {
        {
            let mut arrived = self.state.arrived.borrow_mut();
            if *arrived >= self.state.expected {
                run_error!("barrier arrival after release");
            }
            *arrived += 1;
            if *arrived < self.state.expected {
                return Ok(());
            }
        }
        for waker in self.state.listen_waiting.borrow_mut().drain(..) {
            waker.wake();
        }
        Ok(())
    }

    /// Whether all expected arrivals have been recorded.
    #[must_use]
    pub fn is_released(&self) -> bool {
        *self.state.arrived.borrow() >= self.state.expected
    }
}

impl Event<()> for Barrier {
    fn listen(&self) -> BoxFuture<'static, ()> {
        Box::pin(BarrierFuture {
            state: self.state.clone(),
            done: false,
        })
    }
}

pub struct BarrierFuture {
    state: Rc<BarrierState>,
    done: bool,
}

impl Future for BarrierFuture {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if *self.state.arrived.borrow() >= self.state.expected {
            self.done = true;
            Poll::Ready(())
        } else {
            self.state
                .listen_waiting
                .borrow_mut()
                .push(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl FusedFuture for BarrierFuture {
    fn is_terminated(&self) -> bool {
        self.done
    }
}
