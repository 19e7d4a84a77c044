// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! An event that can be triggered multiple times. The event allows the
//! notifier to pass a custom result to its listeners on each notification,
//! using the `notify_result()` method. Alternatively, the last set result
//! will be provided to the listeners. If no result has been set, the
//! default value for the result type will be used.
//!
//! The pipeline scheduler uses this to publish iteration progress: each
//! completed iteration notifies with its index, and observers (such as a
//! progress bar task) pick up the latest value when they are next polled.

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures::Future;
use futures::future::FusedFuture;

use crate::traits::{BoxFuture, Event};
use crate::types::RunResult;

struct RepeatedState<T>
where
    T: Copy,
{
    listen_waiting: RefCell<Vec<Waker>>,
    result: RefCell<T>,
}

/// A repeatable notification carrying a value of type `T`.
pub struct Repeated<T>
where
    T: Copy,
{
    state: Rc<RepeatedState<T>>,
}

impl<T> Clone for Repeated<T>
where
    T: Copy,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Repeated<T>
where
    T: Copy,
{
    /// Create the event with an initial result value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            state: Rc::new(RepeatedState {
                listen_waiting: RefCell::new(Vec::new()),
                result: RefCell::new(value),
            }),
        }
    }

    /// Wake all current listeners with the last set result.
    pub fn notify(&self) -> RunResult {
        for waker in self.state.listen_waiting.borrow_mut().drain(..) {
            waker.wake();
        }
        Ok(())
    }

    /// Set the result and wake all current listeners.
    pub fn notify_result(&self, result: T) -> RunResult {
        *self.state.result.borrow_mut() = result;
        self.notify()
    }
}

impl<T> Default for Repeated<T>
where
    T: Copy + Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Event<T> for Repeated<T>
where
    T: Copy + 'static,
{
    fn listen(&self) -> BoxFuture<'static, T> {
        Box::pin(RepeatedFuture {
            state: self.state.clone(),
            init: false,
            done: false,
        })
    }
}

pub struct RepeatedFuture<T>
where
    T: Copy,
{
    state: Rc<RepeatedState<T>>,
    init: bool,
    done: bool,
}

impl<T> Future for RepeatedFuture<T>
where
    T: Copy,
{
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.init {
            self.done = true;
            Poll::Ready(*self.state.result.borrow())
        } else {
            self.init = true;
            self.state
                .listen_waiting
                .borrow_mut()
                .push(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl<T> FusedFuture for RepeatedFuture<T>
where
    T: Copy,
{
    fn is_terminated(&self) -> bool {
        self.done
    }
}
