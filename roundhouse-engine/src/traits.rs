// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the Roundhouse engine.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::types::RunResult;

/// Values that can be carried through pipeline buffers and moved between
/// executor tasks.
///
///  - Clone:    Buffers hand copies of their contents to stage tasks while
///    retaining their own. It would be nice to use `Copy` instead, but
///    tensor-like payloads are not `Copy`.
///  - Debug:    In order to print "{:?}" payloads have to at least
///    implement Debug.
///  - Default:  Buffers are zero-filled before any real value has been
///    produced; `Default` provides the fill value.
///  - 'static:  Due to the way that futures are implemented, the lifetimes
///    need to be `static.
pub trait Payload: Clone + Debug + Default + 'static {}

impl<T> Payload for T where T: Clone + Debug + Default + 'static {}

/// The `Event` trait defines an object that can be waited on.
///
/// This is a trait that defines the `listen` function that returns a
/// future so that it can be used in `async` code.
pub trait Event<T> {
    /// Wait for the event to fire, yielding its value.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    fn listen(&self) -> BoxFuture<'static, T>;
}

/// A block with a `run()` entry point that can be spawned onto the
/// executor.
#[async_trait(?Send)]
pub trait Runnable {
    /// Drive the block to completion.
    async fn run(&self) -> RunResult;
}

/// A boxed, non-`Send` future as produced by [`Event::listen`].
pub type BoxFuture<'a, T> = Pin<std::boxed::Box<dyn Future<Output = T> + 'a>>;
