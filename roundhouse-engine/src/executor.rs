// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Single-threaded cooperative executor.
//!
//! The executor polls every runnable task in turn. A task that cannot make
//! progress parks itself by storing the [`Waker`] it is polled with (for
//! example inside a [`Barrier`](crate::events::barrier::Barrier)); waking
//! that waker moves the task back onto the run queue. The run ends when no
//! task is runnable.
//!
//! Tasks are `!Send`: everything runs on the calling thread, and tasks
//! share state through `Rc`/`RefCell`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::mem::ManuallyDrop;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use roundhouse_track::entity::Entity;

use crate::types::RunResult;

struct Task {
    future: RefCell<Pin<Box<dyn Future<Output = RunResult>>>>,
    executor_state: Rc<ExecutorState>,
}

impl Task {
    fn new(
        future: impl Future<Output = RunResult> + 'static,
        executor_state: Rc<ExecutorState>,
    ) -> Task {
        Task {
            future: RefCell::new(Box::pin(future)),
            executor_state,
        }
    }

    fn poll(&self, context: &mut Context) -> Poll<RunResult> {
        self.future.borrow_mut().as_mut().poll(context)
    }
}

// Wakers carry an `Rc<Task>` behind a raw pointer. `clone`/`drop` adjust
// the reference count; waking pushes the task onto the woken list.

static VTABLE: RawWakerVTable =
    RawWakerVTable::new(clone_raw_waker, wake_task, wake_task_by_ref, drop_raw_waker);

fn waker_for(task: Rc<Task>) -> Waker {
    let ptr = Rc::into_raw(task) as *const ();
    unsafe { Waker::from_raw(RawWaker::new(ptr, &VTABLE)) }
}

unsafe fn clone_raw_waker(data: *const ()) -> RawWaker {
    unsafe {
        let task = ManuallyDrop::new(Rc::from_raw(data as *const Task));
        let ptr = Rc::into_raw((*task).clone()) as *const ();
        RawWaker::new(ptr, &VTABLE)
    }
}

unsafe fn wake_task(data: *const ()) {
    unsafe {
        // Consumes the waker's reference.
        let task = Rc::from_raw(data as *const Task);
        let woken = task.clone();
        task.executor_state.woken.borrow_mut().push(woken);
    }
}

unsafe fn wake_task_by_ref(data: *const ()) {
    unsafe {
        let task = ManuallyDrop::new(Rc::from_raw(data as *const Task));
        let woken = (*task).clone();
        task.executor_state.woken.borrow_mut().push(woken);
    }
}

unsafe fn drop_raw_waker(data: *const ()) {
    unsafe {
        drop(Rc::from_raw(data as *const Task));
    }
}

struct ExecutorState {
    /// Tasks that are ready to be polled in the current step.
    run_queue: RefCell<VecDeque<Rc<Task>>>,

    /// Tasks spawned or woken since the last step started.
    woken: RefCell<Vec<Rc<Task>>>,
}

impl ExecutorState {
    fn new() -> Self {
        Self {
            run_queue: RefCell::new(VecDeque::new()),
            woken: RefCell::new(Vec::new()),
        }
    }

    fn spawn(self: &Rc<Self>, future: impl Future<Output = RunResult> + 'static) {
        self.woken
            .borrow_mut()
            .push(Rc::new(Task::new(future, self.clone())));
    }
}

/// Single-threaded executor.
///
/// This is a thin wrapper (using [`Rc`]) around the real executor, so that
/// this struct can be cloned and passed around.
#[derive(Clone)]
pub struct Executor {
    /// Entity for attributing executor track events.
    pub entity: Arc<Entity>,
    state: Rc<ExecutorState>,
}

impl Executor {
    /// Add a task to be run.
    pub fn spawn(&self, future: impl Future<Output = RunResult> + 'static) {
        self.state.spawn(future);
    }

    /// Run until no task can make progress.
    ///
    /// The first task error aborts the run; remaining runnable tasks are
    /// discarded.
    pub fn run(&self) -> RunResult {
        loop {
            self.step()?;
            if self.state.woken.borrow().is_empty() {
                break;
            }
        }
        Ok(())
    }

    /// Poll every currently-runnable task once.
    pub fn step(&self) -> RunResult {
        let mut run_queue = self.state.run_queue.borrow_mut();
        run_queue.extend(self.state.woken.borrow_mut().drain(..));

        while let Some(task) = run_queue.pop_front() {
            let waker = waker_for(task.clone());
            let mut context = Context::from_waker(&waker);

            match task.poll(&mut context) {
                Poll::Ready(Err(e)) => {
                    return Err(e);
                }
                Poll::Ready(Ok(())) => {
                    // Task complete, drop it
                }
                Poll::Pending => {
                    // Task has parked itself waiting somewhere
                }
            }
        }
        Ok(())
    }
}

/// `Spawner` spawns new futures into the executor.
#[derive(Clone)]
pub struct Spawner {
    state: Rc<ExecutorState>,
}

impl Spawner {
    /// Add a task to be run.
    pub fn spawn(&self, future: impl Future<Output = RunResult> + 'static) {
        self.state.spawn(future);
    }
}

/// Create a connected [`Executor`] / [`Spawner`] pair below `top`.
#[must_use]
pub fn new_executor_and_spawner(top: &Arc<Entity>) -> (Executor, Spawner) {
    let state = Rc::new(ExecutorState::new());
    let entity = Arc::new(Entity::new(top, "executor"));
    (
        Executor {
            entity,
            state: state.clone(),
        },
        Spawner { state },
    )
}
