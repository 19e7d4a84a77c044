// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use roundhouse_engine::run_error;
use roundhouse_engine::test_helpers::start_test;

#[test]
fn tasks_run_to_completion() {
    let mut engine = start_test(file!());

    let counter = Rc::new(RefCell::new(0));
    for _ in 0..10 {
        let counter = counter.clone();
        engine.spawn(async move {
            *counter.borrow_mut() += 1;
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*counter.borrow(), 10);
}

#[test]
fn tasks_can_spawn_tasks() {
    let mut engine = start_test(file!());
    let spawner = engine.spawner();

    let counter = Rc::new(RefCell::new(0));
    {
        let counter = counter.clone();
        engine.spawn(async move {
            for _ in 0..3 {
                let counter = counter.clone();
                spawner.spawn(async move {
                    *counter.borrow_mut() += 1;
                    Ok(())
                });
            }
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*counter.borrow(), 3);
}

#[test]
fn first_error_aborts_the_run() {
    let mut engine = start_test(file!());

    engine.spawn(async { run_error!("stage fault") });

    let err = engine.run().unwrap_err();
    assert_eq!(format!("{err}"), "Error: stage fault");
}
