// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use roundhouse_engine::events::barrier::Barrier;
use roundhouse_engine::test_helpers::start_test;
use roundhouse_engine::traits::Event;

#[test]
fn releases_after_all_arrivals() {
    let barrier = Barrier::new(3);

    barrier.arrive().unwrap();
    barrier.arrive().unwrap();
    assert!(!barrier.is_released());

    barrier.arrive().unwrap();
    assert!(barrier.is_released());

    assert!(barrier.arrive().is_err());
}

#[test]
fn listener_waits_for_all_arrivals() {
    let mut engine = start_test(file!());
    let barrier = Barrier::new(2);

    let order = Rc::new(RefCell::new(Vec::new()));

    // The listener is spawned first to make sure it has to park.
    {
        let barrier = barrier.clone();
        let order = order.clone();
        engine.spawn(async move {
            barrier.listen().await;
            order.borrow_mut().push("joined");
            Ok(())
        });
    }

    for _ in 0..2 {
        let barrier = barrier.clone();
        let order = order.clone();
        engine.spawn(async move {
            order.borrow_mut().push("arrived");
            barrier.arrive()
        });
    }

    engine.run().unwrap();
    assert_eq!(order.borrow().as_slice(), &["arrived", "arrived", "joined"]);
}

#[test]
fn listen_after_release_is_immediate() {
    let mut engine = start_test(file!());
    let barrier = Barrier::new(1);
    barrier.arrive().unwrap();

    let seen = Rc::new(RefCell::new(false));
    {
        let barrier = barrier.clone();
        let seen = seen.clone();
        engine.spawn(async move {
            barrier.listen().await;
            *seen.borrow_mut() = true;
            Ok(())
        });
    }

    engine.run().unwrap();
    assert!(*seen.borrow());
}
