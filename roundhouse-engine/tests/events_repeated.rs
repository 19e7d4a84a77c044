// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use roundhouse_engine::events::repeated::Repeated;
use roundhouse_engine::test_helpers::start_test;
use roundhouse_engine::traits::Event;

#[test]
fn listeners_receive_latest_result() {
    let mut engine = start_test(file!());
    let event: Repeated<usize> = Repeated::new(0);

    let seen = Rc::new(RefCell::new(None));
    {
        let event = event.clone();
        let seen = seen.clone();
        engine.spawn(async move {
            *seen.borrow_mut() = Some(event.listen().await);
            Ok(())
        });
    }

    {
        let event = event.clone();
        engine.spawn(async move { event.notify_result(7) });
    }

    engine.run().unwrap();
    assert_eq!(*seen.borrow(), Some(7));
}

#[test]
fn every_listener_is_woken() {
    let mut engine = start_test(file!());
    let event: Repeated<usize> = Repeated::new(0);

    let total = Rc::new(RefCell::new(0));
    for _ in 0..3 {
        let event = event.clone();
        let total = total.clone();
        engine.spawn(async move {
            *total.borrow_mut() += event.listen().await;
            Ok(())
        });
    }

    {
        let event = event.clone();
        engine.spawn(async move { event.notify_result(5) });
    }

    engine.run().unwrap();
    assert_eq!(*total.borrow(), 15);
}
