//! Registration facade: slot ownership, re-registration and pipe isolation.

use imx708_ctl::error::Error;
use imx708_ctl::ports::{AeOps, RegisterTransport, SensorOps};
use imx708_ctl::registry::AllocStats;
use imx708_ctl::types::{MAX_PIPES, Orientation, Pipe};

use crate::mock_bus::{driver, pipe};

#[test]
fn register_twice_does_not_leak() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.register(p).unwrap();
    assert_eq!(drv.alloc_stats(), AllocStats { allocated: 2, freed: 1 });
    assert_eq!(drv.alloc_stats().live(), 1);

    drv.unregister(p);
    assert_eq!(drv.alloc_stats().live(), 0);
}

#[test]
fn reregistration_starts_from_defaults() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();
    drv.set_fps(p, 15.0).unwrap();

    drv.register(p).unwrap();
    let ctx = drv.context(p).unwrap();
    assert!(!ctx.is_initialized());
    assert_eq!(ctx.frame_length(), 2649);
    assert!(ctx.batch().is_empty());
    assert!(!drv.transport().is_open(p), "old bus handle released");
}

#[test]
fn unregister_is_idempotent() {
    let mut drv = driver();
    let p = pipe(3);
    drv.unregister(p);
    drv.register(p).unwrap();
    drv.unregister(p);
    drv.unregister(p);
    assert_eq!(drv.alloc_stats(), AllocStats { allocated: 1, freed: 1 });
    assert_eq!(drv.init(p), Err(Error::NotRegistered(3)));
}

#[test]
fn pipes_are_independent() {
    let mut drv = driver();
    for i in 0..MAX_PIPES {
        drv.register(pipe(i)).unwrap();
    }
    drv.set_fps(pipe(1), 10.0).unwrap();
    drv.set_mirror_flip(pipe(2), Orientation::Flip).unwrap();

    assert_eq!(drv.context(pipe(0)).unwrap().frame_length(), 2649);
    assert_eq!(drv.context(pipe(1)).unwrap().frame_length(), 7947);
    assert!(drv.context(pipe(1)).unwrap().batch().len() == 2);
    assert!(drv.context(pipe(0)).unwrap().batch().is_empty());
    assert_eq!(drv.context(pipe(2)).unwrap().batch().len(), 1);
}

#[test]
fn pipe_index_is_bounded() {
    assert_eq!(Pipe::new(MAX_PIPES), Err(Error::InvalidPipe(MAX_PIPES)));
}
