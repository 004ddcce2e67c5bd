//! Probe / init / stream / mode-switch flows through the `SensorOps` trait.

use imx708_ctl::error::{Error, TransportError, Unsupported};
use imx708_ctl::ports::{AeOps, SensorOps};
use imx708_ctl::regs;
use imx708_ctl::sensor::{LifecycleState, ModeId};
use imx708_ctl::sensor::lifecycle::init_burst;

use crate::mock_bus::{BusCall, driver, pipe};

#[test]
fn full_bring_up_sequence() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();

    drv.probe(p).unwrap();
    drv.init(p).unwrap();
    drv.restart(p).unwrap();

    let t = drv.transport();
    assert_eq!(t.opens(), 1, "init must reuse the bus probe opened");
    assert_eq!(
        &t.calls[..3],
        &[
            BusCall::Open(0),
            BusCall::Read(0, regs::CHIP_ID_H),
            BusCall::Read(0, regs::CHIP_ID_L),
        ]
    );

    let mut expected: Vec<(u16, u8)> = init_burst(ModeId::Full4608x2592P30.descriptor())
        .iter()
        .map(|w| (w.addr, w.value))
        .collect();
    expected.push((regs::MODE_SELECT, regs::MODE_STREAMING));
    assert_eq!(t.writes(0), expected);

    assert_eq!(drv.context(p).unwrap().state(), LifecycleState::Streaming);
    assert_eq!(drv.delay().total_ms(), 20);
}

#[test]
fn probe_mismatch_reports_found_id_and_closes() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.transport_mut().registers.insert(regs::CHIP_ID_L, 0x77);

    assert_eq!(
        drv.probe(p),
        Err(Error::IdMismatch {
            expected: 0x0708,
            found: 0x0777,
        })
    );
    assert_eq!(drv.transport().calls.last(), Some(&BusCall::Close(0)));
}

#[test]
fn open_failure_surfaces_bus_number() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.transport_mut().fail_open = true;
    assert_eq!(
        drv.init(p),
        Err(Error::Transport(TransportError::Open { bus: 4 }))
    );
    assert!(!drv.context(p).unwrap().is_initialized());
}

#[test]
fn partial_burst_is_reported_not_retried() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.transport_mut().fail_write_at = Some(regs::FRAME_LENGTH_H);

    let err = drv.init(p).unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Burst {
            index: 3,
            addr: regs::FRAME_LENGTH_H,
            ..
        })
    ));
    assert_eq!(drv.transport().writes(0).len(), 3);

    // Caller-driven retry from scratch succeeds once the bus recovers.
    drv.transport_mut().fail_write_at = None;
    drv.init(p).unwrap();
    assert!(drv.context(p).unwrap().is_initialized());
}

#[test]
fn mode_switch_while_running() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();
    drv.transport_mut().calls.clear();

    let info = drv.set_image_mode(p, 2304, 1296).unwrap();
    assert_eq!(info.fps, 60.0);

    let writes = drv.transport().writes(0);
    assert_eq!(writes[0], (regs::MODE_SELECT, regs::MODE_STANDBY));
    assert!(writes.contains(&(regs::FRAME_LENGTH_H, 0x05)));
    assert!(writes.contains(&(regs::FRAME_LENGTH_L, 0x38)));
    assert_eq!(drv.context(p).unwrap().frame_length(), 1336);
}

#[test]
fn mode_switch_drops_writes_queued_for_old_mode() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();
    drv.set_fps(p, 15.0).unwrap();
    assert_eq!(drv.update_integration_time(p, 100_000).unwrap(), 5250);

    drv.set_image_mode(p, 2304, 1296).unwrap();
    let sync = drv.register_sync_info(p).unwrap();
    assert!(!sync.needs_update());
    assert!(sync.writes.is_empty());
    assert_eq!(drv.context(p).unwrap().max_int_time(), 1288);
}

#[test]
fn failed_mode_switch_is_recovered_by_init() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();

    drv.transport_mut().fail_write_at = Some(regs::LINE_LENGTH_H);
    assert!(matches!(
        drv.set_image_mode(p, 2304, 1296),
        Err(Error::Transport(TransportError::Burst {
            addr: 0x0342,
            ..
        }))
    ));
    assert!(!drv.context(p).unwrap().is_initialized());

    drv.transport_mut().fail_write_at = None;
    drv.transport_mut().calls.clear();
    drv.init(p).unwrap();
    let expected: Vec<(u16, u8)> = init_burst(ModeId::Binned2304x1296P60.descriptor())
        .iter()
        .map(|w| (w.addr, w.value))
        .collect();
    assert_eq!(drv.transport().writes(0), expected);
    assert!(drv.context(p).unwrap().is_initialized());
}

#[test]
fn unsupported_mode_leaves_everything() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();
    drv.transport_mut().calls.clear();

    assert_eq!(
        drv.set_image_mode(p, 9999, 9999),
        Err(Error::Unsupported(Unsupported::Resolution {
            width: 9999,
            height: 9999,
        }))
    );
    assert_eq!(drv.context(p).unwrap().mode(), ModeId::Full4608x2592P30);
    assert!(drv.transport().calls.is_empty());
}

#[test]
fn exit_then_init_reopens() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();
    drv.exit(p).unwrap();
    assert!(!drv.context(p).unwrap().is_initialized());
    assert_eq!(drv.context(p).unwrap().state(), LifecycleState::Exited);

    drv.init(p).unwrap();
    assert_eq!(drv.transport().opens(), 2);
}

#[test]
fn standby_writes_mode_select() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.init(p).unwrap();
    drv.restart(p).unwrap();
    drv.standby(p).unwrap();
    assert_eq!(
        drv.transport().writes(0).last(),
        Some(&(regs::MODE_SELECT, regs::MODE_STANDBY))
    );
    assert_eq!(drv.context(p).unwrap().state(), LifecycleState::Standby);
}
