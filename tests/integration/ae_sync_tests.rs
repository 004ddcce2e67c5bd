//! AE negotiation through the facade and the once-per-frame sync drain,
//! down to bytes on the simulated bus.

use imx708_ctl::adapters::sim_bus::{SimBusFactory, SimSensor};
use imx708_ctl::adapters::time::RecordingDelay;
use imx708_ctl::error::{Error, Unsupported};
use imx708_ctl::ports::{AeOps, AwbOps, RegisterTransport, SensorOps};
use imx708_ctl::regs;
use imx708_ctl::types::{MAX_SYNC_REGS, Orientation, RegWrite, WdrMode};
use imx708_ctl::{DriverConfig, Imx708};

use crate::mock_bus::{driver, pipe};

#[test]
fn half_rate_queues_exactly_one_frame_length_pair() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();

    let ae = drv.set_fps(p, 15.0).unwrap();
    assert_eq!(ae.full_lines_std, 5298);

    let sync = drv.register_sync_info(p).unwrap();
    assert_eq!(
        sync.writes.as_slice(),
        &[
            RegWrite::new(regs::FRAME_LENGTH_H, 0x14),
            RegWrite::new(regs::FRAME_LENGTH_L, 0xB2),
        ]
    );
    assert!(drv.register_sync_info(p).unwrap().writes.is_empty());
}

#[test]
fn one_ae_frame_in_order() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();

    drv.set_fps(p, 30.0).unwrap();
    assert_eq!(drv.update_integration_time(p, 100_000).unwrap(), 2601);
    assert_eq!(drv.update_gains(p, 0, u32::MAX).unwrap(), (112, 0xFFFF));
    drv.set_mirror_flip(p, Orientation::Mirror).unwrap();

    let addrs: Vec<u16> = drv
        .register_sync_info(p)
        .unwrap()
        .writes
        .iter()
        .map(|w| w.addr)
        .collect();
    assert_eq!(
        addrs,
        vec![
            regs::FRAME_LENGTH_H,
            regs::FRAME_LENGTH_L,
            regs::EXPOSURE_H,
            regs::EXPOSURE_L,
            regs::ANA_GAIN_H,
            regs::ANA_GAIN_L,
            regs::DGTL_GAIN_H,
            regs::DGTL_GAIN_L,
            regs::ORIENTATION,
        ]
    );
}

#[test]
fn overflow_fails_the_drain_instead_of_truncating() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();

    for _ in 0..MAX_SYNC_REGS / 2 {
        drv.update_integration_time(p, 500).unwrap();
    }
    assert_eq!(
        drv.update_integration_time(p, 500),
        Err(Error::QueueOverflow { capacity: MAX_SYNC_REGS })
    );
    assert_eq!(
        drv.register_sync_info(p),
        Err(Error::QueueOverflow { capacity: MAX_SYNC_REGS })
    );
    // The latch is one-shot; the next frame is clean.
    assert!(!drv.register_sync_info(p).unwrap().needs_update());
}

#[test]
fn rejected_fps_keeps_frame_timing() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    assert!(matches!(
        drv.set_fps(p, 120.0),
        Err(Error::Unsupported(Unsupported::FrameRate { millis: 120_000 }))
    ));
    assert_eq!(drv.context(p).unwrap().frame_length(), 2649);
    assert!(!drv.register_sync_info(p).unwrap().needs_update());
}

#[test]
fn binned_mode_allows_sixty_fps() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.set_image_mode(p, 2304, 1296).unwrap();
    let ae = drv.set_fps(p, 60.0).unwrap();
    assert_eq!(ae.full_lines_std, 1336);
    assert_eq!(ae.max_int_time, 1288);
}

#[test]
fn wdr_request_rejected_linear_accepted() {
    let mut drv = driver();
    let p = pipe(0);
    drv.register(p).unwrap();
    assert!(drv.set_wdr_mode(p, WdrMode::TwoToOneLine).is_err());
    assert!(drv.set_wdr_mode(p, WdrMode::None).is_ok());
    assert_eq!(drv.awb_defaults(p).unwrap().run_interval, 1);
}

#[test]
fn drained_batch_ships_to_sim_sensor() {
    let sensor = SimSensor::new();
    let mut drv = Imx708::with_bus_factory(
        DriverConfig::default(),
        SimBusFactory::new(sensor.clone()),
        RecordingDelay::new(),
    )
    .unwrap();
    let p = pipe(0);
    drv.register(p).unwrap();
    drv.probe(p).unwrap();
    drv.init(p).unwrap();
    sensor.clear_writes();

    drv.set_fps(p, 15.0).unwrap();
    drv.update_gains(p, 0x3C0, 0x100).unwrap();
    let sync = drv.register_sync_info(p).unwrap();
    drv.transport_mut().write_burst(p, &sync.writes).unwrap();

    assert_eq!(sensor.register(regs::FRAME_LENGTH_H), Some(0x14));
    assert_eq!(sensor.register(regs::FRAME_LENGTH_L), Some(0xB2));
    assert_eq!(sensor.register(regs::ANA_GAIN_H), Some(0x03));
    assert_eq!(sensor.register(regs::ANA_GAIN_L), Some(0xC0));
    assert_eq!(sensor.writes().len(), 6);
}
