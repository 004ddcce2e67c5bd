//! Fuzz target: AE request sequences against one sensor context.
//!
//! Each 5-byte chunk is one call: an opcode byte and a little-endian `u32`
//! argument.  Invariants checked after every call:
//! - No panics under any byte sequence
//! - Frame length stays within `[vts_def, 0xFFFF]`
//! - Integration time and gains come back inside their mode ranges
//! - The batch never exceeds its capacity, and a drain empties it
//!
//! cargo fuzz run fuzz_ae_sequence

#![no_main]

use imx708_ctl::regs;
use imx708_ctl::sensor::{ModeId, SensorContext};
use imx708_ctl::types::{MAX_SYNC_REGS, Orientation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };
    let mode = if first & 1 == 0 {
        ModeId::Full4608x2592P30
    } else {
        ModeId::Binned2304x1296P60
    };
    let d = mode.descriptor();
    let mut ctx = SensorContext::new(mode);

    for chunk in rest.chunks_exact(5) {
        let arg = u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]);
        match chunk[0] % 6 {
            0 => {
                let fps = f32::from_bits(arg);
                let _ = ctx.set_fps(fps, 50);
            }
            1 => {
                if let Ok(applied) = ctx.update_integration_time(arg) {
                    assert!(applied >= d.exposure.min);
                    assert!(applied <= ctx.frame_length() - regs::EXPOSURE_OFFSET);
                }
            }
            2 => {
                if let Ok((a, g)) = ctx.update_gains(arg, arg.rotate_left(16)) {
                    assert!((d.again.min..=d.again.max).contains(&a));
                    assert!((d.dgain.min..=d.dgain.max).contains(&g));
                }
            }
            3 => {
                let o = match arg & 3 {
                    0 => Orientation::Normal,
                    1 => Orientation::Mirror,
                    2 => Orientation::Flip,
                    _ => Orientation::MirrorFlip,
                };
                let _ = ctx.set_mirror_flip(o);
            }
            4 => {
                let _ = ctx.drain_sync();
                assert!(ctx.batch().is_empty());
            }
            _ => {
                let ae = ctx.ae_defaults(50);
                assert_eq!(ae.full_lines_std, ctx.frame_length());
            }
        }
        assert!(ctx.frame_length() >= d.vts_def);
        assert!(ctx.frame_length() <= regs::FRAME_LENGTH_MAX);
        assert!(ctx.batch().len() <= MAX_SYNC_REGS);
    }
});
