mod common;

use common::SimulatedConfigSpace;
use isawait::{ChipsetFamily, RecoveryRequest, Width, apply};
use proptest::prelude::*;

const PIIX_8_BIT_MASK: u8 = 0b0111_1000;
const PIIX_16_BIT_MASK: u8 = 0b0000_0111;
const SIS_8_BIT_MASK: u8 = 0b0011_0000;
const SIS_16_BIT_MASK: u8 = 0b1100_0000;

fn request() -> impl Strategy<Value = RecoveryRequest> {
    prop_oneof![
        Just(RecoveryRequest::Unchanged),
        Just(RecoveryRequest::Disable),
        (1u8..=8).prop_map(RecoveryRequest::Cycles),
    ]
}

proptest! {
    #[test]
    fn piix_8_bit_write_keeps_other_bits(raw in any::<u8>(), cycles in 0u8..=8) {
        let new_raw = ChipsetFamily::Piix.encode(raw, Width::Bits8, cycles).unwrap();
        prop_assert_eq!(new_raw & !PIIX_8_BIT_MASK, raw & !PIIX_8_BIT_MASK);
        let state = ChipsetFamily::Piix.decode(new_raw).recovery_8;
        prop_assert_eq!(state.enabled, cycles != 0);
        if cycles != 0 {
            prop_assert_eq!(state.cycles, cycles);
        }
    }

    #[test]
    fn piix_16_bit_write_keeps_other_bits(raw in any::<u8>(), cycles in 0u8..=4) {
        let new_raw = ChipsetFamily::Piix.encode(raw, Width::Bits16, cycles).unwrap();
        prop_assert_eq!(new_raw & !PIIX_16_BIT_MASK, raw & !PIIX_16_BIT_MASK);
        let state = ChipsetFamily::Piix.decode(new_raw).recovery_16;
        prop_assert_eq!(state.enabled, cycles != 0);
        if cycles != 0 {
            prop_assert_eq!(state.cycles, cycles);
        }
    }

    #[test]
    fn sis_write_keeps_other_bits_or_nothing(raw in any::<u8>(), cycles in any::<u8>(), wide in any::<bool>()) {
        let (width, mask) = if wide {
            (Width::Bits16, SIS_16_BIT_MASK)
        } else {
            (Width::Bits8, SIS_8_BIT_MASK)
        };
        match ChipsetFamily::Sis.encode(raw, width, cycles) {
            Some(new_raw) => {
                prop_assert_eq!(new_raw & !mask, raw & !mask);
                prop_assert_eq!(ChipsetFamily::Sis.decode(new_raw).width(width).cycles, cycles);
            }
            None => {
                let table: &[u8] = if wide { &[5, 4, 3, 2] } else { &[8, 5, 4, 3] };
                prop_assert!(!table.contains(&cycles));
            }
        }
    }

    #[test]
    fn piix_session_only_touches_requested_widths(
        raw in any::<u8>(),
        request_8 in request(),
        request_16 in request(),
    ) {
        // 16-bit requests above 4 are rejected by parsing before they get here
        let request_16 = match request_16 {
            RecoveryRequest::Cycles(cycles) => RecoveryRequest::Cycles(cycles.min(4)),
            other => other,
        };
        let mut pci = SimulatedConfigSpace::new().with_device(0, 4, 0x8086, 0x7000);
        pci.set_byte(0, 4, 0x4C, raw);

        let session = apply(&mut pci, request_8, request_16).unwrap();

        let after = pci.byte(0, 4, 0x4C);
        let mut untouched = !0u8;
        if request_8 != RecoveryRequest::Unchanged {
            untouched &= !PIIX_8_BIT_MASK;
        }
        if request_16 != RecoveryRequest::Unchanged {
            untouched &= !PIIX_16_BIT_MASK;
        }
        prop_assert_eq!(after & untouched, raw & untouched);
        prop_assert!(session.is_complete());
        prop_assert_eq!(session.after.raw, after);
    }
}
