//! CRC-32 (IEEE 802.3, reflected) used by event-stream frame checksums.

const POLYNOMIAL: u32 = 0xEDB8_8320;

pub(crate) fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (POLYNOMIAL & mask);
        }
    }
    !crc
}
