//! Seen/owned Pokédex bitmaps.
//!
//! Every generation keeps "seen" and "owned" as flat bitmaps with one bit
//! per species: bit index `national id - 1`, least significant bit first
//! within each byte. The same helper serves all of them.

use crate::{Error, Result};

fn bit_index(buf_len: usize, national_id: u16) -> Result<(usize, u8)> {
    if national_id == 0 {
        return Err(Error::ParamOutOfRange {
            what: "national id",
            value: 0,
            max: (buf_len * 8) as u32,
        });
    }
    let index = usize::from(national_id - 1);
    let byte = index / 8;
    if byte >= buf_len {
        return Err(Error::ParamOutOfRange {
            what: "national id",
            value: u32::from(national_id),
            max: (buf_len * 8) as u32,
        });
    }
    Ok((byte, 1 << (index % 8)))
}

/// Check the flag for one species in a seen/owned bitmap.
pub fn get_bit(buf: &[u8], national_id: u16) -> Result<bool> {
    let (byte, mask) = bit_index(buf.len(), national_id)?;
    Ok(buf[byte] & mask != 0)
}

/// Set or clear the flag for one species in a seen/owned bitmap.
pub fn set_bit(buf: &mut [u8], national_id: u16, set: bool) -> Result<()> {
    let (byte, mask) = bit_index(buf.len(), national_id)?;
    if set {
        buf[byte] |= mask;
    } else {
        buf[byte] &= !mask;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut buf = [0u8; 49];
        set_bit(&mut buf, 151, true).unwrap();
        assert!(get_bit(&buf, 151).unwrap());
        set_bit(&mut buf, 151, false).unwrap();
        assert!(!get_bit(&buf, 151).unwrap());
    }

    #[test]
    fn neighbors_unaffected() {
        let mut buf = [0u8; 49];
        set_bit(&mut buf, 25, true).unwrap();
        assert!(!get_bit(&buf, 24).unwrap());
        assert!(!get_bit(&buf, 26).unwrap());

        set_bit(&mut buf, 25, false).unwrap();
        assert_eq!(buf, [0u8; 49]);
    }

    #[test]
    fn first_id_is_lowest_bit() {
        let mut buf = [0u8; 2];
        set_bit(&mut buf, 1, true).unwrap();
        assert_eq!(buf[0], 0x01);
        set_bit(&mut buf, 9, true).unwrap();
        assert_eq!(buf[1], 0x01);
    }

    #[test]
    fn id_zero_rejected() {
        let buf = [0u8; 4];
        assert!(matches!(
            get_bit(&buf, 0),
            Err(Error::ParamOutOfRange { value: 0, .. })
        ));
    }

    #[test]
    fn id_past_buffer_rejected() {
        let mut buf = [0u8; 2];
        assert!(get_bit(&buf, 16).is_ok());
        assert!(get_bit(&buf, 17).is_err());
        assert!(set_bit(&mut buf, 17, true).is_err());
        assert_eq!(buf, [0u8; 2]);
    }
}
