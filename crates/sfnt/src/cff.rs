//! Detection of CID-keyed CFF fonts.
//!
//! A CID-keyed font announces itself with the `ROS` operator (`12 30`),
//!     which must be the first operator in its Top DICT.
//! We therefore only walk the operands in front of the first operator.

use super::read::Reader;
use super::Error;
use std::io::{Read, Seek};

/// Returns whether the CFF table at the given offset is CID-keyed.
pub(crate) fn is_cid_keyed<R: Read + Seek>(
    r: &mut Reader<R>,
    cff_offset: u32,
    cff_length: u32,
) -> Result<bool, Error> {
    let cff_offset = cff_offset as u64;
    r.seek(cff_offset)?;
    let _major: u8 = r.read()?;
    let _minor: u8 = r.read()?;
    let header_size: u8 = r.read()?;
    if header_size < 4 {
        return Err(Error::MalformedCff("header is shorter than 4 bytes"));
    }
    r.seek(cff_offset + header_size as u64)?;
    skip_index(r)?;

    // Top DICT INDEX; only the first DICT matters.
    let count: u16 = r.read()?;
    if count == 0 {
        return Err(Error::MalformedCff("Top DICT INDEX is empty"));
    }
    let off_size: u8 = r.read()?;
    check_off_size(off_size)?;
    let start = r.read_sized(off_size)?;
    let end = r.read_sized(off_size)?;
    if end < start {
        return Err(Error::MalformedCff("Top DICT INDEX offsets decrease"));
    }
    if end - start > cff_length {
        return Err(Error::MalformedCff("Top DICT is longer than the table"));
    }
    r.skip((count as i64 - 1) * off_size as i64)?;
    r.skip(start as i64 - 1)?;
    let dict = r.read_bytes((end - start) as usize)?;
    Ok(scan_top_dict(&dict))
}

fn check_off_size(off_size: u8) -> Result<(), Error> {
    if !(1..=4).contains(&off_size) {
        return Err(Error::MalformedCff("INDEX offset size is not in [1, 4]"));
    }
    Ok(())
}

/// Skips over a CFF INDEX, leaving the reader at the first byte after it.
fn skip_index<R: Read + Seek>(r: &mut Reader<R>) -> Result<(), Error> {
    let count: u16 = r.read()?;
    if count == 0 {
        return Ok(());
    }
    let off_size: u8 = r.read()?;
    check_off_size(off_size)?;
    r.skip(count as i64 * off_size as i64)?;
    let last = r.read_sized(off_size)?;
    r.skip(last as i64 - 1)?;
    Ok(())
}

/// Walks the operands at the start of a Top DICT.
///
/// Returns true iff the first operator is `ROS`.
/// Real-number operands (byte 30) and any other operator end the scan.
pub(crate) fn scan_top_dict(dict: &[u8]) -> bool {
    let mut i = 0;
    while let Some(&b) = dict.get(i) {
        match b {
            32..=246 => i += 1,
            247..=254 => i += 2,
            28 => i += 3,
            29 => i += 5,
            12 => return dict.get(i + 1) == Some(&30),
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! scan_tests {
        ( $( ($name: ident, $dict: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(scan_top_dict(&$dict), $want);
                }
            )+
        };
    }

    scan_tests!(
        (ros_after_small_operands, [139, 139, 139, 12, 30], true),
        (escaped_other_operator, [139, 139, 12, 5], false),
        (ros_after_every_operand_size, [247, 0, 28, 1, 2, 29, 1, 2, 3, 4, 12, 30], true),
        (plain_operator_first, [139, 17, 12, 30], false),
        (real_operand_stops_the_scan, [30, 0x1F, 12, 30], false),
        (empty_dict, [], false),
        (escape_at_end, [139, 12], false),
    );
}
