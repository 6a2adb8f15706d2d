//! The `cmap` table: character to glyph mapping.
//!
//! Only the two Windows Unicode subtables are supported:
//!     format 4 for the Basic Multilingual Plane (platform 3, encoding 1)
//!     and format 12 for the full Unicode range (platform 3, encoding 10).

use super::read::Reader;
use super::Error;
use std::io::{Read, Seek};

/// Platform/encoding key of the Windows BMP subtable.
pub const WINDOWS_BMP: u32 = 0x03_0001;

/// Platform/encoding key of the Windows full-repertoire subtable.
pub const WINDOWS_FULL: u32 = 0x03_000A;

/// A parsed cmap subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmap {
    Format4(CmapFormat4),
    Format12(CmapFormat12),
}

impl Cmap {
    /// Returns the glyph id of a codepoint, or 0 (`.notdef`) if it is unmapped.
    pub fn lookup(&self, codepoint: u32) -> u32 {
        match self {
            Cmap::Format4(f) => f.lookup(codepoint),
            Cmap::Format12(f) => f.lookup(codepoint),
        }
    }
}

/// One segment of a format 4 subtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub end_code: u16,
    pub start_code: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

/// Segment mapping to delta values.
///
/// Segments are sorted by ascending end code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmapFormat4 {
    pub segments: Vec<Segment>,
    pub glyph_id_array: Vec<u16>,
}

impl CmapFormat4 {
    pub fn lookup(&self, codepoint: u32) -> u32 {
        let Ok(c) = u16::try_from(codepoint) else {
            return 0;
        };
        let i = self.segments.partition_point(|s| s.end_code < c);
        let Some(segment) = self.segments.get(i) else {
            return 0;
        };
        if segment.start_code > c {
            return 0;
        }
        if segment.id_range_offset == 0 {
            return apply_delta(c, segment.id_delta);
        }
        // The range offset is measured in bytes from the segment's own entry in the
        // idRangeOffset array, which sits immediately before the glyph id array.
        let index = (c - segment.start_code) as i64 + (segment.id_range_offset / 2) as i64 + i as i64
            - self.segments.len() as i64;
        let Some(&glyph) = usize::try_from(index)
            .ok()
            .and_then(|index| self.glyph_id_array.get(index))
        else {
            return 0;
        };
        if glyph == 0 {
            return 0;
        }
        apply_delta(glyph, segment.id_delta)
    }
}

fn apply_delta(v: u16, delta: i16) -> u32 {
    (v as i32 + delta as i32).rem_euclid(1 << 16) as u32
}

/// One group of a format 12 subtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub start_code: u32,
    pub end_code: u32,
    pub start_glyph_id: u32,
}

/// Segmented coverage.
///
/// Groups are sorted by ascending end code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmapFormat12 {
    pub groups: Vec<Group>,
}

impl CmapFormat12 {
    pub fn lookup(&self, codepoint: u32) -> u32 {
        let i = self.groups.partition_point(|g| g.end_code < codepoint);
        match self.groups.get(i) {
            Some(g) if g.start_code <= codepoint => g
                .start_glyph_id
                .checked_add(codepoint - g.start_code)
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// Reads the encoding records of the cmap table and parses the preferred subtable.
pub(crate) fn parse<R: Read + Seek>(
    r: &mut Reader<R>,
    cmap_offset: u32,
    cmap_length: u32,
) -> Result<Cmap, Error> {
    let cmap_offset = cmap_offset as u64;
    r.seek(cmap_offset + 2)?;
    let num_records: u16 = r.read()?;
    let mut bmp: Option<u32> = None;
    let mut full: Option<u32> = None;
    for _ in 0..num_records {
        let key: u32 = r.read()?;
        let offset: u32 = r.read()?;
        if key > WINDOWS_FULL {
            break;
        }
        if key == WINDOWS_BMP && bmp.is_none() {
            bmp = Some(offset);
        } else if key == WINDOWS_FULL && full.is_none() {
            full = Some(offset);
        }
    }
    if let Some(offset) = bmp {
        log::debug!("using the format 4 cmap subtable at offset {offset}");
        r.seek(cmap_offset + offset as u64)?;
        let available = (cmap_length as u64).saturating_sub(offset as u64);
        return Ok(Cmap::Format4(parse_format_4(r, available)?));
    }
    if let Some(offset) = full {
        log::debug!("using the format 12 cmap subtable at offset {offset}");
        r.seek(cmap_offset + offset as u64)?;
        return Ok(Cmap::Format12(parse_format_12(r)?));
    }
    Err(Error::NoUsableCmap)
}

fn check_format<R: Read + Seek>(r: &mut Reader<R>, want: u16) -> Result<(), Error> {
    let format: u16 = r.read()?;
    if format != want {
        return Err(Error::UnexpectedCmapFormat { want, got: format });
    }
    Ok(())
}

/// Parses a format 4 subtable; `available` is the number of bytes from its start
/// to the end of the cmap table.
fn parse_format_4<R: Read + Seek>(r: &mut Reader<R>, available: u64) -> Result<CmapFormat4, Error> {
    check_format(r, 4)?;
    // The 16-bit length field wraps for large subtables and is not used.
    let _length: u16 = r.read()?;
    let _language: u16 = r.read()?;
    let seg_count = (r.read::<u16>()? / 2) as usize;
    // searchRange, entrySelector, rangeShift
    r.skip(6)?;
    let read_column = |r: &mut Reader<R>| -> Result<Vec<u16>, Error> {
        (0..seg_count).map(|_| r.read::<u16>()).collect()
    };
    let end_codes = read_column(r)?;
    let _reserved_pad: u16 = r.read()?;
    let start_codes = read_column(r)?;
    let id_deltas = read_column(r)?;
    let id_range_offsets = read_column(r)?;
    let segments: Vec<Segment> = (0..seg_count)
        .map(|i| Segment {
            end_code: end_codes[i],
            start_code: start_codes[i],
            id_delta: id_deltas[i] as i16,
            id_range_offset: id_range_offsets[i],
        })
        .collect();
    // The glyph id array holds the entries the segments index into,
    // bounded by the bytes left in the table.
    let needed = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.id_range_offset != 0)
        .map(|(i, s)| {
            s.end_code.saturating_sub(s.start_code) as i64 + (s.id_range_offset / 2) as i64 + i as i64
                - seg_count as i64
                + 1
        })
        .max()
        .unwrap_or(0)
        .max(0) as u64;
    let header_len = 16 + 8 * seg_count as u64;
    let glyph_count = needed.min(available.saturating_sub(header_len) / 2);
    let glyph_id_array = (0..glyph_count)
        .map(|_| r.read::<u16>())
        .collect::<Result<_, _>>()?;
    Ok(CmapFormat4 {
        segments,
        glyph_id_array,
    })
}

fn parse_format_12<R: Read + Seek>(r: &mut Reader<R>) -> Result<CmapFormat12, Error> {
    check_format(r, 12)?;
    // reserved, length, language
    r.skip(10)?;
    let num_groups: u32 = r.read()?;
    let mut groups = Vec::with_capacity(num_groups.min(1 << 16) as usize);
    for _ in 0..num_groups {
        groups.push(Group {
            start_code: r.read()?,
            end_code: r.read()?,
            start_glyph_id: r.read()?,
        });
    }
    Ok(CmapFormat12 { groups })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_4(segments: &[(u16, u16, i16, u16)], glyph_id_array: Vec<u16>) -> CmapFormat4 {
        CmapFormat4 {
            segments: segments
                .iter()
                .map(|&(start_code, end_code, id_delta, id_range_offset)| Segment {
                    end_code,
                    start_code,
                    id_delta,
                    id_range_offset,
                })
                .collect(),
            glyph_id_array,
        }
    }

    /// A format 4 subtable with two segments; the first maps a..c through the glyph id array.
    fn format_4_bytes(length: u16) -> Vec<u8> {
        let words: [u16; 16] = [
            4, length, 0, 4, 4, 1, 0, // header
            0x63, 0xFFFF, 0, // end codes, reserved pad
            0x61, 0xFFFF, // start codes
            0, 1, // id deltas
            4, 0, // id range offsets
        ];
        let mut b: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        b.extend([7_u16, 8, 9].iter().flat_map(|w| w.to_be_bytes()));
        b
    }

    #[test]
    fn format_4_glyph_array_ignores_the_length_field() {
        // A wrapped length, as in subtables longer than 64KiB.
        let data = format_4_bytes(6);
        let available = data.len() as u64;
        let mut r = Reader::new(std::io::Cursor::new(data)).unwrap();
        let cmap = parse_format_4(&mut r, available).unwrap();
        assert_eq!(cmap.glyph_id_array, vec![7, 8, 9]);
        assert_eq!(cmap.lookup(0x62), 8);
    }

    #[test]
    fn format_4_glyph_array_stops_at_the_end_of_the_table() {
        let data = format_4_bytes(38);
        let available = data.len() as u64 - 2;
        let mut r = Reader::new(std::io::Cursor::new(data)).unwrap();
        let cmap = parse_format_4(&mut r, available).unwrap();
        assert_eq!(cmap.glyph_id_array, vec![7, 8]);
        assert_eq!(cmap.lookup(0x63), 0);
    }

    macro_rules! lookup_tests {
        ( $( ($name: ident, $cmap: expr, $codepoint: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let cmap = $cmap;
                    assert_eq!(cmap.lookup($codepoint), $want);
                }
            )+
        };
    }

    lookup_tests!(
        (
            format_4_identity,
            format_4(&[(0x41, 0x5A, 0, 0), (0xFFFF, 0xFFFF, 1, 0)], vec![]),
            0x42,
            0x42
        ),
        (
            format_4_unmapped_gap,
            format_4(&[(0x41, 0x5A, 0, 0), (0xFFFF, 0xFFFF, 1, 0)], vec![]),
            0x100,
            0
        ),
        (
            format_4_before_first_segment,
            format_4(&[(0x41, 0x5A, 0, 0)], vec![]),
            0x20,
            0
        ),
        (
            format_4_past_last_segment,
            format_4(&[(0x41, 0x5A, 0, 0)], vec![]),
            0x5B,
            0
        ),
        (
            format_4_negative_delta_wraps,
            format_4(&[(0x41, 0x5A, -0x40, 0)], vec![]),
            0x41,
            1
        ),
        (
            format_4_delta_wraps_above,
            format_4(&[(0xFFF0, 0xFFF0, 0x20, 0)], vec![]),
            0xFFF0,
            0x10
        ),
        (
            format_4_glyph_array,
            // Two segments: the first uses the glyph array starting at its first entry,
            // so idRangeOffset = 2 * (segCount - 0 + 0) = 4.
            format_4(&[(0x61, 0x63, 0, 4), (0xFFFF, 0xFFFF, 1, 0)], vec![7, 8, 9]),
            0x62,
            8
        ),
        (
            format_4_glyph_array_with_delta,
            format_4(&[(0x61, 0x63, 10, 4), (0xFFFF, 0xFFFF, 1, 0)], vec![7, 8, 9]),
            0x63,
            19
        ),
        (
            format_4_glyph_array_zero_is_unmapped,
            format_4(&[(0x61, 0x63, 10, 4), (0xFFFF, 0xFFFF, 1, 0)], vec![7, 0, 9]),
            0x62,
            0
        ),
        (
            format_4_astral_codepoint,
            format_4(&[(0x0, 0xFFFF, 0, 0)], vec![]),
            0x20000,
            0
        ),
        (
            format_12_group,
            CmapFormat12 {
                groups: vec![Group {
                    start_code: 0x20000,
                    end_code: 0x20010,
                    start_glyph_id: 500
                }]
            },
            0x20005,
            505
        ),
        (
            format_12_between_groups,
            CmapFormat12 {
                groups: vec![
                    Group {
                        start_code: 0x41,
                        end_code: 0x42,
                        start_glyph_id: 1
                    },
                    Group {
                        start_code: 0x50,
                        end_code: 0x52,
                        start_glyph_id: 3
                    },
                ]
            },
            0x45,
            0
        ),
        (
            format_12_glyph_id_overflow_is_unmapped,
            CmapFormat12 {
                groups: vec![Group {
                    start_code: 0x10,
                    end_code: 0x20,
                    start_glyph_id: u32::MAX - 2
                }]
            },
            0x18,
            0
        ),
    );
}
