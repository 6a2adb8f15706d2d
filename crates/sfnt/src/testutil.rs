//! Builder for small synthetic fonts.
//!
//! The fonts contain only the tables and fields this crate reads,
//!     and are intended for tests here and in downstream crates.

use super::Tag;

#[derive(Debug, Clone)]
struct Format4Segment {
    start: u16,
    end: u16,
    delta: i16,
    glyphs: Option<Vec<u16>>,
}

/// Builder for a single font.
#[derive(Debug, Clone)]
pub struct FontBuilder {
    units_per_em: u16,
    ascent: i16,
    caps_height: i16,
    advance_widths: Vec<u16>,
    format_4: Vec<Format4Segment>,
    format_12: Vec<(u32, u32, u32)>,
    cff: Option<Vec<u8>>,
    omitted: Vec<Tag>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        Self {
            units_per_em: 1000,
            ascent: 880,
            caps_height: 700,
            advance_widths: vec![500],
            format_4: vec![],
            format_12: vec![],
            cff: None,
            omitted: vec![],
        }
    }
}

impl FontBuilder {
    pub fn units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    pub fn ascent(mut self, ascent: i16) -> Self {
        self.ascent = ascent;
        self
    }

    pub fn caps_height(mut self, caps_height: i16) -> Self {
        self.caps_height = caps_height;
        self
    }

    /// Sets the `hmtx` advance widths, indexed by glyph id.
    pub fn advance_widths(mut self, advance_widths: Vec<u16>) -> Self {
        self.advance_widths = advance_widths;
        self
    }

    /// Adds a segment to the format 4 subtable.
    ///
    /// Segments must be added in ascending order.
    /// If `glyphs` is provided the segment maps through the glyph id array,
    ///     otherwise it maps by adding `delta` to the codepoint.
    pub fn format_4_segment(mut self, start: u16, end: u16, delta: i16, glyphs: Option<Vec<u16>>) -> Self {
        self.format_4.push(Format4Segment {
            start,
            end,
            delta,
            glyphs,
        });
        self
    }

    /// Adds a group to the format 12 subtable.
    pub fn format_12_group(mut self, start: u32, end: u32, start_glyph_id: u32) -> Self {
        self.format_12.push((start, end, start_glyph_id));
        self
    }

    /// Adds a CFF table whose first Top DICT has the given bytes.
    pub fn cff_top_dict(mut self, top_dict: Vec<u8>) -> Self {
        let mut b = vec![1, 0, 4, 1];
        // Name INDEX with one entry.
        b.extend([0, 1, 1, 1, 5]);
        b.extend(b"Test");
        // Top DICT INDEX with one entry.
        b.extend([0, 1, 1, 1, 1 + top_dict.len() as u8]);
        b.extend(top_dict);
        // Empty String INDEX and Global Subr INDEX.
        b.extend([0, 0, 0, 0]);
        self.cff = Some(b);
        self
    }

    /// Adds a CFF table with exactly the given bytes.
    pub fn raw_cff(mut self, cff: Vec<u8>) -> Self {
        self.cff = Some(cff);
        self
    }

    /// Leaves a table out of the built font.
    pub fn omit(mut self, tag: Tag) -> Self {
        self.omitted.push(tag);
        self
    }

    /// Builds a standalone font file.
    pub fn build(&self) -> Vec<u8> {
        self.build_with_offset(0)
    }

    /// Builds a font whose table offsets assume it starts at `start` in its file.
    pub fn build_with_offset(&self, start: u32) -> Vec<u8> {
        let mut tables: Vec<(Tag, Vec<u8>)> = vec![
            (Tag::HEAD, self.head()),
            (Tag::OS2, self.os2()),
            (Tag::HHEA, self.hhea()),
            (Tag::HMTX, self.hmtx()),
            (Tag::CMAP, self.cmap()),
        ];
        if let Some(cff) = &self.cff {
            tables.push((Tag::CFF, cff.clone()));
        }
        tables.retain(|(tag, _)| !self.omitted.contains(tag));
        tables.sort_by_key(|(tag, _)| *tag);

        let mut b = vec![];
        let version: &[u8; 4] = if self.cff.is_some() { b"OTTO" } else { &[0, 1, 0, 0] };
        b.extend(version);
        put_u16(&mut b, tables.len() as u16);
        b.extend([0; 6]);
        let mut offset = start + 12 + 16 * tables.len() as u32;
        for (tag, data) in &tables {
            b.extend(tag.0);
            put_u32(&mut b, 0);
            put_u32(&mut b, offset);
            put_u32(&mut b, data.len() as u32);
            offset += padded_len(data);
        }
        for (_, data) in &tables {
            b.extend(data);
            b.resize(b.len() + (padded_len(data) as usize - data.len()), 0);
        }
        b
    }

    fn head(&self) -> Vec<u8> {
        let mut b = vec![0; 54];
        b[0..4].copy_from_slice(&[0, 1, 0, 0]);
        b[18..20].copy_from_slice(&self.units_per_em.to_be_bytes());
        b
    }

    fn os2(&self) -> Vec<u8> {
        let mut b = vec![0; 96];
        b[68..70].copy_from_slice(&self.ascent.to_be_bytes());
        b[88..90].copy_from_slice(&self.caps_height.to_be_bytes());
        b
    }

    fn hhea(&self) -> Vec<u8> {
        let mut b = vec![0; 36];
        b[34..36].copy_from_slice(&(self.advance_widths.len() as u16).to_be_bytes());
        b
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut b = vec![];
        for &width in &self.advance_widths {
            put_u16(&mut b, width);
            put_u16(&mut b, 0);
        }
        b
    }

    fn cmap(&self) -> Vec<u8> {
        let mut subtables: Vec<(u16, u16, Vec<u8>)> = vec![];
        if !self.format_4.is_empty() {
            subtables.push((3, 1, self.format_4_subtable()));
        }
        if !self.format_12.is_empty() {
            subtables.push((3, 10, self.format_12_subtable()));
        }
        let mut b = vec![];
        put_u16(&mut b, 0);
        put_u16(&mut b, subtables.len() as u16);
        let mut offset = 4 + 8 * subtables.len() as u32;
        for (platform, encoding, data) in &subtables {
            put_u16(&mut b, *platform);
            put_u16(&mut b, *encoding);
            put_u32(&mut b, offset);
            offset += data.len() as u32;
        }
        for (_, _, data) in subtables {
            b.extend(data);
        }
        b
    }

    fn format_4_subtable(&self) -> Vec<u8> {
        let mut segments = self.format_4.clone();
        if segments.last().map(|s| s.end) != Some(0xFFFF) {
            segments.push(Format4Segment {
                start: 0xFFFF,
                end: 0xFFFF,
                delta: 1,
                glyphs: None,
            });
        }
        let seg_count = segments.len() as u16;
        let mut glyph_id_array: Vec<u16> = vec![];
        let mut range_offsets = vec![];
        for (i, segment) in segments.iter().enumerate() {
            match &segment.glyphs {
                None => range_offsets.push(0),
                Some(glyphs) => {
                    let remaining = seg_count - i as u16;
                    range_offsets.push(2 * (remaining + glyph_id_array.len() as u16));
                    glyph_id_array.extend(glyphs);
                }
            }
        }
        let length = 16 + 8 * seg_count + 2 * glyph_id_array.len() as u16;
        let entry_selector = 15 - seg_count.leading_zeros() as u16;
        let search_range = 2 << entry_selector;

        let mut b = vec![];
        put_u16(&mut b, 4);
        put_u16(&mut b, length);
        put_u16(&mut b, 0);
        put_u16(&mut b, 2 * seg_count);
        put_u16(&mut b, search_range);
        put_u16(&mut b, entry_selector);
        put_u16(&mut b, 2 * seg_count - search_range);
        for s in &segments {
            put_u16(&mut b, s.end);
        }
        put_u16(&mut b, 0);
        for s in &segments {
            put_u16(&mut b, s.start);
        }
        for s in &segments {
            put_u16(&mut b, s.delta as u16);
        }
        for &r in &range_offsets {
            put_u16(&mut b, r);
        }
        for &g in &glyph_id_array {
            put_u16(&mut b, g);
        }
        b
    }

    fn format_12_subtable(&self) -> Vec<u8> {
        let mut b = vec![];
        put_u16(&mut b, 12);
        put_u16(&mut b, 0);
        put_u32(&mut b, 16 + 12 * self.format_12.len() as u32);
        put_u32(&mut b, 0);
        put_u32(&mut b, self.format_12.len() as u32);
        for &(start, end, glyph) in &self.format_12 {
            put_u32(&mut b, start);
            put_u32(&mut b, end);
            put_u32(&mut b, glyph);
        }
        b
    }
}

/// Builds a font collection containing the given fonts in order.
pub fn collection(fonts: &[FontBuilder]) -> Vec<u8> {
    let mut b = vec![];
    b.extend(Tag::TTC.0);
    put_u32(&mut b, 0x0001_0000);
    put_u32(&mut b, fonts.len() as u32);
    let mut offset = 12 + 4 * fonts.len() as u32;
    let mut faces = vec![];
    for font in fonts {
        let face = font.build_with_offset(offset);
        put_u32(&mut b, offset);
        offset += face.len() as u32;
        faces.push(face);
    }
    for face in faces {
        b.extend(face);
    }
    b
}

fn padded_len(data: &[u8]) -> u32 {
    (data.len() as u32 + 3) & !3
}

fn put_u16(b: &mut Vec<u8>, v: u16) {
    b.extend(v.to_be_bytes());
}

fn put_u32(b: &mut Vec<u8>, v: u32) {
    b.extend(v.to_be_bytes());
}
