//! The `.g` drawing file format.
//!
//! ## Layout
//!
//! All numbers are little-endian.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `SLWG` |
//! | 4 | 1 | format version (1) |
//! | 5 | 57 × n | shape records |
//! | 5 + 57n | 1 | end marker `0xFF` |
//!
//! A record is the kind tag (`ShapeKind::tag`, one byte) followed by seven
//! `f64`: x1, y1, x2, y2, red, green, blue. Anything after the end marker is
//! ignored.

use crate::error::{FileError, Result};
use crate::shape::{Point, Rgb, Shape, ShapeKind};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: [u8; 4] = *b"SLWG";
pub const VERSION: u8 = 1;
pub const END_MARKER: u8 = 0xFF;
pub const EXTENSION: &str = "g";

const FIELDS: usize = 7;
/// Bytes per record, tag included.
pub const RECORD_LEN: usize = 1 + FIELDS * 8;

/// Append the `.g` extension unless the name already ends with it.
pub fn with_extension(path: &Path) -> PathBuf {
    let has_ext = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case(EXTENSION))
        .unwrap_or(false);
    if has_ext {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(EXTENSION);
        PathBuf::from(name)
    }
}

pub fn encode(shapes: &[Shape]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAGIC.len() + 2 + shapes.len() * RECORD_LEN);
    buf.extend_from_slice(&MAGIC);
    buf.push(VERSION);
    for shape in shapes {
        buf.push(shape.kind.tag());
        let fields = [
            shape.start.x,
            shape.start.y,
            shape.end.x,
            shape.end.y,
            shape.color.r,
            shape.color.g,
            shape.color.b,
        ];
        for field in fields {
            buf.extend_from_slice(&field.to_le_bytes());
        }
    }
    buf.push(END_MARKER);
    buf
}

pub fn write_shapes(mut writer: impl Write, shapes: &[Shape]) -> Result<()> {
    writer.write_all(&encode(shapes))?;
    writer.flush()?;
    Ok(())
}

/// Cursor over a byte slice that reports which record ran short.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, index: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let bytes = self.data.get(self.pos..end).ok_or(FileError::Truncated { index })?;
        self.pos = end;
        Ok(bytes)
    }

    fn f64(&mut self, index: usize) -> Result<f64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8, index)?);
        Ok(f64::from_le_bytes(raw))
    }
}

pub fn decode(data: &[u8]) -> Result<Vec<Shape>> {
    let mut magic = [0u8; 4];
    let head = data.get(..MAGIC.len()).ok_or(FileError::Truncated { index: 0 })?;
    magic.copy_from_slice(head);
    if magic != MAGIC {
        return Err(FileError::BadMagic(magic));
    }

    let mut reader = Reader { data, pos: MAGIC.len() };
    let version = reader.take(1, 0)?[0];
    if version != VERSION {
        return Err(FileError::UnsupportedVersion(version));
    }

    let mut shapes = Vec::new();
    loop {
        let index = shapes.len();
        let tag = reader.take(1, index)?[0];
        if tag == END_MARKER {
            return Ok(shapes);
        }
        let kind = ShapeKind::from_tag(tag).ok_or(FileError::UnknownTag { tag, index })?;

        let mut f = [0.0f64; FIELDS];
        for field in &mut f {
            *field = reader.f64(index)?;
        }
        shapes.push(Shape::new(
            kind,
            Point::new(f[0], f[1]),
            Point::new(f[2], f[3]),
            Rgb::new(f[4], f[5], f[6]),
        ));
    }
}

pub fn read_shapes(mut reader: impl Read) -> Result<Vec<Shape>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode(&data)
}
