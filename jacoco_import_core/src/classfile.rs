//! Just enough of the JVM class-file format to tell which class a file
//! declares and which source file it was compiled from.

use crate::error::ClassFileError;
use crate::mutf8;

const CLASS_MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFileInfo {
    /// Internal name, `/`-separated.
    pub name: String,
    pub source_file: Option<String>,
    pub major_version: u16,
}

impl ClassFileInfo {
    pub fn package(&self) -> &str {
        self.name.rsplit_once('/').map_or("", |(package, _)| package)
    }

    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, simple)| simple)
    }
}

#[derive(Debug, Clone, Copy)]
enum Constant<'a> {
    Unusable,
    Utf8(&'a [u8]),
    Class(u16),
    Other,
}

pub fn read_class_file(bytes: &[u8]) -> Result<ClassFileInfo, ClassFileError> {
    let mut cursor = Cursor { bytes, offset: 0 };
    let magic = cursor.u32()?;
    if magic != CLASS_MAGIC {
        return Err(ClassFileError::InvalidMagic { found: magic });
    }
    let _minor_version = cursor.u16()?;
    let major_version = cursor.u16()?;
    let pool = read_constant_pool(&mut cursor)?;

    let _access_flags = cursor.u16()?;
    let this_class = cursor.u16()?;
    let _super_class = cursor.u16()?;
    let interfaces = cursor.u16()?;
    cursor.skip(usize::from(interfaces) * 2)?;
    skip_members(&mut cursor)?;
    skip_members(&mut cursor)?;

    let mut source_file = None;
    let attributes = cursor.u16()?;
    for _ in 0..attributes {
        let name_index = cursor.u16()?;
        let len = cursor.u32()? as usize;
        if utf8(&pool, name_index)? == "SourceFile" && len >= 2 {
            let source_index = cursor.u16()?;
            source_file = Some(utf8(&pool, source_index)?);
            cursor.skip(len - 2)?;
        } else {
            cursor.skip(len)?;
        }
    }

    Ok(ClassFileInfo {
        name: class_name(&pool, this_class)?,
        source_file,
        major_version,
    })
}

fn read_constant_pool<'a>(
    cursor: &mut Cursor<'a>,
) -> Result<Vec<Constant<'a>>, ClassFileError> {
    let count = cursor.u16()?;
    let mut pool = vec![Constant::Unusable; usize::from(count)];
    let mut index = 1u16;
    while index < count {
        let tag = cursor.u8()?;
        let (entry, slots) = match tag {
            1 => {
                let len = usize::from(cursor.u16()?);
                (Constant::Utf8(cursor.take(len)?), 1)
            }
            7 => (Constant::Class(cursor.u16()?), 1),
            3 | 4 => {
                cursor.skip(4)?;
                (Constant::Other, 1)
            }
            // Longs and doubles occupy two pool slots.
            5 | 6 => {
                cursor.skip(8)?;
                (Constant::Other, 2)
            }
            8 | 16 | 19 | 20 => {
                cursor.skip(2)?;
                (Constant::Other, 1)
            }
            15 => {
                cursor.skip(3)?;
                (Constant::Other, 1)
            }
            9..=12 | 17 | 18 => {
                cursor.skip(4)?;
                (Constant::Other, 1)
            }
            _ => return Err(ClassFileError::UnknownConstant { tag, index }),
        };
        if let Some(slot) = pool.get_mut(usize::from(index)) {
            *slot = entry;
        }
        index = index.saturating_add(slots);
    }
    Ok(pool)
}

fn skip_members(cursor: &mut Cursor<'_>) -> Result<(), ClassFileError> {
    let count = cursor.u16()?;
    for _ in 0..count {
        cursor.skip(6)?;
        let attributes = cursor.u16()?;
        for _ in 0..attributes {
            cursor.skip(2)?;
            let len = cursor.u32()? as usize;
            cursor.skip(len)?;
        }
    }
    Ok(())
}

fn utf8(pool: &[Constant<'_>], index: u16) -> Result<String, ClassFileError> {
    match pool.get(usize::from(index)) {
        Some(Constant::Utf8(raw)) => {
            mutf8::decode(raw).ok_or(ClassFileError::InvalidUtf { index })
        }
        _ => Err(ClassFileError::BadConstantRef {
            index,
            expected: "Utf8",
        }),
    }
}

fn class_name(pool: &[Constant<'_>], index: u16) -> Result<String, ClassFileError> {
    match pool.get(usize::from(index)) {
        Some(Constant::Class(name_index)) => utf8(pool, *name_index),
        _ => Err(ClassFileError::BadConstantRef {
            index,
            expected: "Class",
        }),
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::Truncated {
                offset: self.offset,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassFileError> {
        self.take(len).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ClassFileError> {
        let raw = self.take(2)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    fn u32(&mut self) -> Result<u32, ClassFileError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}
