use crate::error::ExecDecodeError;
use crate::exec::{
    BLOCK_EXECUTION_DATA, BLOCK_HEADER, BLOCK_SESSION_INFO, ClassExecution, ExecDump, ExecFormat,
    MAGIC_NUMBER, SessionInfo,
};
use crate::mutf8;

pub fn decode_exec(bytes: &[u8]) -> Result<ExecDump, ExecDecodeError> {
    let mut cursor = ByteCursor::new(bytes);
    let mut dump: Option<ExecDump> = None;

    while !cursor.is_empty() {
        let block_offset = cursor.offset;
        let block = cursor.u8()?;
        match (block, dump.as_mut()) {
            (BLOCK_HEADER, None) => {
                dump = Some(ExecDump::new(read_header(&mut cursor)?));
            }
            (BLOCK_HEADER, Some(current)) => {
                let format = read_header(&mut cursor)?;
                if format != current.format {
                    return Err(ExecDecodeError::MixedVersions {
                        offset: block_offset,
                        expected: current.format.version(),
                        found: format.version(),
                    });
                }
            }
            (_, None) => return Err(ExecDecodeError::MissingHeader { block }),
            (BLOCK_SESSION_INFO, Some(current)) => {
                current.sessions.push(read_session_info(&mut cursor)?);
            }
            (BLOCK_EXECUTION_DATA, Some(current)) => {
                current.put(read_class_execution(&mut cursor)?)?;
            }
            (_, Some(_)) => {
                return Err(ExecDecodeError::UnknownBlock {
                    block,
                    offset: block_offset,
                });
            }
        }
    }

    dump.ok_or(ExecDecodeError::Empty)
}

/// Reads only the leading header, e.g. to report the version of a file
/// whose body fails to decode.
pub fn peek_format(bytes: &[u8]) -> Result<ExecFormat, ExecDecodeError> {
    let mut cursor = ByteCursor::new(bytes);
    if cursor.is_empty() {
        return Err(ExecDecodeError::Empty);
    }
    let block = cursor.u8()?;
    if block != BLOCK_HEADER {
        return Err(ExecDecodeError::MissingHeader { block });
    }
    read_header(&mut cursor)
}

fn read_header(cursor: &mut ByteCursor<'_>) -> Result<ExecFormat, ExecDecodeError> {
    let magic = cursor.u16()?;
    if magic != MAGIC_NUMBER {
        return Err(ExecDecodeError::InvalidMagic { found: magic });
    }
    let version = cursor.u16()?;
    ExecFormat::from_version(version).ok_or(ExecDecodeError::UnsupportedVersion { found: version })
}

fn read_session_info(cursor: &mut ByteCursor<'_>) -> Result<SessionInfo, ExecDecodeError> {
    let id = cursor.utf()?;
    let start = cursor.i64()?;
    let dump = cursor.i64()?;
    Ok(SessionInfo { id, start, dump })
}

fn read_class_execution(cursor: &mut ByteCursor<'_>) -> Result<ClassExecution, ExecDecodeError> {
    let id = cursor.i64()? as u64;
    let name = cursor.utf()?;
    let probes = cursor.bool_array()?;
    Ok(ClassExecution { id, name, probes })
}

struct ByteCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ExecDecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ExecDecodeError::Truncated {
                offset: self.offset,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ExecDecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ExecDecodeError> {
        let raw = self.take(2)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    fn i64(&mut self) -> Result<i64, ExecDecodeError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_be_bytes(buf))
    }

    fn utf(&mut self) -> Result<String, ExecDecodeError> {
        let len = usize::from(self.u16()?);
        let start = self.offset;
        let raw = self.take(len)?;
        mutf8::decode(raw).ok_or(ExecDecodeError::InvalidUtf { offset: start })
    }

    /// Seven bits per byte, least significant group first.
    fn var_int(&mut self) -> Result<u32, ExecDecodeError> {
        let start = self.offset;
        let mut value = 0u32;
        let mut shift = 0u32;
        loop {
            let byte = self.u8()?;
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                return Err(ExecDecodeError::InvalidLength { offset: start });
            }
        }
    }

    fn bool_array(&mut self) -> Result<Vec<bool>, ExecDecodeError> {
        let len = self.var_int()? as usize;
        let packed = self.take(len.div_ceil(8))?;
        Ok((0..len)
            .map(|index| packed[index / 8] & (1 << (index % 8)) != 0)
            .collect())
    }
}
