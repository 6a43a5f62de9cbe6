use crate::error::ExecEncodeError;
use crate::exec::{
    BLOCK_EXECUTION_DATA, BLOCK_HEADER, BLOCK_SESSION_INFO, ClassExecution, ExecDump, ExecFormat,
    MAGIC_NUMBER, SessionInfo,
};
use crate::mutf8;

/// Serializes a dump as a single header followed by its sessions and its
/// classes. Classes without any executed probe are left out.
pub fn encode_exec(dump: &ExecDump) -> Result<Vec<u8>, ExecEncodeError> {
    let mut writer = ExecWriter::default();
    writer.header(dump.format);
    for session in &dump.sessions {
        writer.session_info(session)?;
    }
    for class in dump.classes().filter(|class| class.has_hits()) {
        writer.class_execution(class)?;
    }
    Ok(writer.out)
}

#[derive(Default)]
struct ExecWriter {
    out: Vec<u8>,
}

impl ExecWriter {
    fn header(&mut self, format: ExecFormat) {
        self.out.push(BLOCK_HEADER);
        self.out.extend_from_slice(&MAGIC_NUMBER.to_be_bytes());
        self.out.extend_from_slice(&format.version().to_be_bytes());
    }

    fn session_info(&mut self, session: &SessionInfo) -> Result<(), ExecEncodeError> {
        self.out.push(BLOCK_SESSION_INFO);
        self.utf(&session.id)?;
        self.out.extend_from_slice(&session.start.to_be_bytes());
        self.out.extend_from_slice(&session.dump.to_be_bytes());
        Ok(())
    }

    fn class_execution(&mut self, class: &ClassExecution) -> Result<(), ExecEncodeError> {
        self.out.push(BLOCK_EXECUTION_DATA);
        self.out.extend_from_slice(&class.id.to_be_bytes());
        self.utf(&class.name)?;
        self.bool_array(&class.probes);
        Ok(())
    }

    fn utf(&mut self, text: &str) -> Result<(), ExecEncodeError> {
        let encoded = mutf8::encode(text);
        let len = u16::try_from(encoded.len()).map_err(|_| ExecEncodeError::StringTooLong {
            len: encoded.len(),
            preview: text.chars().take(40).collect(),
        })?;
        self.out.extend_from_slice(&len.to_be_bytes());
        self.out.extend_from_slice(&encoded);
        Ok(())
    }

    fn var_int(&mut self, mut value: u32) {
        while value & !0x7F != 0 {
            self.out.push(0x80 | (value & 0x7F) as u8);
            value >>= 7;
        }
        self.out.push(value as u8);
    }

    fn bool_array(&mut self, values: &[bool]) {
        self.var_int(values.len() as u32);
        for chunk in values.chunks(8) {
            let packed = chunk
                .iter()
                .enumerate()
                .filter(|(_, value)| **value)
                .fold(0u8, |acc, (bit, _)| acc | (1 << bit));
            self.out.push(packed);
        }
    }
}
