#![allow(dead_code)]

/// Hand-assembled execution data, independent of the crate's writer.
#[derive(Default)]
pub struct ExecBytes {
    pub bytes: Vec<u8>,
}

impl ExecBytes {
    pub fn header(mut self, version: u16) -> Self {
        self.bytes.push(0x01);
        self.bytes.extend_from_slice(&[0xC0, 0xC0]);
        self.bytes.extend_from_slice(&version.to_be_bytes());
        self
    }

    pub fn session(mut self, id: &str, start: i64, dump: i64) -> Self {
        self.bytes.push(0x10);
        self.utf(id);
        self.bytes.extend_from_slice(&start.to_be_bytes());
        self.bytes.extend_from_slice(&dump.to_be_bytes());
        self
    }

    pub fn class(mut self, id: u64, name: &str, probes: &[bool]) -> Self {
        self.bytes.push(0x11);
        self.bytes.extend_from_slice(&id.to_be_bytes());
        self.utf(name);
        assert!(probes.len() < 0x80, "single byte var-int only");
        self.bytes.push(probes.len() as u8);
        for chunk in probes.chunks(8) {
            let mut packed = 0u8;
            for (bit, value) in chunk.iter().enumerate() {
                if *value {
                    packed |= 1 << bit;
                }
            }
            self.bytes.push(packed);
        }
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    fn utf(&mut self, text: &str) {
        self.bytes
            .extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(text.as_bytes());
    }
}

/// A minimal but valid class file: constant pool, `this_class`, and an
/// optional `SourceFile` attribute. No fields or methods.
pub fn class_file(internal_name: &str, source_file: Option<&str>) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = vec![];
    pool.push(utf8_constant(internal_name)); // #1
    pool.push(vec![7, 0, 1]); // #2 Class -> #1
    pool.push(vec![5, 0, 0, 0, 0, 0, 0, 0, 42]); // #3 Long, occupies #3 and #4
    if let Some(source) = source_file {
        pool.push(utf8_constant("SourceFile")); // #5
        pool.push(utf8_constant(source)); // #6
    }
    let slot_count: u16 = if source_file.is_some() { 7 } else { 5 };

    let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
    out.extend_from_slice(&slot_count.to_be_bytes());
    pool.iter().for_each(|entry| out.extend_from_slice(entry));
    out.extend_from_slice(&[0x00, 0x21]); // ACC_PUBLIC | ACC_SUPER
    out.extend_from_slice(&[0x00, 0x02]); // this_class
    out.extend_from_slice(&[0x00, 0x00]); // super_class
    out.extend_from_slice(&[0x00, 0x00]); // interfaces
    out.extend_from_slice(&[0x00, 0x00]); // fields
    out.extend_from_slice(&[0x00, 0x00]); // methods
    if source_file.is_some() {
        out.extend_from_slice(&[0x00, 0x01, 0x00, 0x05, 0x00, 0x00, 0x00, 0x02, 0x00, 0x06]);
    } else {
        out.extend_from_slice(&[0x00, 0x00]);
    }
    out
}

fn utf8_constant(text: &str) -> Vec<u8> {
    let mut entry = vec![1];
    entry.extend_from_slice(&(text.len() as u16).to_be_bytes());
    entry.extend_from_slice(text.as_bytes());
    entry
}
