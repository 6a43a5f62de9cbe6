//! Class identity as JaCoCo computes it: a CRC64 over the raw class file
//! bytes (reversed polynomial `0xD800000000000000`, zero seed, no final xor).

const POLY64REV: u64 = 0xD800_0000_0000_0000;

const LOOKUP_TABLE: [u64; 256] = build_table();

const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut index = 0usize;
    while index < 256 {
        let mut value = index as u64;
        let mut bit = 0;
        while bit < 8 {
            value = if value & 1 == 1 {
                (value >> 1) ^ POLY64REV
            } else {
                value >> 1
            };
            bit += 1;
        }
        table[index] = value;
        index += 1;
    }
    table
}

pub fn class_id(class_bytes: &[u8]) -> u64 {
    class_bytes.iter().fold(0u64, |sum, byte| {
        let lookup = ((sum ^ u64::from(*byte)) & 0xFF) as usize;
        (sum >> 8) ^ LOOKUP_TABLE[lookup]
    })
}
