mod support;

use jacoco_import_core::error::ExecMergeError;
use jacoco_import_core::exec::reader::decode_exec;
use jacoco_import_core::exec::writer::encode_exec;
use jacoco_import_core::exec::{ClassExecution, ExecDump, ExecFormat, SessionInfo};

use support::ExecBytes;

fn class(id: u64, name: &str, probes: &[bool]) -> ClassExecution {
    ClassExecution {
        id,
        name: name.to_string(),
        probes: probes.to_vec(),
    }
}

#[test]
fn writer_output_matches_hand_assembled_bytes() {
    let mut dump = ExecDump::new(ExecFormat::V1006);
    dump.sessions.push(SessionInfo {
        id: "ci".to_string(),
        start: 10,
        dump: 20,
    });
    dump.put(class(3, "Hello", &[false, true, true])).unwrap();

    let expected = ExecBytes::default()
        .header(0x1006)
        .session("ci", 10, 20)
        .class(3, "Hello", &[false, true, true])
        .bytes;
    assert_eq!(encode_exec(&dump).unwrap(), expected);
}

#[test]
fn classes_without_hits_are_not_written() {
    let mut dump = ExecDump::new(ExecFormat::V1007);
    dump.put(class(1, "Ran", &[true])).unwrap();
    dump.put(class(2, "NeverRan", &[false, false])).unwrap();

    let decoded = decode_exec(&encode_exec(&dump).unwrap()).unwrap();
    assert_eq!(decoded.class_count(), 1);
    assert!(decoded.class(2).is_none());
}

#[test]
fn long_probe_arrays_use_multi_byte_lengths() {
    let probes = (0..300).map(|i| i % 7 == 0).collect::<Vec<_>>();
    let mut dump = ExecDump::new(ExecFormat::V1007);
    dump.put(class(5, "Big", &probes)).unwrap();

    let bytes = encode_exec(&dump).unwrap();
    // header (5) + block (1) + id (8) + name (2 + 3), then var-int 300 = AC 02
    assert_eq!(&bytes[19..21], &[0xAC, 0x02]);
    let decoded = decode_exec(&bytes).unwrap();
    assert_eq!(decoded.class(5).unwrap().probes, probes);
}

#[test]
fn merging_dumps_of_one_version_ors_probes_and_keeps_sessions() {
    let mut left = ExecDump::new(ExecFormat::V1007);
    left.sessions.push(SessionInfo {
        id: "a".to_string(),
        start: 1,
        dump: 2,
    });
    left.put(class(1, "Hello", &[true, false])).unwrap();

    let mut right = ExecDump::new(ExecFormat::V1007);
    right.sessions.push(SessionInfo {
        id: "b".to_string(),
        start: 3,
        dump: 4,
    });
    right.put(class(1, "Hello", &[false, true])).unwrap();
    right.put(class(2, "Other", &[true])).unwrap();

    left.merge(right).unwrap();
    assert_eq!(left.sessions.len(), 2);
    assert_eq!(left.class(1).unwrap().probes, vec![true, true]);
    assert_eq!(left.class_count(), 2);
}

#[test]
fn merging_dumps_of_different_versions_is_refused() {
    let mut left = ExecDump::new(ExecFormat::V1006);
    let right = ExecDump::new(ExecFormat::V1007);
    assert_eq!(
        left.merge(right).unwrap_err(),
        ExecMergeError::FormatMismatch {
            expected: 0x1006,
            found: 0x1007,
        }
    );
}
