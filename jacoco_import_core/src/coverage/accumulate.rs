use crate::coverage::model::{CoverageResult, ExecutionDataEntry, SourceFileDescriptor};
use crate::error::EntryIntegrityError;

/// Turns one class's per-line data into a fragment for `source`.
///
/// The whole entry is rejected when any line falls outside the file or any
/// branch record claims more covered outcomes than it has.
pub fn accumulate_entry(
    entry: &ExecutionDataEntry,
    source: &SourceFileDescriptor,
) -> Result<CoverageResult, EntryIntegrityError> {
    validate_entry(entry, source)?;

    let mut fragment = CoverageResult::default();
    for (index, hits) in entry.line_hits.iter().enumerate() {
        let Some(hits) = hits else {
            continue;
        };
        let line = line_number(index);
        let previous = fragment.line_hits.get(&line).copied().unwrap_or(0);
        fragment.line_hits.insert(line, previous.saturating_add(*hits));
    }
    for (index, record) in entry.branches.iter().enumerate() {
        if record.total <= 1 {
            continue;
        }
        let line = line_number(index);
        fragment.branch_totals.insert(line, record.total);
        fragment.branch_covered.insert(line, record.covered);
    }
    Ok(fragment)
}

fn validate_entry(
    entry: &ExecutionDataEntry,
    source: &SourceFileDescriptor,
) -> Result<(), EntryIntegrityError> {
    let out_of_range = |line: u32| EntryIntegrityError::LineOutOfRange {
        class: entry.class_name.clone(),
        file: source.key.clone(),
        line,
        lines: source.lines,
    };

    for (index, _) in entry
        .line_hits
        .iter()
        .enumerate()
        .filter(|(_, hits)| hits.is_some())
    {
        let line = line_number(index);
        if line > source.lines {
            return Err(out_of_range(line));
        }
    }

    for (index, record) in entry.branches.iter().enumerate() {
        let line = line_number(index);
        if record.covered > record.total {
            return Err(EntryIntegrityError::CoveredExceedsTotal {
                class: entry.class_name.clone(),
                line,
                total: record.total,
                covered: record.covered,
            });
        }
        if record.total > 1 && line > source.lines {
            return Err(out_of_range(line));
        }
    }
    Ok(())
}

fn line_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
