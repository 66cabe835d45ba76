use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::SequenceConfig;
use crate::table::VocabRow;

/// Atomic unit of the planned output track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// A cell to be spoken with the voice configured for its column
    Speech {
        column: String,
        row: usize,
        text: String,
    },
    /// A replay of an earlier Speech clip in the same row; never
    /// triggers a second synthesis
    Repeat { column: String, row: usize },
    /// A fixed span of silence
    Silence { duration_ms: u64 },
}

impl Segment {
    pub fn is_silence(&self) -> bool {
        matches!(self, Segment::Silence { .. })
    }
}

/// Ordered segments for one row, trailing silence trimmed
pub type RowSequence = Vec<Segment>;

/// Concatenation of all row sequences with inter-row silence
pub type FinalSequence = Vec<Segment>;

/// Plan the segment sequence for a single row.
///
/// Columns are visited in table order. Blank cells contribute nothing.
/// Each spoken cell is followed by the configured cell gap. When a repeat
/// rule's target column was just spoken and its source column produced a
/// clip earlier in the same row, the source clip is replayed after the
/// translation, again followed by the cell gap. The trailing silence is
/// trimmed so a row never ends in a gap.
pub fn sequence_row(
    row: &VocabRow,
    columns: &[String],
    config: &SequenceConfig,
) -> RowSequence {
    let mut segments = Vec::new();
    let mut spoken: HashSet<&str> = HashSet::new();

    for (col_idx, column) in columns.iter().enumerate() {
        let Some(text) = row.cell(col_idx) else {
            continue;
        };

        segments.push(Segment::Speech {
            column: column.clone(),
            row: row.index,
            text: text.to_string(),
        });
        segments.push(Segment::Silence {
            duration_ms: config.cell_gap_ms,
        });
        spoken.insert(column.as_str());

        for rule in &config.repeats {
            if rule.repeat_source_after_target
                && rule.target == *column
                && spoken.contains(rule.source.as_str())
            {
                segments.push(Segment::Repeat {
                    column: rule.source.clone(),
                    row: row.index,
                });
                segments.push(Segment::Silence {
                    duration_ms: config.cell_gap_ms,
                });
            }
        }
    }

    trim_trailing_silence(&mut segments);
    segments
}

/// Plan the full track over all rows.
///
/// Rows beyond `max_rows` are skipped, as are rows with no spoken cell.
/// Non-empty row sequences are joined by the configured row gap and the
/// final trailing silence is trimmed.
pub fn assemble(
    rows: &[VocabRow],
    columns: &[String],
    config: &SequenceConfig,
    max_rows: Option<usize>,
) -> FinalSequence {
    let limit = max_rows.unwrap_or(usize::MAX);
    let mut sequence = Vec::new();

    for row in rows.iter().take(limit) {
        let row_sequence = sequence_row(row, columns, config);
        if row_sequence.is_empty() {
            continue;
        }

        sequence.extend(row_sequence);
        sequence.push(Segment::Silence {
            duration_ms: config.row_gap_ms,
        });
    }

    trim_trailing_silence(&mut sequence);
    sequence
}

fn trim_trailing_silence(segments: &mut Vec<Segment>) {
    if segments.last().is_some_and(Segment::is_silence) {
        segments.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RepeatRule};

    fn columns() -> Vec<String> {
        Config::default().table.columns
    }

    fn seq_config() -> SequenceConfig {
        Config::default().sequence
    }

    fn row(index: usize, cells: &[&str]) -> VocabRow {
        VocabRow::new(
            index,
            cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        None
                    } else {
                        Some(c.to_string())
                    }
                })
                .collect(),
        )
    }

    fn speech(column: &str, row: usize, text: &str) -> Segment {
        Segment::Speech {
            column: column.to_string(),
            row,
            text: text.to_string(),
        }
    }

    fn silence(duration_ms: u64) -> Segment {
        Segment::Silence { duration_ms }
    }

    #[test]
    fn test_single_cell_row_has_no_trailing_silence() {
        let row = row(1, &["Hallo", "", "", "", "", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert_eq!(sequence, vec![speech("de", 1, "Hallo")]);
    }

    #[test]
    fn test_two_cells_separated_by_gap() {
        let row = row(1, &["Hallo", "Privet", "", "", "", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert_eq!(
            sequence,
            vec![
                speech("de", 1, "Hallo"),
                silence(1000),
                speech("ru", 1, "Privet"),
            ]
        );
    }

    #[test]
    fn test_blank_cells_contribute_nothing() {
        let row = row(3, &["", "  ", "Haus", "", "\t", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert_eq!(sequence, vec![speech("b1_de", 3, "Haus")]);
    }

    #[test]
    fn test_cell_text_is_trimmed() {
        let row = row(1, &["  Hallo  ", "", "", "", "", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert_eq!(sequence, vec![speech("de", 1, "Hallo")]);
    }

    #[test]
    fn test_repeat_rule_replays_source_after_translation() {
        let row = row(1, &["", "", "Haus", "Dom", "", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert_eq!(
            sequence,
            vec![
                speech("b1_de", 1, "Haus"),
                silence(1000),
                speech("b1_ru", 1, "Dom"),
                silence(1000),
                Segment::Repeat {
                    column: "b1_de".to_string(),
                    row: 1,
                },
            ]
        );
    }

    #[test]
    fn test_repeat_skipped_when_source_was_blank() {
        let row = row(1, &["", "", "", "Dom", "", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert_eq!(sequence, vec![speech("b1_ru", 1, "Dom")]);
    }

    #[test]
    fn test_base_pair_does_not_repeat_by_default() {
        let row = row(1, &["Hallo", "Privet", "", "", "", ""]);
        let sequence = sequence_row(&row, &columns(), &seq_config());

        assert!(!sequence
            .iter()
            .any(|s| matches!(s, Segment::Repeat { .. })));
    }

    #[test]
    fn test_base_pair_repeat_is_configurable() {
        let mut config = seq_config();
        config.repeats.push(RepeatRule {
            source: "de".to_string(),
            target: "ru".to_string(),
            repeat_source_after_target: true,
        });

        let row = row(1, &["Hallo", "Privet", "", "", "", ""]);
        let sequence = sequence_row(&row, &columns(), &config);

        assert_eq!(
            sequence.last(),
            Some(&Segment::Repeat {
                column: "de".to_string(),
                row: 1,
            })
        );
    }

    #[test]
    fn test_disabled_rule_never_fires() {
        let mut config = seq_config();
        for rule in &mut config.repeats {
            rule.repeat_source_after_target = false;
        }

        let row = row(1, &["", "", "Haus", "Dom", "", ""]);
        let sequence = sequence_row(&row, &columns(), &config);

        assert!(!sequence
            .iter()
            .any(|s| matches!(s, Segment::Repeat { .. })));
    }

    #[test]
    fn test_row_sequence_never_ends_in_silence() {
        let rows = [
            row(1, &["Hallo", "", "", "", "", ""]),
            row(2, &["Hallo", "Privet", "Haus", "Dom", "", ""]),
            row(3, &["", "", "", "", "Zug", "Poezd"]),
        ];

        for r in &rows {
            let sequence = sequence_row(r, &columns(), &seq_config());
            assert!(!sequence.last().unwrap().is_silence());
        }
    }

    #[test]
    fn test_assemble_joins_rows_with_row_gap() {
        let rows = vec![
            row(1, &["Hallo", "", "", "", "", ""]),
            row(2, &["Welt", "", "", "", "", ""]),
        ];
        let sequence = assemble(&rows, &columns(), &seq_config(), None);

        assert_eq!(
            sequence,
            vec![
                speech("de", 1, "Hallo"),
                silence(2000),
                speech("de", 2, "Welt"),
            ]
        );
    }

    #[test]
    fn test_assemble_has_no_adjacent_silences() {
        let rows = vec![
            row(1, &["Hallo", "Privet", "Haus", "Dom", "", ""]),
            row(2, &["", "", "", "", "", ""]),
            row(3, &["Zug", "Poezd", "", "", "", ""]),
        ];
        let sequence = assemble(&rows, &columns(), &seq_config(), None);

        for pair in sequence.windows(2) {
            assert!(!(pair[0].is_silence() && pair[1].is_silence()));
        }
        assert!(!sequence.last().unwrap().is_silence());

        // exactly one inter-row gap between the two non-empty rows
        let row_gaps = sequence
            .iter()
            .filter(|s| matches!(s, Segment::Silence { duration_ms: 2000 }))
            .count();
        assert_eq!(row_gaps, 1);
    }

    #[test]
    fn test_assemble_skips_empty_rows() {
        let rows = vec![
            row(1, &["", "", "", "", "", ""]),
            row(2, &["Hallo", "", "", "", "", ""]),
        ];
        let sequence = assemble(&rows, &columns(), &seq_config(), None);

        assert_eq!(sequence, vec![speech("de", 2, "Hallo")]);
    }

    #[test]
    fn test_assemble_honors_row_limit() {
        let rows = vec![
            row(1, &["Eins", "", "", "", "", ""]),
            row(2, &["Zwei", "", "", "", "", ""]),
            row(3, &["Drei", "", "", "", "", ""]),
        ];
        let sequence = assemble(&rows, &columns(), &seq_config(), Some(2));

        assert!(sequence.contains(&speech("de", 2, "Zwei")));
        assert!(!sequence.contains(&speech("de", 3, "Drei")));
    }

    #[test]
    fn test_assemble_empty_input() {
        let sequence = assemble(&[], &columns(), &seq_config(), None);
        assert!(sequence.is_empty());
    }
}
