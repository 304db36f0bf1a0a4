use super::*;

#[test]
fn test_line_starts() {
    let index = LineIndex::new("ab\ncde\n\nf");
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.line_start(0), Some(0));
    assert_eq!(index.line_start(1), Some(3));
    assert_eq!(index.line_start(2), Some(7));
    assert_eq!(index.line_start(3), Some(8));
    assert_eq!(index.line_start(4), None);
}

#[test]
fn test_line_text_excludes_newline() {
    let index = LineIndex::new("ab\ncde\n");
    assert_eq!(index.line_text(0), Some("ab"));
    assert_eq!(index.line_text(1), Some("cde"));
    assert_eq!(index.line_text(2), Some(""));
    assert_eq!(index.line_text(3), None);
}

#[test]
fn test_position_round_trip() {
    let text = "var a = 1;\nfunction f() {\n  return a;\n}";
    let index = LineIndex::new(text);
    for offset in 0..=text.len() as u32 {
        let position = index.position(offset);
        let Some(position) = position else {
            panic!("no position for offset {offset}");
        };
        assert_eq!(index.offset(position), Some(offset));
    }
}

#[test]
fn test_position_counts_utf16_units() {
    // 'é' is 2 bytes / 1 unit, '𝒳' is 4 bytes / 2 units
    let text = "é𝒳x";
    let index = LineIndex::new(text);
    assert_eq!(index.position(2), Some(LineColumn::new(0, 1)));
    assert_eq!(index.position(6), Some(LineColumn::new(0, 3)));
    assert_eq!(index.offset(LineColumn::new(0, 3)), Some(6));
    // inside the 4-byte character
    assert_eq!(index.position(3), None);
    // between the two surrogates
    assert_eq!(index.offset(LineColumn::new(0, 2)), None);
    assert_eq!(index.line_len_utf16(0), Some(4));
}

#[test]
fn test_offset_rejects_columns_past_line_end() {
    let index = LineIndex::new("abc\ndef");
    assert_eq!(index.offset(LineColumn::new(0, 3)), Some(3));
    assert_eq!(index.offset(LineColumn::new(0, 4)), None);
    assert_eq!(index.offset(LineColumn::new(5, 0)), None);
}

#[test]
fn test_position_past_end() {
    let index = LineIndex::new("abc");
    assert_eq!(index.position(3), Some(LineColumn::new(0, 3)));
    assert_eq!(index.position(4), None);
}
