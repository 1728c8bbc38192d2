//! Two-column (term, meaning) vocabulary sheets.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("unexpected character after closing quote on line {line}")]
    TrailingAfterQuote { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyRow {
    pub term: String,
    pub meaning: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedSheet {
    pub rows: Vec<VocabularyRow>,
    pub skipped: usize,
}

/// Splits CSV text into records of fields.
///
/// Quoted fields may contain commas, newlines and `""` escapes. Unquoted
/// fields are trimmed. Both `\n` and `\r\n` end a record and a trailing
/// newline does not produce an empty record.
pub fn tokenize(input: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;
    let mut field_started = false;
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' if !field_started || field.trim().is_empty() && !quoted => {
                let open_line = line;
                field.clear();
                quoted = true;
                field_started = true;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            field.push(c);
                        }
                        None => return Err(CsvError::UnterminatedQuote { line: open_line }),
                    }
                }
                while matches!(chars.peek(), Some(' ') | Some('\t')) {
                    chars.next();
                }
                match chars.peek() {
                    None | Some(',') | Some('\n') | Some('\r') => {}
                    Some(_) => return Err(CsvError::TrailingAfterQuote { line }),
                }
            }
            ',' => {
                record.push(finish_field(&mut field, quoted));
                field_started = false;
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(finish_field(&mut field, quoted));
                records.push(std::mem::take(&mut record));
                field_started = false;
                quoted = false;
                line += 1;
            }
            other => {
                field.push(other);
                field_started = true;
            }
        }
    }

    if field_started || !record.is_empty() {
        record.push(finish_field(&mut field, quoted));
        records.push(record);
    }

    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    Ok(records)
}

fn finish_field(field: &mut String, quoted: bool) -> String {
    let value = std::mem::take(field);
    if quoted {
        value
    } else {
        value.trim().to_string()
    }
}

fn is_header(record: &[String]) -> bool {
    let first = record.first().map(|v| v.to_ascii_lowercase());
    let second = record.get(1).map(|v| v.to_ascii_lowercase());
    matches!(first.as_deref(), Some("term") | Some("word"))
        && matches!(second.as_deref(), Some("meaning") | Some("definition"))
}

/// Parses a sheet into rows, dropping a header row and rows without a term.
pub fn parse_sheet(input: &str) -> Result<ParsedSheet, CsvError> {
    let records = tokenize(input.trim_start_matches('\u{feff}'))?;
    let mut sheet = ParsedSheet::default();

    for (idx, record) in records.into_iter().enumerate() {
        if idx == 0 && is_header(&record) {
            continue;
        }
        let mut fields = record.into_iter();
        let term = fields.next().unwrap_or_default().trim().to_string();
        let meaning = fields.next().unwrap_or_default().trim().to_string();
        if term.is_empty() {
            sheet.skipped += 1;
            continue;
        }
        sheet.rows.push(VocabularyRow { term, meaning });
    }

    Ok(sheet)
}
