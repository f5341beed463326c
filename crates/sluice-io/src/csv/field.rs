//! Zero-copy field splitting for a single record.

use sluice_mem::ScratchArena;

use crate::error::Result;

pub const QUOTE: u8 = b'"';

/// One field of a record. `bytes` borrows the input line, or the scratch
/// arena when the field contained doubled quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField<'a> {
    pub bytes: &'a [u8],
    pub quoted: bool,
}

impl RawField<'_> {
    /// Unquoted and empty after trimming.
    pub fn is_null(&self) -> bool {
        !self.quoted && self.bytes.is_empty()
    }
}

fn trim(mut s: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = s {
        s = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = s {
        s = rest;
    }
    s
}

/// Split `line` on `delimiter`.
///
/// A quote only opens a quoted field at the very start of the field; text
/// between the closing quote and the next delimiter becomes a field of its
/// own. A trailing delimiter produces a final empty field.
pub fn split_fields<'a>(
    line: &'a [u8],
    delimiter: u8,
    arena: &'a ScratchArena,
) -> Result<Vec<RawField<'a>>> {
    let mut fields = Vec::new();
    let len = line.len();
    let mut i = 0;

    while i < len {
        if line[i] == QUOTE {
            i += 1;
            let start = i;
            let mut escaped = false;
            while i < len {
                if line[i] == QUOTE {
                    if i + 1 < len && line[i + 1] == QUOTE {
                        escaped = true;
                        i += 2;
                        continue;
                    }
                    break;
                }
                i += 1;
            }
            let end = i;
            if i < len {
                // closing quote
                i += 1;
            }
            let raw = &line[start..end];
            let bytes = if escaped {
                arena.alloc_unescaped(raw, QUOTE)?
            } else {
                raw
            };
            fields.push(RawField {
                bytes,
                quoted: true,
            });
            if i < len && line[i] != delimiter {
                continue;
            }
        } else {
            let start = i;
            while i < len && line[i] != delimiter {
                i += 1;
            }
            fields.push(RawField {
                bytes: trim(&line[start..i]),
                quoted: false,
            });
        }
        if i < len {
            // delimiter
            i += 1;
            if i == len {
                fields.push(RawField {
                    bytes: &[],
                    quoted: false,
                });
            }
        }
    }
    Ok(fields)
}
