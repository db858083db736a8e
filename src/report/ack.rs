//! Backend acknowledgment check.
//!
//! A report counts as accepted only when the backend answers `200` and the
//! top-level JSON object of the body has `"ok"` set to `true`. The key is
//! located structurally, so whitespace and key order do not matter, and an
//! `ok` inside a nested object or inside a string value is ignored.

/// HTTP status of an accepted report.
pub const STATUS_OK: u16 = 200;

/// Status code and body together decide acceptance.
pub fn is_accepted(status: u16, body: &[u8]) -> bool {
    status == STATUS_OK && acknowledges(body)
}

/// Whether the top-level object of `body` carries `"ok": true`.
///
/// The first top-level `ok` key decides.
pub fn acknowledges(body: &[u8]) -> bool {
    let mut depth = 0usize;
    let mut i = 0;

    while i < body.len() {
        match body[i] {
            b'"' => {
                let Some(end) = string_end(body, i + 1) else {
                    return false;
                };
                let text = &body[i + 1..end];
                i = end + 1;

                if depth == 1 && text == b"ok" {
                    let colon = skip_ws(body, i);
                    if body.get(colon) == Some(&b':') {
                        return is_true_literal(body, skip_ws(body, colon + 1));
                    }
                }
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return false;
                }
            }
            _ => {}
        }
        i += 1;
    }

    false
}

/// Index of the closing quote of a string whose content starts at `start`.
fn string_end(body: &[u8], start: usize) -> Option<usize> {
    let mut escape_next = false;
    for (offset, &byte) in body.get(start..)?.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match byte {
            b'\\' => escape_next = true,
            b'"' => return Some(start + offset),
            _ => {}
        }
    }
    None
}

fn skip_ws(body: &[u8], mut i: usize) -> usize {
    while let Some(b' ' | b'\t' | b'\n' | b'\r') = body.get(i) {
        i += 1;
    }
    i
}

fn is_true_literal(body: &[u8], at: usize) -> bool {
    let Some(rest) = body.get(at..) else {
        return false;
    };
    if !rest.starts_with(b"true") {
        return false;
    }
    matches!(
        rest.get(4),
        None | Some(b',' | b'}' | b' ' | b'\t' | b'\n' | b'\r')
    )
}
