//! Whitespace normalizer for generated HTML and text
//!
//! Static site generators tend to emit stray trailing spaces, CRLF line
//! endings from templates authored on Windows, and long runs of blank lines
//! where template blocks rendered empty. `Tidy` cleans those up without
//! touching the interior of a line. It does not know about markup, so
//! trailing whitespace and blank-line runs inside `<pre>` or `<textarea>`
//! are normalized too, which is visible in the rendered page.
//!
//! Rules, applied in order:
//! 1. `\r\n` and lone `\r` become `\n`
//! 2. trailing spaces and tabs are stripped from every line
//! 3. leading blank lines are dropped
//! 4. runs of blank lines longer than `max_blank_lines` are collapsed
//! 5. output ends with exactly one `\n` (whitespace-only input becomes empty)
//!
//! Works on raw bytes; invalid UTF-8 passes through untouched.

use super::Transform;

/// Default number of consecutive blank lines kept
pub const DEFAULT_MAX_BLANK_LINES: usize = 1;

/// Whitespace normalizer
#[derive(Debug, Clone, Copy)]
pub struct Tidy {
    max_blank_lines: usize,
}

impl Tidy {
    /// Create a normalizer keeping at most `max_blank_lines` blank lines in a row
    pub fn new(max_blank_lines: usize) -> Self {
        Self { max_blank_lines }
    }
}

impl Default for Tidy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLANK_LINES)
    }
}

impl Transform for Tidy {
    fn apply(&self, input: &[u8]) -> Vec<u8> {
        let normalized = normalize_line_endings(input);

        let mut out = Vec::with_capacity(normalized.len() + 1);
        let mut pending_blank = 0usize;
        let mut seen_content = false;

        for line in normalized.split(|&b| b == b'\n') {
            let line = trim_trailing(line);

            if line.is_empty() {
                if seen_content {
                    pending_blank += 1;
                }
                continue;
            }

            if seen_content {
                out.push(b'\n');
                for _ in 0..pending_blank.min(self.max_blank_lines) {
                    out.push(b'\n');
                }
            }
            pending_blank = 0;
            seen_content = true;
            out.extend_from_slice(line);
        }

        if seen_content {
            out.push(b'\n');
        }
        out
    }

    fn name(&self) -> &str {
        "tidy"
    }
}

fn normalize_line_endings(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut iter = input.iter().peekable();

    while let Some(&b) = iter.next() {
        if b == b'\r' {
            if iter.peek() == Some(&&b'\n') {
                iter.next();
            }
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }
    out
}

fn trim_trailing(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |i| i + 1);
    &line[..end]
}
