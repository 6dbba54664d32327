//! Pure line extraction over a single page of bytes.
//!
//! The caller walks the file backward, so the page passed here sits at a
//! lower file offset than everything processed so far. The `suffix` is
//! the carry: bytes that sit immediately after this page in the file and
//! whose line terminator has not yet been seen. Extraction reassembles
//! lines that cross the page boundary without ever holding more than one
//! page and one line's worth of bytes.

use std::borrow::Cow;

use memchr::memchr_iter;

/// Result of scanning one page.
#[derive(Debug)]
pub(crate) struct Extraction<'a> {
    /// Complete lines found in the page, most recent (highest file
    /// offset) first. Views borrow from the page or the suffix and are
    /// invalidated by the next page read; callers copy before yielding.
    pub lines: Vec<Cow<'a, [u8]>>,

    /// Candidate start of an older line. It is not confirmed: it may
    /// extend into an earlier page, so it becomes the next suffix.
    pub prefix: Cow<'a, [u8]>,

    /// True when a kept line, or the unterminated accumulation of page
    /// and suffix, outgrew `max_line_length`.
    pub overflow: bool,
}

/// Splits a page into newline-terminated lines, joining the carried
/// suffix onto the page's tail region where the suffix is terminated.
pub(crate) fn extract_lines<'a>(
    max_line_length: usize,
    page: &'a [u8],
    suffix: &'a [u8],
) -> Extraction<'a> {
    let mut lines: Vec<Cow<'a, [u8]>> = Vec::new();
    let mut start = 0;
    for newline in memchr_iter(b'\n', page) {
        lines.push(Cow::Borrowed(&page[start..=newline]));
        start = newline + 1;
    }

    if lines.is_empty() {
        // No terminator anywhere in the page: the whole page extends the
        // suffix leftward.
        if page.len() + suffix.len() >= max_line_length {
            return Extraction {
                lines,
                prefix: Cow::Borrowed(&[]),
                overflow: true,
            };
        }
        return Extraction {
            lines,
            prefix: join(page, suffix),
            overflow: false,
        };
    }

    let tail = &page[start..];
    let suffix_terminated = suffix.last() == Some(&b'\n');
    if tail.is_empty() {
        if suffix_terminated {
            lines.push(Cow::Borrowed(suffix));
        }
    } else if suffix_terminated {
        lines.push(join(tail, suffix));
    }
    // An unterminated suffix can never be completed from the left, so it
    // is dropped, along with any unterminated tail bytes.

    lines.reverse();
    let prefix = lines
        .pop()
        .expect("a page with a newline yields at least one segment");
    let overflow = lines.iter().any(|line| line.len() > max_line_length);

    Extraction {
        lines,
        prefix,
        overflow,
    }
}

fn join<'a>(left: &'a [u8], right: &[u8]) -> Cow<'a, [u8]> {
    if right.is_empty() {
        return Cow::Borrowed(left);
    }
    let mut joined = Vec::with_capacity(left.len() + right.len());
    joined.extend_from_slice(left);
    joined.extend_from_slice(right);
    Cow::Owned(joined)
}
