//! Path tokenizing.
//!
//! A path is split on [`DELIMITER`] one segment at a time. Traversal code only
//! ever needs the head segment and the untouched remainder, so the resolver
//! hands those back as borrowed slices of the input.

/// The fixed segment delimiter.
pub const DELIMITER: char = ':';

/// One step of a path: the head segment and what follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The first token of the path.
    pub head: &'a str,

    /// The remaining tokens joined with the delimiter, or `""` if none remain.
    pub rest: &'a str,

    /// True iff the path held exactly one token.
    pub is_final: bool,
}

/// Split off the first segment of a path.
///
/// `"a:b:c"` gives head `"a"`, rest `"b:c"`. A trailing delimiter leaves one
/// more (empty) segment to resolve: `"a:"` is not final and its rest is `""`.
pub fn next_segment(path: &str) -> Segment<'_> {
    match path.split_once(DELIMITER) {
        Some((head, rest)) => Segment {
            head,
            rest,
            is_final: false,
        },
        None => Segment {
            head: path,
            rest: "",
            is_final: true,
        },
    }
}

/// Iterate over every segment of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(DELIMITER)
}

/// Join segments back into a path.
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(segment.as_ref());
    }
    out
}
