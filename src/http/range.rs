//! HTTP Range request parsing module
//!
//! Single byte-range support (RFC 7233) so media and large assets can be
//! resumed or seeked by browsers.

/// Inclusive byte range, already clamped to the file length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

/// What to send for a given `Range` header
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No Range header, or one we ignore (malformed, multi-range, other unit)
    Full,
    /// Send 206 with this slice
    Partial(ByteRange),
    /// Send 416
    Unsatisfiable,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end`
/// - `bytes=start-`
/// - `bytes=-suffix`
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeOutcome {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };

    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        parse_suffix_range(end_str, file_size)
    } else {
        parse_standard_range(start_str, end_str, file_size)
    }
}

/// Parse suffix range (e.g., "-500" means the last 500 bytes)
fn parse_suffix_range(suffix_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeOutcome::Full;
    };

    if suffix == 0 || file_size == 0 {
        return RangeOutcome::Unsatisfiable;
    }

    // Suffix larger than the file selects the whole file
    RangeOutcome::Partial(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(start) = start_str.parse::<usize>() else {
        return RangeOutcome::Full;
    };

    if start >= file_size {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        let Ok(e) = end_str.parse::<usize>() else {
            return RangeOutcome::Full;
        };
        e.min(file_size - 1)
    };

    if start > end {
        return RangeOutcome::Unsatisfiable;
    }

    RangeOutcome::Partial(ByteRange { start, end })
}
