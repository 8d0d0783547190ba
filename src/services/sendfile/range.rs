//! Byte-range parsing and window computation for streamed responses.

use crate::error::{AppError, AppResult};

/// Byte window requested by a `Range: bytes=<first>-[<last>]` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub first: u64,
    pub last: Option<u64>,
}

/// Inclusive byte window of a file, `first <= last < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

impl ByteRange {
    /// Number of bytes in the window.
    pub fn length(&self) -> u64 {
        self.last - self.first + 1
    }

    /// Value for the `Content-Range` header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.first, self.last, self.total)
    }
}

/// Parse a single-range `Range` header value.
///
/// Returns `None` for anything other than `bytes=<first>-` or
/// `bytes=<first>-<last>` with `first <= last`; callers treat that as a
/// full request starting at byte 0.
pub fn parse_range_header(value: Option<&str>) -> Option<RangeRequest> {
    let spec = value?.trim().strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }

    let (first, last) = spec.split_once('-')?;
    let first = first.trim().parse::<u64>().ok()?;
    let last = match last.trim() {
        "" => None,
        last => Some(last.parse::<u64>().ok()?),
    };

    if let Some(last) = last
        && last < first
    {
        return None;
    }

    Some(RangeRequest { first, last })
}

/// Compute the window to serve for a file of `size` bytes.
///
/// The window never exceeds `max_chunk_bytes`. A start at or past the end of
/// the file is rejected rather than clamped.
pub fn compute_range(
    request: Option<RangeRequest>,
    size: u64,
    max_chunk_bytes: u64,
) -> AppResult<ByteRange> {
    let request = request.unwrap_or(RangeRequest {
        first: 0,
        last: None,
    });

    if request.first >= size {
        return Err(AppError::RangeNotSatisfiable(size));
    }

    let capped = request
        .first
        .saturating_add(max_chunk_bytes.max(1) - 1)
        .min(size - 1);
    let last = match request.last {
        Some(last) => capped.min(last),
        None => capped,
    };

    Ok(ByteRange {
        first: request.first,
        last,
        total: size,
    })
}
