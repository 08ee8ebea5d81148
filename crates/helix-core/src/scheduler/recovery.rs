//! Thread-id recovery (compatibility shim)
//!
//! Older snapshots and callers encode the tube number inside thread ids,
//! e.g. `thread-T2-001`, `tube-3` or `t-1`. When a completion arrives for a
//! thread no tube carries any more, this parser is the last attempt to find
//! the intended tube before falling back to the active one.
//!
//! Contract: the id must start with one of the known prefixes; the digit
//! group immediately after the prefix, ending at end-of-string or `-`, is
//! the tube number and must be 1, 2 or 3. Nothing else is inferred.

use crate::tube::TubeNumber;

/// Extract a tube number from a thread id.
pub fn tube_number_from_thread_id<S: AsRef<str>>(
    thread_id: &str,
    prefixes: &[S],
) -> Option<TubeNumber> {
    prefixes.iter().find_map(|prefix| {
        let rest = thread_id.strip_prefix(prefix.as_ref())?;
        let digits = rest.split('-').next()?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u8>().ok().and_then(TubeNumber::new)
    })
}
