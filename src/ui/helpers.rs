use anyhow::Error;

/// Shift `selected` by `offset` within a list of `len` items, clamping at
/// both ends.
pub(crate) fn move_index(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len as isize - 1;
    (selected as isize + offset).clamp(0, last) as usize
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
