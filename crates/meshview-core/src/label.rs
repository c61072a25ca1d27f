//! Short display labels for hierarchical peer ids.

/// Separator between the segments of a peer id.
pub const ID_DELIMITER: char = '-';

/// Return the last `-` separated segment of `id`.
///
/// Ids without a delimiter are returned unchanged, an empty id yields an
/// empty label and a trailing delimiter yields an empty label.
pub fn resolve_label(id: &str) -> &str {
    resolve_label_with(id, ID_DELIMITER)
}

/// Same as [`resolve_label`] with a caller chosen delimiter.
pub fn resolve_label_with(id: &str, delimiter: char) -> &str {
    // rsplit always yields at least one item
    id.rsplit(delimiter).next().unwrap_or(id)
}
