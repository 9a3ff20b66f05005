// ── Composite identifiers ──
//
// The snapshot links resources with `"<category>.<id>"` strings, e.g.
// `"structure.3f2a..."` or `"device.02AA01AC..."`. Lookups key on the id
// component.

use crate::error::CoreError;

/// Extract the id from a `"category.id"` reference: split on `.`, take
/// component 1.
pub fn parse_composite_id(composite: &str) -> Result<&str, CoreError> {
    composite
        .split('.')
        .nth(1)
        .ok_or_else(|| CoreError::MissingField {
            path: format!("id component in '{composite}'"),
        })
}
