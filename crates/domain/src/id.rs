//! ID generation utilities.

use uuid::Uuid;

/// Generates a new UUID v7 as a string.
///
/// Used to tag guard mounts in log output; v7 keeps them sortable by
/// creation time.
#[must_use]
pub fn generate_id_v7() -> String {
    Uuid::now_v7().to_string()
}
