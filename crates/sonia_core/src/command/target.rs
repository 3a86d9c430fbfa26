//! `Class id` argument resolution shared by `show` and `destroy`.

use super::{partition_space, CommandError};
use crate::model::object::{ClassName, ObjectKey};

/// Resolves `<Class> <id> [ignored...]` into an object key.
///
/// The class is checked before the id, so `show Bogus` reports the class.
pub fn resolve_target(args: &str) -> Result<ObjectKey, CommandError> {
    let (class_text, rest) = partition_space(args);
    let class = resolve_class(class_text)?;

    let (id, _) = partition_space(rest);
    if id.is_empty() {
        return Err(CommandError::InstanceIdMissing);
    }

    Ok(ObjectKey::new(class, id))
}

/// Maps a class token onto the registry.
pub fn resolve_class(class_text: &str) -> Result<ClassName, CommandError> {
    if class_text.is_empty() {
        return Err(CommandError::ClassNameMissing);
    }
    class_text
        .parse()
        .map_err(|_| CommandError::ClassDoesNotExist)
}
