//! Pluggable identity rules for [`UniqueObjectStore`](super::UniqueObjectStore).

use std::hash::Hash;

/// Decides which backend handles denote the same underlying object.
///
/// Two handles are the same identity exactly when their keys are equal; the key
/// also provides the hash. This keeps equality and hashing consistent by
/// construction and lets each handle kind bring its own rule.
pub trait IdentityComparer<T>
{
    /// Key that stands for the identity of a handle.
    type Key: Eq + Hash + Clone;

    /// Compute the identity key of `value`.
    fn identity(&self, value: &T) -> Self::Key;
}

/// Identity is the value itself (`Eq` + `Hash` on `T`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueComparer;

impl<T> IdentityComparer<T> for ValueComparer
where
    T: Eq + Hash + Clone,
{
    type Key = T;

    fn identity(&self, value: &T) -> T
    {
        value.clone()
    }
}

/// Handles that can report the build identifier of the binary they describe.
pub trait HasBuildId
{
    /// Unique token of the underlying binary (e.g. the GNU build id in hex).
    fn build_id(&self) -> String;
}

/// Two modules are the same identity when their build identifiers match.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildIdComparer;

impl<T: HasBuildId> IdentityComparer<T> for BuildIdComparer
{
    type Key = String;

    fn identity(&self, value: &T) -> String
    {
        value.build_id()
    }
}
