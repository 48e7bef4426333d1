//! Strongly-typed source group name wrapper.

use crate::newtype_string::define_name_type;

define_name_type! {
    /// Strongly-typed wrapper for source group names.
    ///
    /// A source group is the logical namespace in `source('group', 'table')`
    /// markers; it maps to a physical schema in the target store.
    pub struct SourceName;
}
