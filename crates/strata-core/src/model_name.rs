//! Strongly-typed model name wrapper.

use crate::newtype_string::define_name_type;

define_name_type! {
    /// Strongly-typed wrapper for model names.
    ///
    /// Prevents accidental mixing of model names with source names, schema
    /// names, or other strings.
    pub struct ModelName;
}
