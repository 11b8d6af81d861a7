//! Shader data error types.

use thiserror::Error;

use crate::keyword::KeywordState;

/// Errors raised while building, resolving or (de)serializing shader passes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// No compiled variant exists for the validated keyword state.
    #[error("shader pass '{pass}' has no variant for keywords {keywords}")]
    VariantNotFound {
        /// Name of the pass that was queried.
        pass: String,
        /// The validated keyword state that missed.
        keywords: KeywordState,
    },

    /// A keyword was declared without any legal option.
    #[error("keyword '{0}' declares no options")]
    EmptyKeywordOptions(String),

    /// A compiled variant carries a keyword state the pass domain would not produce.
    #[error("variant keywords {keywords} are not valid for pass '{pass}'")]
    UnvalidatedVariant {
        /// Name of the pass being constructed.
        pass: String,
        /// The keyword state found on the variant.
        keywords: KeywordState,
    },

    /// Two compiled variants share the same keyword state.
    #[error("pass '{pass}' has more than one variant for keywords {keywords}")]
    DuplicateVariant {
        /// Name of the pass being constructed.
        pass: String,
        /// The duplicated keyword state.
        keywords: KeywordState,
    },

    /// Encoding shader data failed.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// Decoding shader data failed.
    #[error("deserialization failed: {0}")]
    Deserialize(String),
}
