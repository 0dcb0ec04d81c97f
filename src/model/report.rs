use serde::Serialize;

/// The output of one render pass.
///
/// `preview` is the same format and delimiter applied to the fixed sample
/// collection, so what the user sees while editing matches the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    pub text: String,
    pub preview: String,
}
