#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("markup nests deeper than {limit} elements")]
    TooDeep { limit: usize },
}

/// Turns a fragment of rich-text markup into the target markdown dialect.
pub trait Converter {
    fn to_markdown(&self, html: &str) -> Result<String, ConvertError>;
}

/// Delegates to the `html2md` crate; kept as an alternative renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> Result<String, ConvertError> {
        Ok(html2md::parse_html(html).trim().to_string())
    }
}
