/// Errors that can occur while loading an ontology
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    /// I/O error reading the ontology file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing XML
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// UTF-8 encoding error in an attribute
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Required XML attribute is missing
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),
}
