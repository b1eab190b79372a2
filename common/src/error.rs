//! 에러 타입 정의

use thiserror::Error;

/// 공통 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("Excel read error: {0}")]
    Calamine(#[from] calamine::XlsxError),

    /// 통합문서 구조가 예상과 다름 (손상된 파일 등)
    #[error("Parse error: {0}")]
    Parse(String),

    /// 지정한 시트가 통합문서에 없음
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Export error: {0}")]
    Export(String),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
