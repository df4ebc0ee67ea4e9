use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use lyra_core::document::Document;
use thiserror::Error;
use tracing::debug;

mod codec;
pub mod dom;
mod number;

pub use codec::{FORMAT_VERSION, shape_tag, tag_kind};
pub use number::{format_exp, format_fixed};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

/// 写在文件开头的生成器注释。
pub fn generator_comment() -> String {
    format!(" Generated by LyraTool v{} ", env!("CARGO_PKG_VERSION"))
}

/// 从字节流读取工程文件。流由调用方打开与关闭。
pub fn decode<R: Read>(mut reader: R) -> Result<Document, IoError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    decode_str(&text)
}

pub fn decode_str(text: &str) -> Result<Document, IoError> {
    let roots = dom::parse(text)?;
    let document = codec::document_from_elements(&roots)?;
    debug!(shapes = document.len(), "工程文件解析完成");
    Ok(document)
}

/// 把文档编码为 UTF-8 XML 写入字节流。
pub fn encode<W: Write>(document: &Document, writer: W) -> Result<(), IoError> {
    let root = codec::document_to_element(document);
    dom::write(writer, &generator_comment(), &root)
}

pub fn encode_to_string(document: &Document) -> Result<String, IoError> {
    let mut buffer = Vec::new();
    encode(document, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| {
        IoError::Stream(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// 基于文件路径的 XML 工程读写入口。
pub struct XmlProjectFacade;

impl XmlProjectFacade {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XmlProjectFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for XmlProjectFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        decode_str(&data)
    }
}

impl DocumentSaver for XmlProjectFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let text = encode_to_string(document)?;
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), shapes = document.len(), "工程文件已保存");
        Ok(())
    }
}
