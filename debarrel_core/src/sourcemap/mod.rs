use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

mod splice;
mod vlq;


pub use splice::SourceSplicer;
pub use vlq::{decode_vlq_segment, encode_vlq};

const VERSION: u32 = 3;
const DATA_URL_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// Version 3 source map for one spliced module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    pub sources_content: Vec<Option<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub(crate) fn single_source(
        file: Option<String>,
        source: String,
        content: &str,
        mappings: String,
    ) -> Self {
        Self {
            version: VERSION,
            file,
            sources: vec![source],
            sources_content: vec![Some(content.to_string())],
            names: vec![],
            mappings,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_data_url(&self) -> String {
        format!("{DATA_URL_PREFIX}{}", BASE64.encode(self.to_json().as_bytes()))
    }
}
