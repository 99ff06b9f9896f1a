use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chunk of corpus text returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFragment {
    pub text: String,
    pub score: f32,
    /// Payload minus the text: `document_id`, `chunk_index` and any
    /// metadata supplied when the document was indexed.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl KnowledgeFragment {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn document_id(&self) -> Option<&str> {
        self.metadata.get("document_id").and_then(Value::as_str)
    }

    pub fn chunk_index(&self) -> Option<u64> {
        self.metadata.get("chunk_index").and_then(Value::as_u64)
    }

    /// Case-insensitive substring test used by the name boost.
    pub fn mentions(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.to_lowercase().contains(&needle.to_lowercase())
    }
}
