//! Grounding metadata for model answers
//!
//! Converts the provider's grounding chunks into a tagged [`CitationSource`]
//! so rendering code matches on the source kind instead of probing for
//! optional sub-records.

use crate::api::types::{GroundingChunk, GroundingMetadata};
use serde::{Deserialize, Serialize};

/// Where a cited passage came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CitationSource {
    /// A web page
    Web {
        title: Option<String>,
        uri: Option<String>,
    },
    /// A document retrieved from a File Search store
    Document {
        uri: Option<String>,
        title: Option<String>,
    },
    /// A chunk carrying neither a web nor a document reference
    Unknown,
}

impl From<&GroundingChunk> for CitationSource {
    fn from(chunk: &GroundingChunk) -> Self {
        if let Some(web) = &chunk.web {
            Self::Web {
                title: web.title.clone(),
                uri: web.uri.clone(),
            }
        } else if let Some(ctx) = &chunk.retrieved_context {
            Self::Document {
                uri: ctx.uri.clone(),
                title: ctx.title.clone(),
            }
        } else {
            Self::Unknown
        }
    }
}

/// Citations attached to one model answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grounding {
    /// Sources in the order the model reported them
    pub sources: Vec<CitationSource>,
    /// Number of answer segments backed by at least one source
    pub grounded_segments: usize,
    /// Rendered search entry point, when the API supplies one
    pub search_queries: Option<String>,
}

impl Grounding {
    /// True when there is nothing worth rendering
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.grounded_segments == 0 && self.search_queries.is_none()
    }
}

impl From<&GroundingMetadata> for Grounding {
    fn from(metadata: &GroundingMetadata) -> Self {
        Self {
            sources: metadata
                .grounding_chunks
                .iter()
                .map(CitationSource::from)
                .collect(),
            grounded_segments: metadata.grounding_supports.len(),
            search_queries: metadata
                .search_entry_point
                .as_ref()
                .and_then(|e| e.rendered_content.clone())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{RetrievedContextChunk, SearchEntryPoint, WebChunk};

    #[test]
    fn test_chunk_kinds() {
        let web = GroundingChunk {
            web: Some(WebChunk {
                uri: Some("https://example.com".to_string()),
                title: Some("Example".to_string()),
            }),
            retrieved_context: None,
        };
        let doc = GroundingChunk {
            web: None,
            retrieved_context: Some(RetrievedContextChunk {
                uri: None,
                title: Some("handbook.pdf".to_string()),
                text: Some("...".to_string()),
            }),
        };
        let empty = GroundingChunk::default();

        assert!(matches!(CitationSource::from(&web), CitationSource::Web { .. }));
        assert_eq!(
            CitationSource::from(&doc),
            CitationSource::Document {
                uri: None,
                title: Some("handbook.pdf".to_string())
            }
        );
        assert_eq!(CitationSource::from(&empty), CitationSource::Unknown);
    }

    #[test]
    fn test_from_metadata_counts_supports() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![GroundingChunk::default(); 2],
            grounding_supports: vec![serde_json::json!({}); 3],
            search_entry_point: Some(SearchEntryPoint {
                rendered_content: Some("<div>query</div>".to_string()),
            }),
        };
        let grounding = Grounding::from(&metadata);
        assert_eq!(grounding.sources.len(), 2);
        assert_eq!(grounding.grounded_segments, 3);
        assert_eq!(grounding.search_queries.as_deref(), Some("<div>query</div>"));
        assert!(!grounding.is_empty());
    }

    #[test]
    fn test_empty_metadata() {
        let grounding = Grounding::from(&GroundingMetadata::default());
        assert!(grounding.is_empty());
    }
}
