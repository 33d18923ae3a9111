//! Sanitized fault bodies written to the wire.

use axum::http::StatusCode;
use serde::Serialize;

use super::taxonomy::{classify, Classification};
use super::Fault;

/// Kind-specific fields echoed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FaultDetail {
    DocumentConflict {
        #[serde(rename = "DocId")]
        doc_id: String,
        #[serde(rename = "LargestEtag")]
        largest_etag: i64,
    },
    IndexCompilation {
        #[serde(rename = "IndexDefinitionProperty")]
        index_definition_property: String,
        #[serde(rename = "ProblematicText")]
        problematic_text: String,
    },
}

impl FaultDetail {
    /// Public detail for the allow-listed kinds, `None` for all others.
    pub fn of(fault: &Fault) -> Option<Self> {
        match fault {
            Fault::DocumentConflict {
                doc_id,
                largest_etag,
            } => Some(FaultDetail::DocumentConflict {
                doc_id: doc_id.clone(),
                largest_etag: *largest_etag,
            }),
            Fault::IndexCompilation {
                index_definition_property,
                problematic_text,
                ..
            } => Some(FaultDetail::IndexCompilation {
                index_definition_property: index_definition_property.clone(),
                problematic_text: problematic_text.clone(),
            }),
            _ => None,
        }
    }
}

/// JSON body of a failed request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaultBody {
    pub url: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub message: String,
    pub error: String,
    #[serde(flatten)]
    pub detail: Option<FaultDetail>,
}

/// A fault after classification: what goes on the wire.
#[derive(Debug, Clone)]
pub struct ClassifiedFault {
    pub classification: Classification,
    pub body: FaultBody,
}

impl ClassifiedFault {
    /// Classify `fault` and build its sanitized body.
    ///
    /// `url` is the request path plus query string. With `expose_details`
    /// set, the raw fault text of every kind is echoed in `Message` and
    /// `Error`; otherwise only the allow-listed kinds carry it.
    pub fn new(fault: &Fault, url: impl Into<String>, expose_details: bool) -> Self {
        let classification = classify(fault);
        let summary = classification.class.summary();

        let (message, error) = if fault.detail_is_public() {
            (fault.to_string(), fault.to_string())
        } else if expose_details {
            (fault.to_string(), format!("{fault:?}"))
        } else {
            (summary.to_string(), summary.to_string())
        };

        Self {
            classification,
            body: FaultBody {
                url: url.into(),
                kind: fault.kind_name().to_string(),
                message,
                error,
                detail: FaultDetail::of(fault),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.classification.status
    }

    pub fn to_json(&self) -> Vec<u8> {
        // FaultBody holds only strings and integers; serialization cannot fail.
        serde_json::to_vec(&self.body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_document_conflict_body() {
        let fault = Fault::DocumentConflict {
            doc_id: "orders/1".into(),
            largest_etag: 42,
        };
        let classified = ClassifiedFault::new(&fault, "/databases/shop/docs?id=orders/1", false);
        assert_eq!(classified.status(), StatusCode::CONFLICT);

        let json: Value = serde_json::from_slice(&classified.to_json()).unwrap();
        assert_eq!(json["Url"], "/databases/shop/docs?id=orders/1");
        assert_eq!(json["Type"], "DocumentConflict");
        assert_eq!(json["DocId"], "orders/1");
        assert_eq!(json["LargestEtag"], 42);
        assert!(json["Message"].as_str().unwrap().contains("orders/1"));
    }

    #[test]
    fn test_index_compilation_body() {
        let fault = Fault::IndexCompilation {
            index_definition_property: "Maps".into(),
            problematic_text: "from o in docs.Orders select o.Totl".into(),
            message: "member Totl not found".into(),
        };
        let classified = ClassifiedFault::new(&fault, "/databases/shop/indexes", false);
        let json: Value = serde_json::from_slice(&classified.to_json()).unwrap();
        assert_eq!(json["IndexDefinitionProperty"], "Maps");
        assert_eq!(json["ProblematicText"], "from o in docs.Orders select o.Totl");
        assert!(json.get("DocId").is_none());
    }

    #[test]
    fn test_internal_text_is_summarized() {
        let fault = Fault::DatabaseLoadFailure {
            database: "shop".into(),
            reason: "cannot open /var/lib/docdb/shop/journal".into(),
        };
        let classified = ClassifiedFault::new(&fault, "/databases/shop/stats", false);
        let body = String::from_utf8(classified.to_json()).unwrap();
        assert!(!body.contains("/var/lib"));

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["Type"], "DatabaseLoadFailure");
        assert_eq!(
            json["Message"],
            "The requested database is currently unavailable"
        );
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_expose_details_flag() {
        let fault = Fault::Internal("index writer poisoned".into());
        let classified = ClassifiedFault::new(&fault, "/x", true);
        assert!(classified.body.message.contains("index writer poisoned"));
        assert!(classified.body.error.contains("Internal"));
    }
}
