//! URL catalogue of the public taxonomy service API.

use serde_json::json;

use crate::{InternalId, TaxonomyError, TransportRequest, VersionId};

/// Builds requests for every endpoint the client consumes, relative to a
/// base URL such as `https://api.aviationreporting.eu/taxonomy-service`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Creates the catalogue. A trailing `/` on `base_url` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::ConfigurationError`] if `base_url` is blank.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TaxonomyError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(TaxonomyError::ConfigurationError {
                message: format!("taxonomy service URL '{base_url}' is not valid"),
            });
        }
        Ok(Self {
            base_url: trimmed.to_owned(),
        })
    }

    /// Returns the normalised base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current taxonomy version.
    pub fn version(&self) -> TransportRequest {
        TransportRequest::get(format!("{}/version/public/", self.base_url))
    }

    /// Full taxonomy tree of the current version.
    pub fn tree(&self) -> TransportRequest {
        TransportRequest::get(format!("{}/tree/public/", self.base_url))
    }

    /// Metadata of one attribute in the given version.
    pub fn attribute_by_id(&self, attribute: InternalId, version: VersionId) -> TransportRequest {
        TransportRequest::get(format!(
            "{}/attributes/public/byID/{attribute}?taxonomyId={version}",
            self.base_url
        ))
    }

    /// Top-level values of an attribute's value list.
    pub fn first_level_values(&self, attribute: InternalId) -> TransportRequest {
        TransportRequest::get(format!(
            "{}/attributes/public/showFirstLevelValues?attributesList={attribute}",
            self.base_url
        ))
    }

    /// Direct children of one value in a hierarchical value list.
    pub fn child_values(&self, value: InternalId) -> TransportRequest {
        TransportRequest::get(format!(
            "{}/listofvalue/public/childrenLov/{value}",
            self.base_url
        ))
    }

    /// Batch lookup of attributes by internal id.
    pub fn attributes_by_ids(&self, attributes: &[InternalId], version: VersionId) -> TransportRequest {
        TransportRequest::post(
            format!("{}/attributes/public/byIDs", self.base_url),
            json!({
                "attributeIdentifiers": attributes,
                "taxonomyId": version,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Method;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("/")]
    fn blank_base_url_is_rejected(#[case] url: &str) {
        let err = Endpoints::new(url).unwrap_err();
        assert!(matches!(err, TaxonomyError::ConfigurationError { .. }));
    }

    #[test]
    fn trailing_slash_is_normalised() {
        let endpoints = Endpoints::new("https://example.org/taxonomy-service/").unwrap();
        assert_eq!(endpoints.base_url(), "https://example.org/taxonomy-service");
        assert_eq!(
            endpoints.version().url,
            "https://example.org/taxonomy-service/version/public/"
        );
    }

    #[test]
    fn attribute_metadata_is_scoped_to_the_version() {
        let endpoints = Endpoints::new("http://svc").unwrap();
        let req = endpoints.attribute_by_id(InternalId::new(1002), VersionId::new(7));
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url, "http://svc/attributes/public/byID/1002?taxonomyId=7");
    }

    #[test]
    fn value_list_endpoints_are_keyed_by_internal_id() {
        let endpoints = Endpoints::new("http://svc").unwrap();
        assert_eq!(
            endpoints.first_level_values(InternalId::new(5)).url,
            "http://svc/attributes/public/showFirstLevelValues?attributesList=5"
        );
        assert_eq!(
            endpoints.child_values(InternalId::new(77)).url,
            "http://svc/listofvalue/public/childrenLov/77"
        );
    }

    #[test]
    fn batch_lookup_posts_ids_and_version() {
        let endpoints = Endpoints::new("http://svc").unwrap();
        let req = endpoints.attributes_by_ids(&[InternalId::new(1002)], VersionId::new(7));
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "http://svc/attributes/public/byIDs");
        assert_eq!(
            req.body,
            Some(json!({"attributeIdentifiers": [1002], "taxonomyId": 7}))
        );
    }
}
