//! Registry of `CatalogSource`/`DetailSource`/`UrlBuilder` instances keyed
//! by provider type name, the same factory/lookup shape the teacher uses
//! for its `MediaProvider` instances — minus the factory-function
//! indirection, since this crate constructs one instance per provider type
//! at startup rather than per-account instances.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::{CatalogSource, DetailSource, UrlBuilder};

#[derive(Default)]
pub struct ProviderRegistry {
    catalog_sources: HashMap<String, Arc<dyn CatalogSource>>,
    detail_sources: HashMap<String, Arc<dyn DetailSource>>,
    url_builders: HashMap<String, Arc<dyn UrlBuilder>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_catalog_source(&mut self, source: Arc<dyn CatalogSource>) {
        self.catalog_sources.insert(source.name().to_string(), source);
    }

    pub fn register_detail_source(&mut self, source: Arc<dyn DetailSource>) {
        self.detail_sources.insert(source.name().to_string(), source);
    }

    pub fn register_url_builder(&mut self, builder: Arc<dyn UrlBuilder>) {
        self.url_builders.insert(builder.name().to_string(), builder);
    }

    #[must_use]
    pub fn catalog_source(&self, source_type: &str) -> Option<Arc<dyn CatalogSource>> {
        self.catalog_sources.get(source_type).cloned()
    }

    #[must_use]
    pub fn detail_source(&self, source_type: &str) -> Option<Arc<dyn DetailSource>> {
        self.detail_sources.get(source_type).cloned()
    }

    #[must_use]
    pub fn url_builder(&self, source_type: &str) -> Option<Arc<dyn UrlBuilder>> {
        self.url_builders.get(source_type).cloned()
    }

    #[must_use]
    pub fn catalog_source_types(&self) -> Vec<String> {
        self.catalog_sources.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::provider::{CategoryProvider, ProviderContext};
    use async_trait::async_trait;

    struct MockSource;

    #[async_trait]
    impl CatalogSource for MockSource {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn scan(
            &self,
            _ctx: &ProviderContext<'_>,
            _content_type: &str,
            _since_ms: Option<i64>,
        ) -> crate::Result<super::super::traits::RawRecordStream> {
            use futures::stream;
            let items: Vec<crate::Result<RawRecord>> = Vec::new();
            Ok(Box::pin(stream::iter(items)))
        }

        fn as_category_provider(&self) -> Option<&dyn CategoryProvider> {
            None
        }
    }

    #[test]
    fn register_and_look_up_catalog_source() {
        let mut registry = ProviderRegistry::new();
        registry.register_catalog_source(Arc::new(MockSource));
        assert!(registry.catalog_source("mock").is_some());
        assert!(registry.catalog_source("unknown").is_none());
    }
}
