use std::sync::Arc;

use crate::application::linktracking::LinkTracker;
use crate::application::linktracking::parser::LinkParser;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::bootstrap::config::Config;
use crate::domain::pages::page::SchemaRegistry;
use crate::infrastructure::memory::InMemoryStore;

pub type DynLinkTracker<'a> = LinkTracker<
    'a,
    dyn PageRepository,
    dyn FilesRepository,
    dyn LinkTrackingRepository,
    dyn UrlNormalizer,
>;

pub type DynLinkParser<'a> =
    LinkParser<'a, dyn PageRepository, dyn FilesRepository, dyn UrlNormalizer>;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    page_repo: Arc<dyn PageRepository>,
    files_repo: Arc<dyn FilesRepository>,
    tracking_repo: Arc<dyn LinkTrackingRepository>,
    url_normalizer: Arc<dyn UrlNormalizer>,
    schema: Arc<SchemaRegistry>,
}

impl AppServices {
    pub fn new(
        page_repo: Arc<dyn PageRepository>,
        files_repo: Arc<dyn FilesRepository>,
        tracking_repo: Arc<dyn LinkTrackingRepository>,
        url_normalizer: Arc<dyn UrlNormalizer>,
        schema: SchemaRegistry,
    ) -> Self {
        Self {
            page_repo,
            files_repo,
            tracking_repo,
            url_normalizer,
            schema: Arc::new(schema),
        }
    }

    pub fn in_memory(
        store: Arc<InMemoryStore>,
        url_normalizer: Arc<dyn UrlNormalizer>,
        schema: SchemaRegistry,
    ) -> Self {
        Self::new(store.clone(), store.clone(), store, url_normalizer, schema)
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn page_repo(&self) -> Arc<dyn PageRepository> {
        self.services.page_repo.clone()
    }

    pub fn files_repo(&self) -> Arc<dyn FilesRepository> {
        self.services.files_repo.clone()
    }

    pub fn tracking_repo(&self) -> Arc<dyn LinkTrackingRepository> {
        self.services.tracking_repo.clone()
    }

    pub fn url_normalizer(&self) -> Arc<dyn UrlNormalizer> {
        self.services.url_normalizer.clone()
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.services.schema
    }

    pub fn link_tracker(&self) -> DynLinkTracker<'_> {
        LinkTracker {
            pages: self.services.page_repo.as_ref(),
            files: self.services.files_repo.as_ref(),
            tracking: self.services.tracking_repo.as_ref(),
            urls: self.services.url_normalizer.as_ref(),
            schema: &self.services.schema,
            broken_class: &self.cfg.broken_link_class,
        }
    }

    pub fn link_parser(&self) -> DynLinkParser<'_> {
        LinkParser {
            pages: self.services.page_repo.as_ref(),
            files: self.services.files_repo.as_ref(),
            urls: self.services.url_normalizer.as_ref(),
        }
    }
}
