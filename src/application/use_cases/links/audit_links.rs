use crate::application::linktracking::descriptor::LinkDescriptor;
use crate::application::linktracking::parser::LinkParser;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::application::services::markup::MarkupDocument;

/// Classifies the links in a piece of markup without touching any page or edge.
pub struct AuditLinks<'a, P, F, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub parser: LinkParser<'a, P, F, U>,
}

impl<'a, P, F, U> AuditLinks<'a, P, F, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub async fn execute(&self, html: &str) -> anyhow::Result<Vec<LinkDescriptor>> {
        let doc = MarkupDocument::parse(html);
        self.parser.process(&doc).await
    }
}
