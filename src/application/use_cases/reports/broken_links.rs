use serde::Serialize;

use crate::application::ports::page_repository::PageRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokenReason {
    BrokenLink,
    BrokenFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenPageEntry {
    pub page_id: i64,
    pub title: String,
    pub page_type: String,
    pub reasons: Vec<BrokenReason>,
}

pub struct BrokenLinksReport<'a, P: PageRepository + ?Sized> {
    pub pages: &'a P,
}

impl<'a, P: PageRepository + ?Sized> BrokenLinksReport<'a, P> {
    pub async fn execute(&self) -> anyhow::Result<Vec<BrokenPageEntry>> {
        let pages = self.pages.list_broken().await?;
        Ok(pages
            .into_iter()
            .filter_map(|page| {
                let mut reasons = Vec::new();
                if page.has_broken_link {
                    reasons.push(BrokenReason::BrokenLink);
                }
                if page.has_broken_file {
                    reasons.push(BrokenReason::BrokenFile);
                }
                if reasons.is_empty() {
                    return None;
                }
                Some(BrokenPageEntry {
                    page_id: page.id?,
                    title: page.title,
                    page_type: page.page_type,
                    reasons,
                })
            })
            .collect())
    }
}
