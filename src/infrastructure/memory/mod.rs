use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::domain::links::link::{BacklinkInfo, TrackingEdge, TrackingRelation};
use crate::domain::pages::page::Page;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    pages: BTreeMap<i64, Page>,
    files: BTreeSet<i64>,
    edges: Vec<(TrackingRelation, TrackingEdge)>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store backing every port. Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // a poisoned lock only means a panicking test; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a page as-is, assigning an id when it has none.
    pub fn put_page(&self, mut page: Page) -> i64 {
        let mut state = self.lock();
        let id = match page.id {
            Some(id) => {
                state.next_id = state.next_id.max(id);
                id
            }
            None => state.allocate_id(),
        };
        page.id = Some(id);
        state.pages.insert(id, page);
        id
    }

    pub fn page(&self, id: i64) -> Option<Page> {
        self.lock().pages.get(&id).cloned()
    }

    pub fn put_file(&self, file_id: i64) {
        self.lock().files.insert(file_id);
    }

    pub fn remove_file(&self, file_id: i64) -> bool {
        self.lock().files.remove(&file_id)
    }

    pub fn edges(&self, relation: TrackingRelation) -> Vec<TrackingEdge> {
        self.lock()
            .edges
            .iter()
            .filter(|(r, _)| *r == relation)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl PageRepository for InMemoryStore {
    async fn get_draft(&self, id: i64) -> anyhow::Result<Option<Page>> {
        Ok(self.page(id))
    }

    async fn find_body(&self, id: i64) -> anyhow::Result<Option<String>> {
        Ok(self
            .lock()
            .pages
            .get(&id)
            .map(|p| p.field("Content").unwrap_or_default().to_string()))
    }

    async fn insert_draft(&self, page: &Page) -> anyhow::Result<i64> {
        let mut page = page.clone();
        page.id = None;
        Ok(self.put_page(page))
    }

    async fn save_draft(&self, page: &Page) -> anyhow::Result<()> {
        let Some(id) = page.id else {
            anyhow::bail!("cannot save a page that was never inserted");
        };
        let mut state = self.lock();
        if !state.pages.contains_key(&id) {
            anyhow::bail!("page {id} does not exist");
        }
        state.pages.insert(id, page.clone());
        Ok(())
    }

    async fn delete_draft(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.lock().pages.remove(&id).is_some())
    }

    async fn list_broken(&self) -> anyhow::Result<Vec<Page>> {
        let mut pages: Vec<Page> = self
            .lock()
            .pages
            .values()
            .filter(|p| p.is_broken())
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(pages)
    }
}

#[async_trait]
impl FilesRepository for InMemoryStore {
    async fn file_exists(&self, file_id: i64) -> anyhow::Result<bool> {
        Ok(self.lock().files.contains(&file_id))
    }
}

#[async_trait]
impl LinkTrackingRepository for InMemoryStore {
    async fn list_edges(
        &self,
        relation: TrackingRelation,
        owner_id: i64,
    ) -> anyhow::Result<Vec<TrackingEdge>> {
        Ok(self
            .edges(relation)
            .into_iter()
            .filter(|e| e.owner_id == owner_id)
            .collect())
    }

    async fn replace_field_edges(
        &self,
        relation: TrackingRelation,
        owner_id: i64,
        field_name: &str,
        targets: &[i64],
    ) -> anyhow::Result<()> {
        let mut state = self.lock();
        state.edges.retain(|(r, e)| {
            !(*r == relation && e.owner_id == owner_id && e.field_name == field_name)
        });
        for &target_id in targets {
            let edge = TrackingEdge {
                owner_id,
                target_id,
                field_name: field_name.to_string(),
            };
            if !state.edges.iter().any(|(r, e)| *r == relation && *e == edge) {
                state.edges.push((relation, edge));
            }
        }
        Ok(())
    }

    async fn clear_owner(&self, owner_id: i64) -> anyhow::Result<()> {
        self.lock().edges.retain(|(_, e)| e.owner_id != owner_id);
        Ok(())
    }

    async fn owners_linking_to(
        &self,
        relation: TrackingRelation,
        target_id: i64,
    ) -> anyhow::Result<Vec<i64>> {
        let owners: BTreeSet<i64> = self
            .edges(relation)
            .into_iter()
            .filter(|e| e.target_id == target_id)
            .map(|e| e.owner_id)
            .collect();
        Ok(owners.into_iter().collect())
    }

    async fn backlinks_for(
        &self,
        relation: TrackingRelation,
        target_id: i64,
    ) -> anyhow::Result<Vec<BacklinkInfo>> {
        let state = self.lock();
        let mut by_owner: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
        for (r, e) in &state.edges {
            if *r == relation && e.target_id == target_id {
                by_owner
                    .entry(e.owner_id)
                    .or_default()
                    .insert(e.field_name.clone());
            }
        }
        let mut out: Vec<BacklinkInfo> = by_owner
            .into_iter()
            .filter_map(|(page_id, fields)| {
                let page = state.pages.get(&page_id)?;
                Some(BacklinkInfo {
                    page_id,
                    title: page.title.clone(),
                    field_names: fields.into_iter().collect(),
                })
            })
            .collect();
        out.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(out)
    }
}
