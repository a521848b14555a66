use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use linktrack::application::linktracking::descriptor::LinkKind;
use linktrack::application::services::markup::MarkupDocument;
use linktrack::application::use_cases::files::get_file_usage::GetFileUsage;
use linktrack::application::use_cases::links::audit_links::AuditLinks;
use linktrack::application::use_cases::pages::delete_page::DeletePage;
use linktrack::application::use_cases::pages::get_backlinks::GetBacklinks;
use linktrack::application::use_cases::pages::get_outgoing_links::GetOutgoingLinks;
use linktrack::application::use_cases::pages::resync_dependents::{
    DependencyTarget, ResyncDependents,
};
use linktrack::application::use_cases::pages::save_page::{PageEdits, SavePage};
use linktrack::application::use_cases::pages::sync_page::SyncPage;
use linktrack::application::use_cases::reports::broken_links::{BrokenLinksReport, BrokenReason};
use linktrack::bootstrap::app_context::{AppContext, AppServices};
use linktrack::bootstrap::config::Config;
use linktrack::domain::links::link::TrackingRelation;
use linktrack::domain::pages::page::{Page, SchemaRegistry, Stage};
use linktrack::infrastructure::memory::InMemoryStore;
use linktrack::infrastructure::url::SiteUrlNormalizer;

fn context() -> (AppContext, Arc<InMemoryStore>) {
    let cfg = Config::from_source(|_| None).unwrap();
    let store = Arc::new(InMemoryStore::default());
    let urls = SiteUrlNormalizer::new(Some("https://example.com/")).unwrap();
    let services =
        AppServices::in_memory(store.clone(), Arc::new(urls), SchemaRegistry::default());
    (AppContext::new(cfg, services), store)
}

fn content(title: &str, html: &str) -> PageEdits {
    PageEdits {
        title: Some(title.to_string()),
        fields: BTreeMap::from([("Content".to_string(), html.to_string())]),
    }
}

async fn create(ctx: &AppContext, title: &str, html: &str) -> Page {
    let tracker = ctx.link_tracker();
    SavePage { tracker: &tracker }
        .create("Page", content(title, html))
        .await
        .unwrap()
}

#[tokio::test]
async fn deleting_and_restoring_a_page_updates_linking_pages() {
    let (ctx, store) = context();
    let about = create(&ctx, "About", "<h2 id=\"team\">Team</h2>").await;
    let about_id = about.id.unwrap();
    let home = create(
        &ctx,
        "Home",
        &format!("<p><a href=\"[sitetree_link id={about_id}]#team\">About us</a></p>"),
    )
    .await;
    let home_id = home.id.unwrap();
    assert!(!home.has_broken_link);

    let backlinks = GetBacklinks {
        tracking: ctx.tracking_repo().as_ref(),
    }
    .execute(about_id)
    .await
    .unwrap();
    assert_eq!(backlinks.len(), 1);
    assert_eq!(backlinks[0].page_id, home_id);
    assert_eq!(backlinks[0].field_names, vec!["Content"]);

    let tracker = ctx.link_tracker();
    assert!(DeletePage { tracker: &tracker }.execute(about_id).await.unwrap());

    let home = store.page(home_id).unwrap();
    assert!(home.has_broken_link);
    assert_eq!(
        home.field("Content"),
        Some(
            format!(
                "<p><a href=\"[sitetree_link id={about_id}]#team\" class=\"ss-broken\">About us</a></p>"
            )
            .as_str()
        )
    );
    assert!(store.edges(TrackingRelation::LinkTracking).is_empty());

    let report = BrokenLinksReport {
        pages: ctx.page_repo().as_ref(),
    }
    .execute()
    .await
    .unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].page_id, home_id);
    assert_eq!(report[0].reasons, vec![BrokenReason::BrokenLink]);

    // restore under the same id
    store.put_page(about);
    let resynced = ResyncDependents { tracker: &tracker }
        .execute(DependencyTarget::Page(about_id))
        .await
        .unwrap();
    assert_eq!(resynced, vec![home_id]);

    let home = store.page(home_id).unwrap();
    assert!(!home.has_broken_link);
    assert_eq!(
        home.field("Content"),
        Some(format!("<p><a href=\"[sitetree_link id={about_id}]#team\">About us</a></p>").as_str())
    );
    let owners: Vec<i64> = store
        .edges(TrackingRelation::LinkTracking)
        .into_iter()
        .filter(|e| e.target_id == about_id)
        .map(|e| e.owner_id)
        .collect();
    assert_eq!(owners, vec![home_id]);
}

#[tokio::test]
async fn removing_a_file_flags_every_page_that_uses_it() {
    let (ctx, store) = context();
    store.put_file(7);
    let gallery = create(
        &ctx,
        "Gallery",
        "<p>[image src=\"cat.png\" id=\"7\"]</p><a class=\"download\" href=\"[file_link,id=7]\">Get it</a>",
    )
    .await;
    let gallery_id = gallery.id.unwrap();
    assert!(!gallery.has_broken_file);

    let usage = GetFileUsage {
        tracking: ctx.tracking_repo().as_ref(),
    }
    .execute(7)
    .await
    .unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].title, "Gallery");

    assert!(store.remove_file(7));
    let tracker = ctx.link_tracker();
    let resynced = ResyncDependents { tracker: &tracker }
        .execute(DependencyTarget::File(7))
        .await
        .unwrap();
    assert_eq!(resynced, vec![gallery_id]);

    let gallery = store.page(gallery_id).unwrap();
    assert!(gallery.has_broken_file);
    assert!(!gallery.has_broken_link);
    assert!(gallery
        .field("Content")
        .unwrap()
        .contains("class=\"download ss-broken\""));
    assert!(store.edges(TrackingRelation::ImageTracking).is_empty());

    let report = BrokenLinksReport {
        pages: ctx.page_repo().as_ref(),
    }
    .execute()
    .await
    .unwrap();
    assert_eq!(report[0].reasons, vec![BrokenReason::BrokenFile]);
}

#[tokio::test]
async fn outgoing_links_cover_pages_and_files() {
    let (ctx, store) = context();
    store.put_file(3);
    let target = create(&ctx, "Target", "").await.id.unwrap();
    let page = create(
        &ctx,
        "Links",
        &format!(
            "<a href=\"https://example.com/[sitetree_link id={target}]\">t</a>\
             <a href=\"[file_link id=3]\">f</a>\
             <a href=\"https://other.org/\">ext</a>"
        ),
    )
    .await;

    let links = GetOutgoingLinks {
        tracking: ctx.tracking_repo().as_ref(),
    }
    .execute(page.id.unwrap())
    .await
    .unwrap();
    let pairs: HashSet<(TrackingRelation, i64)> =
        links.iter().map(|l| (l.relation, l.target_id)).collect();
    assert_eq!(
        pairs,
        HashSet::from([
            (TrackingRelation::LinkTracking, target),
            (TrackingRelation::ImageTracking, 3),
        ])
    );
    assert!(links.iter().all(|l| l.field_name == "Content"));
}

#[tokio::test]
async fn manual_sync_repairs_edges_after_out_of_band_edits() {
    let (ctx, store) = context();
    let a = create(&ctx, "A", "").await.id.unwrap();
    let b = create(&ctx, "B", "").await.id.unwrap();
    let page = create(&ctx, "Hub", &format!("<a href=\"[sitetree_link id={a}]\">a</a>")).await;
    let hub = page.id.unwrap();

    // content changed without going through the tracker
    store.put_page(page.with_field("Content", &format!("<a href=\"[sitetree_link id={b}]\">b</a>")));
    let tracker = ctx.link_tracker();
    let synced = SyncPage { tracker: &tracker }.execute(hub).await.unwrap();

    assert!(!synced.has_broken_link);
    let targets: Vec<i64> = store
        .edges(TrackingRelation::LinkTracking)
        .into_iter()
        .filter(|e| e.owner_id == hub)
        .map(|e| e.target_id)
        .collect();
    assert_eq!(targets, vec![b]);
    assert!(SyncPage { tracker: &tracker }.execute(hub + 100).await.is_err());
}

#[tokio::test]
async fn edges_always_match_the_resolvable_links() {
    let (ctx, store) = context();
    store.put_file(20);
    let live = create(&ctx, "Live", "<a name=\"top\"></a>").await.id.unwrap();
    let cases = [
        format!("<a href=\"[sitetree_link id={live}]\">ok</a><a href=\"[sitetree_link id=404]\">gone</a>"),
        format!("<a href=\"[sitetree_link id={live}]#top\">ok</a><a href=\"[sitetree_link id={live}]#nope\">bad anchor</a>"),
        "[image id=20] [image id=21] <a href=\"[file_link id=20]\">f</a>".to_string(),
        "<a href=\"#here\">jump</a><span id=\"here\"></span><a href=\"/root\">r</a>".to_string(),
        String::new(),
    ];
    let tracker = ctx.link_tracker();

    for html in cases {
        let mut page = Page::new("Page", "Case").with_field("Content", &html);
        page.id = Some(store.put_page(page.clone()));
        let owner = page.id.unwrap();
        tracker.synchronize(&mut page, Stage::Draft).await.unwrap();

        let expected_pages: BTreeSet<i64> = tracker
            .parser()
            .process(&MarkupDocument::parse(page.field("Content").unwrap()))
            .await
            .unwrap()
            .into_iter()
            .filter(|l| l.kind == LinkKind::InternalPage && !l.is_broken)
            .filter_map(|l| l.target)
            .collect();
        let tracked_pages: BTreeSet<i64> = store
            .edges(TrackingRelation::LinkTracking)
            .into_iter()
            .filter(|e| e.owner_id == owner)
            .map(|e| e.target_id)
            .collect();
        assert_eq!(tracked_pages, expected_pages, "html: {html}");

        let tracked_files: BTreeSet<i64> = store
            .edges(TrackingRelation::ImageTracking)
            .into_iter()
            .filter(|e| e.owner_id == owner)
            .map(|e| e.target_id)
            .collect();
        assert!(!tracked_files.contains(&21));

        // a second pass changes nothing
        let once = page.clone();
        tracker.synchronize(&mut page, Stage::Draft).await.unwrap();
        assert_eq!(page.fields, once.fields);
        assert_eq!(page.has_broken_link, once.has_broken_link);
        assert_eq!(page.has_broken_file, once.has_broken_file);
    }
}

#[tokio::test]
async fn audit_classifies_without_saving() {
    let (ctx, store) = context();
    let target = create(&ctx, "Target", "").await.id.unwrap();
    let uc = AuditLinks {
        parser: ctx.link_parser(),
    };

    let links = uc
        .execute(&format!(
            "<a href=\"https://example.com/\">home</a>\
             <a href=\"[sitetree_link id={target}]\">t</a>\
             <a href=\"#missing\">m</a>"
        ))
        .await
        .unwrap();

    let json = serde_json::to_value(&links).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"kind": "broken", "target": null, "anchor": null, "is_broken": true},
            {"kind": "internal_page", "target": target, "anchor": null, "is_broken": false},
            {"kind": "local_anchor", "target": null, "anchor": "missing", "is_broken": true},
        ])
    );
    assert!(store.edges(TrackingRelation::LinkTracking).is_empty());
}

#[tokio::test]
async fn anchors_match_regardless_of_attribute_quoting() {
    let (ctx, _store) = context();
    let uc = AuditLinks {
        parser: ctx.link_parser(),
    };

    let links = uc
        .execute("<a href=#top>x</a><h2 id=top>T</h2><a href=/about?x=1>y</a>")
        .await
        .unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].kind, LinkKind::LocalAnchor);
    assert!(!links[0].is_broken);
    assert_eq!(links[1].kind, LinkKind::Broken);
}
