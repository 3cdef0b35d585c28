//! End-to-end batch scenarios over the in-memory store.

use std::sync::Arc;

use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

use driveloader_core::download::{DownloadError, DownloadJob, ItemOutcome, JobKind};
use driveloader_core::ports::{RemotePortError, RemoteStorePort};
use driveloader_core::settings::LedgerMatch;
use driveloader_download::testing::FakeStore;
use driveloader_download::{
    CompletionLedger, DownloadOrchestrator, JsonFilmCatalog, NameResolver, OrchestratorOptions,
    TransferConfig,
};

fn orchestrator(store: &Arc<FakeStore>) -> DownloadOrchestrator {
    orchestrator_with(store, OrchestratorOptions::default())
}

fn orchestrator_with(store: &Arc<FakeStore>, options: OrchestratorOptions) -> DownloadOrchestrator {
    DownloadOrchestrator::new(Arc::clone(store) as Arc<dyn RemoteStorePort>, options)
}

fn files_job(names: &[&str], target: &std::path::Path) -> DownloadJob {
    DownloadJob::new(
        JobKind::SingleFileSet,
        names.iter().map(|n| (*n).to_string()).collect(),
        target,
    )
}

#[tokio::test]
async fn two_unique_files_are_downloaded_and_recorded() {
    let out = tempdir().unwrap();
    let store = Arc::new(
        FakeStore::new()
            .with_file("a", "a.txt", None, "alpha")
            .with_file("b", "b.txt", None, "bravo!"),
    );

    let report = orchestrator(&store)
        .run(&files_job(&["a.txt", "b.txt"], out.path()), &CancellationToken::new())
        .await;

    assert_eq!(report.items.len(), 2);
    for item in &report.items {
        let outcome = item.outcome().expect("transferred");
        assert!(outcome.success);
        assert!(!outcome.fallback_used);
    }
    assert_eq!(report.bytes_written(), 11);
    assert_eq!(std::fs::read(out.path().join("a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(out.path().join("b.txt")).unwrap(), b"bravo!");
    assert_eq!(
        std::fs::read_to_string(out.path().join("success.txt")).unwrap(),
        "a.txt\nb.txt\n"
    );
}

#[tokio::test]
async fn folder_with_a_document_uses_export_for_it() {
    let out = tempdir().unwrap();
    let store = Arc::new(
        FakeStore::new()
            .with_folder("trip", "Trip Photos", None)
            .with_file("p1", "beach.jpg", Some("trip"), "sand")
            .with_file("p2", "dunes.jpg", Some("trip"), "wind")
            .with_document("d1", "Itinerary", Some("trip"), "day one"),
    );
    let job = DownloadJob::new(
        JobKind::FlatFolderSet,
        vec!["Trip Photos".to_string()],
        out.path(),
    );

    let report = orchestrator(&store).run(&job, &CancellationToken::new()).await;

    assert_eq!(report.transferred(), 3);
    assert_eq!(report.exported(), 1);
    assert_eq!(store.export_calls(), 1);

    let folder = out.path().join("Trip Photos");
    assert!(folder.join("beach.jpg").exists());
    assert!(folder.join("dunes.jpg").exists());
    assert_eq!(std::fs::read(folder.join("Itinerary.docx")).unwrap(), b"day one");

    let ledger = CompletionLedger::for_dir(&folder, "success.txt", LedgerMatch::Exact);
    assert_eq!(
        ledger.entries().unwrap(),
        vec!["beach.jpg", "dunes.jpg", "Itinerary"]
    );
}

#[tokio::test]
async fn search_term_without_candidates_is_not_fatal() {
    let out = tempdir().unwrap();
    let store = Arc::new(FakeStore::new());
    let catalog = JsonFilmCatalog::from_json(
        r#"[{"director": "Yasujiro Ozu", "year": 1953, "title": "Tokyo Story"}]"#,
    )
    .unwrap();
    let job = DownloadJob::new(
        JobKind::DerivedFolderSet {
            field: "director".to_string(),
        },
        vec!["Kiarostami".to_string()],
        out.path(),
    );

    let report = orchestrator(&store)
        .with_catalog(Arc::new(catalog))
        .run(&job, &CancellationToken::new())
        .await;

    assert!(report.items.is_empty());
    assert!(report.group_failures.is_empty());
    assert_eq!(report.empty_lookups, vec!["Kiarostami".to_string()]);
    assert!(!report.interrupted);
    assert_eq!(store.list_calls(), 0);
}

#[tokio::test]
async fn second_run_transfers_nothing() {
    let out = tempdir().unwrap();
    let store = Arc::new(
        FakeStore::new()
            .with_file("a", "a.txt", None, "alpha")
            .with_file("b", "b.txt", None, "bravo"),
    );
    let orchestrator = orchestrator(&store);
    let job = files_job(&["a.txt", "b.txt"], out.path());

    let first = orchestrator.run(&job, &CancellationToken::new()).await;
    assert_eq!(first.transferred(), 2);
    let chunks = store.chunk_calls();
    let lists = store.list_calls();

    let second = orchestrator.run(&job, &CancellationToken::new()).await;
    assert_eq!(second.transferred(), 0);
    assert_eq!(second.already_complete(), 2);
    assert!(second
        .items
        .iter()
        .all(|i| i.result == Ok(ItemOutcome::AlreadyComplete)));
    assert_eq!(store.chunk_calls(), chunks);
    assert_eq!(store.list_calls(), lists);
}

#[tokio::test]
async fn interruption_removes_partial_file_and_stops_batch() {
    let out = tempdir().unwrap();
    let token = CancellationToken::new();
    let store = Arc::new(
        FakeStore::new()
            .with_file("big", "big.bin", None, "0123456789")
            .with_file("next", "next.bin", None, "after")
            .cancel_after_chunks("big", 2, token.clone()),
    );
    let options = OrchestratorOptions {
        transfer: TransferConfig {
            chunk_size: 2,
            ..TransferConfig::default()
        },
        ..OrchestratorOptions::default()
    };

    let report = orchestrator_with(&store, options)
        .run(&files_job(&["big.bin", "next.bin"], out.path()), &token)
        .await;

    assert!(report.interrupted);
    assert_eq!(report.items.len(), 1);
    assert_eq!(
        report.items[0].result,
        Err(DownloadError::Interrupted { bytes_written: 4 })
    );
    assert!(!out.path().join("big.bin").exists());
    assert!(!out.path().join("next.bin").exists());

    let ledger = CompletionLedger::for_dir(out.path(), "success.txt", LedgerMatch::Exact);
    assert!(!ledger.is_complete("big.bin").unwrap());
}

#[tokio::test]
async fn cancel_during_a_pending_chunk_removes_partial_file() {
    let out = tempdir().unwrap();
    let token = CancellationToken::new();
    let store = Arc::new(
        FakeStore::new()
            .with_file("big", "big.bin", None, "0123456789")
            .hang_chunks_after("big", 1),
    );
    let options = OrchestratorOptions {
        transfer: TransferConfig {
            chunk_size: 4,
            ..TransferConfig::default()
        },
        ..OrchestratorOptions::default()
    };

    // Cancel once the second chunk request is in flight.
    let watcher = {
        let store = Arc::clone(&store);
        let token = token.clone();
        tokio::spawn(async move {
            while store.chunk_calls() < 2 {
                tokio::task::yield_now().await;
            }
            token.cancel();
        })
    };

    let report = orchestrator_with(&store, options)
        .run(&files_job(&["big.bin"], out.path()), &token)
        .await;
    watcher.await.unwrap();

    assert!(report.interrupted);
    assert_eq!(
        report.items[0].result,
        Err(DownloadError::Interrupted { bytes_written: 4 })
    );
    assert_eq!(store.chunk_calls(), 2);
    assert!(!out.path().join("big.bin").exists());
    assert!(!out.path().join("success.txt").exists());
}

#[tokio::test]
async fn failed_transfer_removes_partial_file_and_continues() {
    let out = tempdir().unwrap();
    let expired = RemotePortError::AuthRequired {
        message: "token expired".to_string(),
    };
    let store = Arc::new(
        FakeStore::new()
            .with_file("a", "a.bin", None, "0123456789")
            .with_file("b", "b.txt", None, "bravo")
            .fail_chunks_after("a", 1, vec![expired]),
    );
    let options = OrchestratorOptions {
        transfer: TransferConfig {
            chunk_size: 4,
            ..TransferConfig::default()
        },
        ..OrchestratorOptions::default()
    };

    let report = orchestrator_with(&store, options)
        .run(&files_job(&["a.bin", "b.txt"], out.path()), &CancellationToken::new())
        .await;

    assert!(!report.interrupted);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.transferred(), 1);
    assert!(!out.path().join("a.bin").exists());
    assert_eq!(std::fs::read(out.path().join("b.txt")).unwrap(), b"bravo");

    let ledger = CompletionLedger::for_dir(out.path(), "success.txt", LedgerMatch::Exact);
    assert_eq!(ledger.entries().unwrap(), vec!["b.txt"]);
}

#[tokio::test]
async fn ledger_flips_after_download() {
    let out = tempdir().unwrap();
    let store = Arc::new(FakeStore::new().with_file("a", "a.txt", None, "alpha"));
    let ledger = CompletionLedger::for_dir(out.path(), "success.txt", LedgerMatch::Exact);

    assert!(!ledger.is_complete("a.txt").unwrap());
    orchestrator(&store)
        .run(&files_job(&["a.txt"], out.path()), &CancellationToken::new())
        .await;
    assert!(ledger.is_complete("a.txt").unwrap());
}

#[tokio::test]
async fn resolution_outcomes() {
    let store: Arc<dyn RemoteStorePort> = Arc::new(
        FakeStore::new()
            .with_folder("s1", "Season 1", None)
            .with_folder("s2", "Season 2", None)
            .with_file("u", "unique.mkv", None, "x")
            .with_file("e1", "e01.mkv", Some("s1"), "x")
            .with_file("e2", "e01.mkv", Some("s2"), "x"),
    );
    let resolver = NameResolver::new(store);

    assert_eq!(resolver.resolve("unique.mkv", None).await.unwrap(), "u");
    assert_eq!(
        resolver.resolve("absent.mkv", None).await,
        Err(DownloadError::not_found("absent.mkv"))
    );
    assert_eq!(
        resolver.resolve("e01.mkv", None).await,
        Err(DownloadError::ambiguous("e01.mkv", 2))
    );
    assert_eq!(resolver.resolve("e01.mkv", Some("s2")).await.unwrap(), "e2");
}
