use sorng_skydrive::*;
use std::io::Cursor;
use std::sync::Arc;

fn setup() -> (Arc<SimulatedTransport>, SkyDriveClient) {
    let sim = SimulatedTransport::new();
    let client = SkyDriveClient::new(sim.clone());
    (sim, client)
}

fn content(bytes: &'static [u8]) -> ContentStream {
    Box::new(Cursor::new(bytes))
}

#[tokio::test]
async fn test_folder_tree_workflow() {
    let (_sim, client) = setup();

    let root = client.root_folder().await.unwrap();
    let docs = root.create_folder("Docs", Some("work papers")).await.unwrap();
    assert_eq!(docs.description(), "work papers");
    assert_eq!(docs.properties().parent_id(), root.id());

    docs.upload_file(content(b"alpha"), "a.txt").await.unwrap();
    docs.upload_file(content(b"beta"), "b.txt").await.unwrap();
    docs.create_folder("Archive", None).await.unwrap();

    let files = docs.list_files().await.unwrap();
    let mut names: Vec<_> = files.iter().map(|f| f.name().to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt", "b.txt"]);

    let folders = docs.list_folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name(), "Archive");

    let mut refreshed = client.get_properties(docs.id()).await.unwrap();
    refreshed.refresh_properties().await.unwrap();
    assert_eq!(refreshed.as_folder().unwrap().child_count(), 3);
}

#[tokio::test]
async fn test_upload_and_download_local_files() {
    let (sim, client) = setup();
    let dir = tempfile::tempdir().unwrap();

    let src = dir.path().join("report.csv");
    tokio::fs::write(&src, b"id,total\n1,42\n").await.unwrap();

    let uploaded = client.upload_file_from_path(&src, None).await.unwrap();
    assert_eq!(uploaded.name(), "report.csv");
    assert_eq!(
        sim.content_of(uploaded.id()).await.unwrap(),
        b"id,total\n1,42\n".to_vec()
    );

    let dest = dir.path().join("copy.csv");
    let written = uploaded.download_to(&dest).await.unwrap();
    assert_eq!(written, Some(14));
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"id,total\n1,42\n");
}

#[tokio::test]
async fn test_upload_missing_local_file() {
    let (sim, client) = setup();
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .upload_file_from_path(dir.path().join("absent.bin"), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, SkyDriveErrorCode::LocalIo);
    assert!(sim.requests().await.iter().all(|r| !r.starts_with("UPLOAD")));
}

#[tokio::test]
async fn test_download_without_content_creates_nothing() {
    let (sim, client) = setup();
    let dir = tempfile::tempdir().unwrap();
    let id = sim.add_empty_file(sim.root_id(), "empty.txt").await;

    assert!(client.download_file(&id).await.unwrap().is_none());

    let dest = dir.path().join("empty.txt");
    assert_eq!(client.download_file_to(&dest, &id).await.unwrap(), None);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_move_and_copy() {
    let (sim, client) = setup();
    let inbox = sim.add_folder(sim.root_id(), "Inbox").await;
    let archive = sim.add_folder(sim.root_id(), "Archive").await;
    let id = sim.add_file(&inbox, "mail.eml", b"From: a").await;

    let file = client.get_properties(&id).await.unwrap();
    let copy = file.copy_to(&archive).await.unwrap();
    assert!(copy.is_file());
    assert_ne!(copy.id(), id);
    assert_eq!(copy.properties().parent_id(), archive);

    // Same name already in the destination.
    let err = file.move_to(&archive).await.unwrap_err();
    assert_eq!(err.code, SkyDriveErrorCode::Conflict);

    copy.delete().await.unwrap();
    let moved = file.move_to(&archive).await.unwrap();
    assert_eq!(moved.id(), id);
    assert_eq!(moved.properties().parent_id(), archive);
    assert!(client.list_files(Some(&inbox)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_then_rename_by_path() {
    let (sim, client) = setup();
    let photos = sim.add_folder(sim.root_id(), "Photos").await;
    sim.add_file(&photos, "beach.jpg", b"\xFF\xD8").await;

    let mut item = client.find_by_path("Photos/beach.jpg").await.unwrap();
    item.set_name("coast.jpg");
    item.write_properties().await.unwrap();

    assert!(client.find_by_path("Photos/beach.jpg").await.is_err());
    let found = client.find_by_path("Photos/coast.jpg").await.unwrap();
    assert_eq!(found.id(), item.id());
}

#[tokio::test]
async fn test_session_resume_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skydrive").join("refresh_token.json");

    let store = FileTokenStore::new(&path);
    store
        .save_token(RefreshTokenRecord::new("CvY5x!BbvmIBaW0Nyd"))
        .await
        .unwrap();

    // A fresh process sees the same record.
    let reopened: Arc<dyn RefreshTokenStore> = Arc::new(FileTokenStore::new(&path));
    let record = reopened.retrieve_token().await.unwrap().unwrap();
    assert_eq!(record.refresh_token(), "CvY5x!BbvmIBaW0Nyd");
}
