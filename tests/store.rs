use camino::Utf8PathBuf;

use hirise_dl::domain::{ObservationId, ProductId, SourceProductId};
use hirise_dl::store::{Metadata, Store};

#[test]
fn layout_paths() {
    let store = Store::with_root(Utf8PathBuf::from("/data/hirise"));
    let obsid: ObservationId = "PSP_003092_0985".parse().unwrap();
    let pid: ProductId = "ESP_011491_0985_RED".parse().unwrap();
    let spid: SourceProductId = "PSP_003092_0985_RED4_0".parse().unwrap();

    assert_eq!(store.labels_dir().as_str(), "/data/hirise/labels");
    assert_eq!(
        store.label_path(&pid).as_str(),
        "/data/hirise/labels/ESP_011491_0985_RED.LBL"
    );
    assert_eq!(
        store.observation_dir(&obsid).as_str(),
        "/data/hirise/PSP_003092_0985"
    );
    assert_eq!(
        store.source_product_path(&spid).as_str(),
        "/data/hirise/PSP_003092_0985/PSP_003092_0985_RED4_0.IMG"
    );
    assert_eq!(
        store.browse_path("ESP_011491_0985_COLOR.thumb.jpg").as_str(),
        "/data/hirise/browse/ESP_011491_0985_COLOR.thumb.jpg"
    );
    assert_eq!(
        store.metadata_path("PSP_003092_0985_RED4_0.source").as_str(),
        "/data/hirise/metadata/PSP_003092_0985_RED4_0.source.json"
    );
}

#[test]
fn metadata_round_trips_through_sidecar_files() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("hirise")).unwrap();
    let store = Store::with_root(root);

    let meta = Metadata {
        id: "PSP_003092_0985_RED4_0".to_string(),
        artifact: Some("source".to_string()),
        url: "https://hirise-pds.lpl.arizona.edu/PDS/EDR/x.IMG".to_string(),
        downloaded_at: "2026-08-08T00:00:00+00:00".to_string(),
        tool: "hirise-dl/0.1.0".to_string(),
        resolved_path: "/data/PSP_003092_0985_RED4_0.IMG".to_string(),
    };
    let path = store.metadata_path("PSP_003092_0985_RED4_0.source");
    Store::write_metadata(&path, &meta).unwrap();

    let listed = store.list_metadata().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, meta.id);
    assert_eq!(listed[0].artifact.as_deref(), Some("source"));
    assert_eq!(listed[0].url, meta.url);
}

#[test]
fn list_metadata_on_missing_dir_is_empty() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("empty")).unwrap();
    let store = Store::with_root(root);
    assert!(store.list_metadata().unwrap().is_empty());
}
