//! End-to-end catalog resolution over a directory source

mod common;

use std::sync::Arc;

use common::{diagram_tree, write, OIL_FOLDER};
use diagram_catalog::catalog::ordering::sort_entries;
use diagram_catalog::transport::dir::DirTransport;
use diagram_catalog::{CatalogResolver, Settings, ValidationMode};

fn resolver_for(root: &std::path::Path, settings: &Settings) -> CatalogResolver {
    CatalogResolver::new(Arc::new(DirTransport::new(root)), settings)
}

#[tokio::test]
async fn test_oil_lubricating_system_scenario() {
    let tmp = diagram_tree();
    let resolver = resolver_for(tmp.path(), &Settings::default());

    let entries = resolver
        .list_catalog(&[OIL_FOLDER.to_string()], ValidationMode::Strict)
        .await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].base_name, OIL_FOLDER);
    assert_eq!(entries[0].marker_count, 1);

    let diagram = resolver
        .load_diagram(OIL_FOLDER, ValidationMode::Lenient)
        .await
        .unwrap();
    assert_eq!(diagram.rows.len(), 1);
    assert_eq!(diagram.rows[0].number, "1");
    assert_eq!(diagram.rows[0].part_number, "P1");
    assert_eq!(diagram.rows[0].name, "2");

    let layout = resolver
        .project_markers(OIL_FOLDER, 100.0, None)
        .await
        .unwrap();
    let placement = layout.markers[0].placement;
    assert!((placement.left - 100.0).abs() < 1e-9);
    assert!((placement.top - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_html_manifest_excluded_only_in_strict_mode() {
    let tmp = diagram_tree();
    let resolver = resolver_for(tmp.path(), &Settings::default());
    let folders = vec!["Broken".to_string()];

    assert!(resolver
        .list_catalog(&folders, ValidationMode::Strict)
        .await
        .is_empty());

    let lenient = resolver.list_catalog(&folders, ValidationMode::Lenient).await;
    assert_eq!(lenient.len(), 1);
    assert_eq!(lenient[0].marker_count, 0);
}

#[tokio::test]
async fn test_discovered_catalog_in_both_modes() {
    let tmp = diagram_tree();
    let resolver = resolver_for(tmp.path(), &Settings::default());

    let strict = resolver.list_discovered(ValidationMode::Strict).await.unwrap();
    let names: Vec<&str> = strict.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec![OIL_FOLDER, "Fuel_Pump"]);

    let mut lenient = resolver.list_discovered(ValidationMode::Lenient).await.unwrap();
    assert_eq!(lenient.len(), 4);

    sort_entries(&mut lenient);
    let names: Vec<&str> = lenient.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["2. Cooling", OIL_FOLDER, "Broken", "Fuel_Pump"]);
}

#[tokio::test]
async fn test_nested_folder_shares_one_base_name() {
    let tmp = diagram_tree();
    let resolver = resolver_for(tmp.path(), &Settings::default());

    let folder = resolver.resolve_folder("Engine/Fuel_Pump").await;
    assert_eq!(folder.base_name.as_deref(), Some("FuelPump"));
    assert!(folder.has_table);
    assert_eq!(folder.image_extension.as_deref(), Some("png"));

    let layout = resolver
        .project_markers("Engine/Fuel_Pump", 400.0, Some(1024.0))
        .await
        .unwrap();
    assert!((layout.scale - 2.0).abs() < 1e-9);
    assert_eq!(layout.markers.len(), 2);
    assert!((layout.markers[1].placement.left - 200.0).abs() < 1e-9);
    assert!((layout.markers[1].placement.top - 100.0).abs() < 1e-9);
    // 30 * 2 clamps to the maximum
    assert!((layout.markers[1].placement.size - 44.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_configured_override_is_tried_last() {
    let tmp = diagram_tree();
    write(tmp.path(), "Brakes/Brk.json", r#"{"imageName":"Brakes","coordinates":[{"number":"1","x":1,"y":1}]}"#);

    let folders = vec!["Brakes".to_string()];
    let plain = resolver_for(tmp.path(), &Settings::default());
    assert!(plain.list_catalog(&folders, ValidationMode::Strict).await.is_empty());

    let settings = Settings::from_toml("[naming.overrides]\nBrakes = [\"Brk\"]\n").unwrap();
    let configured = resolver_for(tmp.path(), &settings);
    let entries = configured.list_catalog(&folders, ValidationMode::Strict).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].base_name, "Brk");
}

#[tokio::test]
async fn test_files_added_after_a_miss_need_a_cache_clear() {
    let tmp = diagram_tree();
    let resolver = resolver_for(tmp.path(), &Settings::default());

    assert!(!resolver.resolve_folder("Nowhere").await.is_found());
    write(tmp.path(), "Nowhere/data.json", r#"{"imageName":"N","coordinates":[]}"#);
    assert!(!resolver.resolve_folder("Nowhere").await.is_found());

    resolver.clear_caches();
    assert!(resolver.resolve_folder("Nowhere").await.is_found());
}
