//! Shared fixtures for integration tests
//!
//! Builds a small diagram source tree on disk covering each naming
//! convention and the failure cases.

#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;

pub const OIL_FOLDER: &str = "10. Oil Lubricating System";

pub const OIL_MANIFEST: &str = r#"{
  "imageName": "Oil-System",
  "coordinates": [{ "number": "1", "x": 50, "y": 50, "partNumber": "P1" }]
}"#;

pub const OIL_TABLE: &str = "Number,Part No.,Description,Qty\n1,P1,Oil Pump,2\n2,,,";

/// Encode a blank PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn write(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A source tree with:
///
/// - `10. Oil Lubricating System`: folder-named files, table and 50x50 image
/// - `2. Cooling`: legacy `data.*` files, manifest without markers
/// - `Broken`: an HTML error page served as the manifest
/// - `Engine/Fuel_Pump`: nested folder, underscores stripped from the base name
/// - `Nowhere`: listed in `folders.json` but absent
pub fn diagram_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        "folders.json",
        format!(
            r#"{{ "folders": ["{OIL_FOLDER}", "2. Cooling", "Broken", "Engine/Fuel_Pump", "Nowhere"] }}"#
        ),
    );

    write(root, &format!("{OIL_FOLDER}/{OIL_FOLDER}.json"), OIL_MANIFEST);
    write(root, &format!("{OIL_FOLDER}/{OIL_FOLDER}.csv"), OIL_TABLE);
    write(root, &format!("{OIL_FOLDER}/{OIL_FOLDER}.png"), png(50, 50));

    write(root, "2. Cooling/data.json", r#"{"imageName":"Cooling","coordinates":[]}"#);
    write(root, "2. Cooling/data.csv", "S.No.,Description\n1,Radiator\n2,Fan\n");

    write(
        root,
        "Broken/data.json",
        "<!DOCTYPE html>\n<html><body>Not Found</body></html>",
    );

    write(
        root,
        "Engine/Fuel_Pump/FuelPump.json",
        r#"{"imageName":"Fuel Pump","coordinates":[
            {"id":"a","number":"1","x":10,"y":20},
            {"id":"b","number":"2","x":100,"y":50}
        ]}"#,
    );
    write(
        root,
        "Engine/Fuel_Pump/FuelPump.csv",
        "Number,Part No,Description,Name\n1,FP-1,Housing,Housing\n2,FP-2,Gasket,Gasket\n",
    );
    write(root, "Engine/Fuel_Pump/FuelPump.png", png(200, 100));

    tmp
}
