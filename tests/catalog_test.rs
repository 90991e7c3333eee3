//! カタログ読み込みの統合テスト

use camellia_auction::catalog::load_catalog;
use camellia_auction::error::AuctionError;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::tempdir;

fn write_workbook(path: &Path, header: &[&str], rows: &[(f64, Option<&str>, &str)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, (id, name, color)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_number(r, 0, *id).unwrap();
        if let Some(name) = name {
            worksheet.write_string(r, 1, *name).unwrap();
        }
        worksheet.write_string(r, 2, *color).unwrap();
    }
    workbook.save(path).unwrap();
}

#[test]
fn test_load_xlsx_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ACCS.xlsx");
    write_workbook(
        &path,
        &["id", "name", "color"],
        &[
            (101.0, Some("Debutante"), "pink"),
            (102.0, None, "white"),
            (103.0, Some("Pink Perfection"), "pink"),
        ],
    );

    let catalog = load_catalog(&path).expect("カタログ読み込み失敗");

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.columns(), &["id".to_string(), "name".to_string(), "color".to_string()][..]);
    // 数値のidは小数部なし
    assert_eq!(catalog.get(0).unwrap().id, "101");
    assert_eq!(catalog.get(1).unwrap().name, "Pink Perfection");
    assert_eq!(catalog.get(1).unwrap().fields, vec!["103", "Pink Perfection", "pink"]);
    assert_eq!(catalog.issues().missing_name, 1);
}

#[test]
fn test_xlsx_without_name_column() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("bad.xlsx");
    write_workbook(&path, &["id", "cultivar", "color"], &[(1.0, Some("Debutante"), "pink")]);

    let result = load_catalog(&path);
    assert!(matches!(result, Err(AuctionError::Common(_))));
}

#[test]
fn test_corrupted_xlsx() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let result = load_catalog(&path);
    assert!(matches!(result, Err(AuctionError::CatalogLoad(_))));
}

#[test]
fn test_csv_catalog_with_quotes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.csv");
    std::fs::write(&path, "id,name,notes\n1,\"Kramer's Supreme\",\"red, peony\"\n").unwrap();

    let catalog = load_catalog(&path).expect("カタログ読み込み失敗");
    assert_eq!(catalog.get(0).unwrap().name, "Kramer's Supreme");
    assert_eq!(catalog.get(0).unwrap().fields[2], "red, peony");
}
