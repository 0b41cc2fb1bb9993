//! メタデータレコード（XMLファイル）の取得と前処理

pub mod fetch;
pub mod normalize;

pub use fetch::{
    check_well_formed, fetch_records, read_fetch_list, FetchReport, RecordSource, SkippedRecord,
};
pub use normalize::normalize_namespace;

use crate::error::{MdevalError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// フォルダ直下の `*.xml` を名前順で列挙
pub fn scan_xml_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(MdevalError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_xml(p))
        .collect();

    files.sort();
    Ok(files)
}

pub fn is_xml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}

/// 拡張子 `.xml` がなければ付ける
pub fn with_xml_extension(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(".xml") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".xml");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_only_direct_xml_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.xml"), "<b/>").unwrap();
        std::fs::write(dir.path().join("a.XML"), "<a/>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.xml"), "<c/>").unwrap();

        let files = scan_xml_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.XML", "b.xml"]);
    }

    #[test]
    fn test_scan_missing_folder() {
        let result = scan_xml_files(Path::new("/nonexistent/records/12345"));
        assert!(matches!(result, Err(MdevalError::FolderNotFound(_))));
    }

    #[test]
    fn test_with_xml_extension() {
        assert_eq!(with_xml_extension(Path::new("out/rec1")), PathBuf::from("out/rec1.xml"));
        assert_eq!(with_xml_extension(Path::new("out/rec1.xml")), PathBuf::from("out/rec1.xml"));
        assert_eq!(with_xml_extension(Path::new("rec.json")), PathBuf::from("rec.json.xml"));
    }
}
