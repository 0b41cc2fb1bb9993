//! 名前空間URIの統一

use super::scan_xml_files;
use crate::error::Result;
use std::path::Path;

/// フォルダ直下の `*.xml` で `old` を `new` に置き換える
///
/// 書き換えたファイル数を返す。
pub fn normalize_namespace(folder: &Path, old: &str, new: &str) -> Result<usize> {
    let mut rewritten = 0;

    for path in scan_xml_files(folder)? {
        let content = std::fs::read_to_string(&path)?;
        if old.is_empty() || !content.contains(old) {
            continue;
        }
        std::fs::write(&path, content.replace(old, new))?;
        tracing::info!(path = %path.display(), "namespace normalized");
        rewritten += 1;
    }

    Ok(rewritten)
}
