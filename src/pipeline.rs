//! 1コレクション分の集計
//!
//! 評価結果CSVから出現数行列・集計表・内容行列を作り `data_dir` に書き出す。

use crate::error::Result;
use crate::evaluator::EvaluationTarget;
use mdeval_common::{
    collection_label, concept_content, count_summary, occurrence_matrix, xpath_content,
    DialectReference, Domain, HitTable,
};
use std::path::{Path, PathBuf};

/// 1領域分の入出力CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFiles {
    /// 評価結果（入力）
    pub hits: PathBuf,
    pub matrix: PathBuf,
    pub summary: PathBuf,
    pub content: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFiles {
    pub concept: DomainFiles,
    pub xpath: DomainFiles,
}

impl CollectionFiles {
    pub fn for_target(target: &EvaluationTarget, data_dir: &Path) -> Self {
        let evaluated = target.evaluated_paths(data_dir);
        Self {
            concept: DomainFiles {
                hits: evaluated.concept,
                matrix: target.data_file(data_dir, "ConceptOccurrenceMatrix"),
                summary: target.data_file(data_dir, "ConceptSummary"),
                content: target.data_file(data_dir, "ConceptContent"),
            },
            xpath: DomainFiles {
                hits: evaluated.element,
                matrix: target.data_file(data_dir, "XPathOccurrenceMatrix"),
                summary: target.data_file(data_dir, "XPathSummary"),
                content: target.data_file(data_dir, "XPathContent"),
            },
        }
    }

    pub fn domain(&self, domain: Domain) -> &DomainFiles {
        match domain {
            Domain::Concept => &self.concept,
            Domain::XPath => &self.xpath,
        }
    }
}

/// 集計結果の件数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainStats {
    pub records: usize,
    pub terms: usize,
    pub hits: usize,
}

/// 評価結果から全ての集計CSVを作る
///
/// 概念は方言リファレンスの語彙で列を補う。XPathには補わない。
pub fn aggregate_collection(
    target: &EvaluationTarget,
    data_dir: &Path,
    reference: Option<&DialectReference>,
) -> Result<(CollectionFiles, DomainStats, DomainStats)> {
    let files = CollectionFiles::for_target(target, data_dir);
    let label = collection_label(&target.organization, &target.collection);

    let vocabulary = reference
        .map(|r| r.vocabulary(&target.dialect))
        .transpose()?;

    let concept_hits = HitTable::read_csv(&files.concept.hits, Domain::Concept)?;
    let matrix = occurrence_matrix(&concept_hits, vocabulary.as_ref());
    matrix.write_csv(&files.concept.matrix)?;
    let summary = count_summary(&concept_hits, vocabulary.as_ref(), &label);
    summary.write_csv(&files.concept.summary)?;
    concept_content(&concept_hits, vocabulary.as_ref()).write_csv(&files.concept.content)?;
    let concept_stats = DomainStats {
        records: summary.number_of_records,
        terms: matrix.terms.len(),
        hits: concept_hits.len(),
    };

    let xpath_hits = HitTable::read_csv(&files.xpath.hits, Domain::XPath)?;
    let matrix = occurrence_matrix(&xpath_hits, None);
    matrix.write_csv(&files.xpath.matrix)?;
    let summary = count_summary(&xpath_hits, None, &label);
    summary.write_csv(&files.xpath.summary)?;
    xpath_content(&xpath_hits).write_csv(&files.xpath.content)?;
    let xpath_stats = DomainStats {
        records: summary.number_of_records,
        terms: matrix.terms.len(),
        hits: xpath_hits.len(),
    };

    tracing::info!(
        collection = %label,
        concept_records = concept_stats.records,
        xpath_records = xpath_stats.records,
        "collection aggregated"
    );
    Ok((files, concept_stats, xpath_stats))
}
