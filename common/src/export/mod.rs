//! ワークブック生成モジュール

pub mod collection;
pub mod organization;
pub mod workbook;

pub use collection::{CollectionDomain, CollectionReport, CollectionReportPaths};
pub use organization::{OrganizationDomain, OrganizationReport, OrganizationReportPaths};

use crate::hits::Domain;

/// 領域ごとのシート名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainSheets {
    pub occurrence: &'static str,
    pub counts: &'static str,
    pub content: &'static str,
    pub analysis: &'static str,
    pub average: &'static str,
}

impl DomainSheets {
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Concept => Self {
                occurrence: "ConceptOccurrence",
                counts: "ConceptCounts",
                content: "ConceptContent",
                analysis: "ConceptOccurrenceAnalysis",
                average: "AVGconceptOccurrence",
            },
            Domain::XPath => Self {
                occurrence: "XpathOccurrence",
                counts: "XpathCounts",
                content: "XpathContent",
                analysis: "XpathOccurrenceAnalysis",
                average: "AVGxpathOccurrence",
            },
        }
    }
}
