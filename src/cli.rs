use clap::{Args, Parser, Subcommand};
use mdeval_common::Domain;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdeval")]
#[command(about = "メタデータ評価・集計・レポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 評価対象（組織・コレクション・方言）
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// 組織ID
    #[arg(long)]
    pub org: String,

    /// コレクションID
    #[arg(long)]
    pub collection: String,

    /// 方言ID（dialectContains.csv の Concept 列）
    #[arg(long)]
    pub dialect: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// URL一覧からレコードをダウンロード
    Fetch {
        /// `url,file` 列を持つCSV
        #[arg(required = true)]
        list: PathBuf,

        /// 相対パスの保存先の基準フォルダ
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// 整形式でないXMLも保存する
        #[arg(long)]
        no_validate: bool,
    },

    /// 名前空間URIを統一
    Normalize {
        /// レコードフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 置換前のURI
        #[arg(long)]
        old: String,

        /// 置換後のURI
        #[arg(long)]
        new: String,
    },

    /// 評価サービスでレコードを評価
    Evaluate {
        /// レコードフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// ローカルでXPathを抽出（評価サービスを使わない）
    LocalEval {
        /// レコードフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// 出力CSV（省略時は data_dir の ElementEvaluated）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 評価結果から出現数行列・集計表・内容行列を作成
    Aggregate {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// 複数コレクションのCSVを結合
    Combine {
        /// 結合方法 (occurrence/average/summaries/matrices/hits)
        #[arg(short, long)]
        kind: CombineKind,

        /// 領域 (concept/xpath)
        #[arg(short, long, default_value = "concept")]
        domain: Domain,

        /// 出力CSV
        #[arg(short, long)]
        output: PathBuf,

        /// 入力CSV
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// 単一コレクションのレポートを生成
    CollectionReport {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// 組織（複数コレクション）のレポートを生成
    OrgReport {
        /// 組織ID
        #[arg(long)]
        org: String,

        /// 概念の CollectionOccurrence% ピボット
        #[arg(long)]
        concept_occurrence: PathBuf,

        /// 概念の AverageOccurrencePerRecord ピボット
        #[arg(long)]
        concept_average: PathBuf,

        /// 連結した概念集計表
        #[arg(long)]
        concept_counts: Option<PathBuf>,

        /// XPathの CollectionOccurrence% ピボット
        #[arg(long)]
        xpath_occurrence: PathBuf,

        /// XPathの AverageOccurrencePerRecord ピボット
        #[arg(long)]
        xpath_average: PathBuf,

        /// 連結したXPath集計表
        #[arg(long)]
        xpath_counts: Option<PathBuf>,
    },

    /// レポートを公開して共有URLを表示
    Publish {
        /// xlsxファイル
        #[arg(required = true)]
        workbook: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 評価サービスのURLを設定
        #[arg(long)]
        set_evaluator_url: Option<String>,

        /// データフォルダを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// レポートフォルダを設定
        #[arg(long)]
        set_reports_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 結合方法
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineKind {
    /// CollectionOccurrence% のピボット
    Occurrence,
    /// AverageOccurrencePerRecord のピボット
    Average,
    /// 集計表の連結
    Summaries,
    /// 出現数行列の連結
    Matrices,
    /// 評価結果の連結
    Hits,
}

impl std::str::FromStr for CombineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "occurrence" => Ok(CombineKind::Occurrence),
            "average" | "avg" => Ok(CombineKind::Average),
            "summaries" | "counts" => Ok(CombineKind::Summaries),
            "matrices" | "matrix" => Ok(CombineKind::Matrices),
            "hits" | "evaluated" => Ok(CombineKind::Hits),
            _ => Err(format!(
                "Unknown combine kind: {}. Use occurrence, average, summaries, matrices, or hits",
                s
            )),
        }
    }
}

impl std::fmt::Display for CombineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombineKind::Occurrence => write!(f, "occurrence"),
            CombineKind::Average => write!(f, "average"),
            CombineKind::Summaries => write!(f, "summaries"),
            CombineKind::Matrices => write!(f, "matrices"),
            CombineKind::Hits => write!(f, "hits"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_kind_from_str() {
        assert_eq!("Occurrence".parse::<CombineKind>().unwrap(), CombineKind::Occurrence);
        assert_eq!("avg".parse::<CombineKind>().unwrap(), CombineKind::Average);
        assert_eq!("counts".parse::<CombineKind>().unwrap(), CombineKind::Summaries);
        assert!("pivot".parse::<CombineKind>().is_err());
    }

    #[test]
    fn test_parse_org_report_without_counts() {
        let cli = Cli::try_parse_from([
            "mdeval",
            "org-report",
            "--org",
            "DataONE",
            "--concept-occurrence",
            "co.csv",
            "--concept-average",
            "ca.csv",
            "--xpath-occurrence",
            "xo.csv",
            "--xpath-average",
            "xa.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::OrgReport { org, concept_counts, xpath_counts, .. } => {
                assert_eq!(org, "DataONE");
                assert!(concept_counts.is_none());
                assert!(xpath_counts.is_none());
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_parse_combine_with_domain() {
        let cli = Cli::try_parse_from([
            "mdeval", "-v", "combine", "--kind", "occurrence", "--domain", "xpath", "-o", "out.csv",
            "a.csv", "b.csv",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Combine { kind, domain, inputs, .. } => {
                assert_eq!(kind, CombineKind::Occurrence);
                assert_eq!(domain, Domain::XPath);
                assert_eq!(inputs.len(), 2);
            }
            _ => panic!("unexpected command"),
        }
    }
}
