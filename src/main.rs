use anyhow::{Context, Result};
use clap::Parser;
use mdeval::cli::{Cli, CombineKind, Commands, TargetArgs};
use mdeval::config::Config;
use mdeval::evaluator::{self, EvaluationTarget, HttpEvaluator};
use mdeval::{export, pipeline, publish, records};
use mdeval_common::combine::{
    combine_average, combine_files, combine_hits, combine_matrices, combine_occurrence,
    combine_summaries,
};
use mdeval_common::export::OrganizationReportPaths;
use mdeval_common::DialectReference;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "mdeval=debug,mdeval_common=debug"
    } else {
        "mdeval=info,mdeval_common=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stdout)
        .without_time()
        .init();
}

fn target_of(args: &TargetArgs) -> EvaluationTarget {
    EvaluationTarget::new(&args.org, &args.collection, &args.dialect)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定の読み込みに失敗")?;

    match cli.command {
        Commands::Fetch { list, output_dir, no_validate } => {
            println!("📥 mdeval - レコード取得\n");

            let (urls, destinations) = records::read_fetch_list(&list, output_dir.as_deref())?;
            println!("✔ {}件のURLを読み込み", urls.len());

            let client = config.http_client()?;
            let report = records::fetch_records(&client, &urls, &destinations, !no_validate)?;
            println!("✔ {}件を保存", report.written.len());

            if !report.is_complete() {
                println!("- {}件をスキップ:", report.skipped.len());
                for skipped in &report.skipped {
                    println!("  {} ({})", skipped.url, skipped.reason);
                }
            }
        }

        Commands::Normalize { folder, old, new } => {
            let rewritten = records::normalize_namespace(&folder, &old, &new)?;
            println!("✔ {}件のファイルの名前空間を置換", rewritten);
        }

        Commands::Evaluate { folder, target } => {
            println!("🔎 mdeval - 評価\n");
            let target = target_of(&target);

            println!("[1/2] 評価サービスへ送信中...");
            let client = config.http_client()?;
            let service = HttpEvaluator::new(&client, &config.evaluator_url);
            let paths = evaluator::evaluate(&service, &folder, &target, &config.data_dir)
                .with_context(|| format!("{} の評価に失敗", folder.display()))?;
            println!("✔ 評価完了\n");

            println!("[2/2] 結果を保存");
            println!("✔ {}", paths.element.display());
            println!("✔ {}", paths.concept.display());
        }

        Commands::LocalEval { folder, target, output } => {
            let target = target_of(&target);
            let hits = evaluator::evaluate_directory(&folder, &target.collection, &target.dialect)?;
            let output = output.unwrap_or_else(|| target.evaluated_paths(&config.data_dir).element);
            hits.write_csv(&output)?;
            println!("✔ {}件のXPathを抽出: {}", hits.len(), output.display());
        }

        Commands::Aggregate { target } => {
            println!("📊 mdeval - 集計\n");
            let target = target_of(&target);

            let reference = if config.dialect_reference.exists() {
                Some(DialectReference::load(&config.dialect_reference)?)
            } else {
                tracing::warn!(
                    path = %config.dialect_reference.display(),
                    "dialect reference not found, concept columns are not filled"
                );
                None
            };

            let (files, concept, xpath) =
                pipeline::aggregate_collection(&target, &config.data_dir, reference.as_ref())?;
            println!(
                "✔ 概念: {}レコード / {}項目 / {}件",
                concept.records, concept.terms, concept.hits
            );
            println!(
                "✔ XPath: {}レコード / {}項目 / {}件",
                xpath.records, xpath.terms, xpath.hits
            );
            println!("✔ 集計表: {}", files.concept.summary.display());
            println!("✔ 集計表: {}", files.xpath.summary.display());
        }

        Commands::Combine { kind, domain, output, inputs } => {
            let combined = match kind {
                CombineKind::Occurrence => {
                    combine_files(&inputs, &output, |t| combine_occurrence(t, domain))?
                }
                CombineKind::Average => {
                    combine_files(&inputs, &output, |t| combine_average(t, domain))?
                }
                CombineKind::Summaries => {
                    combine_files(&inputs, &output, |t| combine_summaries(t, domain))?
                }
                CombineKind::Matrices => combine_files(&inputs, &output, combine_matrices)?,
                CombineKind::Hits => combine_files(&inputs, &output, |t| combine_hits(t, domain))?,
            };
            println!(
                "✔ {}件を結合 ({}): {}行 → {}",
                inputs.len(),
                kind,
                combined.len(),
                output.display()
            );
        }

        Commands::CollectionReport { target } => {
            let target = target_of(&target);
            let path =
                export::write_collection_report(&target, &config.data_dir, &config.reports_dir)?;
            println!("✔ レポートを保存: {}", path.display());
        }

        Commands::OrgReport {
            org,
            concept_occurrence,
            concept_average,
            concept_counts,
            xpath_occurrence,
            xpath_average,
            xpath_counts,
        } => {
            let inputs = OrganizationReportPaths {
                concept_occurrence,
                concept_average,
                concept_counts,
                xpath_occurrence,
                xpath_average,
                xpath_counts,
            };
            let path = export::write_organization_report(&org, &inputs, &config.reports_dir)?;
            println!("✔ レポートを保存: {}", path.display());
        }

        Commands::Publish { workbook } => {
            println!("☁ mdeval - 公開\n");
            let url = publish::publish(&config, &workbook)
                .with_context(|| format!("{} の公開に失敗", workbook.display()))?;
            println!("✔ 公開URL: {}", url);
        }

        Commands::Config {
            set_evaluator_url,
            set_data_dir,
            set_reports_dir,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(url) = set_evaluator_url {
                config.evaluator_url = url;
                changed = true;
            }
            if let Some(dir) = set_data_dir {
                config.data_dir = dir;
                changed = true;
            }
            if let Some(dir) = set_reports_dir {
                config.reports_dir = dir;
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  評価サービス: {}", config.evaluator_url);
                println!("  データフォルダ: {}", config.data_dir.display());
                println!("  レポートフォルダ: {}", config.reports_dir.display());
                println!("  方言リファレンス: {}", config.dialect_reference.display());
                println!("  クライアント情報: {}", config.client_secrets.display());
                println!("  資格情報: {}", config.credentials.display());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}
