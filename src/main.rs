mod filter;
mod keyword;
mod output;
mod pipeline;
mod sitemap;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::filter::{CustomFilter, FilterConfig, FilterMode};
use crate::pipeline::CrawlOptions;

#[derive(Parser)]
#[command(name = "url_keywords", about = "Sitemap URL discovery with SEO keyword generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover sitemap URLs, filter them, optionally derive keywords
    Crawl {
        /// Base website URL (must start with http:// or https://)
        url: String,
        /// Drop every URL containing /blog
        #[arg(long)]
        remove_blogs: bool,
        /// Keep only leaf .htm pages, plus the homepage
        #[arg(long)]
        only_mainsite: bool,
        /// Keep only location landing pages (trailing-slash URLs one segment deep)
        #[arg(long)]
        location_pages_only: bool,
        /// Keep only URLs containing this keyword
        #[arg(long, value_name = "KEYWORD", conflicts_with = "not_containing")]
        containing: Option<String>,
        /// Keep only URLs not containing this keyword
        #[arg(long, value_name = "KEYWORD")]
        not_containing: Option<String>,
        /// Main keyword with location (e.g. "Widget Manufacturers in Texas");
        /// enables keyword generation
        #[arg(short = 'k', long, value_name = "TEMPLATE")]
        keyword: Option<String>,
        /// Write the results to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        /// Write the results to a plain-text file
        #[arg(long, value_name = "PATH")]
        txt: Option<PathBuf>,
    },
    /// Derive the keyword for a single URL (no network)
    Keyword {
        url: String,
        /// Homepage URL of the site
        #[arg(short, long)]
        base: String,
        /// Main keyword with location
        #[arg(short, long)]
        keyword: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Crawl {
            url,
            remove_blogs,
            only_mainsite,
            location_pages_only,
            containing,
            not_containing,
            keyword,
            csv,
            txt,
        } => {
            let custom = containing
                .map(|kw| CustomFilter {
                    mode: FilterMode::Containing,
                    keyword: kw,
                })
                .or(not_containing.map(|kw| CustomFilter {
                    mode: FilterMode::NotContaining,
                    keyword: kw,
                }));
            let opts = CrawlOptions {
                filters: FilterConfig {
                    remove_blogs,
                    only_mainsite,
                    location_pages_only,
                    custom,
                },
                main_keyword: keyword,
            };

            println!("Crawling {}...", url);
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}%")?
                    .progress_chars("=> "),
            );
            let rows = pipeline::run(&url, &opts, |pct| pb.set_position(pct as u64)).await?;
            pb.finish_and_clear();

            if rows.is_empty() {
                println!("No matching results found.");
                return Ok(());
            }

            output::print_preview(&rows);
            if let Some(path) = csv {
                output::write_csv(&path, &rows)?;
                println!("Wrote {}", path.display());
            }
            if let Some(path) = txt {
                output::write_txt(&path, &rows)?;
                println!("Wrote {}", path.display());
            }
            println!("Processed {} items.", rows.len());
            Ok(())
        }
        Commands::Keyword { url, base, keyword } => {
            let req = keyword::KeywordRequest::new(&base, &keyword);
            match keyword::derive(&url, &req) {
                Some(kw) => println!("{} -> {}", url, kw),
                None => println!("No keyword applies to {}", url),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
