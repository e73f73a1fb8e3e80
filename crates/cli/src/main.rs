//! mta-site-breadcrumbs CLI
//!
//! Resolves breadcrumb trails for page requests against a site file
//! (settings, markup and a content snapshot in YAML or JSON).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mta_site_breadcrumbs_core::{
    format_ancestors, format_output, format_output_batch, AncestorResolver, ArchiveKind,
    OutputFormat, PageContext, RequestState, SiteFile, StaticGenerator, TrailBuilder,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Site breadcrumb trail resolver
#[derive(Parser)]
#[command(name = "mta-site-breadcrumbs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve breadcrumb trails for site pages from a content snapshot")]
#[command(long_about = r#"
mta-site-breadcrumbs: Breadcrumb Trails for Content Sites

Given a site file holding settings, markup options and a snapshot of the site's
content (pages, posts, products, terms, authors), resolves the breadcrumb trail
of a page request: home crumb, ancestors, the current item, then search and
pagination crumbs.

Output formats:
  - JSON (default) - Trail bundled with the markup settings
  - YAML - Human-readable YAML format
  - ANSI - Colorful terminal output
  - Summary - Plain text listing
  - HTML - Rendered navigation markup

Examples:
  mta-site-breadcrumbs trail --site site.yaml --context single --id 42
  mta-site-breadcrumbs trail --site site.yaml --context category --id 7 --page 3
  mta-site-breadcrumbs trail --site site.yaml --context date --year 2024 --month 5
  mta-site-breadcrumbs ancestors --site site.yaml --term 12 --taxonomy product_cat
  mta-site-breadcrumbs batch --site site.yaml requests.yaml --format yaml
"#)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the trail of a single request
    Trail {
        /// Site file (YAML or JSON)
        #[arg(long)]
        site: PathBuf,

        /// What kind of page is shown
        #[arg(long, value_enum)]
        context: ContextKind,

        /// Item, term or user id, depending on the context
        #[arg(long)]
        id: Option<u64>,

        /// Post type of a single item or post type archive
        #[arg(long)]
        post_type: Option<String>,

        /// Taxonomy key of a custom taxonomy archive
        #[arg(long)]
        taxonomy: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,

        #[arg(long)]
        day: Option<u32>,

        /// Requested page number
        #[arg(long)]
        page: Option<u32>,

        /// Search query
        #[arg(long)]
        search: Option<String>,

        /// Current request URL
        #[arg(long)]
        url: Option<String>,

        /// Endpoint slug shown on a page
        #[arg(long)]
        endpoint: Option<String>,

        /// The request is for the site's front page
        #[arg(long)]
        front_page: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
        format: OutputFormatArg,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the ancestors of a term, root first
    Ancestors {
        /// Site file (YAML or JSON)
        #[arg(long)]
        site: PathBuf,

        /// Term id
        #[arg(long)]
        term: u64,

        /// Taxonomy key
        #[arg(long)]
        taxonomy: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
        format: OutputFormatArg,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve a list of requests read from a YAML or JSON file
    Batch {
        /// Site file (YAML or JSON)
        #[arg(long)]
        site: PathBuf,

        /// Requests file
        requests: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
        format: OutputFormatArg,

        /// Number of threads for parallel resolution (default: auto)
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Ansi,
    Summary,
    Html,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
            OutputFormatArg::Summary => OutputFormat::Summary,
            OutputFormatArg::Html => OutputFormat::Html,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    Text,
    Json,
}

/// Page context argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextKind {
    Home,
    NotFound,
    Attachment,
    Single,
    Page,
    ProductCategory,
    ProductTag,
    Category,
    Tag,
    Taxonomy,
    Author,
    Date,
    PostTypeArchive,
}

/// Flags that together describe one request
struct RequestFlags<'a> {
    context: ContextKind,
    id: Option<u64>,
    post_type: Option<&'a str>,
    taxonomy: Option<&'a str>,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    match &args.command {
        Commands::Trail {
            site,
            context,
            id,
            post_type,
            taxonomy,
            year,
            month,
            day,
            page,
            search,
            url,
            endpoint,
            front_page,
            format,
            output,
        } => {
            let flags = RequestFlags {
                context: *context,
                id: *id,
                post_type: post_type.as_deref(),
                taxonomy: taxonomy.as_deref(),
                year: *year,
                month: *month,
                day: *day,
            };

            let mut request = RequestState::new(build_context(&flags)?).with_front_page(*front_page);
            if let Some(page) = page {
                request = request.with_paged(*page);
            }
            if let Some(query) = search {
                request = request.with_search(query.clone());
            }
            if let Some(url) = url {
                request = request.with_url(url.clone());
            }
            if let Some(endpoint) = endpoint {
                request = request.with_endpoint(endpoint.clone());
            }

            run_trail(site, &request, (*format).into(), output.as_ref())
        }
        Commands::Ancestors {
            site,
            term,
            taxonomy,
            format,
            output,
        } => run_ancestors(site, *term, taxonomy, (*format).into(), output.as_ref()),
        Commands::Batch {
            site,
            requests,
            format,
            threads,
            output,
        } => run_batch(site, requests, (*format).into(), *threads, output.as_ref(), &args),
    }
}

fn init_tracing(args: &Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match args.verbose {
        0 => "mta_site_breadcrumbs=info,mta_site_breadcrumbs_core=info",
        1 => "mta_site_breadcrumbs=debug,mta_site_breadcrumbs_core=debug",
        _ => "mta_site_breadcrumbs=trace,mta_site_breadcrumbs_core=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so they never mix with formatted output
    match args.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Map the context flags onto a page context, checking required ids
fn build_context(flags: &RequestFlags<'_>) -> Result<PageContext> {
    let id = || {
        flags
            .id
            .with_context(|| format!("--id is required for --context {:?}", flags.context))
    };

    let context = match flags.context {
        ContextKind::Home => PageContext::Home,
        ContextKind::NotFound => PageContext::NotFound,
        ContextKind::Attachment => PageContext::Attachment { id: id()? },
        ContextKind::Single => PageContext::SinglePost {
            id: id()?,
            post_type: flags.post_type.unwrap_or("post").to_string(),
        },
        ContextKind::Page => PageContext::Page { id: id()? },
        ContextKind::ProductCategory => PageContext::ArchiveListing {
            archive: ArchiveKind::ProductCategory,
            term_id: flags.id,
        },
        ContextKind::ProductTag => PageContext::ArchiveListing {
            archive: ArchiveKind::ProductTag,
            term_id: flags.id,
        },
        ContextKind::Category => PageContext::Category { term_id: id()? },
        ContextKind::Tag => PageContext::Tag { term_id: id()? },
        ContextKind::Taxonomy => {
            let Some(taxonomy) = flags.taxonomy else {
                bail!("--taxonomy is required for --context taxonomy");
            };
            PageContext::Taxonomy {
                term_id: id()?,
                taxonomy: taxonomy.to_string(),
            }
        }
        ContextKind::Author => PageContext::Author { user_id: id()? },
        ContextKind::Date => PageContext::Date {
            year: flags.year,
            month: flags.month,
            day: flags.day,
        },
        ContextKind::PostTypeArchive => {
            let Some(post_type) = flags.post_type else {
                bail!("--post-type is required for --context post-type-archive");
            };
            PageContext::PostTypeArchive {
                post_type: post_type.to_string(),
            }
        }
    };

    Ok(context)
}

fn load_site(path: &Path) -> Result<SiteFile> {
    SiteFile::load(path).with_context(|| format!("Failed to load site file {}", path.display()))
}

/// Builder for a loaded site, with the file's static generators registered
fn site_builder<'a>(
    site: &SiteFile,
    store: &'a mta_site_breadcrumbs_core::InMemoryStore,
) -> TrailBuilder<'a> {
    let mut builder = TrailBuilder::new(store, site.settings.clone()).with_markup(site.markup.clone());

    for (post_type, crumbs) in &site.generators {
        builder.register_generator(post_type.clone(), Arc::new(StaticGenerator::new(crumbs.clone())));
    }

    builder
}

fn run_trail(
    site_path: &Path,
    request: &RequestState,
    format: OutputFormat,
    output_path: Option<&PathBuf>,
) -> Result<()> {
    let site = load_site(site_path)?;
    let store = site.build_store();
    let builder = site_builder(&site, &store);

    let result = builder.breadcrumbs(request);
    tracing::debug!(crumbs = result.breadcrumb.len(), "trail resolved");

    let output = format_output(&result, format)?;
    write_output(&output, output_path)?;

    Ok(())
}

fn run_ancestors(
    site_path: &Path,
    term: u64,
    taxonomy: &str,
    format: OutputFormat,
    output_path: Option<&PathBuf>,
) -> Result<()> {
    let site = load_site(site_path)?;
    let store = site.build_store();

    let ancestors = AncestorResolver::new(&store).ancestors(term, taxonomy);

    let output = format_ancestors(&ancestors, format)?;
    write_output(&output, output_path)?;

    Ok(())
}

fn run_batch(
    site_path: &Path,
    requests_path: &Path,
    format: OutputFormat,
    threads: usize,
    output_path: Option<&PathBuf>,
    args: &Args,
) -> Result<()> {
    let site = load_site(site_path)?;
    let store = site.build_store();
    let builder = site_builder(&site, &store);
    let requests = load_requests(requests_path)?;

    // Show progress spinner
    let spinner = if args.verbose > 0 && atty::is(atty::Stream::Stderr) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Invalid spinner template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Resolving {} requests...", requests.len()));
        Some(pb)
    } else {
        None
    };

    let results = builder
        .breadcrumbs_batch(&requests, threads)
        .context("Failed to resolve requests")?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!("Resolved {} trails", results.len()));
    }

    let output = format_output_batch(&results, format)?;
    write_output(&output, output_path)?;

    Ok(())
}

/// Read a list of requests, choosing the parser by extension
fn load_requests(path: &Path) -> Result<Vec<RequestState>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read requests file {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let requests = match ext.as_str() {
        "json" => serde_json::from_str(&raw).context("Failed to parse requests JSON")?,
        "yaml" | "yml" => serde_yaml::from_str(&raw).context("Failed to parse requests YAML")?,
        other => bail!("Unsupported requests file extension: {other}"),
    };

    Ok(requests)
}

fn write_output(output: &str, path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, output).context("Failed to write output file")?;
        eprintln!("{} {}", "Wrote".green(), path.display());
    } else {
        println!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(context: ContextKind) -> RequestFlags<'static> {
        RequestFlags {
            context,
            id: None,
            post_type: None,
            taxonomy: None,
            year: None,
            month: None,
            day: None,
        }
    }

    #[test]
    fn test_single_defaults_to_post() {
        let mut f = flags(ContextKind::Single);
        f.id = Some(5);
        assert_eq!(
            build_context(&f).unwrap(),
            PageContext::SinglePost {
                id: 5,
                post_type: "post".to_string()
            }
        );
    }

    #[test]
    fn test_missing_id_is_an_error() {
        assert!(build_context(&flags(ContextKind::Page)).is_err());
        assert!(build_context(&flags(ContextKind::Home)).is_ok());
    }

    #[test]
    fn test_product_category_id_optional() {
        assert_eq!(
            build_context(&flags(ContextKind::ProductCategory)).unwrap(),
            PageContext::ArchiveListing {
                archive: ArchiveKind::ProductCategory,
                term_id: None
            }
        );
    }

    #[test]
    fn test_taxonomy_requires_key() {
        let mut f = flags(ContextKind::Taxonomy);
        f.id = Some(50);
        assert!(build_context(&f).is_err());
        f.taxonomy = Some("genre");
        assert!(build_context(&f).is_ok());
    }

    #[test]
    fn test_cli_parses_trail() {
        let args = Args::try_parse_from([
            "mta-site-breadcrumbs",
            "trail",
            "--site",
            "site.yaml",
            "--context",
            "post-type-archive",
            "--post-type",
            "event",
            "--page",
            "2",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.verbose, 1);
        match args.command {
            Commands::Trail { context, page, .. } => {
                assert_eq!(context, ContextKind::PostTypeArchive);
                assert_eq!(page, Some(2));
            }
            _ => panic!("expected trail subcommand"),
        }
    }
}
