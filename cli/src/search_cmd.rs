use crate::output::{SourceArg, human_size};
use anyhow::{Result, bail};
use assetdex_catalog::CatalogStore;
use assetdex_query::{
    FilterState, PreviewSelector, QueryCompiler, RangeFilter, SortField, TagSelector,
    run_file_query,
};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search phrase: `+word` required, `-word` excluded, `~text` exact,
    /// `=predicate` raw (needs allow_raw_predicates)
    #[arg(value_name = "PHRASE", default_value = "", allow_hyphen_values = true)]
    pub phrase: String,

    /// File type or type group, e.g. "png" or "Images"
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub file_type: Option<String>,

    #[arg(long, value_name = "ID")]
    pub package_id: Option<i64>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Only files tagged with this tag id
    #[arg(long, value_name = "TAG_ID", conflicts_with = "untagged")]
    pub tag: Option<i64>,

    /// Only files without any tag
    #[arg(long)]
    pub untagged: bool,

    #[arg(long, value_enum, default_value_t = PreviewArg::Any)]
    pub preview: PreviewArg,

    /// Width bound in pixels: ">=512", "<=128" or a plain minimum
    #[arg(long, value_name = "BOUND", value_parser = parse_bound)]
    pub width: Option<RangeFilter>,

    /// Height bound in pixels
    #[arg(long, value_name = "BOUND", value_parser = parse_bound)]
    pub height: Option<RangeFilter>,

    /// Length bound in seconds
    #[arg(long, value_name = "BOUND", value_parser = parse_bound)]
    pub length: Option<RangeFilter>,

    /// Size bound in KB
    #[arg(long, value_name = "BOUND", value_parser = parse_bound)]
    pub size: Option<RangeFilter>,

    #[arg(long, value_enum, default_value_t = SortArg::Path)]
    pub sort: SortArg,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Also search packages flagged as excluded
    #[arg(long)]
    pub include_excluded: bool,

    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// 0 uses the configured maximum
    #[arg(short = 'n', long, default_value_t = 50)]
    pub page_size: u32,

    /// Print the result page as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PreviewArg {
    Any,
    Available,
    Missing,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Path,
    Name,
    Type,
    Size,
    Width,
    Height,
    Length,
    Package,
    Category,
    Publisher,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Path => SortField::Path,
            SortArg::Name => SortField::FileName,
            SortArg::Type => SortField::FileType,
            SortArg::Size => SortField::Size,
            SortArg::Width => SortField::Width,
            SortArg::Height => SortField::Height,
            SortArg::Length => SortField::Length,
            SortArg::Package => SortField::Package,
            SortArg::Category => SortField::Category,
            SortArg::Publisher => SortField::Publisher,
        }
    }
}

/// Bounds are inclusive: `<=N` is an upper bound, `>=N` or a bare `N` a
/// lower one. Strict `<`/`>` are rejected.
pub fn parse_bound(raw: &str) -> Result<RangeFilter, String> {
    let raw = raw.trim();
    let (value, is_max) = if let Some(rest) = raw.strip_prefix("<=") {
        (rest, true)
    } else if let Some(rest) = raw.strip_prefix(">=") {
        (rest, false)
    } else {
        (raw, false)
    };
    let value = value.trim();
    if value.parse::<f64>().is_err() {
        return Err(format!("'{raw}' is not a number with an optional <= or >= prefix"));
    }
    Ok(RangeFilter {
        value: Some(value.to_string()),
        is_max,
    })
}

impl SearchArgs {
    pub fn filter(&self) -> FilterState {
        let file_tag = match (self.tag, self.untagged) {
            (Some(tag), _) => TagSelector::Tag(tag),
            (None, true) => TagSelector::Untagged,
            (None, false) => TagSelector::Any,
        };
        let preview = match self.preview {
            PreviewArg::Any => PreviewSelector::Any,
            PreviewArg::Available => PreviewSelector::Available,
            PreviewArg::Missing => PreviewSelector::Missing,
        };
        FilterState {
            phrase: self.phrase.clone(),
            include_excluded: self.include_excluded,
            file_type: self.file_type.clone(),
            package_id: self.package_id,
            publisher: self.publisher.clone(),
            category: self.category.clone(),
            source: self.source.map(Into::into),
            file_tag,
            preview,
            width: self.width.clone().unwrap_or_default(),
            height: self.height.clone().unwrap_or_default(),
            length: self.length.clone().unwrap_or_default(),
            size: self.size.clone().unwrap_or_default(),
            sort: self.sort.into(),
            descending: self.desc,
            page: self.page,
            page_size: self.page_size,
            ..Default::default()
        }
    }
}

pub fn run_search<S: CatalogStore>(
    args: &SearchArgs,
    compiler: &QueryCompiler,
    store: &S,
) -> Result<()> {
    let page = run_file_query(compiler, store, &args.filter());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    }
    if let Some(message) = &page.error {
        bail!("Query failed: {message}");
    }
    if args.json {
        return Ok(());
    }

    if page.rows.is_empty() {
        println!("{} No files found", "✗".bright_red());
        return Ok(());
    }

    println!(
        "{} {} files, page {} of {}\n",
        "✓".bright_green(),
        page.total.to_string().bright_cyan(),
        page.page,
        page.page_count()
    );
    for row in &page.rows {
        println!(
            "  {}  {}  {}",
            row.file.path.bright_cyan(),
            human_size(row.file.size).bright_black(),
            row.package.display_name.dimmed()
        );
    }
    Ok(())
}
