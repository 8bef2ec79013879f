// hwp / land-transition / validate-config

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use invgrid_io::{csv, xlsx, FsSource, OutputShape, OutputSheet};
use invgrid_recon::{
    run_hwp, run_land_transition, CountryGroup, Diagnostic, MetricKey, ReconConfig, RunOutput,
    RunSummary, YearRange,
};

use crate::{CliError, CountrySelection, HarvestArgs, OutputFormat, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Hwp,
    LandTransition,
}

impl Kind {
    fn sheet<'a>(&self, config: &'a ReconConfig) -> &'a str {
        match self {
            Self::Hwp => &config.hwp.sheet,
            Self::LandTransition => &config.land_transition.sheet,
        }
    }

    fn value_label<'a>(&self, config: &'a ReconConfig) -> &'a str {
        match self {
            Self::Hwp => &config.hwp.value_label,
            Self::LandTransition => &config.land_transition.value_label,
        }
    }

    /// `<table>_<what>` part of the default output name.
    fn output_stem(&self, config: &ReconConfig) -> String {
        match self {
            Self::Hwp => format!("{}_HWP_gains_losses", self.sheet(config)),
            Self::LandTransition => format!("{}_Land_Transition_Matrix", self.sheet(config)),
        }
    }
}

/// Default output path, relative to the current directory.
pub fn default_output(
    kind: Kind,
    config: &ReconConfig,
    group: &CountryGroup,
    years: YearRange,
    format: OutputFormat,
) -> PathBuf {
    let stem = format!(
        "{}_{}_{}_{}",
        group.file_prefix(),
        kind.output_stem(config),
        years.start(),
        years.end()
    );
    match format {
        OutputFormat::Xlsx => PathBuf::from(format!("{stem}.xlsx")),
        OutputFormat::Csv => PathBuf::from(stem),
    }
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read {}: {}", path.display(), e)))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        CliError::config(format!("{}: {}", path.display(), e))
            .with_hint(format!("invgrid validate-config {}", path.display()))
    })
}

impl CountrySelection {
    fn resolve(&self, source: &FsSource) -> Result<CountryGroup, CliError> {
        if self.eu {
            return Ok(CountryGroup::Eu);
        }
        if self.euplus {
            return Ok(CountryGroup::EuPlus);
        }
        if self.all {
            return Ok(CountryGroup::All);
        }
        if self.amissing {
            return Ok(CountryGroup::AllWithGaps);
        }
        if self.amissingnoeua {
            return Ok(CountryGroup::AllWithGapsNoEua);
        }
        if !self.countries.is_empty() {
            let codes: Vec<String> = self
                .countries
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if codes.is_empty() {
                return Err(CliError::usage("--countries needs at least one code"));
            }
            return Ok(CountryGroup::Explicit(codes));
        }
        if self.list {
            let countries = source.list_countries()?;
            if countries.is_empty() {
                log::warn!("no country directories under {}", source.root().display());
            }
            let name = source
                .root()
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "countries".to_string());
            return Ok(CountryGroup::Directory { name, countries });
        }
        if let Some(name) = &self.group {
            return Ok(CountryGroup::named(name)?);
        }
        Err(CliError::usage("no country selection given")
            .with_hint("use one of --eu, --euplus, -a, -c, -l, --amissing, --amissingnoeua, -g"))
    }
}

// ============================================================================
// hwp / land-transition
// ============================================================================

#[derive(Serialize)]
struct Report<'a> {
    output: String,
    group: String,
    summary: &'a RunSummary,
    diagnostics: &'a [Diagnostic],
}

pub fn cmd_harvest(kind: Kind, args: HarvestArgs, quiet: bool) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let years = YearRange::new(args.start, args.end)?;
    let source = FsSource::new(&args.directory, &config.discovery)?;
    let group = args.selection.resolve(&source)?;
    let countries = group.countries(&config.country_groups);
    log::info!(
        "{}: {} countries ({}), {}-{}",
        kind.sheet(&config),
        countries.len(),
        group,
        years.start(),
        years.end()
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(kind, &config, &group, years, args.format));

    match kind {
        Kind::Hwp => {
            let run = run_hwp(&source, &config, &countries, years);
            finish(run, &args, &output, kind.value_label(&config), &group, quiet)
        }
        Kind::LandTransition => {
            let run = run_land_transition(&source, &config, &countries, years);
            finish(run, &args, &output, kind.value_label(&config), &group, quiet)
        }
    }
}

fn finish<K: MetricKey>(
    run: RunOutput<K>,
    args: &HarvestArgs,
    output: &Path,
    value_label: &str,
    group: &CountryGroup,
    quiet: bool,
) -> Result<(), CliError> {
    let sheets: Vec<OutputSheet<'_>> = run
        .matrices
        .iter()
        .map(|(key, matrix)| OutputSheet { name: key.sheet_name(), matrix })
        .collect();
    let shape = match args.shape {
        Shape::Long => OutputShape::Long,
        Shape::Wide => OutputShape::Wide,
    };

    match args.format {
        OutputFormat::Xlsx => {
            xlsx::export(output, &sheets, shape, value_label)?;
        }
        OutputFormat::Csv => {
            csv::export_dir(output, &sheets, shape, value_label)?;
        }
    }

    let report = Report {
        output: output.display().to_string(),
        group: group.to_string(),
        summary: &run.summary,
        diagnostics: &run.diagnostics,
    };

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("cannot serialize report: {e}")))?;
        std::fs::write(path, json + "\n")
            .map_err(|e| CliError::write(format!("cannot write {}: {}", path.display(), e)))?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("cannot serialize report: {e}")))?;
        println!("{}", json);
    } else if !quiet {
        print_summary(&report, sheets.len())
            .map_err(|e| CliError::general(format!("cannot write to stdout: {e}")))?;
    }
    Ok(())
}

fn print_summary(report: &Report<'_>, sheet_count: usize) -> std::io::Result<()> {
    let summary = report.summary;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "wrote {} ({} sheets)", report.output, sheet_count)?;
    writeln!(
        out,
        "countries: {}  years: {}-{}  workbooks: {} read, {} skipped",
        summary.countries,
        summary.meta.start_year,
        summary.meta.end_year,
        summary.workbooks_read,
        summary.workbooks_skipped
    )?;
    writeln!(out, "missing cells: {} of {}", summary.missing_cells, summary.cells)?;
    if summary.countries_without_workbooks > 0 {
        writeln!(out, "countries without workbooks: {}", summary.countries_without_workbooks)?;
    }
    if !summary.issue_counts.is_empty() {
        let counts: Vec<String> =
            summary.issue_counts.iter().map(|(kind, n)| format!("{kind}={n}")).collect();
        writeln!(out, "diagnostics: {}", counts.join(" "))?;
    }
    Ok(())
}

// ============================================================================
// validate-config
// ============================================================================

pub fn cmd_validate_config(file: &Path, json: bool) -> Result<(), CliError> {
    let config = load_config(Some(file))?;
    let overrides: Vec<String> = config
        .layout_overrides
        .iter()
        .map(|(code, rule)| format!("{code}={rule}"))
        .collect();

    if json {
        let value = serde_json::json!({
            "valid": true,
            "file": file.display().to_string(),
            "hwp_sheet": config.hwp.sheet,
            "land_transition_sheet": config.land_transition.sheet,
            "year_strategy": config.years.strategy,
            "layout_overrides": config.layout_overrides,
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::general(format!("cannot serialize result: {e}")))?;
        println!("{}", text);
    } else {
        println!("ok: {}", file.display());
        println!("  hwp sheet:             {}", config.hwp.sheet);
        println!("  land transition sheet: {}", config.land_transition.sheet);
        if !overrides.is_empty() {
            println!("  layout overrides:      {}", overrides.join(", "));
        }
    }
    Ok(())
}
