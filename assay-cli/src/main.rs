use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use assay_audit::{AssetTable, AuditReport, SizeRestrictions};
use assay_cond::{EditConditionParser, InstanceContext};
use assay_model::{
    load_project, Issue, LoadedProject, Severity, TypeCategory, ValidationReport, Verdict,
};
use assay_model::report::ObjectResult;
use assay_valid::ValidationEngine;

/// Assay: validate content properties and audit asset dependencies
#[derive(Parser)]
#[command(name = "assay", version, about, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate content objects against their property metadata
    Validate {
        /// Project directory containing assay.config.json
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only validate these objects (repeatable)
        #[arg(long = "object", value_name = "PATH")]
        objects: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Audit asset dependency sizes and check size restrictions
    Audit {
        /// Project directory containing assay.config.json
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only audit these packages (repeatable)
        #[arg(long = "asset", value_name = "PACKAGE")]
        assets: Vec<String>,

        /// Print median statistics after the results
        #[arg(long)]
        summary: bool,

        /// Only list the N largest assets
        #[arg(long, value_name = "N")]
        max_count: Option<usize>,

        /// Print the audit and restriction reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a project and show what it contains
    Check {
        /// Project directory containing assay.config.json
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Parse an edit condition, optionally evaluating it against an object
    Condition {
        /// Condition expression, e.g. "bEnabled && Count > 2"
        expression: String,

        /// Project directory containing assay.config.json
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Object to evaluate the condition against
        #[arg(long, value_name = "PATH")]
        object: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { path, objects, json } => cmd_validate(&path, &objects, json),
        Command::Audit {
            path,
            assets,
            summary,
            max_count,
            json,
        } => cmd_audit(&path, &assets, summary, max_count, json),
        Command::Check { path } => cmd_check(&path),
        Command::Condition {
            expression,
            path,
            object,
        } => cmd_condition(&expression, &path, object.as_deref()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(1)
        }
    }
}

// ── Commands ──

fn cmd_validate(path: &Path, objects: &[String], json: bool) -> Result<bool> {
    let (project, load_report) = load(path)?;
    let report = validate_project(&project, load_report, objects)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.ok);
    }

    println!("{} {}", "Validating".bold(), display_path(path));
    println!();
    print_issues(&report.issues);
    for object in &report.objects {
        print_object(object);
    }

    let invalid = report.count_verdict(Verdict::Invalid);
    let valid = report.count_verdict(Verdict::Valid);
    let skipped = report.count_verdict(Verdict::NotValidated);
    println!();
    if report.ok {
        println!(
            "{} {} valid, {} not validated, {} warning(s)",
            "✓".green().bold(),
            valid,
            skipped,
            report.count(Severity::Warning)
        );
    } else {
        println!(
            "{} {} invalid object(s), {} load error(s)",
            "✗".red().bold(),
            invalid,
            report.count(Severity::Error)
        );
    }

    Ok(report.ok)
}

fn cmd_audit(path: &Path, assets: &[String], summary: bool, max_count: Option<usize>, json: bool) -> Result<bool> {
    let (project, load_report) = load(path)?;
    let table = AssetTable::from_records(project.assets.iter().cloned());
    let packages: Vec<&str> = if assets.is_empty() {
        table.packages().collect()
    } else {
        assets.iter().map(String::as_str).collect()
    };

    let audit = AuditReport::audit_assets(&table, packages.iter().copied());
    let restrictions = check_restrictions(&project, &table, assets);
    let mut report = load_report;
    report.merge(restrictions);

    if json {
        let output = serde_json::json!({
            "audit": &audit,
            "summary": audit.summary(),
            "restrictions": &report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(report.ok);
    }

    println!("{} {}", "Auditing".bold(), display_path(path));
    println!();
    println!(
        "{}",
        "Asset,Class,TotalMemoryMB,TotalDiskMB,Dependencies,Depth,Breadth".bold().underline()
    );
    for result in audit.largest(max_count) {
        println!(
            "{},{},{:.2},{:.2},{},{},{}",
            result.package,
            result.class.dimmed(),
            to_megabytes(result.total_memory_size_bytes),
            to_megabytes(result.total_disk_size_bytes),
            result.total_dependency_count,
            result.dependency_depth,
            result.max_dependency_breadth
        );
    }
    for failure in &audit.failures {
        println!(
            "  {} {} ({})",
            "warning".yellow().bold(),
            failure.package,
            failure.reason.dimmed()
        );
    }

    if summary {
        println!();
        match audit.summary() {
            Some(summary) => println!("{summary}"),
            None => println!("No assets were audited."),
        }
    }

    println!();
    print_issues(&report.issues);
    if report.ok {
        println!("{} {} asset(s) within size limits", "✓".green().bold(), audit.results.len());
    } else {
        println!(
            "{} {} size restriction error(s)",
            "✗".red().bold(),
            report.count(Severity::Error)
        );
    }

    Ok(report.ok)
}

fn cmd_check(path: &Path) -> Result<bool> {
    let (project, report) = load(path)?;
    let types = &project.content.types;

    println!("{}", "Project Info".bold().underline());
    println!("  Name:     {}", project.config.name);
    println!("  Classes:  {}", types.classes().count());
    println!("  Structs:  {}", types.structs().count());
    println!("  Enums:    {}", types.enums().count());
    println!("  Objects:  {}", project.content.object_count());
    println!("  Assets:   {}", project.assets.len());

    let settings = project.config.effective_validation();
    if !settings.packages_to_validate.is_empty() {
        println!();
        println!("{}", "Validated Packages".bold().underline());
        for package in &settings.packages_to_validate {
            println!("  {} {}", "→".dimmed(), package);
        }
    }

    if !report.issues.is_empty() {
        println!();
        print_issues(&report.issues);
    }
    Ok(report.ok)
}

fn cmd_condition(expression: &str, path: &Path, object: Option<&str>) -> Result<bool> {
    let parser = EditConditionParser::new();
    let compiled = parser
        .parse(expression)
        .with_context(|| format!("Failed to parse edit condition '{expression}'"))?;

    let postfix: Vec<String> = compiled.tokens.iter().map(|t| t.kind.to_string()).collect();
    println!("{} {}", "Postfix:".bold(), postfix.join(" "));
    let properties: Vec<&str> = compiled.property_names().collect();
    if !properties.is_empty() {
        println!("{} {}", "Reads:".bold(), properties.join(", "));
    }

    let Some(object_path) = object else {
        return Ok(true);
    };
    let (project, _) = load(path)?;
    let Some(target) = project.content.object(object_path) else {
        bail!("Object '{object_path}' not found in project");
    };

    let context = InstanceContext::new(
        &project.content.types,
        TypeCategory::Class,
        &target.class,
        &target.fields,
    );
    let value = parser
        .evaluate(&compiled, &context)
        .with_context(|| format!("Failed to evaluate '{expression}' on '{object_path}'"))?;
    println!("{} {}", "Result:".bold(), if value { "true".green() } else { "false".red() });
    Ok(true)
}

// ── Helpers ──

fn load(path: &Path) -> Result<(LoadedProject, ValidationReport)> {
    load_project(path).with_context(|| format!("Failed to load project at '{}'", path.display()))
}

/// Validate the whole content, or only the named objects, on top of the load report.
fn validate_project(project: &LoadedProject, load_report: ValidationReport, objects: &[String]) -> Result<ValidationReport> {
    let engine = ValidationEngine::new(project.config.effective_validation())
        .with_external_data(project.config.external_data.clone());
    let content = &project.content;

    let mut report = load_report;
    if objects.is_empty() {
        report.merge(engine.validate_content(content));
        return Ok(report);
    }
    for path in objects {
        let Some(object) = content.object(path) else {
            bail!("Object '{path}' not found in project");
        };
        report.push_object(object.path.clone(), engine.validate_object(content, object));
    }
    Ok(report)
}

/// Size restriction issues for every asset, or only the named ones.
fn check_restrictions(project: &LoadedProject, table: &AssetTable, assets: &[String]) -> ValidationReport {
    let restrictions = SizeRestrictions::from_settings(&project.config.size_restrictions);
    let types = &project.content.types;
    if assets.is_empty() || !restrictions.is_enabled() {
        return restrictions.check_assets(table, types);
    }
    let mut report = ValidationReport::success();
    for package in assets {
        for issue in restrictions.check_asset(table, types, package) {
            report.push(issue);
        }
    }
    report
}

fn print_issues(issues: &[Issue]) {
    for issue in issues {
        let label = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        let location = issue.file.as_deref().or(issue.property.as_deref()).unwrap_or("");
        println!(
            "  {} [{}] {} ({})",
            label,
            issue.code.dimmed(),
            issue.message,
            location
        );
    }
}

fn print_object(object: &ObjectResult) {
    let result = &object.result;
    let marker = match result.verdict {
        Verdict::Valid if result.warnings.is_empty() => "✓".green().bold(),
        Verdict::Valid => "⚠".yellow().bold(),
        Verdict::Invalid => "✗".red().bold(),
        Verdict::NotValidated => "-".dimmed(),
    };
    println!("{} {}", marker, object.object);
    for error in &result.errors {
        println!("    {} {}", "error".red().bold(), error);
    }
    for warning in &result.warnings {
        println!("    {} {}", "warning".yellow().bold(), warning);
    }
}

fn display_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
