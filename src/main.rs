//! resume-scorer: score a resume against a target job role

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use resume_scorer::cli::{self, Cli, Commands, ConfigAction, RoleAction};
use resume_scorer::config::{Config, RewriteMode};
use resume_scorer::input::InputManager;
use resume_scorer::output::formatter::{self, ReportGenerator, ReportMeta};
use resume_scorer::processing::role::TaxonomyStore;
use resume_scorer::processing::AnalysisEngine;
use resume_scorer::ResumeScorerError;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ResumeScorerError>() {
            Some(reason) if reason.is_user_facing() => eprintln!("❌ {}", reason),
            _ => error!("Command failed: {:#}", e),
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            resume,
            role,
            output,
            save,
            rule_based,
        } => analyze(config, &resume, &role, output.as_deref(), save, rule_based).await,
        Commands::Roles { action } => roles(&config, action),
        Commands::Config { action } => config_command(config, cli.config.as_deref(), action),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Config::load().context("Failed to load configuration"),
    }
}

async fn analyze(
    mut config: Config,
    resume: &Path,
    role: &str,
    output: Option<&str>,
    save: Option<PathBuf>,
    rule_based: bool,
) -> Result<()> {
    let format = match output {
        Some(output) => cli::parse_output_format(output).map_err(anyhow::Error::msg)?,
        None => config.output.format,
    };
    if rule_based {
        config.rewriter.mode = RewriteMode::RuleBased;
    }

    let mut input_manager = InputManager::new();
    let document = input_manager.load(resume).await?;

    let generator = ReportGenerator::new(&config.output);
    let engine = AnalysisEngine::new(config).context("Failed to initialize analysis engine")?;

    info!("Scoring {} for '{}'", resume.display(), role);
    let result = engine.analyze(&document.bytes, &document.mime_type, role).await?;

    let meta = ReportMeta::new(resume.display().to_string(), role);
    let rendered = generator.generate(&result, &meta, format)?;
    println!("{}", rendered);

    if let Some(save) = save {
        let path = if save.is_dir() {
            save.join(formatter::suggest_filename(format, &meta.resume_name, true))
        } else {
            save
        };
        // Saved console reports never carry color codes.
        let content = match format {
            resume_scorer::config::OutputFormat::Console => {
                let mut plain = engine.config().output.clone();
                plain.color_output = false;
                ReportGenerator::new(&plain).generate(&result, &meta, format)?
            }
            _ => rendered,
        };
        formatter::save_report_to_file(&content, &path)
            .with_context(|| format!("Failed to save report to {}", path.display()))?;
        println!("💾 Report saved to {}", path.display());
    }

    Ok(())
}

fn roles(config: &Config, action: RoleAction) -> Result<()> {
    let store = TaxonomyStore::from_config(&config.taxonomy).context("Failed to load role taxonomy")?;
    let taxonomy = store.snapshot();

    match action {
        RoleAction::List => {
            println!("📋 Role families:");
            for family in taxonomy.families() {
                println!("  • {} ({} keywords)", family.name, family.keywords.len());
                println!("    aliases: {}", family.aliases.join(", "));
            }
            println!(
                "  • {} (fallback, {} keywords)",
                taxonomy.generic().name,
                taxonomy.generic().keywords.len()
            );
        }
        RoleAction::Show { title } => {
            let profile = taxonomy.resolve(&title)?;
            println!("🎯 {}", profile.title);
            println!("  Normalized: {}", profile.normalized_title);
            println!(
                "  Family: {}{}",
                profile.family,
                if profile.matched_family { "" } else { " (no match, generic profile)" }
            );
            println!("  Seniority: {}", profile.expected_seniority_cue);
            println!("  Expected keywords:");
            for keyword in &profile.expected_keywords {
                println!("    {:<24} {:.2}", keyword.term, keyword.weight);
            }
        }
    }
    Ok(())
}

fn config_command(config: Config, explicit: Option<&Path>, action: Option<ConfigAction>) -> Result<()> {
    let path = explicit.map(Path::to_path_buf).unwrap_or_else(Config::config_path);

    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("# {}\n{}", path.display(), content);
        }
        ConfigAction::Reset => {
            Config::default()
                .save_to(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Configuration reset to defaults at {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
