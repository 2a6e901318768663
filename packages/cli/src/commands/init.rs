use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lettercraft_model::default_template_today;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_LETTER_NAME: &str = "letter.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory
    #[arg(short, long, default_value = "letters")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Lettercraft project...".bright_blue().bold()
    );

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    // Starter letter from the default template
    let letter_file = src_dir.join(DEFAULT_LETTER_NAME);
    if !letter_file.exists() {
        let letter_json = serde_json::to_string_pretty(&default_template_today())?;
        fs::write(&letter_file, letter_json)?;
        println!("  {} Created {}", "✓".green(), DEFAULT_LETTER_NAME);
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        ..Config::default()
    };
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/{}", args.src_dir, DEFAULT_LETTER_NAME);
    println!("  2. Run: lettercraft compile");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}
