use crate::config::{Config, Emit};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use lettercraft_compiler_html::{render, CompileOptions};
use lettercraft_model::DocumentSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Settings file or directory (defaults to the configured source directory)
    pub path: Option<String>,

    /// Outputs to produce (overrides config)
    #[arg(short, long, value_enum)]
    pub emit: Vec<Emit>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let root = match &args.path {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.get_src_dir(cwd),
    };

    if !root.exists() {
        return Err(anyhow!("Path does not exist: {:?}", root));
    }

    let (files, base) = if root.is_file() {
        let base = root.parent().map(Path::to_path_buf).unwrap_or_default();
        (vec![root.clone()], base)
    } else {
        (find_settings_files(&root), root.clone())
    };

    if !args.stdout {
        println!("{}", "🔨 Compiling letters...".bright_blue().bold());
    }

    if files.is_empty() {
        println!("{}", "⚠️  No settings files found".yellow());
        return Ok(());
    }

    let emit = if args.emit.is_empty() {
        config.emit.clone()
    } else {
        args.emit.clone()
    };
    let out_dir = PathBuf::from(cwd).join(args.out_dir.as_deref().unwrap_or(&config.out_dir));
    let options = CompileOptions {
        pretty: config.pretty,
        ..CompileOptions::default()
    };

    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&base).unwrap_or(file);
        match compile_file(file, relative_path, &emit, &out_dir, &options, args.stdout) {
            Ok(outputs) => {
                success_count += 1;
                if !args.stdout {
                    println!(
                        "  {} {} → {}",
                        "✓".green(),
                        relative_path.display(),
                        outputs.join(", ")
                    );
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    format!("{:#}", e).red()
                );
            }
        }
    }

    if args.stdout {
        return if error_count == 0 {
            Ok(())
        } else {
            Err(anyhow!("{} of {} letters failed", error_count, files.len()))
        };
    }

    println!();
    if error_count == 0 {
        println!(
            "{} Compiled {} letters successfully",
            "✅".green(),
            success_count
        );
        Ok(())
    } else {
        Err(anyhow!(
            "Compiled {} letters, {} errors",
            success_count,
            error_count
        ))
    }
}

fn find_settings_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}

fn load_settings(path: &Path) -> Result<DocumentSettings> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))
}

fn compile_file(
    file_path: &Path,
    relative_path: &Path,
    emit: &[Emit],
    out_dir: &Path,
    options: &CompileOptions,
    stdout: bool,
) -> Result<Vec<String>> {
    let settings = load_settings(file_path)?;
    let mut outputs = Vec::new();

    for &target in emit {
        let output = render(&settings, target.mode(), options.clone())?;

        if stdout {
            println!("{}", output);
            outputs.push("stdout".to_string());
            continue;
        }

        let output_file = out_dir.join(relative_path).with_extension(target.extension());
        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_file, output)?;
        debug!(file = %output_file.display(), ?target, "wrote letter");
        outputs.push(output_file.display().to_string());
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettercraft_model::{FragmentId, SettingsUpdate};

    fn write_letter(dir: &Path, name: &str, body: &str) {
        let settings = DocumentSettings::default()
            .with(SettingsUpdate::SetFragment {
                id: FragmentId::Body,
                markup: body.to_string(),
            })
            .unwrap();
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), serde_json::to_string(&settings).unwrap()).unwrap();
    }

    fn args() -> CompileArgs {
        CompileArgs {
            path: None,
            emit: Vec::new(),
            stdout: false,
            out_dir: None,
        }
    }

    #[test]
    fn test_compile_directory_writes_both_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        write_letter(&dir.path().join("letters"), "undangan.json", "<p>Undangan rapat</p>");
        write_letter(&dir.path().join("letters/arsip"), "lama.json", "<p>Arsip</p>");

        compile(args(), &cwd).unwrap();

        let dist = dir.path().join("dist");
        let export = fs::read_to_string(dist.join("undangan.export.html")).unwrap();
        assert!(export.contains("<p>Undangan rapat</p>"));
        assert!(dist.join("undangan.preview.html").exists());
        assert!(dist.join("arsip/lama.export.html").exists());
    }

    #[test]
    fn test_compile_single_file_with_emit_override() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        write_letter(dir.path(), "surat.json", "<p>Halo</p>");

        let args = CompileArgs {
            path: Some("surat.json".to_string()),
            emit: vec![Emit::Export],
            out_dir: Some("out".to_string()),
            ..args()
        };
        compile(args, &cwd).unwrap();

        assert!(dir.path().join("out/surat.export.html").exists());
        assert!(!dir.path().join("out/surat.preview.html").exists());
    }

    #[test]
    fn test_invalid_settings_fail() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        let letters = dir.path().join("letters");
        fs::create_dir_all(&letters).unwrap();
        fs::write(letters.join("broken.json"), "{ not json").unwrap();

        assert!(compile(args(), &cwd).is_err());
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        assert!(compile(args(), &cwd).is_err());
    }
}
