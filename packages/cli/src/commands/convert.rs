use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lettercraft_model::{convert as convert_length, Unit};

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Length to convert
    pub value: f64,

    /// Unit of the value (mm, cm, in)
    #[arg(long)]
    pub from: Unit,

    /// Target unit (mm, cm, in)
    #[arg(long)]
    pub to: Unit,
}

pub fn convert(args: ConvertArgs, _cwd: &str) -> Result<()> {
    let converted = convert_length(args.value, args.from, args.to);
    println!(
        "{} {} = {}",
        args.value,
        args.from,
        format!("{} {}", converted, args.to).bright_white().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ConvertArgs,
    }

    #[test]
    fn test_parse_units() {
        let harness = Harness::parse_from(["convert", "21", "--from", "cm", "--to", "in"]);
        assert_eq!(harness.args.value, 21.0);
        assert_eq!(harness.args.from, Unit::Cm);
        assert_eq!(harness.args.to, Unit::In);
        assert!(convert(harness.args, ".").is_ok());
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!(Harness::try_parse_from(["convert", "1", "--from", "pt", "--to", "mm"]).is_err());
    }
}
