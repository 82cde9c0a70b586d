// Command-line parsing for the diagnose runner.

use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: diagnose <table.csv> [--overrides FILE] [--thresholds FILE] [--json]

  <table.csv>          weekly performance sheet exported as CSV
  --overrides FILE     JSON object of secondary inputs keyed by week label
  --thresholds FILE    JSON object overriding diagnostic thresholds
  --json               print the full diagnosis as JSON instead of text";

#[derive(Debug, PartialEq)]
pub struct CliArgs {
    pub table: PathBuf,
    pub overrides: Option<PathBuf>,
    pub thresholds: Option<PathBuf>,
    pub json: bool,
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let args: Vec<String> = args.into_iter().collect();
    let mut table = None;
    let mut overrides = None;
    let mut thresholds = None;
    let mut json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--overrides" => {
                i += 1;
                overrides = Some(PathBuf::from(
                    args.get(i).ok_or("--overrides needs a file")?,
                ));
            }
            "--thresholds" => {
                i += 1;
                thresholds = Some(PathBuf::from(
                    args.get(i).ok_or("--thresholds needs a file")?,
                ));
            }
            "--json" => json = true,
            arg if !arg.starts_with('-') && table.is_none() => {
                table = Some(PathBuf::from(arg));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(CliArgs {
        table: table.ok_or("missing week table path")?,
        overrides,
        thresholds,
        json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_flags() {
        let cli = parse_args(strings(&["weeks.csv", "--overrides", "o.json", "--json"])).unwrap();
        assert_eq!(cli.table, PathBuf::from("weeks.csv"));
        assert_eq!(cli.overrides, Some(PathBuf::from("o.json")));
        assert_eq!(cli.thresholds, None);
        assert!(cli.json);
    }

    #[test]
    fn rejects_missing_table_and_dangling_flag() {
        assert!(parse_args(strings(&["--json"])).is_err());
        assert!(parse_args(strings(&["weeks.csv", "--thresholds"])).is_err());
        assert!(parse_args(strings(&["a.csv", "b.csv"])).is_err());
    }
}
