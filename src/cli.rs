use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::assign::StratifiedAssigner;
use crate::config::AssignmentConfig;
use crate::constants::assign::DEFAULT_SEED;
use crate::constants::blocks::DEFAULT_BLOCK_SEPARATOR;
use crate::data::AssignmentTable;
use crate::io::{read_subject_table, write_assignments};
use crate::metrics::{block_balances, treatment_balance};
use crate::types::Treatment;

#[derive(Debug, Parser)]
#[command(
    name = "stochatreat",
    disable_help_subcommand = true,
    about = "Stratified random treatment assignment",
    long_about = "Assign treatments to subjects so that every block (combination of stratification values) splits as evenly as possible; leftover misfits are assigned by a seeded interval draw.",
    after_help = "Input is a JSON array of objects or JSON Lines. Output is JSON Lines with `id` and `treat` fields."
)]
/// CLI for `stochatreat`.
///
/// Common usage:
/// - Two arms stratified by one column: `--input subjects.jsonl --block-col region --treats 2`
/// - Several stratification columns: repeat `--block-col`, order matters for block keys
/// - Weighted subsample: `--size 500 --weights 0.2,0.3,0.5` (one weight per block, sorted key order)
struct StochatreatCli {
    #[arg(long, value_name = "PATH", help = "Subject table (JSON array or JSON Lines)")]
    input: PathBuf,
    #[arg(
        long = "block-col",
        value_name = "COLUMN",
        required = true,
        help = "Stratification column, repeat as needed in block-key order"
    )]
    block_cols: Vec<String>,
    #[arg(
        long,
        value_parser = parse_treats,
        help = "Number of treatment cells, including control"
    )]
    treats: Treatment,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Deterministic seed")]
    seed: u64,
    #[arg(
        long = "idx-col",
        value_name = "COLUMN",
        help = "Identifier column; defaults to the row position"
    )]
    idx_col: Option<String>,
    #[arg(long, value_parser = parse_positive_usize, help = "Target sample size")]
    size: Option<usize>,
    #[arg(
        long,
        value_name = "W1,W2,...",
        value_parser = parse_weights_arg,
        help = "Comma-separated per-block weights in sorted block-key order"
    )]
    weights: Option<Weights>,
    #[arg(
        long = "block-separator",
        value_name = "SEP",
        help = "Separator placed between stratification values in block keys (default: none)"
    )]
    block_separator: Option<String>,
    #[arg(long, value_name = "PATH", help = "Output path; stdout when omitted")]
    output: Option<PathBuf>,
    #[arg(long, help = "Print a balance report to stderr")]
    summary: bool,
}

#[derive(Debug, Clone)]
struct Weights(Vec<f64>);

/// Run the `stochatreat` command line over `args_iter` (program name excluded).
pub fn run_stochatreat<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let Some(cli) =
        parse_cli::<StochatreatCli, _>(std::iter::once("stochatreat".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let config = AssignmentConfig {
        block_cols: cli.block_cols,
        treats: cli.treats,
        seed: cli.seed,
        idx_col: cli.idx_col,
        size: cli.size,
        weights: cli.weights.map(|weights| weights.0),
        block_separator: cli
            .block_separator
            .unwrap_or_else(|| DEFAULT_BLOCK_SEPARATOR.to_string()),
    };
    let assigner = StratifiedAssigner::new(config)?;
    let table = read_subject_table(&cli.input)?;
    let result = assigner.assign(&table)?;

    match &cli.output {
        Some(path) => write_assignments(File::create(path)?, &result)?,
        None => write_assignments(io::stdout().lock(), &result)?,
    }

    if cli.summary {
        print_summary(&mut io::stderr().lock(), &result)?;
    }
    Ok(())
}

fn print_summary<W: Write>(out: &mut W, result: &AssignmentTable) -> io::Result<()> {
    let overall = treatment_balance(&result.assignments, result.treats);
    writeln!(out, "=== treatment balance ===")?;
    writeln!(
        out,
        "subjects: {}  treats: {}  blocks: {}",
        overall.total,
        result.treats,
        result.blocks.len()
    )?;
    for share in &overall.per_treatment {
        writeln!(
            out,
            "  treat {}: {} ({:.2}%)",
            share.treat,
            share.count,
            share.share * 100.0
        )?;
    }
    writeln!(out)?;
    writeln!(out, "[PER BLOCK]")?;
    for (summary, block) in result.blocks.iter().zip(block_balances(result)) {
        let counts: Vec<String> = block
            .balance
            .per_treatment
            .iter()
            .map(|share| share.count.to_string())
            .collect();
        writeln!(
            out,
            "  {} => size {}, sampled {}, misfits {}, counts [{}]",
            summary.key,
            summary.size,
            summary.sampled,
            summary.misfits,
            counts.join(", ")
        )?;
    }
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_treats(raw: &str) -> Result<Treatment, String> {
    let parsed = raw.parse::<Treatment>().map_err(|_| {
        format!(
            "Could not parse --treats value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed == 0 {
        return Err("--treats must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse --size value '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("--size must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_weights_arg(raw: &str) -> Result<Weights, String> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid weight '{}': must be a float", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_weights_arg_accepts_spaced_lists() {
        let weights = parse_weights_arg("0.25, 0.75").unwrap();
        assert_eq!(weights.0, vec![0.25, 0.75]);
        assert!(parse_weights_arg("0.5,abc").is_err());
    }

    #[test]
    fn parse_treats_rejects_zero() {
        assert_eq!(parse_treats("3").unwrap(), 3);
        assert!(parse_treats("0").is_err());
        assert!(parse_treats("-1").is_err());
    }

    #[test]
    fn cli_requires_block_columns() {
        let parsed = StochatreatCli::try_parse_from([
            "stochatreat",
            "--input",
            "subjects.json",
            "--treats",
            "2",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_collects_repeated_block_columns_in_order() {
        let cli = StochatreatCli::try_parse_from([
            "stochatreat",
            "--input",
            "subjects.json",
            "--block-col",
            "gender",
            "--block-col",
            "smoker",
            "--treats",
            "3",
            "--weights",
            "0.5,0.5",
        ])
        .unwrap();
        assert_eq!(cli.block_cols, vec!["gender", "smoker"]);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.weights.map(|w| w.0), Some(vec![0.5, 0.5]));
    }

    #[test]
    fn help_exits_cleanly() {
        let outcome = parse_cli::<StochatreatCli, _>(["stochatreat", "--help"]).unwrap();
        assert!(outcome.is_none());
    }
}
