//! Command line definition
//!
//! Options follow GDAL conventions (`-of GTiff`, `-co NAME=VALUE`, ...).
//! clap only understands single-dash short flags, so known long options
//! given with one dash are rewritten to the double-dash form before
//! parsing.

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Long options accepted with a single dash, in their canonical spelling
const GDAL_STYLE_OPTIONS: [&str; 10] = [
    "of", "ot", "initid", "co", "q", "quiet", "csv", "input_file_list", "config", "log-file",
];

/// Rewrites `-of`, `-CSV`, `-q`, ... as `--of`, `--csv`, `--quiet`, ...
///
/// Matching is case-insensitive. Option values are never rewritten, and
/// everything after a bare `--` is left alone.
pub fn normalize_gdal_style_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut normalized = Vec::new();
    let mut expecting_value = false;
    let mut passthrough = false;

    for (i, arg) in args.into_iter().enumerate() {
        let arg: String = arg.into();
        if i == 0 || passthrough || expecting_value {
            expecting_value = false;
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let canonical = arg.strip_prefix('-')
            .filter(|body| !body.starts_with('-'))
            .and_then(|body| GDAL_STYLE_OPTIONS.iter().find(|name| name.eq_ignore_ascii_case(body)));

        match canonical {
            Some(&"q") | Some(&"quiet") => normalized.push("--quiet".to_string()),
            Some(name) => {
                expecting_value = true;
                normalized.push(format!("--{}", name));
            }
            None => {
                expecting_value = arg == "-o";
                normalized.push(arg);
            }
        }
    }

    normalized
}

/// Builds the clap command
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("rastercombine")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Overlay co-registered rasters and catalogue their unique pixel value combinations")
        .arg(
            Arg::new("inputs")
                .help("Input rasters; band 1 of each is combined")
                .value_name("INPUT")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .help("Output raster of combination identifiers")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("format")
                .long("of")
                .help("Output raster format [default: GTiff]")
                .value_name("DRIVER"),
        )
        .arg(
            Arg::new("type")
                .long("ot")
                .help("Output sample type: Byte, UInt16 or UInt32 [default: UInt16]")
                .value_name("TYPE"),
        )
        .arg(
            Arg::new("initid")
                .long("initid")
                .help("First combination identifier [default: 0]")
                .value_name("ID")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true),
        )
        .arg(
            Arg::new("co")
                .long("co")
                .help("Creation option for the output raster (repeatable)")
                .value_name("NAME=VALUE")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress progress and informational output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Output CSV table of combinations")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("input_file_list")
                .long("input_file_list")
                .help("File listing additional input rasters, one per line")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with a [combine] table of defaults")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .help("Append log records to this file")
                .value_name("FILE"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(args: &[&str]) -> Vec<String> {
        normalize_gdal_style_args(args.iter().copied())
    }

    #[test]
    fn single_dash_long_options_gain_a_dash() {
        assert_eq!(
            normalize(&["rastercombine", "-OF", "MEM", "-co", "COMPRESS=ZSTD", "-Q", "-csv", "out.csv", "a.tif"]),
            vec!["rastercombine", "--of", "MEM", "--co", "COMPRESS=ZSTD", "--quiet", "--csv", "out.csv", "a.tif"],
        );
    }

    #[test]
    fn values_and_unknown_options_are_left_alone() {
        assert_eq!(
            normalize(&["rastercombine", "-o", "-csv", "-initid", "-3", "-xyz", "--", "-q"]),
            vec!["rastercombine", "-o", "-csv", "--initid", "-3", "-xyz", "--", "-q"],
        );
    }

    #[test]
    fn normalized_arguments_parse() {
        let args = normalize(&["rastercombine", "-o", "ids.tif", "-ot", "Byte", "-initid", "1",
                               "-co", "COMPRESS=DEFLATE", "-co", "BLOCKYSIZE=8", "-quiet",
                               "-csv", "out.csv", "a.tif", "b.tif"]);
        let matches = build_cli().try_get_matches_from(args).unwrap();

        assert_eq!(matches.get_one::<String>("output").map(String::as_str), Some("ids.tif"));
        assert_eq!(matches.get_one::<String>("type").map(String::as_str), Some("Byte"));
        assert_eq!(matches.get_one::<i64>("initid"), Some(&1));
        assert_eq!(matches.get_many::<String>("co").unwrap().count(), 2);
        assert!(matches.get_flag("quiet"));
        assert_eq!(matches.get_many::<String>("inputs").unwrap().collect::<Vec<_>>(), vec!["a.tif", "b.tif"]);
    }

    #[test]
    fn unrecognised_options_are_errors() {
        let args = normalize(&["rastercombine", "-csv", "out.csv", "-unknown", "a.tif"]);
        assert!(build_cli().try_get_matches_from(args).is_err());
    }
}
