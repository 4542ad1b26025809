use clap::{Arg, Command};
use std::error::Error;
use std::io::Read;
use tracing_subscriber::EnvFilter;
use zonal_io::{bounds_window, window_bounds, Affine, Bounds, Layer, Normalizer};

fn parse_floats<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn run_features(input: &str, layer: Option<&String>) -> Result<(), Box<dyn Error>> {
    let mut normalizer = Normalizer::new();
    if let Some(layer) = layer {
        normalizer = normalizer.layer(Layer::parse(layer));
    }

    // "-" reads the input text from stdin
    let collection = if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        normalizer.feature_collection(text)?
    } else {
        normalizer.feature_collection(input)?
    };
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}

fn run_window(bounds: [f64; 4], transform: [f64; 6]) -> Result<(), Box<dyn Error>> {
    let [a, b, c, d, e, f] = transform;
    let affine = Affine::new(a, b, c, d, e, f);
    let window = bounds_window(&Bounds::from((bounds[0], bounds[1], bounds[2], bounds[3])), &affine)?;
    let covered = window_bounds(&window, &affine);
    println!(
        "(({}, {}), ({}, {}))",
        window.rows.0, window.rows.1, window.cols.0, window.cols.1
    );
    println!(
        "covers ({}, {}, {}, {})",
        covered.minx, covered.miny, covered.maxx, covered.maxy
    );
    Ok(())
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let matches = Command::new("zonal-io")
        .version("0.1")
        .author("Jesper Fjellin")
        .about("Normalizes vector input and computes raster windows for zonal statistics")
        .subcommand_required(true)
        .subcommand(
            Command::new("features")
                .about("Print any vector input as a GeoJSON FeatureCollection")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .help("Path, GeoJSON text, WKT, hex WKB, or - for stdin"),
                )
                .arg(
                    Arg::new("layer")
                        .short('l')
                        .long("layer")
                        .num_args(1)
                        .help("Layer index or name of a multi-layer source"),
                ),
        )
        .subcommand(
            Command::new("window")
                .about("Print the pixel window covering a bounding box")
                .arg(
                    Arg::new("bounds")
                        .short('b')
                        .long("bounds")
                        .required(true)
                        .allow_hyphen_values(true)
                        .value_parser(parse_floats::<4>)
                        .help("minx,miny,maxx,maxy"),
                )
                .arg(
                    Arg::new("transform")
                        .short('t')
                        .long("transform")
                        .required(true)
                        .allow_hyphen_values(true)
                        .value_parser(parse_floats::<6>)
                        .help("Affine coefficients a,b,c,d,e,f"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("features", sub)) => {
            let input = sub
                .get_one::<String>("input")
                .map(String::as_str)
                .unwrap_or("-");
            run_features(input, sub.get_one::<String>("layer"))
        }
        Some(("window", sub)) => match (
            sub.get_one::<[f64; 4]>("bounds"),
            sub.get_one::<[f64; 6]>("transform"),
        ) {
            (Some(bounds), Some(transform)) => run_window(*bounds, *transform),
            _ => Err("window needs --bounds and --transform".into()),
        },
        _ => Err("unknown command".into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
