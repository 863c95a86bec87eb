use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use pagefold::build::build_site;
use pagefold::config::Config;
use pagefold::node;
use pagefold::projector::{ProjectionConfig, Projector};
use std::error::Error;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("pagefold")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a personal blog from a content directory")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs progress at INFO level"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site into the output directory")
                .arg(
                    Arg::with_name("project")
                        .short("p")
                        .long("project")
                        .takes_value(true)
                        .default_value(".")
                        .help("A directory inside the project (searched upward for pagefold.yaml)"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value("_output")
                        .help("The directory the site is written to"),
                ),
        )
        .subcommand(
            SubCommand::with_name("project")
                .about("Prints the navigation headers and recent posts for a page-map snapshot")
                .arg(
                    Arg::with_name("snapshot")
                        .required(true)
                        .help("A JSON or YAML page-map snapshot"),
                )
                .arg(
                    Arg::with_name("posts-folder")
                        .long("posts-folder")
                        .takes_value(true)
                        .help("The top-level folder holding posts [default: posts]"),
                )
                .arg(
                    Arg::with_name("max-posts")
                        .long("max-posts")
                        .takes_value(true)
                        .help("The number of recent posts to keep [default: 10]"),
                ),
        )
        .get_matches();

    let verbose = matches.is_present("verbose")
        || matches
            .subcommand()
            .1
            .map(|args| args.is_present("verbose"))
            .unwrap_or(false);
    init_tracing(verbose);

    let result = match matches.subcommand() {
        ("build", Some(args)) => build(args),
        ("project", Some(args)) => project(args),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        let mut source = err.source();
        while let Some(err) = source {
            eprintln!("  caused by: {}", err);
            source = err.source();
        }
        std::process::exit(1);
    }
}

// --verbose forces INFO, otherwise RUST_LOG decides, defaulting to WARN.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build(args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let project = Path::new(args.value_of("project").unwrap_or("."));
    let output = Path::new(args.value_of("output").unwrap_or("_output"));
    let config = Config::from_directory(project, output)?;
    build_site(&config)?;
    Ok(())
}

fn project(args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = args.value_of("snapshot").unwrap_or_default();
    let input = std::fs::read_to_string(path)?;
    let nodes = node::from_snapshot(&input)?;
    let mut config = ProjectionConfig::default();
    if let Some(posts_folder) = args.value_of("posts-folder") {
        config.posts_folder = posts_folder.to_owned();
    }
    if let Some(max_posts) = args.value_of("max-posts") {
        config.max_posts = max_posts.parse()?;
    }
    let projection = Projector::new(&config).project(&nodes);
    print!("{}", serde_yaml::to_string(&projection)?);
    Ok(())
}
