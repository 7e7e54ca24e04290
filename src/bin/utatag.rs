use std::env;
use std::path::PathBuf;
use std::process;

use utatag::tagger::{self, TagRun};
use utatag::utanet::{DEFAULT_REQUEST_DELAY_MS, DEFAULT_USER_AGENT};
use utatag::{Config, UtaNetClient};

fn print_usage() {
    println!("Add lyrics from uta-net.com to the audio files in a directory");
    println!();
    println!("Usage: utatag [DIRECTORY] [OPTIONS]");
    println!();
    println!("Arguments:");
    println!("  DIRECTORY                 Directory containing audio files (default: current directory)");
    println!();
    println!("Options:");
    println!("  -d, --directory <DIR>     Directory containing audio files");
    println!("  -u, --url <URL>           uta-net.com artist page URL (default: auto-detect)");
    println!("  --per-file                Search for the artist of each file individually");
    println!("  --delay <MS>              Minimum delay between requests in milliseconds (default: 500)");
    println!("  --user-agent <UA>         User-Agent header for catalogue requests");
    println!("  -v, --verbose             Print each catalogue request as it goes out");
    println!("  --show-defaults           Show built-in default values and exit");
    println!("  --show-saved-defaults     Show saved default configuration from file and exit");
    println!("  --save-defaults           Save current command-line options as defaults");
    println!("  -h, --help                Show this help message");
    println!();
    println!("Configuration:");
    println!("  Defaults can be saved to ~/.state/utatag/defaults.toml using --save-defaults.");
    println!("  Saved defaults override built-in defaults, and command-line options override both.");
    println!();
    println!("Examples:");
    println!("  utatag ~/Music/YOASOBI");
    println!("  utatag -d ~/Music/YOASOBI -u https://www.uta-net.com/artist/12795/");
    println!("  utatag ~/Music/mixed --per-file --verbose");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Load saved defaults from config file if available
    let saved_config = Config::load().unwrap_or_else(|_| Config::new());

    // Built-in default values
    let builtin_defaults = Config {
        directory: Some(".".to_string()),
        artist_url: None,
        per_file_search: Some(false),
        request_delay_ms: Some(DEFAULT_REQUEST_DELAY_MS),
        user_agent: Some(DEFAULT_USER_AGENT.to_string()),
        verbose: Some(false),
    };

    // Start with built-in defaults, then apply saved config
    let mut effective_config = builtin_defaults.clone();
    effective_config.merge(&saved_config);

    // Current values (will be updated by command-line args)
    let mut directory = effective_config
        .directory
        .clone()
        .unwrap_or_else(|| ".".to_string());
    let mut artist_url = effective_config.artist_url.clone();
    let mut per_file_search = effective_config.per_file_search.unwrap_or(false);
    let mut request_delay_ms = effective_config
        .request_delay_ms
        .unwrap_or(DEFAULT_REQUEST_DELAY_MS);
    let mut user_agent = effective_config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let mut verbose = effective_config.verbose.unwrap_or(false);

    // Track which options were explicitly set on command line
    let mut cmdline_config = Config::new();
    let mut save_defaults = false;

    let mut i = 1;
    let mut positional_args = Vec::new();

    while i < args.len() {
        match args[i].as_str() {
            "--show-defaults" => {
                builtin_defaults.print("Built-in default settings");
                process::exit(0);
            }
            "--show-saved-defaults" => {
                if let Ok(config_path) = Config::get_config_path() {
                    if config_path.exists() {
                        println!("Saved defaults from {:?}:", config_path);
                        println!();
                        saved_config.print("Configuration");
                    } else {
                        println!("No saved defaults file found at {:?}", config_path);
                        println!("Use --save-defaults to create one.");
                    }
                } else {
                    println!("Could not determine config file path");
                }
                process::exit(0);
            }
            "--save-defaults" => {
                save_defaults = true;
            }
            "-d" | "--directory" => {
                if i + 1 < args.len() {
                    directory = args[i + 1].clone();
                    cmdline_config.directory = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-u" | "--url" => {
                if i + 1 < args.len() {
                    artist_url = Some(args[i + 1].clone());
                    cmdline_config.artist_url = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--per-file" => {
                per_file_search = true;
                cmdline_config.per_file_search = Some(true);
            }
            "--delay" => {
                if i + 1 < args.len() {
                    request_delay_ms = args[i + 1].parse().unwrap_or(DEFAULT_REQUEST_DELAY_MS);
                    cmdline_config.request_delay_ms = Some(request_delay_ms);
                    i += 1;
                }
            }
            "--user-agent" => {
                if i + 1 < args.len() {
                    user_agent = args[i + 1].clone();
                    cmdline_config.user_agent = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
                cmdline_config.verbose = Some(true);
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                positional_args.push(arg.to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    // Save defaults if requested
    if save_defaults {
        // Merge command-line config with saved config
        let mut config_to_save = saved_config.clone();
        config_to_save.merge(&cmdline_config);

        match config_to_save.save() {
            Ok(_) => {
                if let Ok(config_path) = Config::get_config_path() {
                    println!("Defaults saved to {:?}", config_path);
                    println!();
                    config_to_save.print("Saved configuration");
                }
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error saving defaults: {}", e);
                process::exit(1);
            }
        }
    }

    // Get directory from positional args
    if !positional_args.is_empty() {
        directory = positional_args[0].clone();
    }

    let opts = TagRun {
        directory: PathBuf::from(&directory),
        artist_url,
        per_file_search,
        verbose,
    };

    let mut client = UtaNetClient::with_settings(&user_agent, request_delay_ms);
    if let Err(e) = tagger::run(&mut client, &opts) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
