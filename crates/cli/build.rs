use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let extract = clap::Command::new("extract")
        .about("Extract one record per input URL or local HTML file")
        .arg(clap::arg!(<INPUT> ... "URLs to fetch or local HTML files"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, jsonl, text)")
                .value_name("FORMAT")
                .default_value("json")
                .value_parser(["json", "jsonl", "text"]),
        )
        .arg(
            clap::arg!(-o --"out-dir" <DIR> "Write one <domain>.json file per record into this directory")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-j --jobs <NUM> "Organizations processed concurrently").default_value("4"))
        .arg(clap::arg!(--timeout <SECS> "Timeout for rendering one page or fetching one document").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--"delay-ms" <MS> "Minimum delay between two requests to the same host").default_value("1000"))
        .arg(clap::arg!(--"wait-for-js" "Ask the renderer to let client-side scripts run"))
        .arg(clap::arg!(--"max-subpages" <NUM> "Sub-pages followed per organization").default_value("3"))
        .arg(clap::arg!(--"max-pdfs" <NUM> "PDF reports decoded per organization").default_value("1"))
        .arg(
            clap::arg!(--locale <FILE> "JSON locale file with gazetteer and contact patterns")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-i --interactive "Prompt for selectors for fields left unresolved"))
        .arg(clap::arg!(--provenance "Show where each value came from (text format only)"));

    let overrides = clap::Command::new("overrides")
        .about("Manage per-domain selector overrides")
        .subcommand(
            clap::Command::new("set")
                .about("Store a selector for one field of a domain")
                .arg(clap::arg!(<DOMAIN> "Domain the selector applies to"))
                .arg(clap::arg!(<FIELD> "Field key, e.g. year_founded or contact_info.phone"))
                .arg(clap::arg!(<SELECTOR> "CSS selector")),
        )
        .subcommand(
            clap::Command::new("show")
                .about("Print the overrides that apply to a domain")
                .arg(clap::arg!(<DOMAIN> "Domain to look up")),
        );

    let mut cmd = clap::Command::new("ngoscope")
        .version(env!("CARGO_PKG_VERSION"))
        .author("ngoscope contributors")
        .about("Extract organization records from NGO websites")
        .arg(
            clap::arg!(--"overrides-dir" <DIR> "Directory holding per-domain override files")
                .value_name("DIR")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(extract)
        .subcommand(overrides);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "ngoscope", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "ngoscope", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "ngoscope", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "ngoscope", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
