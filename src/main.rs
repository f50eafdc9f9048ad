use emberwood::cli::CliOverrides;
use emberwood::run_with_overrides;

fn main() {
    let overrides = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed.into_config_overrides(),
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run_with_overrides(overrides) {
        eprintln!("Application error: {err:?}");
    }
}
