use crate::config::AppConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    scripts_dir: Option<PathBuf>,
    hard_mode: Option<bool>,
    max_ticks: Option<u64>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --scripts/--hard/--ticks with values.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "scripts" => {
                    overrides.scripts_dir = Some(PathBuf::from(value));
                }
                "hard" => {
                    overrides.hard_mode = Some(parse_bool_flag("hard", &value)?);
                }
                "ticks" => {
                    overrides.max_ticks =
                        Some(value.parse::<u64>().with_context(|| format!("Invalid tick count '{value}'"))?);
                }
                _ => bail!("Unknown flag '{flag}'. Supported flags: --scripts, --hard, --ticks."),
            }
        }
        Ok(overrides)
    }

    pub fn into_config_overrides(self) -> AppConfigOverrides {
        AppConfigOverrides {
            scripts_dir: self.scripts_dir,
            hard_mode: self.hard_mode,
            max_ticks: self.max_ticks,
        }
    }

    #[cfg(test)]
    pub fn as_tuple(&self) -> (Option<&std::path::Path>, Option<bool>, Option<u64>) {
        (self.scripts_dir.as_deref(), self.hard_mode, self.max_ticks)
    }
}

fn parse_bool_flag(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => bail!("Invalid value '{value}' for --{name}. Use true/false."),
    }
}
