use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

use crate::theme::catppuccin::Mocha as P;

#[derive(Debug, Clone)]
pub struct Colors {
    pub op_facing: Color,   // '>' '<' 'v' '^'
    pub op_memory: Color,   // 'd' 'a' 's' 'w'
    pub op_inc: Color,      // '+'
    pub op_dec: Color,      // '-'
    pub op_output: Color,   // '.'
    pub op_input: Color,    // ','
    pub op_bracket: Color,  // '[' and ']'
    pub op_halt: Color,     // '!'
    pub non_op: Color,

    pub error_header: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            op_facing: P::SKY,
            op_memory: P::TEAL,
            op_inc: P::GREEN,
            op_dec: P::RED,
            op_output: P::YELLOW,
            op_input: P::PEACH,
            op_bracket: P::MAUVE,
            op_halt: P::BLUE,
            non_op: P::SURFACE2,

            error_header: P::RED,
        }
    }
}

/// Limits applied to a run when nothing more specific is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub run: RunConfig,
    pub colors: Colors,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| load_from_toml().unwrap_or_default())
}

pub fn colors() -> &'static Colors {
    &config().colors
}

/// Resolve run limits: flags -> env -> config file -> unlimited.
pub fn resolve_limits(max_steps: Option<usize>, timeout_ms: Option<u64>) -> RunConfig {
    let file = &config().run;
    RunConfig {
        max_steps: max_steps
            .or_else(|| env_number("BRAINBOX_MAX_STEPS"))
            .or(file.max_steps),
        timeout_ms: timeout_ms
            .or_else(|| env_number("BRAINBOX_TIMEOUT_MS"))
            .or(file.timeout_ms),
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
    } else {
        let name = s.to_ascii_lowercase();
        return Some(match name.as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "purple" | "magenta" => Color::Purple,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "gray" | "grey" | "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
            "lightred" | "light_red" => Color::LightRed,
            "lightgreen" | "light_green" => Color::LightGreen,
            "lightblue" | "light_blue" => Color::LightBlue,
            "lightpurple" | "light_purple" | "lightmagenta" | "light_magenta" => Color::LightPurple,
            "lightcyan" | "light_cyan" => Color::LightCyan,
            _ => return None,
        });
    }
    None
}

fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("brainbox.toml");
    Some(path)
}

fn load_from_toml() -> Option<Config> {
    let path = config_path()?;
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no config file loaded");
            return None;
        }
    };
    tracing::debug!(path = %path.display(), "loaded config");
    Some(parse_config(&content))
}

/// Parse the small TOML subset we accept: `[run]` and `[colors]` sections
/// holding `key = value` pairs. Values may be quoted.
pub fn parse_config(content: &str) -> Config {
    let mut section = String::new();
    let mut map: HashMap<(String, String), String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len()-1].trim().to_string();
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq+1..].trim();
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len()-1].to_string()
            } else { val_raw.to_string() };
            map.insert((section.clone(), key), val);
        }
    }

    let mut cfg = Config::default();
    let get = |section: &str, key: &str| map.get(&(section.to_string(), key.to_string()));

    if let Some(v) = get("run", "max_steps") {
        match v.parse() {
            Ok(n) => cfg.run.max_steps = Some(n),
            Err(_) => tracing::warn!(value = %v, "ignoring invalid run.max_steps"),
        }
    }
    if let Some(v) = get("run", "timeout_ms") {
        match v.parse() {
            Ok(n) => cfg.run.timeout_ms = Some(n),
            Err(_) => tracing::warn!(value = %v, "ignoring invalid run.timeout_ms"),
        }
    }

    macro_rules! set {
        ($field:ident) => {
            if let Some(v) = get("colors", stringify!($field)).and_then(|s| parse_color(s)) { cfg.colors.$field = v; }
        };
    }

    set!(op_facing);
    set!(op_memory);
    set!(op_inc);
    set!(op_dec);
    set!(op_output);
    set!(op_input);
    set!(op_bracket);
    set!(op_halt);
    set!(non_op);
    set!(error_header);

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_and_colors_sections() {
        let cfg = parse_config(
            r##"
# limits
[run]
max_steps = 5000
timeout_ms = "250"

[colors]
op_halt = "#ff0000"
non_op = light_cyan
"##,
        );
        assert_eq!(cfg.run.max_steps, Some(5000));
        assert_eq!(cfg.run.timeout_ms, Some(250));
        assert_eq!(cfg.colors.op_halt, Color::Rgb(255, 0, 0));
        assert_eq!(cfg.colors.non_op, Color::LightCyan);
    }

    #[test]
    fn keys_are_scoped_to_their_section() {
        let cfg = parse_config("[colors]\nmax_steps = 10\n");
        assert_eq!(cfg.run, RunConfig::default());
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let cfg = parse_config("[run]\nmax_steps = lots\n[colors]\nop_inc = \"#zzzzzz\"\n");
        assert_eq!(cfg.run.max_steps, None);
        assert_eq!(cfg.colors.op_inc, Colors::default().op_inc);
    }

    #[test]
    fn flags_win_over_everything() {
        let limits = resolve_limits(Some(7), Some(9));
        assert_eq!(limits, RunConfig { max_steps: Some(7), timeout_ms: Some(9) });
    }
}
