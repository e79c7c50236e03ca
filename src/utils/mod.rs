pub mod persistence;

use std::{env, path::PathBuf, sync::Once};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIR_NAME: &str = ".tradebook";
const HOME_ENV: &str = "TRADEBOOK_HOME";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
            .add_directive(
                "tradebook_core=info"
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            );

        // A subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.tradebook`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Lowercase, dash-separated slug used for file names.
pub fn canonical_name(name: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !slug.is_empty() && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-').to_string();
    if trimmed.is_empty() {
        "book".into()
    } else {
        trimmed
    }
}

/// Turns a free-form backup note into a file-name friendly label.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
