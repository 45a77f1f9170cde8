//! likedeck library
//!
//! A small web front-end for managing a Spotify library: build playlists from
//! a list of favorite artists, browse and remove liked tracks, browse and
//! unfollow playlists and artists. Sign-in uses the OAuth authorization-code
//! flow and keeps the token in a server-side session.
//!
//! # Modules
//!
//! - `api` - HTTP handlers, one per user-facing action
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by client and handlers
//! - `logger` - Logging capability injected into client and handlers
//! - `server` - Router wiring and the HTTP listener
//! - `session` - Server-side sessions and the signed session cookie
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Sorting, filtering and pagination helpers
//! - `views` - HTML rendering of the pages

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod views;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for start-up failures. Request handling logs through
/// [`logger::Logger`] instead and never terminates the process.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
