//! Startup banner and URL display

use super::config::{AppConfig, is_all_interfaces};
use super::constants::APP_NAME;

/// Format a URL as a clickable terminal hyperlink if supported.
///
/// Uses OSC 8 escape sequences where the terminal supports them and falls back
/// to plain cyan text elsewhere.
pub fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{url}\x07\x1b[36m{url}\x1b[0m\x1b]8;;\x07")
    } else {
        format!("\x1b[36m{url}\x1b[0m")
    }
}

/// Print the startup banner with URLs
pub fn print_banner(config: &AppConfig) {
    let host = config.server.host.as_str();
    let port = config.server.port;
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    // Label width for alignment
    const W: usize = 10;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let local_url = format!("http://{display_host}:{port}");
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Local:",
        terminal_link(&local_url)
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{ip}:{port}");
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    terminal_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{host}:{port}");
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network:",
            terminal_link(&network_url)
        );
    }

    let gemini = match (&config.gemini.url, config.gemini.api_key.is_some()) {
        (None, _) => "\x1b[33mnot configured (sample itinerary only)\x1b[0m".to_string(),
        (Some(_), true) if config.gemini.use_api_key => "api key".to_string(),
        (Some(_), _) if config.gemini.service_account_file.is_some() => {
            "service account".to_string()
        }
        (Some(_), _) => "\x1b[33mmissing credentials\x1b[0m".to_string(),
    };
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Gemini:", gemini);
    if config.dev {
        println!(
            "  \x1b[35m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m add ?debug=1 to see raw model output",
            "Dev mode:"
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_link_contains_url_and_color() {
        let url = "http://127.0.0.1:5000";
        let result = terminal_link(url);
        assert!(result.contains(url));
        assert!(result.contains("\x1b[36m"));
        assert!(result.ends_with("\x1b[0m") || result.ends_with("\x1b]8;;\x07"));
    }
}
