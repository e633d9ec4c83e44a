use colored::Colorize;
use qconnect_config::AppConfig;

pub fn list(cfg: &AppConfig) {
    if cfg.servers.is_empty() {
        println!("No servers configured.");
        return;
    }
    for server in cfg.registry().servers() {
        let tls = if server.trust_self_signed {
            " (self-signed TLS trusted)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {}  {}{}",
            server.id.cyan(),
            server.display_name,
            server.base_address,
            tls
        );
    }
}
