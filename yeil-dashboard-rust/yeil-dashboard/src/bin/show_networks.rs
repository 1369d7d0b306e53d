use yeil_dashboard::infrastructure::config::Config;

fn main() {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    println!("Yeil Dashboard Network Configuration:\n");
    println!("  Environment: {}", config.environment);
    println!("  Default Chain: {}", config.default_chain_id);
    println!(
        "  WalletConnect Project ID: {}",
        if config.walletconnect_project_id.is_empty() { "(not set)" } else { &config.walletconnect_project_id }
    );
    println!(
        "  Signer: {}",
        if config.signer_private_key.is_some() { "configured" } else { "(not set, read-only)" }
    );

    let mut chains: Vec<_> = config.supported_chains.values().collect();
    chains.sort_by_key(|c| c.chain_id);
    for chain in chains {
        println!("\n  {} ({})", chain.name, chain.chain_id);
        println!("    RPC URL: {}", chain.rpc_url);
        println!("    Explorer: {}", chain.explorer.as_deref().unwrap_or("(none)"));
        println!("    Contract: {}", chain.contract_address.as_deref().unwrap_or("(not set)"));
    }
}
