use std::env;
use std::process;

use anyhow::{Context, Result, anyhow};
use pmoigd::{IgdOptions, PortMapping, Protocol, spawn_discover_igd};

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let options = IgdOptions::from_config(&pmoconfig::get_config());
    let discover = spawn_discover_igd(options);

    match (args[1].as_str(), args.len()) {
        ("s", 2) => {
            let igd = discover.recv().context("No Internet Gateway Device found")?;
            let status = igd
                .spawn_connection_status()
                .recv()
                .context("Cannot read the connection status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        ("l", 2) => {
            let igd = discover.recv().context("No Internet Gateway Device found")?;
            let mappings: Vec<PortMapping> = igd.spawn_list_redirections().iter().collect();
            println!("{}", serde_json::to_string_pretty(&mappings)?);
        }
        ("a", 4) => {
            let port: u16 = args[2]
                .parse()
                .with_context(|| format!("Invalid port {:?}", args[2]))?;
            let protocol: Protocol = args[3].parse()?;

            let igd = discover.recv().context("No Internet Gateway Device found")?;
            let mapping = igd
                .spawn_add_local_port_redirection(port, protocol)
                .recv()
                .map_err(|_| anyhow!("{} refused the port mapping", igd))?;
            println!("{}", mapping);
        }
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {0} s                 # print the IGD connection status\n  {0} a <port> <tcp|udp>  # map <port> on the IGD to the same local port\n  {0} l                 # list the port mappings of the IGD\n\nSet RUST_LOG=pmoigd=debug to trace the SSDP and SOAP exchanges.",
        program
    );
}
