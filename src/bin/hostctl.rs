//! hostctl - host administration CLI
//!
//! Thin command-line front end over the libhostctl clients: nmcli
//! connections and devices, systemd units, wireless stations and disk
//! usage.

use clap::{Parser, Subcommand};
use libhostctl::config::HostctlConfig;
use libhostctl::df::Df;
use libhostctl::error::HostctlResult;
use libhostctl::exec::ShellInvoker;
use libhostctl::iw::Iw;
use libhostctl::nmcli::NmCli;
use libhostctl::systemctl::{Service, SystemCtl};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hostctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage host networking, services and disks via the system CLIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// NetworkManager connections
    #[command(subcommand)]
    Connection(ConnectionCommands),

    /// NetworkManager devices
    #[command(subcommand)]
    Device(DeviceCommands),

    /// WiFi hotspot management
    #[command(subcommand)]
    Hotspot(HotspotCommands),

    /// systemd units
    #[command(subcommand)]
    Service(ServiceCommands),

    /// Connected wireless stations
    #[command(subcommand)]
    Station(StationCommands),

    /// Disk usage
    Disk,
}

#[derive(Subcommand)]
enum ConnectionCommands {
    /// List connection profiles
    List,
    /// Show one connection
    Show { name: String },
    /// Activate a connection
    Up { name: String },
    /// Deactivate a connection
    Down { name: String },
    /// Set a connection option
    Modify {
        name: String,
        option: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum DeviceCommands {
    /// Show device properties
    Show { name: String },
    /// Show device hardware address
    Hwaddr { name: String },
}

#[derive(Subcommand)]
enum HotspotCommands {
    /// Create and activate a WPA-personal hotspot
    Create {
        /// Wireless device to host the hotspot
        device: String,
        /// Connection name, also used as the SSID
        name: String,
        /// WPA passphrase (at least 8 characters)
        password: String,
    },
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Enable and start a unit
    Enable {
        name: String,
        /// Operate on the calling user's service manager
        #[arg(long)]
        user: bool,
    },
    /// Disable and stop a unit
    Disable {
        name: String,
        #[arg(long)]
        user: bool,
    },
    /// Restart a unit
    Restart { name: String },
    /// Report whether a unit is active
    Status { name: String },
}

#[derive(Subcommand)]
enum StationCommands {
    /// List stations connected to the wireless interface
    List {
        /// Interface to query instead of the configured default
        #[arg(short, long)]
        interface: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match HostctlConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => HostctlConfig::default(),
    };

    if let Err(e) = run(&cli, &config).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: &Cli, config: &HostctlConfig) -> HostctlResult<()> {
    let invoker = Arc::new(ShellInvoker::new());

    match &cli.command {
        Commands::Connection(command) => {
            let nm = NmCli::new(invoker);
            match command {
                ConnectionCommands::List => {
                    let connections = nm.connections().await?;
                    if cli.json {
                        let records: Vec<_> = connections
                            .iter()
                            .map(|c| {
                                json!({
                                    "name": c.name,
                                    "uuid": c.uuid,
                                    "type": c.connection_type.as_str(),
                                    "device": c.device,
                                })
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&records).unwrap_or_default());
                    } else {
                        for c in &connections {
                            println!(
                                "{}  {}  {}  {}",
                                c.name, c.uuid, c.connection_type, c.device
                            );
                        }
                    }
                }
                ConnectionCommands::Show { name } => {
                    let conn = nm.connection(name).await?;
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "name": conn.name,
                                "uuid": conn.uuid,
                                "type": conn.connection_type.as_str(),
                                "device": conn.device,
                                "active": conn.is_active(),
                                "autoconnect": conn.autoconnect(),
                                "gateway": conn.gateway().map(|g| g.to_string()),
                            }))
                            .unwrap_or_default()
                        );
                    } else {
                        println!("Name:        {}", conn.name);
                        println!("UUID:        {}", conn.uuid);
                        println!("Type:        {}", conn.connection_type);
                        println!("Device:      {}", conn.device);
                        println!("Active:      {}", conn.is_active());
                        println!("Autoconnect: {}", conn.autoconnect());
                        if let Some(gateway) = conn.gateway() {
                            println!("Gateway:     {}", gateway);
                        }
                    }
                }
                ConnectionCommands::Up { name } => {
                    nm.connection(name).await?.up().await?;
                    println!("Connection '{}' activated", name);
                }
                ConnectionCommands::Down { name } => {
                    nm.connection(name).await?.down().await?;
                    println!("Connection '{}' deactivated", name);
                }
                ConnectionCommands::Modify {
                    name,
                    option,
                    value,
                } => {
                    nm.connection(name).await?.set_option(option, value).await?;
                    println!("Set {} = {}", option, value);
                }
            }
        }
        Commands::Device(command) => {
            let nm = NmCli::new(invoker);
            match command {
                DeviceCommands::Show { name } => {
                    let device = nm.device(name).await?;
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "name": name,
                                "canBeAccessPoint": device.can_be_access_point(),
                            }))
                            .unwrap_or_default()
                        );
                    } else {
                        println!("Device:             {}", name);
                        println!("Can be accesspoint: {}", device.can_be_access_point());
                    }
                }
                DeviceCommands::Hwaddr { name } => {
                    println!("{}", nm.hardware_address(name).await?);
                }
            }
        }
        Commands::Hotspot(command) => {
            let nm = NmCli::new(invoker);
            match command {
                HotspotCommands::Create {
                    device,
                    name,
                    password,
                } => {
                    let hotspot = nm.create_hotspot(device, name, password).await?;
                    println!("Hotspot '{}' created on {}", hotspot.ssid(), device);
                }
            }
        }
        Commands::Service(command) => {
            let ctl = SystemCtl::new(invoker);
            match command {
                ServiceCommands::Enable { name, user } => {
                    let service = Service::new(name.clone())?;
                    if *user {
                        ctl.enable_for_user(&service).await?;
                    } else {
                        ctl.enable(&service).await?;
                    }
                    println!("Service '{}' enabled", service);
                }
                ServiceCommands::Disable { name, user } => {
                    let service = Service::new(name.clone())?;
                    if *user {
                        ctl.disable_for_user(&service).await?;
                    } else {
                        ctl.disable(&service).await?;
                    }
                    println!("Service '{}' disabled", service);
                }
                ServiceCommands::Restart { name } => {
                    let service = Service::new(name.clone())?;
                    ctl.restart(&service).await?;
                    println!("Service '{}' restarted", service);
                }
                ServiceCommands::Status { name } => {
                    let service = Service::new(name.clone())?;
                    let active = ctl.is_active(&service).await;
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "service": service.name(),
                                "active": active,
                            }))
                            .unwrap_or_default()
                        );
                    } else {
                        println!("{}: {}", service, if active { "active" } else { "inactive" });
                    }
                }
            }
        }
        Commands::Station(command) => {
            let iw = Iw::from_config(invoker, config);
            match command {
                StationCommands::List { interface } => {
                    let stations = match interface {
                        Some(interface) => iw.stations_on(interface).await?,
                        None => iw.stations().await?,
                    };
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&stations).unwrap_or_default()
                        );
                    } else {
                        for station in &stations {
                            println!(
                                "{}  {}  tx {}  rx {}",
                                station.mac, station.interface, station.tx_bitrate, station.rx_bitrate
                            );
                        }
                    }
                }
            }
        }
        Commands::Disk => {
            let df = Df::from_config(invoker, config);
            let stats = df.stats().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats).unwrap_or_default());
            } else {
                for s in &stats {
                    println!(
                        "{}  {}  {}  {}  {}",
                        s.name, s.size, s.used, s.available, s.mount_point
                    );
                }
            }
        }
    }

    Ok(())
}
