use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use wgt_modbus::codec::{Address, Word};
use wgt_modbus::enums::OperatingMode;
use wgt_modbus::simulator::{run_tcp_simulator, DataStore, Simulator};
use wgt_modbus::wgt::{Wgt, WgtModel, WgtState};
use wgt_modbus::{Config, ModbusClient};

/// Read and control a WGT ventilation unit over Modbus-TCP
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// YAML configuration file
    #[clap(long, short)]
    config: Option<PathBuf>,

    /// Device host, overrides the configuration file
    #[clap(long)]
    host: Option<String>,

    /// Device port, overrides the configuration file
    #[clap(long)]
    port: Option<u16>,

    /// Deadline for connecting and for each send or receive
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// Room number (1 to 17)
    #[clap(long)]
    room: Option<u8>,

    /// Reject read responses that do not match the request
    #[clap(long)]
    verify_reads: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read one holding register
    Read { address: Address },
    /// Write one register
    Write { address: Address, value: Word },
    /// Write one register and read it back
    Update { address: Address, value: Word },
    /// Read every value of the unit and the room
    Status,
    /// Show or set the operating mode, e.g. "Winterbetrieb"
    Mode { label: Option<String> },
    /// Show or set the room target temperature in °C
    Temperature { celsius: Option<f64> },
    /// Serve a simulated unit
    Simulate {
        #[clap(long, default_value = "127.0.0.1:5020")]
        bind: SocketAddr,
        /// Simulated minute
        #[clap(long, default_value = "60000")]
        period_ms: u64,
    },
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(host) = &self.host {
            config.device.host = host.clone();
        }
        if let Some(port) = self.port {
            config.device.port = port;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.device.timeout_ms = timeout_ms;
        }
        if let Some(room) = self.room {
            config.room = room;
        }
        if self.verify_reads {
            config.device.verify_read_responses = true;
        }
        Ok(config)
    }
}

fn print_state(state: &WgtState) {
    let device = &state.device;
    let room = &state.room;
    println!("Betriebsart:              {}", device.operating_mode);
    println!("Luftstufe manuell:        {}", device.fan_level_manual);
    println!("Luftstufe aktuell:        {}", device.fan_level_current);
    println!("Luftleistung manuell:     {} %", device.airflow_manual);
    println!(
        "Stoßlüftung:              {} ({} min)",
        device.boost_ventilation, device.boost_ventilation_remaining
    );
    println!("Bypass:                   {}", device.bypass);
    println!("WP Status:                {}", device.heat_pump_status);
    println!("WP Freigabe Heizen:       {}", device.heat_pump_heating_release);
    println!("WP Freigabe Kühlen:       {}", device.heat_pump_cooling_release);
    println!("Außentemperatur:          {:.1} °C", device.outside_temperature);
    println!("Fehlermeldung:            {}", device.fault);
    println!("Raum:                     {}", room.room.number());
    println!("Temperatur Ist:           {:.1} °C", room.actual_temperature);
    println!("Temperatur Soll:          {:.1} °C", room.target_temperature);
    println!("ZH Freigabe:              {}", room.auxiliary_heating_release);
    println!("ZH Status:                {}", room.auxiliary_heating_status);
    println!("Meldung:                  {}", state.messages.summary());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();
    let config = args.config()?;

    match args.command {
        Command::Simulate { bind, period_ms } => {
            let simulator = Simulator::new(DataStore::new(WgtModel::default()));
            info!("simulating a WGT on {bind}");
            run_tcp_simulator(bind, simulator, Duration::from_millis(period_ms)).await?;
            Ok(())
        }
        command => {
            let mut wgt = Wgt::from_config(&config)?;
            let result = run(&mut wgt, command, &config.device.endpoint()).await;
            wgt.client_mut().disconnect().await;
            result
        }
    }
}

async fn run(wgt: &mut Wgt<ModbusClient>, command: Command, endpoint: &str) -> anyhow::Result<()> {
    match command {
        Command::Read { address } => {
            let value = wgt
                .client_mut()
                .read(address)
                .await
                .with_context(|| format!("reading register {address} from {endpoint}"))?;
            println!("{value}");
        }
        Command::Write { address, value } => {
            wgt.client_mut()
                .write(address, value)
                .await
                .with_context(|| format!("writing register {address} on {endpoint}"))?;
        }
        Command::Update { address, value } => {
            let value = wgt
                .client_mut()
                .update(address, value)
                .await
                .with_context(|| format!("updating register {address} on {endpoint}"))?;
            println!("{value}");
        }
        Command::Status => {
            let state = wgt
                .read_all()
                .await
                .with_context(|| format!("reading status from {endpoint}"))?;
            print_state(state);
        }
        Command::Mode { label } => {
            let mode = match label {
                Some(label) => {
                    let mode: OperatingMode = label.parse()?;
                    wgt.set_operating_mode(mode).await?
                }
                None => wgt.read_all().await?.device.operating_mode,
            };
            println!("{mode}");
        }
        Command::Temperature { celsius } => {
            let celsius = match celsius {
                Some(celsius) => wgt.set_target_temperature(celsius).await?,
                None => wgt.read_all().await?.room.target_temperature,
            };
            println!("{celsius:.1}");
        }
        Command::Simulate { .. } => anyhow::bail!("simulate does not talk to a device"),
    }

    Ok(())
}
