/// Simulated WGT on 127.0.0.1:5020
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use wgt_modbus::simulator::{run_tcp_simulator, DataStore, Simulator};
use wgt_modbus::wgt::WgtModel;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let device = DataStore::new(WgtModel::default());
    let simulator = Simulator::new(device);
    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5020);
    // One tick per simulated minute, sped up
    let state_update_period = Duration::from_secs(1);

    run_tcp_simulator(socket_addr, simulator, state_update_period).await
}
