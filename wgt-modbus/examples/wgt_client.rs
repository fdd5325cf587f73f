/// Poll a WGT, e.g. the one started by the `wgt-device` example
use std::time::Duration;

use wgt_modbus::address::Room;
use wgt_modbus::enums::OperatingMode;
use wgt_modbus::wgt::Wgt;
use wgt_modbus::{ClientConfig, ModbusClient};

#[tokio::main]
async fn main() -> wgt_modbus::Result<()> {
    env_logger::init();

    let config = ClientConfig::new("127.0.0.1", 5020).with_timeout(Duration::from_secs(2));
    let mut wgt = Wgt::new(ModbusClient::new(config), Room::new(1)?);

    let mode = wgt.set_operating_mode(OperatingMode::Manual).await?;
    println!("operating mode: {mode}");
    let target = wgt.set_target_temperature(22.0).await?;
    println!("target temperature: {target} °C");

    loop {
        match wgt.read_all().await {
            Ok(state) => println!(
                "{:.1} °C (target {:.1} °C), outside {:.1} °C, {} / {}, {}",
                state.room.actual_temperature,
                state.room.target_temperature,
                state.device.outside_temperature,
                state.device.operating_mode,
                state.device.fan_level_current,
                state.messages.summary()
            ),
            // The client reconnects on the next call
            Err(err) => eprintln!("{err}"),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
