/// Register map implemented by hand instead of derived
use wgt_modbus::address;
use wgt_modbus::codec::{Decode, Encode};
use wgt_modbus::core::{HoldingRegisterMap, RegisterClient};
use wgt_modbus::{async_trait, ClientConfig, ModbusClient};

#[derive(Debug, Clone, Default)]
pub struct Ventilation {
    /// %
    pub airflow_manual: i16,
    /// °C
    pub outside_temperature: f64,
}

#[async_trait]
impl HoldingRegisterMap for Ventilation {
    async fn update_from_holding_registers(
        &mut self,
        client: &mut dyn RegisterClient,
    ) -> wgt_modbus::Result<()> {
        let word = client.read(address::AIRFLOW_MANUAL).await?;
        self.airflow_manual = i16::from_word(word, 1.0);
        let word = client.read(address::OUTSIDE_TEMPERATURE).await?;
        self.outside_temperature = f64::from_word(word, 0.1);

        Ok(())
    }

    async fn write_to_registers(&self, client: &mut dyn RegisterClient) -> wgt_modbus::Result<()> {
        // Outside temperature is read-only
        let word = self.airflow_manual.to_word(1.0)?;
        client.write(address::AIRFLOW_MANUAL, word).await
    }
}

#[tokio::main]
async fn main() -> wgt_modbus::Result<()> {
    env_logger::init();

    let mut client = ModbusClient::new(ClientConfig::new("127.0.0.1", 5020));

    let mut ventilation = Ventilation::from_holding_registers(&mut client).await?;
    println!("{ventilation:?}");

    ventilation.airflow_manual = 80;
    ventilation.write_to_registers(&mut client).await?;
    ventilation.update_from_holding_registers(&mut client).await?;
    println!("{ventilation:?}");

    client.disconnect().await;
    Ok(())
}
