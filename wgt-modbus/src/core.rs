use async_trait::async_trait;

use crate::codec::{Address, Word};
use crate::error::Result;

#[async_trait]
/// Single-register access to a device, one request in flight at a time.
pub trait RegisterClient: Send {
    /// Read one holding register.
    async fn read(&mut self, address: Address) -> Result<Word>;

    /// Write one register.
    async fn write(&mut self, address: Address, value: Word) -> Result<()>;

    /// Write `value`, then read the register back. Not atomic.
    async fn update(&mut self, address: Address, value: Word) -> Result<Word> {
        self.write(address, value).await?;
        self.read(address).await
    }
}

#[async_trait]
/// Define mapping between Modbus holding registers and the Self type
/// to create and update the type instance by reading values directly from holding registers, or write the values back to holding registers.
pub trait HoldingRegisterMap
where
    Self: Sized + Default + Send + Sync,
{
    async fn update_from_holding_registers(
        &mut self,
        client: &mut dyn RegisterClient,
    ) -> Result<()>;

    async fn from_holding_registers(client: &mut dyn RegisterClient) -> Result<Self> {
        let mut new = Self::default();
        new.update_from_holding_registers(client).await?;

        Ok(new)
    }

    /// Write every writable field.
    async fn write_to_registers(&self, client: &mut dyn RegisterClient) -> Result<()>;
}
