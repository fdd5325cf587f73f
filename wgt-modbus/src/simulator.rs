use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::codec::{Address, Word};
use futures::future;
use log::{debug, error};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};
use tokio_modbus::Quantity;

pub use tokio_modbus::prelude::{ExceptionCode, Request, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A raw Modbus holding registers representation
pub struct Registers(HashMap<Address, Word>);

impl Registers {
    /// Insert new consecutive registers with `words` values starting at `addr` address.
    /// Words past the last address are dropped.
    pub fn insert(&mut self, addr: Address, words: &[Word]) {
        for (i, value) in words.iter().enumerate() {
            let Some(reg_addr) = offset_address(addr, i) else {
                error!(
                    "no register past address {}, {} words dropped",
                    Address::MAX,
                    words.len() - i
                );
                return;
            };
            self.0.insert(reg_addr, *value);
        }
    }

    /// Take over all registers of `other`.
    pub fn extend(&mut self, other: Registers) {
        self.0.extend(other.0);
    }

    pub fn get(&self, addr: Address) -> Option<Word> {
        self.0.get(&addr).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read `cnt` consecutive registers starting at `addr`.
    pub fn read(&self, addr: Address, cnt: Quantity) -> Result<Vec<Word>, ExceptionCode> {
        let mut response_values = vec![0; cnt.into()];
        for (i, value) in response_values.iter_mut().enumerate() {
            let Some(reg_addr) = offset_address(addr, i) else {
                error!(
                    "Exception::IllegalDataAddress - {cnt} registers from {addr} exceed the address range"
                );
                return Err(ExceptionCode::IllegalDataAddress);
            };
            if let Some(r) = self.0.get(&reg_addr) {
                *value = *r;
            } else {
                error!("Exception::IllegalDataAddress - no register at address {reg_addr}");
                return Err(ExceptionCode::IllegalDataAddress);
            }
        }

        Ok(response_values)
    }

    /// Write `words` into existing consecutive registers starting at `addr`.
    /// Nothing is written unless every target register exists.
    pub fn write(&mut self, addr: Address, words: &[Word]) -> Result<(), ExceptionCode> {
        let mut reg_addrs = Vec::with_capacity(words.len());
        for i in 0..words.len() {
            let Some(reg_addr) = offset_address(addr, i) else {
                error!(
                    "Exception::IllegalDataAddress - {} registers from {addr} exceed the address range",
                    words.len()
                );
                return Err(ExceptionCode::IllegalDataAddress);
            };
            if !self.0.contains_key(&reg_addr) {
                error!("Exception::IllegalDataAddress - no register at address {reg_addr}");
                return Err(ExceptionCode::IllegalDataAddress);
            }
            reg_addrs.push(reg_addr);
        }

        for (reg_addr, value) in reg_addrs.into_iter().zip(words) {
            self.0.insert(reg_addr, *value);
        }

        Ok(())
    }

    /// Answer a holding register request. `on_write` runs after a successful write.
    fn serve(
        &mut self,
        req: Request<'_>,
        on_write: impl FnOnce(&mut Registers) -> Result<(), ExceptionCode>,
    ) -> Result<Response, ExceptionCode> {
        match req {
            Request::ReadHoldingRegisters(addr, cnt) => {
                debug!("reading {cnt} holding registers from {addr}");
                let words = self.read(addr, cnt)?;
                Ok(Response::ReadHoldingRegisters(
                    words.into_iter().map(|word| word as u16).collect(),
                ))
            }
            Request::WriteMultipleRegisters(addr, values) => {
                debug!("writing {values:?} to holding registers from {addr}");
                let words: Vec<Word> = values.iter().map(|&value| value as Word).collect();
                self.write(addr, &words)?;
                on_write(self)?;
                Ok(Response::WriteMultipleRegisters(addr, values.len() as Quantity))
            }
            Request::WriteSingleRegister(addr, value) => {
                debug!("writing {value} to holding register {addr}");
                self.write(addr, &[value as Word])?;
                on_write(self)?;
                Ok(Response::WriteSingleRegister(addr, value))
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                Err(ExceptionCode::IllegalFunction)
            }
        }
    }
}

/// `addr + offset`, or `None` past the last address.
fn offset_address(addr: Address, offset: usize) -> Option<Address> {
    Address::try_from(offset)
        .ok()
        .and_then(|offset| addr.checked_add(offset))
}

/// Trait with complementary functionality to [`crate::core::HoldingRegisterMap`]
/// to link [`Registers`] to the type instance for the simulation purposes.
pub trait HoldingRegisterModel {
    /// Create new holding register map.
    fn new_registers(&self) -> Registers;
    fn update_registers(&self, registers: &mut Registers) -> Result<(), ExceptionCode>;
    fn update_self(&mut self, registers: &Registers) -> Result<(), ExceptionCode>;

    /// Advance the simulated device by one step.
    fn tick(&mut self) {}
}

#[derive(Debug, Clone)]
/// Modbus data store to be used in IO operations for the simulation purposes.
pub struct DataStore<H> {
    pub holding_registers: Registers,
    pub model: H,
}

impl<H: HoldingRegisterModel> DataStore<H> {
    pub fn new(model: H) -> Self {
        Self {
            holding_registers: model.new_registers(),
            model,
        }
    }
}

impl<H: HoldingRegisterModel> Device for DataStore<H> {
    fn service_call(&mut self, req: Request<'_>) -> Result<Response, ExceptionCode> {
        let model = &mut self.model;
        self.holding_registers.serve(req, |registers| {
            model.update_self(registers)?;
            // Values derived from the write become visible right away
            model.update_registers(registers)
        })
    }

    fn update_state(&mut self) {
        self.model.tick();
        if let Err(exc) = self.model.update_registers(&mut self.holding_registers) {
            error!("failed to sync simulated registers: {exc:?}");
        }
    }
}

/// A plain register bank without a model behind it.
impl Device for Registers {
    fn service_call(&mut self, req: Request<'_>) -> Result<Response, ExceptionCode> {
        self.serve(req, |_| Ok(()))
    }
}

/// Modbus device simulator trait.
pub trait Device {
    fn service_call(&mut self, req: Request<'_>) -> Result<Response, ExceptionCode>;

    fn update_state(&mut self) {}
}

/// Wrapper around [Device] needed because of [tokio_modbus::server::Service](https://docs.rs/tokio-modbus/latest/tokio_modbus/server/trait.Service.html).
pub struct Simulator<D: Device>(pub Arc<Mutex<D>>);

impl<D: Device> Clone for Simulator<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: Device> Simulator<D> {
    pub fn new(device: D) -> Self {
        Self(Arc::new(Mutex::new(device)))
    }

    /// Lock the simulated device, e.g. to inspect or preload registers.
    pub fn device(&self) -> MutexGuard<'_, D> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Device> tokio_modbus::server::Service for Simulator<D> {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        future::ready(self.device().service_call(req))
    }
}

async fn run_tcp_server_context<D: Device + Send + 'static>(
    listener: TcpListener,
    simulator: Simulator<D>,
) -> std::io::Result<()> {
    let server = Server::new(listener);
    let on_connected = move |stream, socket_addr| {
        let simulator = simulator.clone();
        async move {
            accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                Ok(Some(simulator.clone()))
            })
        }
    };
    let on_process_error = |err: std::io::Error| {
        error!("{err}");
    };
    server.serve(&on_connected, on_process_error).await
}

/// Bind `socket_addr` and serve the simulator in a background task.
///
/// Returns the bound address, which differs from `socket_addr` when port 0
/// is requested.
pub async fn spawn_tcp_simulator<D: Device + Send + 'static>(
    socket_addr: SocketAddr,
    simulator: Simulator<D>,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(socket_addr).await?;
    let local_addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(err) = run_tcp_server_context(listener, simulator).await {
            error!("{err}");
        }
    });

    Ok((local_addr, handle))
}

/// Serve the simulator forever, advancing its state every `state_update_period`.
pub async fn run_tcp_simulator<D: Device + Send + 'static>(
    socket_addr: SocketAddr,
    simulator: Simulator<D>,
    state_update_period: Duration,
) -> std::io::Result<()> {
    let (local_addr, server) = spawn_tcp_simulator(socket_addr, simulator.clone()).await?;
    log::info!("simulator listening on {local_addr}");

    let mut interval = tokio::time::interval(state_update_period);
    loop {
        interval.tick().await;
        if server.is_finished() {
            return Err(std::io::Error::other("simulator server stopped"));
        }
        simulator.device().update_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn bank() -> Registers {
        let mut registers = Registers::default();
        registers.insert(100, &[2, 3]);
        registers
    }

    #[test]
    fn reads_consecutive_registers() {
        assert_eq!(bank().read(100, 2).unwrap(), vec![2, 3]);
        assert_eq!(
            bank().read(100, 3).unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
    }

    #[test]
    fn ranges_past_the_last_address_are_rejected() {
        let mut registers = Registers::default();
        registers.insert(Address::MAX, &[1, 2]);
        assert_eq!(registers.len(), 1);
        assert_eq!(registers.get(Address::MAX), Some(1));

        assert_eq!(
            registers.read(Address::MAX, 2).unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
        assert_eq!(
            registers.write(Address::MAX, &[3, 4]).unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
        assert_eq!(
            registers
                .service_call(Request::ReadHoldingRegisters(Address::MAX, 2))
                .unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
        assert_eq!(
            registers
                .service_call(Request::WriteMultipleRegisters(
                    Address::MAX,
                    Cow::Owned(vec![3, 4])
                ))
                .unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
        assert_eq!(registers.read(Address::MAX, 1).unwrap(), vec![1]);
    }

    #[test]
    fn writes_only_existing_registers() {
        let mut registers = bank();
        registers.write(101, &[-1]).unwrap();
        assert_eq!(registers.get(101), Some(-1));
        assert_eq!(
            registers.write(102, &[1]).unwrap_err(),
            ExceptionCode::IllegalDataAddress
        );
    }

    #[test]
    fn register_bank_serves_requests() {
        let mut registers = bank();
        let response = registers
            .service_call(Request::WriteMultipleRegisters(100, Cow::Owned(vec![0xFFFF])))
            .unwrap();
        assert_eq!(response, Response::WriteMultipleRegisters(100, 1));
        assert_eq!(registers.get(100), Some(-1));

        let response = registers
            .service_call(Request::ReadHoldingRegisters(100, 1))
            .unwrap();
        assert_eq!(response, Response::ReadHoldingRegisters(vec![0xFFFF]));

        assert_eq!(
            registers
                .service_call(Request::ReadCoils(0, 1))
                .unwrap_err(),
            ExceptionCode::IllegalFunction
        );
    }
}
