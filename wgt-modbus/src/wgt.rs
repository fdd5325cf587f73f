//! Typed access to a WGT unit.
//!
//! [`Wgt`] keeps the last values it has seen in a [`WgtState`]. [`Wgt::read_all`]
//! refreshes everything, the setters write one register and store the value the
//! device reports back.

use async_trait::async_trait;

use crate::address::{self, Room};
use crate::client::ModbusClient;
use crate::codec::{Address, Decode, Encode, ScaleFactor};
use crate::config::Config;
use crate::core::{HoldingRegisterMap, RegisterClient};
use crate::derive::{modbus_doc, HoldingRegisterMap};
use crate::enums::{Bypass, FanLevel, Fault, HeatPumpStatus, OperatingMode};
use crate::error::{Error, Result};

#[cfg(feature = "simulator")]
use crate::derive::HoldingRegisterModel;

/// Temperatures are stored in tenths of a degree.
pub const TEMPERATURE_SCALE: ScaleFactor = 0.1;

pub const AIRFLOW_MIN: i16 = 30;
pub const AIRFLOW_MAX: i16 = 100;
pub const TARGET_TEMPERATURE_MIN: f64 = 10.0;
pub const TARGET_TEMPERATURE_MAX: f64 = 30.0;

/// Summary when no status message is active.
pub const NO_MESSAGE: &str = "Keine Meldung";

#[modbus_doc]
#[derive(Debug, Clone, Default, PartialEq, HoldingRegisterMap)]
#[cfg_attr(feature = "simulator", derive(HoldingRegisterModel))]
/// Unit-wide registers.
pub struct DeviceRegisters {
    #[modbus(addr = address::OPERATING_MODE)]
    pub operating_mode: OperatingMode,
    #[modbus(addr = address::FAN_LEVEL_MANUAL)]
    pub fan_level_manual: FanLevel,
    #[modbus(addr = address::FAN_LEVEL_CURRENT, access = "r")]
    pub fan_level_current: FanLevel,
    #[modbus(addr = address::AIRFLOW_MANUAL, unit = "%")]
    pub airflow_manual: i16,
    #[modbus(addr = address::BOOST_VENTILATION)]
    pub boost_ventilation: bool,
    #[modbus(addr = address::BOOST_VENTILATION_REMAINING, unit = "min", access = "r")]
    pub boost_ventilation_remaining: i16,
    #[modbus(addr = address::HEAT_PUMP_STATUS, access = "r")]
    pub heat_pump_status: HeatPumpStatus,
    #[modbus(addr = address::BYPASS, access = "r")]
    pub bypass: Bypass,
    #[modbus(addr = address::OUTSIDE_TEMPERATURE, x = 0.1, unit = "°C", access = "r")]
    pub outside_temperature: f64,
    #[modbus(addr = address::HEAT_PUMP_HEATING_RELEASE)]
    pub heat_pump_heating_release: bool,
    #[modbus(addr = address::HEAT_PUMP_COOLING_RELEASE)]
    pub heat_pump_cooling_release: bool,
    #[modbus(addr = address::FAULT, access = "r")]
    pub fault: Fault,
}

#[modbus_doc]
#[derive(Debug, Clone, Default, PartialEq, HoldingRegisterMap)]
#[cfg_attr(feature = "simulator", derive(HoldingRegisterModel))]
/// Status message flags (Meldungen).
pub struct Messages {
    #[modbus(addr = address::MESSAGE_PRESSURE_SWITCH, access = "r")]
    pub pressure_switch: bool,
    #[modbus(addr = address::MESSAGE_UTILITY_LOCK, access = "r")]
    pub utility_lock: bool,
    #[modbus(addr = address::MESSAGE_DOOR_OPEN, access = "r")]
    pub door_open: bool,
    #[modbus(addr = address::MESSAGE_DEVICE_FILTER, access = "r")]
    pub device_filter: bool,
    #[modbus(addr = address::MESSAGE_UPSTREAM_FILTER, access = "r")]
    pub upstream_filter: bool,
    #[modbus(addr = address::MESSAGE_LOW_TARIFF, access = "r")]
    pub low_tariff: bool,
    #[modbus(addr = address::MESSAGE_SUPPLY_VOLTAGE, access = "r")]
    pub supply_voltage: bool,
    #[modbus(addr = address::MESSAGE_PRESSOSTAT, access = "r")]
    pub pressostat: bool,
    #[modbus(addr = address::MESSAGE_EXTERNAL_UTILITY_LOCK, access = "r")]
    pub external_utility_lock: bool,
    #[modbus(addr = address::MESSAGE_HEATING_MODULE_TEST, access = "r")]
    pub heating_module_test: bool,
    #[modbus(addr = address::MESSAGE_EMERGENCY_MODE, access = "r")]
    pub emergency_mode: bool,
    #[modbus(addr = address::MESSAGE_SUPPLY_AIR_TOO_COLD, access = "r")]
    pub supply_air_too_cold: bool,
}

impl Messages {
    /// Labels of the active messages in register order.
    pub fn active(&self) -> Vec<&'static str> {
        [
            (self.pressure_switch, "Druckwächter Aktiv"),
            (self.utility_lock, "EVU Sperre Aktiv"),
            (self.door_open, "Tür offen"),
            (self.device_filter, "Gerätefilter verschmutzt"),
            (self.upstream_filter, "Vorgelagerter Filter verschmutzt"),
            (self.low_tariff, "Niedertarif abgeschaltet"),
            (self.supply_voltage, "Versorgungsspannung abgeschaltet"),
            (self.pressostat, "Pressostat ausgelöst"),
            (self.external_utility_lock, "EVU Sperre extern Aktiv"),
            (self.heating_module_test, "Heizmodul Testbetrieb aktiv"),
            (self.emergency_mode, "Notbetrieb aktiv"),
            (self.supply_air_too_cold, "Zuluft zu kalt"),
        ]
        .into_iter()
        .filter_map(|(active, label)| active.then_some(label))
        .collect()
    }

    /// Active messages joined with `" | "`, or [`NO_MESSAGE`].
    pub fn summary(&self) -> String {
        let active = self.active();
        if active.is_empty() {
            NO_MESSAGE.to_string()
        } else {
            active.join(" | ")
        }
    }
}

/// Registers of one room. Their addresses depend on the room number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomRegisters {
    pub room: Room,
    /// °C, read-only
    pub actual_temperature: f64,
    /// °C
    pub target_temperature: f64,
    pub auxiliary_heating_release: bool,
    pub auxiliary_heating_status: bool,
}

impl RoomRegisters {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            ..Self::default()
        }
    }

    pub fn actual_temperature_address(&self) -> Address {
        self.room.register(address::ROOM0_ACTUAL_TEMPERATURE)
    }

    pub fn target_temperature_address(&self) -> Address {
        self.room.register(address::ROOM0_TARGET_TEMPERATURE)
    }

    pub fn auxiliary_heating_release_address(&self) -> Address {
        self.room.register(address::ROOM0_AUXILIARY_HEATING_RELEASE)
    }

    pub fn auxiliary_heating_status_address(&self) -> Address {
        self.room.register(address::ROOM0_AUXILIARY_HEATING_STATUS)
    }

    pub async fn update_target_temperature(
        &mut self,
        client: &mut dyn RegisterClient,
        value: f64,
    ) -> Result<f64> {
        let address = self.target_temperature_address();
        self.target_temperature = update_value(client, address, value, TEMPERATURE_SCALE).await?;
        Ok(self.target_temperature)
    }

    pub async fn update_auxiliary_heating_release(
        &mut self,
        client: &mut dyn RegisterClient,
        value: bool,
    ) -> Result<bool> {
        let address = self.auxiliary_heating_release_address();
        self.auxiliary_heating_release = update_value(client, address, value, 1.0).await?;
        Ok(self.auxiliary_heating_release)
    }

    pub async fn update_auxiliary_heating_status(
        &mut self,
        client: &mut dyn RegisterClient,
        value: bool,
    ) -> Result<bool> {
        let address = self.auxiliary_heating_status_address();
        self.auxiliary_heating_status = update_value(client, address, value, 1.0).await?;
        Ok(self.auxiliary_heating_status)
    }
}

#[async_trait]
impl HoldingRegisterMap for RoomRegisters {
    async fn update_from_holding_registers(
        &mut self,
        client: &mut dyn RegisterClient,
    ) -> Result<()> {
        let word = client.read(self.actual_temperature_address()).await?;
        self.actual_temperature = f64::from_word(word, TEMPERATURE_SCALE);
        let word = client.read(self.target_temperature_address()).await?;
        self.target_temperature = f64::from_word(word, TEMPERATURE_SCALE);
        let word = client.read(self.auxiliary_heating_release_address()).await?;
        self.auxiliary_heating_release = bool::from_word(word, 1.0);
        let word = client.read(self.auxiliary_heating_status_address()).await?;
        self.auxiliary_heating_status = bool::from_word(word, 1.0);

        Ok(())
    }

    async fn write_to_registers(&self, client: &mut dyn RegisterClient) -> Result<()> {
        let word = self.target_temperature.to_word(TEMPERATURE_SCALE)?;
        client.write(self.target_temperature_address(), word).await?;
        let word = self.auxiliary_heating_release.to_word(1.0)?;
        client.write(self.auxiliary_heating_release_address(), word).await?;
        let word = self.auxiliary_heating_status.to_word(1.0)?;
        client.write(self.auxiliary_heating_status_address(), word).await?;

        Ok(())
    }
}

async fn update_value<T>(
    client: &mut dyn RegisterClient,
    address: Address,
    value: T,
    x: ScaleFactor,
) -> Result<T>
where
    T: Decode + Encode,
{
    let word = client.update(address, value.to_word(x)?).await?;
    Ok(T::from_word(word, x))
}

/// Last values seen on the device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WgtState {
    pub device: DeviceRegisters,
    pub room: RoomRegisters,
    pub messages: Messages,
}

impl WgtState {
    pub fn new(room: Room) -> Self {
        Self {
            room: RoomRegisters::new(room),
            ..Self::default()
        }
    }
}

/// A WGT unit seen from one room.
#[derive(Debug)]
pub struct Wgt<C: RegisterClient = ModbusClient> {
    client: C,
    state: WgtState,
}

impl Wgt<ModbusClient> {
    /// Client and room taken from a configuration file.
    pub fn from_config(config: &Config) -> Result<Self> {
        let room = config.room()?;
        Ok(Self::new(ModbusClient::new(config.device.clone()), room))
    }
}

impl<C: RegisterClient> Wgt<C> {
    pub fn new(client: C, room: Room) -> Self {
        Self {
            client,
            state: WgtState::new(room),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    pub fn room(&self) -> Room {
        self.state.room.room
    }

    pub fn state(&self) -> &WgtState {
        &self.state
    }

    /// Read every published value. On error the state keeps the values read so far.
    pub async fn read_all(&mut self) -> Result<&WgtState> {
        self.state
            .room
            .update_from_holding_registers(&mut self.client)
            .await?;
        self.state
            .device
            .update_from_holding_registers(&mut self.client)
            .await?;
        self.state
            .messages
            .update_from_holding_registers(&mut self.client)
            .await?;

        Ok(&self.state)
    }

    pub async fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<OperatingMode> {
        self.state
            .device
            .update_operating_mode(&mut self.client, mode)
            .await
    }

    pub async fn set_fan_level_manual(&mut self, level: FanLevel) -> Result<FanLevel> {
        self.state
            .device
            .update_fan_level_manual(&mut self.client, level)
            .await
    }

    /// Manual airflow in percent, `30..=100`.
    pub async fn set_airflow_manual(&mut self, percent: i16) -> Result<i16> {
        Error::check_range(
            "manual airflow",
            percent.into(),
            AIRFLOW_MIN.into(),
            AIRFLOW_MAX.into(),
        )?;
        self.state
            .device
            .update_airflow_manual(&mut self.client, percent)
            .await
    }

    /// Switch boost ventilation and re-read its remaining time.
    pub async fn set_boost_ventilation(&mut self, on: bool) -> Result<bool> {
        let on = self
            .state
            .device
            .update_boost_ventilation(&mut self.client, on)
            .await?;
        let word = self
            .client
            .read(address::BOOST_VENTILATION_REMAINING)
            .await?;
        self.state.device.boost_ventilation_remaining = i16::from_word(word, 1.0);

        Ok(on)
    }

    pub async fn set_heat_pump_heating_release(&mut self, release: bool) -> Result<bool> {
        self.state
            .device
            .update_heat_pump_heating_release(&mut self.client, release)
            .await
    }

    pub async fn set_heat_pump_cooling_release(&mut self, release: bool) -> Result<bool> {
        self.state
            .device
            .update_heat_pump_cooling_release(&mut self.client, release)
            .await
    }

    /// Room target temperature in °C, `10..=30`.
    pub async fn set_target_temperature(&mut self, celsius: f64) -> Result<f64> {
        Error::check_range(
            "target temperature",
            celsius,
            TARGET_TEMPERATURE_MIN,
            TARGET_TEMPERATURE_MAX,
        )?;
        self.state
            .room
            .update_target_temperature(&mut self.client, celsius)
            .await
    }

    pub async fn set_auxiliary_heating_release(&mut self, release: bool) -> Result<bool> {
        self.state
            .room
            .update_auxiliary_heating_release(&mut self.client, release)
            .await
    }

    pub async fn set_auxiliary_heating_status(&mut self, on: bool) -> Result<bool> {
        self.state
            .room
            .update_auxiliary_heating_status(&mut self.client, on)
            .await
    }
}

#[cfg(feature = "simulator")]
pub use model::WgtModel;

#[cfg(feature = "simulator")]
mod model {
    use super::*;
    use crate::simulator::{ExceptionCode, HoldingRegisterModel, Registers};

    /// Boost ventilation runs this many minutes.
    pub const BOOST_DURATION: i16 = 30;

    impl HoldingRegisterModel for RoomRegisters {
        fn new_registers(&self) -> Registers {
            let mut registers = Registers::default();
            let words = [
                (
                    self.actual_temperature_address(),
                    self.actual_temperature.to_word(TEMPERATURE_SCALE),
                ),
                (
                    self.target_temperature_address(),
                    self.target_temperature.to_word(TEMPERATURE_SCALE),
                ),
                (
                    self.auxiliary_heating_release_address(),
                    self.auxiliary_heating_release.to_word(1.0),
                ),
                (
                    self.auxiliary_heating_status_address(),
                    self.auxiliary_heating_status.to_word(1.0),
                ),
            ];
            for (address, word) in words {
                registers.insert(address, &[word.unwrap_or_default()]);
            }
            registers
        }

        fn update_registers(&self, registers: &mut Registers) -> Result<(), ExceptionCode> {
            let encode = |word: crate::Result<_>| word.map_err(|_| ExceptionCode::IllegalDataValue);
            registers.write(
                self.actual_temperature_address(),
                &[encode(self.actual_temperature.to_word(TEMPERATURE_SCALE))?],
            )?;
            registers.write(
                self.target_temperature_address(),
                &[encode(self.target_temperature.to_word(TEMPERATURE_SCALE))?],
            )?;
            registers.write(
                self.auxiliary_heating_release_address(),
                &[encode(self.auxiliary_heating_release.to_word(1.0))?],
            )?;
            registers.write(
                self.auxiliary_heating_status_address(),
                &[encode(self.auxiliary_heating_status.to_word(1.0))?],
            )
        }

        fn update_self(&mut self, registers: &Registers) -> Result<(), ExceptionCode> {
            let read = |address: Address| {
                registers
                    .get(address)
                    .ok_or(ExceptionCode::IllegalDataAddress)
            };
            self.actual_temperature =
                f64::from_word(read(self.actual_temperature_address())?, TEMPERATURE_SCALE);
            self.target_temperature =
                f64::from_word(read(self.target_temperature_address())?, TEMPERATURE_SCALE);
            self.auxiliary_heating_release =
                bool::from_word(read(self.auxiliary_heating_release_address())?, 1.0);
            self.auxiliary_heating_status =
                bool::from_word(read(self.auxiliary_heating_status_address())?, 1.0);
            Ok(())
        }
    }

    /// Simulated WGT with every room.
    ///
    /// Each [`tick`](HoldingRegisterModel::tick) counts the boost ventilation down by a minute
    /// and moves room temperatures a tenth of a degree towards their target.
    #[derive(Debug, Clone, PartialEq)]
    pub struct WgtModel {
        pub device: DeviceRegisters,
        pub messages: Messages,
        pub rooms: Vec<RoomRegisters>,
    }

    impl Default for WgtModel {
        fn default() -> Self {
            let device = DeviceRegisters {
                operating_mode: OperatingMode::Winter,
                fan_level_manual: FanLevel::Level2,
                fan_level_current: FanLevel::Level2,
                airflow_manual: 70,
                outside_temperature: 8.5,
                heat_pump_heating_release: true,
                ..DeviceRegisters::default()
            };
            let rooms = Room::all()
                .map(|room| RoomRegisters {
                    actual_temperature: 21.5,
                    target_temperature: 21.0,
                    ..RoomRegisters::new(room)
                })
                .collect();

            Self {
                device,
                messages: Messages::default(),
                rooms,
            }
        }
    }

    impl WgtModel {
        pub fn room(&self, room: Room) -> Option<&RoomRegisters> {
            self.rooms.iter().find(|registers| registers.room == room)
        }

        pub fn room_mut(&mut self, room: Room) -> Option<&mut RoomRegisters> {
            self.rooms.iter_mut().find(|registers| registers.room == room)
        }

        fn derive_state(&mut self) {
            let device = &mut self.device;
            if !device.boost_ventilation {
                device.boost_ventilation_remaining = 0;
            } else if device.boost_ventilation_remaining <= 0 {
                device.boost_ventilation_remaining = BOOST_DURATION;
            }
            if device.operating_mode == OperatingMode::Manual {
                device.fan_level_current = device.fan_level_manual;
            }
        }
    }

    impl HoldingRegisterModel for WgtModel {
        fn new_registers(&self) -> Registers {
            let mut registers = self.device.new_registers();
            registers.extend(self.messages.new_registers());
            for room in &self.rooms {
                registers.extend(room.new_registers());
            }
            registers
        }

        fn update_registers(&self, registers: &mut Registers) -> Result<(), ExceptionCode> {
            self.device.update_registers(registers)?;
            self.messages.update_registers(registers)?;
            for room in &self.rooms {
                room.update_registers(registers)?;
            }
            Ok(())
        }

        fn update_self(&mut self, registers: &Registers) -> Result<(), ExceptionCode> {
            self.device.update_self(registers)?;
            self.messages.update_self(registers)?;
            for room in &mut self.rooms {
                room.update_self(registers)?;
            }
            self.derive_state();
            Ok(())
        }

        fn tick(&mut self) {
            let device = &mut self.device;
            if device.boost_ventilation {
                device.boost_ventilation_remaining -= 1;
                if device.boost_ventilation_remaining <= 0 {
                    device.boost_ventilation = false;
                    device.boost_ventilation_remaining = 0;
                }
            }

            for room in &mut self.rooms {
                let actual = (room.actual_temperature * 10.0).round();
                let target = (room.target_temperature * 10.0).round();
                let step = (target - actual).clamp(-1.0, 1.0);
                room.actual_temperature = (actual + step) / 10.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Word;
    use std::collections::HashMap;

    /// In-memory register bank recording every request.
    #[derive(Debug, Default)]
    struct FakeClient {
        registers: HashMap<Address, Word>,
        writes: Vec<(Address, Word)>,
        reads: usize,
    }

    #[async_trait]
    impl RegisterClient for FakeClient {
        async fn read(&mut self, address: Address) -> Result<Word> {
            self.reads += 1;
            Ok(self.registers.get(&address).copied().unwrap_or_default())
        }

        async fn write(&mut self, address: Address, value: Word) -> Result<()> {
            self.writes.push((address, value));
            self.registers.insert(address, value);
            Ok(())
        }
    }

    fn room(number: u8) -> Room {
        Room::new(number).unwrap()
    }

    #[test]
    fn message_summary() {
        let mut messages = Messages::default();
        assert_eq!(messages.summary(), "Keine Meldung");

        messages.door_open = true;
        messages.supply_air_too_cold = true;
        assert_eq!(messages.summary(), "Tür offen | Zuluft zu kalt");
    }

    #[test]
    fn room_addresses_follow_room_number() {
        let registers = RoomRegisters::new(room(3));
        assert_eq!(registers.actual_temperature_address(), 362);
        assert_eq!(registers.target_temperature_address(), 402);
        assert_eq!(registers.auxiliary_heating_release_address(), 442);
        assert_eq!(registers.auxiliary_heating_status_address(), 462);
    }

    #[tokio::test]
    async fn read_all_decodes_every_value() {
        let mut client = FakeClient::default();
        client.registers.extend([
            (address::OPERATING_MODE, 2),
            (address::FAN_LEVEL_CURRENT, 5),
            (address::AIRFLOW_MANUAL, 70),
            (address::OUTSIDE_TEMPERATURE, -35),
            (address::FAULT, 1281),
            (address::BYPASS, 1),
            (address::MESSAGE_DEVICE_FILTER, 1),
            (361, 215),
            (401, 200),
            (461, 1),
        ]);

        let mut wgt = Wgt::new(client, room(2));
        let state = wgt.read_all().await.unwrap().clone();

        assert_eq!(state.device.operating_mode, OperatingMode::Winter);
        assert_eq!(state.device.fan_level_current, FanLevel::Automatic);
        assert_eq!(state.device.airflow_manual, 70);
        assert_eq!(state.device.outside_temperature, -3.5);
        assert_eq!(state.device.fault, Fault::HeatPumpHighPressure);
        assert_eq!(state.device.bypass, Bypass::OpenCooling);
        assert_eq!(state.room.actual_temperature, 21.5);
        assert_eq!(state.room.target_temperature, 20.0);
        assert!(!state.room.auxiliary_heating_release);
        assert!(state.room.auxiliary_heating_status);
        assert_eq!(state.messages.summary(), "Gerätefilter verschmutzt");
        assert!(wgt.client().writes.is_empty());
        // 4 room, 12 device and 12 message registers
        assert_eq!(wgt.client().reads, 28);
    }

    #[tokio::test]
    async fn setters_write_then_read_back() {
        let mut wgt = Wgt::new(FakeClient::default(), room(1));

        assert_eq!(
            wgt.set_operating_mode(OperatingMode::Summer).await.unwrap(),
            OperatingMode::Summer
        );
        assert_eq!(wgt.set_target_temperature(22.5).await.unwrap(), 22.5);
        assert!(wgt.set_auxiliary_heating_release(true).await.unwrap());
        assert_eq!(wgt.set_airflow_manual(55).await.unwrap(), 55);

        assert_eq!(
            wgt.client().writes,
            vec![
                (address::OPERATING_MODE, 3),
                (400, 225),
                (440, 1),
                (address::AIRFLOW_MANUAL, 55)
            ]
        );
        assert_eq!(wgt.state().room.target_temperature, 22.5);
        assert_eq!(wgt.state().device.operating_mode, OperatingMode::Summer);
    }

    #[tokio::test]
    async fn boost_ventilation_rereads_remaining_time() {
        let mut client = FakeClient::default();
        client
            .registers
            .insert(address::BOOST_VENTILATION_REMAINING, 30);
        let mut wgt = Wgt::new(client, room(1));

        assert!(wgt.set_boost_ventilation(true).await.unwrap());
        assert_eq!(wgt.state().device.boost_ventilation_remaining, 30);
    }

    #[tokio::test]
    async fn out_of_range_inputs_are_not_sent() {
        let mut wgt = Wgt::new(FakeClient::default(), room(1));

        assert!(matches!(
            wgt.set_airflow_manual(20).await,
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            wgt.set_target_temperature(30.5).await,
            Err(Error::OutOfRange { .. })
        ));
        assert!(wgt.client().writes.is_empty());
    }

    #[tokio::test]
    async fn write_to_registers_skips_read_only_fields() {
        let device = DeviceRegisters {
            operating_mode: OperatingMode::Manual,
            outside_temperature: 12.3,
            ..DeviceRegisters::default()
        };
        let mut client = FakeClient::default();
        device.write_to_registers(&mut client).await.unwrap();

        let addresses: Vec<Address> = client.writes.iter().map(|(address, _)| *address).collect();
        assert_eq!(
            addresses,
            vec![
                address::OPERATING_MODE,
                address::FAN_LEVEL_MANUAL,
                address::AIRFLOW_MANUAL,
                address::BOOST_VENTILATION,
                address::HEAT_PUMP_HEATING_RELEASE,
                address::HEAT_PUMP_COOLING_RELEASE,
            ]
        );
    }

    #[cfg(feature = "simulator")]
    #[test]
    fn model_counts_boost_down_and_approaches_target() {
        use crate::simulator::HoldingRegisterModel;

        let mut model = WgtModel::default();
        model.device.boost_ventilation = true;
        model.device.boost_ventilation_remaining = 2;

        model.tick();
        assert!(model.device.boost_ventilation);
        assert_eq!(model.device.boost_ventilation_remaining, 1);
        assert_eq!(model.room(room(1)).unwrap().actual_temperature, 21.4);

        model.tick();
        assert!(!model.device.boost_ventilation);
        assert_eq!(model.device.boost_ventilation_remaining, 0);
        assert_eq!(model.room(room(1)).unwrap().actual_temperature, 21.3);
    }

    #[cfg(feature = "simulator")]
    #[test]
    fn model_registers_cover_every_room() {
        use crate::simulator::HoldingRegisterModel;

        let model = WgtModel::default();
        let registers = model.new_registers();
        // 12 device, 12 message and 4 × 17 room registers
        assert_eq!(registers.len(), 12 + 12 + 4 * 17);
        assert_eq!(registers.get(address::OUTSIDE_TEMPERATURE), Some(85));
        assert_eq!(registers.get(376), Some(215));
    }
}
