//! Holding register addresses of the WGT.
//!
//! Room registers are laid out as `ROOM0_* + room` for rooms `1..=17`.

use crate::codec::Address;
use crate::error::{Error, Result};

// 1xx
pub const OPERATING_MODE: Address = 100;
pub const FAN_LEVEL_MANUAL: Address = 101;
pub const FAN_LEVEL_CURRENT: Address = 102;
pub const AIRFLOW_MANUAL: Address = 103;
pub const BOOST_VENTILATION: Address = 111;
pub const BOOST_VENTILATION_REMAINING: Address = 112;
pub const HEAT_PUMP_STATUS: Address = 114;
pub const BYPASS: Address = 123;

// 2xx
pub const OUTSIDE_TEMPERATURE: Address = 209;
pub const HEAT_PUMP_HEATING_RELEASE: Address = 231;
pub const HEAT_PUMP_COOLING_RELEASE: Address = 232;
pub const FAULT: Address = 240;

pub const MESSAGE_PRESSURE_SWITCH: Address = 242;
pub const MESSAGE_UTILITY_LOCK: Address = 243;
pub const MESSAGE_DOOR_OPEN: Address = 244;
pub const MESSAGE_DEVICE_FILTER: Address = 245;
pub const MESSAGE_UPSTREAM_FILTER: Address = 246;
pub const MESSAGE_LOW_TARIFF: Address = 247;
pub const MESSAGE_SUPPLY_VOLTAGE: Address = 248;
pub const MESSAGE_PRESSOSTAT: Address = 250;
pub const MESSAGE_EXTERNAL_UTILITY_LOCK: Address = 251;
pub const MESSAGE_HEATING_MODULE_TEST: Address = 252;
pub const MESSAGE_EMERGENCY_MODE: Address = 253;
pub const MESSAGE_SUPPLY_AIR_TOO_COLD: Address = 254;

// 3xx
pub const ROOM0_ACTUAL_TEMPERATURE: Address = 359;
pub const ROOM0_TARGET_TEMPERATURE: Address = 399;

// 4xx
pub const ROOM0_AUXILIARY_HEATING_RELEASE: Address = 439;
pub const ROOM0_AUXILIARY_HEATING_STATUS: Address = 459;

// 8xx
pub const EARTH_HEAT_EXCHANGER_HOURS: Address = 813;

/// Number of a room served by the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Room(u8);

impl Room {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 17;

    pub fn new(number: u8) -> Result<Self> {
        Error::check_range(
            "room number",
            number.into(),
            Self::FIRST.into(),
            Self::LAST.into(),
        )?;
        Ok(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Address of this room's register in the block starting at `room0`.
    pub fn register(self, room0: Address) -> Address {
        room0 + Address::from(self.0)
    }

    pub fn all() -> impl Iterator<Item = Room> {
        (Self::FIRST..=Self::LAST).map(Room)
    }
}

impl Default for Room {
    fn default() -> Self {
        Self(Self::FIRST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_registers_are_offset_by_room_number() {
        let room = Room::new(3).unwrap();
        assert_eq!(room.register(ROOM0_TARGET_TEMPERATURE), 402);
        assert_eq!(room.register(ROOM0_AUXILIARY_HEATING_STATUS), 462);
    }

    #[test]
    fn room_numbers_are_validated() {
        assert!(Room::new(0).is_err());
        assert!(Room::new(18).is_err());
        assert_eq!(Room::all().count(), 17);
        assert_eq!(Room::default().number(), 1);
    }
}
