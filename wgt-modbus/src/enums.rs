//! Label tables for the enumerated WGT registers.
//!
//! Labels are the ones shown by the unit's own control panel.

use std::fmt;
use std::str::FromStr;

use crate::codec::{Decode, Encode, ScaleFactor, Word};
use crate::error::{Error, Result};

macro_rules! register_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $($variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A value the label table does not know.
            Unknown(Word),
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn from_word(word: Word) -> Self {
                match word {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }

            pub fn word(self) -> Word {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unknown(word) => word,
                }
            }

            pub fn label(self) -> Option<&'static str> {
                match self {
                    $($name::$variant => Some($label),)+
                    $name::Unknown(_) => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.label() {
                    Some(label) => f.write_str(label),
                    None => write!(f, "{} {}", $kind, self.word()),
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(label: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.label() == Some(label))
                    .ok_or_else(|| Error::UnknownLabel {
                        kind: $kind,
                        label: label.to_string(),
                    })
            }
        }

        impl Decode for $name {
            fn from_word(word: Word, _x: ScaleFactor) -> Self {
                $name::from_word(word)
            }
        }

        impl Encode for $name {
            fn to_word(&self, _x: ScaleFactor) -> Result<Word> {
                Ok(self.word())
            }
        }
    };
}

register_enum! {
    /// Operating mode (Betriebsart).
    OperatingMode as "operating mode" {
        Off = 0 => "Aus",
        Manual = 1 => "Handbetrieb",
        Winter = 2 => "Winterbetrieb",
        Summer = 3 => "Sommerbetrieb",
        SummerExhaust = 4 => "Sommer Abluft",
    }
}

register_enum! {
    Bypass as "bypass" {
        Closed = 0 => "Bypass geschlossen",
        OpenCooling = 1 => "Bypass offen (Kühlen)",
        OpenHeating = 2 => "Bypass offen (Heizen)",
    }
}

register_enum! {
    /// Ventilation level (Luftstufe).
    FanLevel as "fan level" {
        Off = 0 => "Aus",
        Level1 = 1 => "Stufe 1",
        Level2 = 2 => "Stufe 2",
        Level3 = 3 => "Stufe 3",
        Level4 = 4 => "Stufe 4",
        Automatic = 5 => "Automatik",
        Linear = 6 => "Linearbetrieb",
    }
}

register_enum! {
    HeatPumpStatus as "heat pump status" {
        Off = 0 => "Aus",
        Heating = 5 => "WP Heizen",
        Cooling = 49 => "WP Kühlen",
    }
}

register_enum! {
    /// Fault code (Fehlermeldung).
    Fault as "fault" {
        NoFault = 0 => "Kein Fehler",
        SupplyFanSpeedMissing = 257 => "Drehzahl Zuluft fehlt",
        ExhaustFanSpeedMissing = 258 => "Drehzahl Abluft fehlt",
        SupplyFanBelowMinimum = 259 => "Ventilator Zuluft Mindestdrehzahl nicht erreicht",
        ExhaustFanBelowMinimum = 260 => "Ventilator Abluft Mindestdrehzahl nicht erreicht",
        SupplyFanAboveMaximum = 261 => "Ventilator Zuluft max. Drehzahl überschritten",
        ExhaustFanAboveMaximum = 262 => "Ventilator Abluft max. Drehzahl überschritten",
        ControlPanelCommunication = 513 => "Kommunikationsfehler zur BDE",
        SecondaryPanelCommunication = 514 => "Kommunikationsfehler Nebenbedieneinheit",
        HeatingModuleCommunication = 515 => "Kommunikationsfehler Heizmodul",
        SensorCommunication = 516 => "Kommunikationsfehler Sensor",
        SensorAdapterCommunication = 517 => "Kommunikationsfehler Sensor-Adapter",
        ReceiverCommunication = 518 => "Kommunikation Empfänger",
        SensorT1 = 770 => "Fehler Sensorelement T1-nach-Ewt",
        SensorT2 = 771 => "Fehler Sensorelement T2-nachVhr",
        SensorT3 = 772 => "Fehler Sensorelement T3-vorNhr",
        SensorT4 = 773 => "Fehler Sensorelement T4-nachNhr",
        SensorT5 = 774 => "Fehler Sensorelement T5-Abluft",
        SensorT6 = 775 => "Fehler Sensorelement T6-imWT",
        SensorT7 = 776 => "Fehler Sensorelement T7-Verdampfer",
        SensorT8 = 777 => "Fehler Sensorelement T8-Kondensator",
        SensorT10 = 779 => "Fehler Sensorelement T10-Außentemperatur",
        ParameterMemory = 1025 => "Fehler Parameterspeicher",
        SystemBus = 1026 => "Fehler System-Bus",
        HeatPumpHighPressure = 1281 => "Wärmepumpe Hochdruck",
        HeatPumpLowPressure = 1282 => "Wärmepumpe Niederdruck",
        DefrostTimeExceeded = 1283 => "Maximale Abtauzeit überschritten",
        HeatPumpLowPressureCooling = 1284 => "Wärmepumpe Niederdruck im Kühlbetrieb",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_map_to_variants_and_back() {
        assert_eq!(OperatingMode::from_word(2), OperatingMode::Winter);
        assert_eq!(HeatPumpStatus::from_word(49), HeatPumpStatus::Cooling);
        assert_eq!(Fault::from_word(1283).word(), 1283);
        for mode in OperatingMode::ALL {
            assert_eq!(OperatingMode::from_word(mode.word()), *mode);
        }
    }

    #[test]
    fn unknown_words_are_kept() {
        let level = FanLevel::from_word(9);
        assert_eq!(level, FanLevel::Unknown(9));
        assert_eq!(level.label(), None);
        assert_eq!(level.word(), 9);
        assert_eq!(level.to_string(), "fan level 9");
    }

    #[test]
    fn labels_parse_and_display() {
        let bypass: Bypass = "Bypass offen (Heizen)".parse().unwrap();
        assert_eq!(bypass, Bypass::OpenHeating);
        assert_eq!(bypass.to_string(), "Bypass offen (Heizen)");
        assert_eq!(FanLevel::default(), FanLevel::Off);
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = "Turbo".parse::<OperatingMode>().unwrap_err();
        assert!(matches!(err, Error::UnknownLabel { kind: "operating mode", .. }));
    }
}
