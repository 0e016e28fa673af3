//! Closed string enumerations used throughout the metadata.

use crate::xml::field_codec::XmlValue;

/// Declare an enum whose variants map one-to-one onto fixed XML strings
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("'{}' is not a valid {}", other, stringify!($name))),
                }
            }
        }

        impl XmlValue for $name {
            fn to_xml_text(&self) -> String {
                self.as_str().to_string()
            }

            fn from_xml_text(text: &str) -> Result<Self, String> {
                text.parse()
            }
        }
    };
}

string_enum! {
    /// Domain of the signal array samples
    DomainType { Fx => "FX", Toa => "TOA" }
}

string_enum! {
    /// Sign of the phase term in the signal model
    PhaseSgn { Plus => "+1", Minus => "-1" }
}

string_enum! {
    EarthModelType { Wgs84 => "WGS_84" }
}

string_enum! {
    /// Binary sample format of the signal arrays
    SignalArrayFormat { Ci2 => "CI2", Ci4 => "CI4", Cf8 => "CF8" }
}

impl SignalArrayFormat {
    /// Bytes per complex sample
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SignalArrayFormat::Ci2 => 2,
            SignalArrayFormat::Ci4 => 4,
            SignalArrayFormat::Cf8 => 8,
        }
    }
}

string_enum! {
    PolarizationType {
        X => "X",
        Y => "Y",
        V => "V",
        H => "H",
        Rhc => "RHC",
        Lhc => "LHC",
        Unspecified => "UNSPECIFIED",
    }
}

string_enum! {
    SideOfTrack { Left => "L", Right => "R" }
}

string_enum! {
    CollectType { Monostatic => "MONOSTATIC", Bistatic => "BISTATIC" }
}

string_enum! {
    RadarModeType {
        Spotlight => "SPOTLIGHT",
        Stripmap => "STRIPMAP",
        DynamicStripmap => "DYNAMIC STRIPMAP",
    }
}

string_enum! {
    /// Reference frame of position/velocity error statistics
    FrameType { Ecf => "ECF", RicEcf => "RIC_ECF", RicEci => "RIC_ECI" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trip() {
        for mode in RadarModeType::ALL {
            assert_eq!(mode.as_str().parse::<RadarModeType>().unwrap(), *mode);
        }
        assert_eq!(" CF8 ".parse::<SignalArrayFormat>().unwrap(), SignalArrayFormat::Cf8);
        assert_eq!(PhaseSgn::Minus.to_string(), "-1");
        assert!("cf8".parse::<SignalArrayFormat>().is_err());
        assert_eq!(SignalArrayFormat::Ci4.bytes_per_sample(), 4);
    }
}
